use serde::Deserialize;

/// Query string of the hook endpoint.
///
/// Bitbucket Server is configured to post to
/// `/bitbucket-scmsource-hook/notify?server_url=<base url>`; a hook without
/// the parameter is accepted but can never match a source.
#[derive(Debug, Default, Deserialize)]
pub struct NotifyQuery {
    #[serde(default)]
    pub server_url: Option<String>,
}
