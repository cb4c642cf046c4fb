use refs_hook_engine::ProcessOutcome;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub event_type: String,
    /// RFC3339 UTC receive time.
    pub received_at: String,
    #[serde(flatten)]
    pub outcome: ProcessOutcome,
}
