use std::sync::Arc;

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use refs_hook_engine::{BitbucketType, HookEventType, HookRequest, process_push_hook};
use tracing::{debug, info, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::notify::{notify_query::NotifyQuery, notify_response::NotifyResponse},
};

const HEADER_EVENT_KEY: &str = "x-event-key";
const HEADER_HOOK_UUID: &str = "x-hook-uuid";
const HEADER_FORWARDED_FOR: &str = "x-forwarded-for";
const HEADER_REQUEST_ID: &str = "x-request-id";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Remote host of the delivery: first forwarded hop, then `Host`.
fn origin_of(headers: &HeaderMap) -> String {
    header(headers, HEADER_FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .or_else(|| header(headers, "host"))
        .unwrap_or("unknown")
        .to_string()
}

/// Only Bitbucket Cloud signs its deliveries with a hook UUID.
fn instance_type_of(headers: &HeaderMap) -> BitbucketType {
    if header(headers, HEADER_HOOK_UUID).is_some() {
        BitbucketType::Cloud
    } else {
        BitbucketType::Server
    }
}

/// Receives a native Bitbucket Server push hook.
///
/// The body is handed to the engine untouched. Deliveries the engine does not
/// act on still answer `200` with an `ignored` outcome; only an undecodable
/// payload is rejected with `400`.
#[instrument(name = "notify_route", skip_all)]
pub async fn notify_route(
    State(state): State<Arc<AppState>>,
    query: Result<Query<NotifyQuery>, QueryRejection>,
    headers: HeaderMap,
    body: String,
) -> AppResult<Response> {
    let Query(query) = query?;

    if let Some(id) = header(&headers, HEADER_REQUEST_ID) {
        debug!(%id, "request id attached");
    }

    let event_key = header(&headers, HEADER_EVENT_KEY)
        .ok_or_else(|| AppError::BadRequest("missing X-Event-Key header".into()))?;

    let request = HookRequest {
        event_type: HookEventType::from_key(event_key),
        payload: (!body.trim().is_empty()).then_some(body),
        instance_type: instance_type_of(&headers),
        origin: origin_of(&headers),
        server_url: query.server_url,
    };

    info!(
        event = %request.event_type,
        origin = %request.origin,
        server_url = request.server_url.as_deref().unwrap_or("-"),
        "hook received"
    );

    let event_type = request.event_type.to_string();
    let outcome = process_push_hook(request, &state.registry, &state.api, &state.trigger).await?;

    let received_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    Ok(ApiResponse::success(NotifyResponse {
        event_type,
        received_at,
        outcome,
    })
    .into_response_with_status(StatusCode::OK))
}
