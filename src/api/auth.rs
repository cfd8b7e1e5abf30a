//! Bearer token authentication.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{Instrument, info_span, warn};
use uuid::Uuid;

use crate::models::Actor;

use super::response::ApiErrorResponse;
use super::state::AppState;

/// Per-request data inserted by [`authenticate`].
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Tags every log line of the request.
    pub correlation_id: Uuid,
    /// The authenticated caller.
    pub actor: Actor,
}

/// Resolves the `Authorization: Bearer <token>` header into an [`Actor`].
///
/// Requests without a known token get a 401 `UNAUTHORIZED` and never reach
/// a handler.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        warn!(
            correlation_id = %correlation_id,
            path = %request.uri().path(),
            "Missing bearer token"
        );
        return ApiErrorResponse::unauthorized("A bearer token is required").into_response();
    };

    let Some(actor) = state.config().authenticate(token) else {
        warn!(
            correlation_id = %correlation_id,
            path = %request.uri().path(),
            "Unknown bearer token"
        );
        return ApiErrorResponse::unauthorized("The bearer token is not recognized")
            .into_response();
    };

    let span = info_span!(
        "request",
        correlation_id = %correlation_id,
        actor = %actor.id,
        method = %request.method(),
        path = %request.uri().path()
    );
    request.extensions_mut().insert(RequestContext {
        correlation_id,
        actor,
    });

    next.run(request).instrument(span).await
}
