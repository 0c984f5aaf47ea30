use aula_core::{AppError, UserIdentity};
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiResult;

/// Header carrying the authenticated subject, set by the upstream identity gateway.
pub const ACTOR_HEADER: &str = "x-actor-id";

pub async fn require_actor(mut request: Request, next: Next) -> ApiResult<Response> {
    let subject = request
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("actor identity required".to_owned()))?;

    let identity = UserIdentity::new(subject);
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
