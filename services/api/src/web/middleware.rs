//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Pulls the session token out of a Cookie header value.
pub fn session_token(cookie_header: &str) -> Option<&str> {
    cookie_header.split(';').find_map(|c| {
        let c = c.trim();
        c.strip_prefix("session=")
    })
}

/// Middleware that validates the auth session cookie and extracts the user id.
///
/// If valid, inserts the user id into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = session_token(cookie_header).ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = state.auth.validate_session(token).await.map_err(|err| {
        warn!(%err, "session validation failed");
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_is_parsed_out_of_the_cookie_header() {
        assert_eq!(session_token("session=abc123"), Some("abc123"));
        assert_eq!(
            session_token("theme=dark; session=abc123; lang=en"),
            Some("abc123")
        );
        assert_eq!(session_token("theme=dark"), None);
    }
}
