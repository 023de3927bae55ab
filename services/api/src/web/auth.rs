//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: signup, login, logout, password reset and
//! email verification. The transition logic lives in the core's
//! `SessionController`; handlers translate its errors to HTTP responses and
//! manage the session cookie.

use axum::{
    extract::{Extension, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use lifelog_core::domain::Identity;
use lifelog_core::ports::ProviderError;
use lifelog_core::session::SessionError;

use crate::web::middleware::session_token;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub code: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct IdentityResponse {
    pub uid: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            uid: identity.uid,
            email: identity.email,
            display_name: identity.display_name,
            email_verified: identity.email_verified,
            created_at: identity.created_at,
        }
    }
}

//=========================================================================================
// Error Translation
//=========================================================================================

pub fn session_error_response(err: SessionError) -> (StatusCode, String) {
    let status = match &err {
        SessionError::Validation(_) => StatusCode::BAD_REQUEST,
        SessionError::EmailAlreadyInUse => StatusCode::CONFLICT,
        SessionError::AccountNotFound => StatusCode::NOT_FOUND,
        SessionError::WrongCredential => StatusCode::UNAUTHORIZED,
        SessionError::EmailNotVerified => StatusCode::FORBIDDEN,
        SessionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        SessionError::NetworkFailure => StatusCode::BAD_GATEWAY,
        SessionError::PermissionDenied => StatusCode::FORBIDDEN,
        SessionError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        SessionError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

pub fn provider_error_response(err: ProviderError) -> (StatusCode, String) {
    session_error_response(SessionError::from_provider(err))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new account and send the verification email.
///
/// The fresh account is signed straight back out: sign-in only becomes
/// possible once the email is verified.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, verification email sent", body = MessageResponse),
        (status = 400, description = "Invalid email or weak password"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let controller = state.session_controller();
    controller
        .sign_up(&req.email, &req.password, &req.name)
        .await
        .map_err(session_error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Account created. Check your inbox to verify your email address."
                .to_string(),
        }),
    ))
}

/// POST /auth/login - Sign in with a verified account.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = IdentityResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Email not verified"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let controller = state.session_controller();
    let identity = controller
        .sign_in(&req.email, &req.password)
        .await
        .map_err(session_error_response)?;

    let ttl = Duration::days(state.config.session_ttl_days);
    let token = state
        .auth
        .create_session(identity.uid, Utc::now() + ttl)
        .await
        .map_err(|err| {
            error!(%err, "failed to create auth session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create session".to_string(),
            )
        })?;

    let cookie = format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        token,
        ttl.num_seconds()
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(IdentityResponse::from(identity)),
    ))
}

/// POST /auth/logout - Logout and invalidate the session.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    let token = session_token(cookie_header)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state.auth.delete_session(token).await.map_err(|err| {
        error!(%err, "failed to delete auth session");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to logout".to_string(),
        )
    })?;

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}

/// POST /auth/reset-password - Send a password-reset email.
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent", body = MessageResponse),
        (status = 400, description = "Invalid email"),
        (status = 404, description = "No account with this email")
    )
)]
pub async fn reset_password_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let controller = state.session_controller();
    controller
        .reset_password(&req.email)
        .await
        .map_err(session_error_response)?;

    Ok(Json(MessageResponse {
        message: "Password reset email sent. Check your inbox for instructions.".to_string(),
    }))
}

/// POST /auth/verify-email - Apply an out-of-band verification code.
#[utoipa::path(
    post,
    path = "/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 500, description = "Invalid or expired code")
    )
)]
pub async fn verify_email_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let controller = state.session_controller();
    controller
        .verify_email(&req.code)
        .await
        .map_err(session_error_response)?;

    Ok(Json(MessageResponse {
        message: "Email verified. You can now sign in.".to_string(),
    }))
}

/// POST /auth/resend-verification - Re-send the verification email.
#[utoipa::path(
    post,
    path = "/auth/resend-verification",
    responses(
        (status = 200, description = "Verification email sent", body = MessageResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn resend_verification_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .auth
        .send_verification_email(user_id)
        .await
        .map_err(provider_error_response)?;

    Ok(Json(MessageResponse {
        message: "Verification email sent.".to_string(),
    }))
}

/// GET /me - The signed-in identity, reloaded from the provider.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "The current identity", body = IdentityResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let identity = state
        .auth
        .reload(user_id)
        .await
        .map_err(provider_error_response)?;
    Ok(Json(IdentityResponse::from(identity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_map_to_the_expected_status_codes() {
        let (status, message) = session_error_response(SessionError::EmailNotVerified);
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(message.contains("verify your email"));

        let (status, _) =
            session_error_response(SessionError::Validation("Please enter a valid email address.".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = session_error_response(SessionError::EmailAlreadyInUse);
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = provider_error_response(ProviderError::WrongCredential);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
