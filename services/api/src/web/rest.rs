//! services/api/src/web/rest.rs
//!
//! The health endpoint and the master definition for the OpenAPI
//! specification.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::web::notifications::local_clock;
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        crate::web::auth::reset_password_handler,
        crate::web::auth::verify_email_handler,
        crate::web::auth::resend_verification_handler,
        crate::web::auth::me_handler,
        crate::web::entries::create_entry_handler,
        crate::web::entries::list_entries_handler,
        crate::web::entries::mood_stats_handler,
        crate::web::entries::mood_series_handler,
        crate::web::entries::word_cloud_handler,
        crate::web::entries::export_handler,
        crate::web::entries::import_handler,
        crate::web::notifications::preferences_handler,
        crate::web::notifications::register_token_handler,
        crate::web::notifications::schedule_handler,
        crate::web::notifications::daily_reminder_handler,
        health_handler,
    ),
    components(
        schemas(
            crate::web::auth::SignupRequest,
            crate::web::auth::LoginRequest,
            crate::web::auth::ResetPasswordRequest,
            crate::web::auth::VerifyEmailRequest,
            crate::web::auth::MessageResponse,
            crate::web::auth::IdentityResponse,
            crate::web::entries::CreateEntryRequest,
            crate::web::entries::EntryResponse,
            crate::web::entries::MoodStatsResponse,
            crate::web::entries::SeriesPointResponse,
            crate::web::entries::WordCountResponse,
            crate::web::entries::ImportResponse,
            crate::web::notifications::PreferencesRequest,
            crate::web::notifications::RegisterTokenRequest,
            crate::web::notifications::PreferencesResponse,
            crate::web::notifications::BatchSendResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "Lifelog API", description = "Journaling, mood trends and reminder notifications.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Health
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp_utc: DateTime<Utc>,
    pub local_time: String,
    pub cron_enabled: bool,
}

/// GET /health - Liveness plus the scheduler's view of the clock.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let now = Utc::now();
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp_utc: now,
        local_time: local_clock(now, state.config.reminder_offset_minutes),
        cron_enabled: !state.config.cron_secret.is_empty(),
    })
}
