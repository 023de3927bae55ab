//! services/api/src/web/notifications.rs
//!
//! Notification registration and the cron-triggered batch reminder sends.
//! The batch endpoints are guarded by a static bearer secret; per-token
//! failures are tallied and reported, never abort the batch.

use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use lifelog_core::domain::{NotificationPreferences, ReminderMessage, ReminderTarget};

use crate::web::entries::store_error_response;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct PreferencesRequest {
    pub daily_reminders: bool,
    /// "HH:MM"; keeps the stored value when omitted.
    pub reminder_time: Option<String>,
    pub weekly_digest: Option<bool>,
    pub fcm_token: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterTokenRequest {
    pub token: String,
}

#[derive(Serialize, ToSchema)]
pub struct PreferencesResponse {
    pub daily_reminders: bool,
    pub reminder_time: String,
    pub weekly_digest: bool,
    pub has_token: bool,
}

impl From<NotificationPreferences> for PreferencesResponse {
    fn from(preferences: NotificationPreferences) -> Self {
        Self {
            daily_reminders: preferences.daily_reminders,
            reminder_time: preferences.reminder_time,
            weekly_digest: preferences.weekly_digest,
            has_token: preferences.fcm_token.is_some(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BatchSendResponse {
    pub message: String,
    pub successful: usize,
    pub failed: usize,
    pub current_time: String,
    pub timestamp: DateTime<Utc>,
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Compares the Authorization header against the configured static secret.
pub fn check_bearer(headers: &HeaderMap, secret: &str) -> Result<(), (StatusCode, String)> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|value| value == format!("Bearer {secret}"))
        .unwrap_or(false);
    if authorized {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
    }
}

/// The wall clock in the configured reminder timezone, formatted "HH:MM".
pub fn local_clock(now: DateTime<Utc>, offset_minutes: i32) -> String {
    match FixedOffset::east_opt(offset_minutes * 60) {
        Some(offset) => now.with_timezone(&offset).format("%H:%M").to_string(),
        None => now.format("%H:%M").to_string(),
    }
}

fn valid_reminder_time(value: &str) -> bool {
    NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}

/// Fire-and-forget delivery: failures are logged and counted, never retried.
async fn send_reminders(state: &AppState, targets: &[ReminderTarget]) -> (usize, usize) {
    let message = ReminderMessage::daily_reminder();
    let mut successful = 0usize;
    let mut failed = 0usize;
    for target in targets {
        match state.push.send(&target.fcm_token, &message).await {
            Ok(()) => successful += 1,
            Err(err) => {
                warn!(%err, user_id = %target.user_id, "failed to send daily reminder");
                failed += 1;
            }
        }
    }
    (successful, failed)
}

//=========================================================================================
// Preference Handlers
//=========================================================================================

/// PUT /notifications/preferences - Update notification settings.
///
/// Disabling reminders nulls the stored push token.
#[utoipa::path(
    put,
    path = "/notifications/preferences",
    request_body = PreferencesRequest,
    responses(
        (status = 200, description = "Preferences updated", body = PreferencesResponse),
        (status = 400, description = "Invalid reminder time"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn preferences_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<PreferencesRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let profile = state
        .profiles
        .get_profile(user_id)
        .await
        .map_err(store_error_response)?;
    let current = profile.preferences;

    let reminder_time = req.reminder_time.unwrap_or(current.reminder_time);
    if !valid_reminder_time(&reminder_time) {
        return Err((
            StatusCode::BAD_REQUEST,
            "Reminder time must be in HH:MM format".to_string(),
        ));
    }

    let preferences = NotificationPreferences {
        daily_reminders: req.daily_reminders,
        reminder_time,
        weekly_digest: req.weekly_digest.unwrap_or(current.weekly_digest),
        fcm_token: if req.daily_reminders {
            req.fcm_token.or(current.fcm_token)
        } else {
            None
        },
    };

    state
        .profiles
        .update_preferences(user_id, &preferences)
        .await
        .map_err(store_error_response)?;

    Ok(Json(PreferencesResponse::from(preferences)))
}

/// POST /notifications/register - Store a push token and enable reminders.
#[utoipa::path(
    post,
    path = "/notifications/register",
    request_body = RegisterTokenRequest,
    responses(
        (status = 200, description = "Reminders enabled", body = PreferencesResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn register_token_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<RegisterTokenRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let profile = state
        .profiles
        .get_profile(user_id)
        .await
        .map_err(store_error_response)?;

    let preferences = NotificationPreferences {
        daily_reminders: true,
        fcm_token: Some(req.token),
        ..profile.preferences
    };
    state
        .profiles
        .update_preferences(user_id, &preferences)
        .await
        .map_err(store_error_response)?;

    Ok(Json(PreferencesResponse::from(preferences)))
}

//=========================================================================================
// Batch Send Handlers (bearer-guarded)
//=========================================================================================

/// POST /notifications/schedule - Send reminders to users whose reminder
/// time matches the current clock in the configured timezone.
#[utoipa::path(
    post,
    path = "/notifications/schedule",
    responses(
        (status = 200, description = "Batch processed", body = BatchSendResponse),
        (status = 401, description = "Missing or wrong bearer secret")
    )
)]
pub async fn schedule_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    check_bearer(&headers, &state.config.cron_secret)?;

    let now = Utc::now();
    let current_time = local_clock(now, state.config.reminder_offset_minutes);

    let recipients = state
        .profiles
        .reminder_recipients()
        .await
        .map_err(store_error_response)?;
    let due: Vec<ReminderTarget> = recipients
        .into_iter()
        .filter(|target| target.reminder_time == current_time)
        .collect();

    info!(due = due.len(), %current_time, "processing scheduled reminders");
    let (successful, failed) = send_reminders(&state, &due).await;

    Ok(Json(BatchSendResponse {
        message: format!("Processed {} notifications", due.len()),
        successful,
        failed,
        current_time,
        timestamp: now,
    }))
}

/// GET /notifications/daily-reminder - Send to every user with reminders
/// enabled, regardless of their reminder time.
#[utoipa::path(
    get,
    path = "/notifications/daily-reminder",
    responses(
        (status = 200, description = "Batch processed", body = BatchSendResponse),
        (status = 401, description = "Missing or wrong bearer secret")
    )
)]
pub async fn daily_reminder_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    check_bearer(&headers, &state.config.cron_secret)?;

    let now = Utc::now();
    let recipients = state
        .profiles
        .reminder_recipients()
        .await
        .map_err(store_error_response)?;

    if recipients.is_empty() {
        return Ok(Json(BatchSendResponse {
            message: "No users to notify.".to_string(),
            successful: 0,
            failed: 0,
            current_time: local_clock(now, state.config.reminder_offset_minutes),
            timestamp: now,
        }));
    }

    let (successful, failed) = send_reminders(&state, &recipients).await;
    info!(successful, failed, "daily reminder batch complete");

    Ok(Json(BatchSendResponse {
        message: format!("Sent reminders to {successful} users, failed for {failed}"),
        successful,
        failed,
        current_time: local_clock(now, state.config.reminder_offset_minutes),
        timestamp: now,
    }))
}
