//! services/api/src/web/entries.rs
//!
//! Journal-entry endpoints: create and list entries, the aggregated views
//! behind the dashboard (mood statistics, mood-trend series, word-cloud
//! dataset) and the backup export/import pair.

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use lifelog_core::backup::{self, BackupEnvelope, BackupError};
use lifelog_core::domain::{JournalEntry, MoodFilter, MoodLevel, MoodStats, NewEntry, TimeWindow};
use lifelog_core::ports::StoreError;
use lifelog_core::stats;

use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateEntryRequest {
    pub content: String,
    /// Mood level as a string digit, "1" (very sad) to "5" (very happy).
    pub mood: String,
    pub date: NaiveDate,
}

#[derive(Serialize, ToSchema)]
pub struct EntryResponse {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub content: String,
    pub mood: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<JournalEntry> for EntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            content: entry.content,
            mood: entry.mood.to_string(),
            date: entry.date,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[derive(Deserialize, IntoParams)]
pub struct EntryListQuery {
    /// One of day, week, month, year, all. Defaults to all.
    pub window: Option<String>,
    /// A mood digit "1".."5", or "all". Defaults to all.
    pub mood: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct WindowQuery {
    /// One of day, week, month, year, all.
    pub window: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MoodStatsResponse {
    pub total: usize,
    pub by_mood: BTreeMap<String, usize>,
    pub average_mood: f64,
}

impl From<MoodStats> for MoodStatsResponse {
    fn from(stats: MoodStats) -> Self {
        Self {
            total: stats.total,
            by_mood: stats
                .by_mood
                .into_iter()
                .map(|(mood, count)| (mood.to_string(), count))
                .collect(),
            average_mood: stats.average_mood,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SeriesPointResponse {
    pub date: NaiveDate,
    pub average_mood: Option<f64>,
    pub entry_count: usize,
}

#[derive(Serialize, ToSchema)]
pub struct WordCountResponse {
    pub word: String,
    pub count: usize,
}

#[derive(Serialize, ToSchema)]
pub struct ImportResponse {
    pub imported: usize,
}

//=========================================================================================
// Error Translation
//=========================================================================================

pub fn store_error_response(err: StoreError) -> (StatusCode, String) {
    let status = match &err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    // The store's raw message is surfaced as-is.
    (status, err.to_string())
}

fn parse_window(raw: Option<&str>, default: TimeWindow) -> Result<TimeWindow, (StatusCode, String)> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|e: lifelog_core::domain::TimeWindowParseError| {
                (StatusCode::BAD_REQUEST, e.to_string())
            }),
        None => Ok(default),
    }
}

fn parse_mood_filter(raw: Option<&str>) -> Result<MoodFilter, (StatusCode, String)> {
    match raw {
        None => Ok(MoodFilter::All),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(MoodFilter::All),
        Some(value) => value
            .parse::<MoodLevel>()
            .map(MoodFilter::Level)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string())),
    }
}

//=========================================================================================
// Entry Handlers
//=========================================================================================

/// POST /entries - Write a new journal entry.
#[utoipa::path(
    post,
    path = "/entries",
    request_body = CreateEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = EntryResponse),
        (status = 400, description = "Empty content or invalid mood"),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.content.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Entry content must not be empty".to_string(),
        ));
    }
    let mood: MoodLevel = req
        .mood
        .parse()
        .map_err(|e: lifelog_core::domain::MoodParseError| {
            (StatusCode::BAD_REQUEST, e.to_string())
        })?;

    let repo = state.entry_repository();
    let entry = repo
        .add_entry(NewEntry {
            user_id,
            content: req.content,
            mood,
            date: req.date,
        })
        .await
        .map_err(|err| {
            error!(%err, user_id = %user_id, "failed to add journal entry");
            store_error_response(err)
        })?;

    Ok((StatusCode::CREATED, Json(EntryResponse::from(entry))))
}

/// GET /entries - All entries for the signed-in user, newest date first,
/// optionally narrowed by time window and mood level.
#[utoipa::path(
    get,
    path = "/entries",
    params(EntryListQuery),
    responses(
        (status = 200, description = "The user's entries", body = [EntryResponse]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_entries_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<EntryListQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let window = parse_window(query.window.as_deref(), TimeWindow::All)?;
    let mood_filter = parse_mood_filter(query.mood.as_deref())?;

    let repo = state.entry_repository();
    let entries = repo
        .fetch_entries(user_id)
        .await
        .map_err(store_error_response)?;

    let entries = stats::filter_by_window(&entries, window, Utc::now());
    let entries = stats::filter_by_mood(&entries, mood_filter);

    let response: Vec<EntryResponse> = entries.into_iter().map(EntryResponse::from).collect();
    Ok(Json(response))
}

//=========================================================================================
// Aggregation Handlers
//=========================================================================================

/// GET /entries/stats - Mood statistics over the user's whole entry set.
#[utoipa::path(
    get,
    path = "/entries/stats",
    responses(
        (status = 200, description = "Mood statistics", body = MoodStatsResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn mood_stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let repo = state.entry_repository();
    repo.fetch_entries(user_id)
        .await
        .map_err(store_error_response)?;
    let stats = repo.mood_stats().await;
    Ok(Json(MoodStatsResponse::from(stats)))
}

/// GET /entries/mood-series - Per-day average mood for the trend chart.
#[utoipa::path(
    get,
    path = "/entries/mood-series",
    params(WindowQuery),
    responses(
        (status = 200, description = "One point per calendar day", body = [SeriesPointResponse]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn mood_series_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let window = parse_window(query.window.as_deref(), TimeWindow::Week)?;

    let entries = state
        .entries
        .entries_for_user(user_id)
        .await
        .map_err(store_error_response)?;

    let series: Vec<SeriesPointResponse> = stats::daily_mood_series(&entries, window, Utc::now())
        .into_iter()
        .map(|point| SeriesPointResponse {
            date: point.date,
            average_mood: point.average_mood,
            entry_count: point.entry_count,
        })
        .collect();
    Ok(Json(series))
}

/// GET /entries/word-cloud - The top words across entry texts in the window.
#[utoipa::path(
    get,
    path = "/entries/word-cloud",
    params(WindowQuery),
    responses(
        (status = 200, description = "Words by descending frequency", body = [WordCountResponse]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn word_cloud_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let window = parse_window(query.window.as_deref(), TimeWindow::All)?;

    let entries = state
        .entries
        .entries_for_user(user_id)
        .await
        .map_err(store_error_response)?;
    let entries = stats::filter_by_window(&entries, window, Utc::now());

    let words: Vec<WordCountResponse> = stats::word_frequencies(
        entries.iter().map(|entry| entry.content.as_str()),
        stats::WORD_CLOUD_LIMIT,
    )
    .into_iter()
    .map(|frequency| WordCountResponse {
        word: frequency.word,
        count: frequency.count,
    })
    .collect();
    Ok(Json(words))
}

//=========================================================================================
// Backup Handlers
//=========================================================================================

/// GET /entries/export - The versioned backup envelope for the user's data.
#[utoipa::path(
    get,
    path = "/entries/export",
    responses(
        (status = 200, description = "The backup envelope"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn export_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entries = state
        .entries
        .entries_for_user(user_id)
        .await
        .map_err(store_error_response)?;
    let preferences = match state.profiles.get_profile(user_id).await {
        Ok(profile) => Some(profile.preferences),
        Err(StoreError::NotFound(_)) => None,
        Err(err) => return Err(store_error_response(err)),
    };

    let envelope = backup::export_envelope(user_id, entries, preferences, Utc::now());
    Ok(Json(envelope))
}

/// POST /entries/import - Restore entries from a backup envelope.
///
/// Entries are append-only: the import re-adds each entry through the store,
/// which assigns fresh ids and timestamps.
#[utoipa::path(
    post,
    path = "/entries/import",
    responses(
        (status = 200, description = "Import complete", body = ImportResponse),
        (status = 400, description = "Malformed or unsupported backup"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Backup belongs to a different user")
    )
)]
pub async fn import_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(envelope): Json<BackupEnvelope>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    backup::validate_envelope(&envelope, user_id).map_err(|err| {
        let status = match err {
            BackupError::UserMismatch => StatusCode::FORBIDDEN,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, err.to_string())
    })?;

    let mut imported = 0usize;
    for entry in envelope.data.entries {
        state
            .entries
            .insert(NewEntry {
                user_id,
                content: entry.content,
                mood: entry.mood,
                date: entry.date,
            })
            .await
            .map_err(store_error_response)?;
        imported += 1;
    }

    if let Some(preferences) = envelope.data.preferences {
        state
            .profiles
            .update_preferences(user_id, &preferences)
            .await
            .map_err(store_error_response)?;
    }

    Ok(Json(ImportResponse { imported }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_and_mood_query_parsing() {
        assert_eq!(parse_window(None, TimeWindow::Week).unwrap(), TimeWindow::Week);
        assert_eq!(
            parse_window(Some("month"), TimeWindow::All).unwrap(),
            TimeWindow::Month
        );
        assert!(parse_window(Some("fortnight"), TimeWindow::All).is_err());

        assert_eq!(parse_mood_filter(None).unwrap(), MoodFilter::All);
        assert_eq!(parse_mood_filter(Some("all")).unwrap(), MoodFilter::All);
        assert_eq!(
            parse_mood_filter(Some("5")).unwrap(),
            MoodFilter::Level(MoodLevel::VeryHappy)
        );
        assert!(parse_mood_filter(Some("6")).is_err());
    }

    #[test]
    fn store_errors_keep_their_raw_message() {
        let (status, message) =
            store_error_response(StoreError::Backend("connection refused".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "connection refused");
    }
}
