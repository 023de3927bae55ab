//! crates/lifelog_core/src/backup.rs
//!
//! The versioned JSON envelope used for data export and import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{JournalEntry, NotificationPreferences};

pub const DATA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupEnvelope {
    pub version: String,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub data: BackupData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupData {
    pub entries: Vec<JournalEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<NotificationPreferences>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackupError {
    #[error("malformed backup: {0}")]
    Malformed(String),
    #[error("unsupported backup version '{0}', expected '{DATA_VERSION}'")]
    VersionMismatch(String),
    #[error("backup belongs to a different user")]
    UserMismatch,
}

/// Builds the export envelope for a user's current data.
pub fn export_envelope(
    user_id: Uuid,
    entries: Vec<JournalEntry>,
    preferences: Option<NotificationPreferences>,
    now: DateTime<Utc>,
) -> BackupEnvelope {
    BackupEnvelope {
        version: DATA_VERSION.to_string(),
        user_id,
        timestamp: now,
        data: BackupData {
            entries,
            preferences,
        },
    }
}

/// Parses an uploaded backup and checks it is importable for `expected_user`.
pub fn parse_envelope(raw: &str, expected_user: Uuid) -> Result<BackupEnvelope, BackupError> {
    let envelope: BackupEnvelope =
        serde_json::from_str(raw).map_err(|err| BackupError::Malformed(err.to_string()))?;
    validate_envelope(&envelope, expected_user)?;
    Ok(envelope)
}

/// Version and ownership checks shared by the parse and import paths.
pub fn validate_envelope(
    envelope: &BackupEnvelope,
    expected_user: Uuid,
) -> Result<(), BackupError> {
    if envelope.version != DATA_VERSION {
        return Err(BackupError::VersionMismatch(envelope.version.clone()));
    }
    if envelope.user_id != expected_user {
        return Err(BackupError::UserMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MoodLevel;
    use chrono::NaiveDate;

    fn sample_entry(user_id: Uuid) -> JournalEntry {
        JournalEntry {
            id: Some(Uuid::new_v4()),
            user_id,
            content: "slept in, felt rested".to_string(),
            mood: MoodLevel::Happy,
            date: NaiveDate::parse_from_str("2024-03-01", "%Y-%m-%d").unwrap(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn envelope_round_trips_through_json() {
        let user = Uuid::new_v4();
        let envelope = export_envelope(user, vec![sample_entry(user)], None, Utc::now());

        let raw = serde_json::to_string(&envelope).unwrap();
        let parsed = parse_envelope(&raw, user).unwrap();

        assert_eq!(parsed, envelope);
        assert_eq!(parsed.data.entries[0].mood, MoodLevel::Happy);
    }

    #[test]
    fn mood_serializes_as_a_string_digit() {
        let user = Uuid::new_v4();
        let envelope = export_envelope(user, vec![sample_entry(user)], None, Utc::now());

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["version"], DATA_VERSION);
        assert_eq!(value["data"]["entries"][0]["mood"], "4");
        assert_eq!(value["data"]["entries"][0]["date"], "2024-03-01");
    }

    #[test]
    fn wrong_version_and_wrong_user_are_rejected() {
        let user = Uuid::new_v4();
        let mut envelope = export_envelope(user, Vec::new(), None, Utc::now());

        assert_eq!(
            validate_envelope(&envelope, Uuid::new_v4()),
            Err(BackupError::UserMismatch)
        );

        envelope.version = "0.9.0".to_string();
        assert_eq!(
            validate_envelope(&envelope, user),
            Err(BackupError::VersionMismatch("0.9.0".to_string()))
        );
    }

    #[test]
    fn garbage_input_is_malformed() {
        let err = parse_envelope("not json", Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, BackupError::Malformed(_)));
    }
}
