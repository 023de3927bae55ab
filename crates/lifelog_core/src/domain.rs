//! crates/lifelog_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization backend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The cached, read-only projection of the auth provider's user record.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub uid: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// One of the five ordinal mood categories, "1" (very sad) to "5" (very happy)
/// on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MoodLevel {
    VerySad,
    Sad,
    Neutral,
    Happy,
    VeryHappy,
}

impl MoodLevel {
    pub const ALL: [MoodLevel; 5] = [
        MoodLevel::VerySad,
        MoodLevel::Sad,
        MoodLevel::Neutral,
        MoodLevel::Happy,
        MoodLevel::VeryHappy,
    ];

    /// The numeric level, 1..=5.
    pub fn level(self) -> u8 {
        match self {
            MoodLevel::VerySad => 1,
            MoodLevel::Sad => 2,
            MoodLevel::Neutral => 3,
            MoodLevel::Happy => 4,
            MoodLevel::VeryHappy => 5,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(MoodLevel::VerySad),
            2 => Some(MoodLevel::Sad),
            3 => Some(MoodLevel::Neutral),
            4 => Some(MoodLevel::Happy),
            5 => Some(MoodLevel::VeryHappy),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoodLevel::VerySad => "Very Sad",
            MoodLevel::Sad => "Sad",
            MoodLevel::Neutral => "Neutral",
            MoodLevel::Happy => "Happy",
            MoodLevel::VeryHappy => "Very Happy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("mood must be a digit between 1 and 5, got '{0}'")]
pub struct MoodParseError(pub String);

impl FromStr for MoodLevel {
    type Err = MoodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(MoodLevel::from_level)
            .ok_or_else(|| MoodParseError(s.to_string()))
    }
}

impl fmt::Display for MoodLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

// The wire format keeps the string digit of the original data model.
impl Serialize for MoodLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.level().to_string())
    }
}

impl<'de> Deserialize<'de> for MoodLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single journaled reflection. Immutable once created; the store assigns
/// `id` and both timestamps on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub content: String,
    pub mood: MoodLevel,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The caller-supplied part of a journal entry, before the store fills in
/// the id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub user_id: Uuid,
    pub content: String,
    pub mood: MoodLevel,
    pub date: NaiveDate,
}

/// Notification settings attached to the per-user profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub daily_reminders: bool,
    /// "HH:MM", compared as text against the scheduler's local clock.
    pub reminder_time: String,
    pub weekly_digest: bool,
    pub fcm_token: Option<String>,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            daily_reminders: false,
            reminder_time: "20:00".to_string(),
            weekly_digest: false,
            fcm_token: None,
        }
    }
}

/// The per-user profile document.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub preferences: NotificationPreferences,
}

/// A user eligible for a push reminder: registered token, reminders enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderTarget {
    pub user_id: Uuid,
    pub fcm_token: String,
    pub reminder_time: String,
}

/// The payload handed to the push messenger. Delivery is fire-and-forget.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderMessage {
    pub title: String,
    pub body: String,
    pub link: String,
    pub kind: String,
}

impl ReminderMessage {
    pub fn daily_reminder() -> Self {
        Self {
            title: "Daily Journal Reminder".to_string(),
            body: "Time to write in your journal! Take a moment to reflect on your day."
                .to_string(),
            link: "/journal/new".to_string(),
            kind: "daily_reminder".to_string(),
        }
    }
}

/// Mood statistics derived from an entry set. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodStats {
    pub total: usize,
    pub by_mood: BTreeMap<MoodLevel, usize>,
    pub average_mood: f64,
}

/// Selects how far back a time-filtered view reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
    Month,
    Year,
    All,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown time window '{0}', expected day, week, month, year or all")]
pub struct TimeWindowParseError(pub String);

impl FromStr for TimeWindow {
    type Err = TimeWindowParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            "month" => Ok(TimeWindow::Month),
            "year" => Ok(TimeWindow::Year),
            "all" => Ok(TimeWindow::All),
            other => Err(TimeWindowParseError(other.to_string())),
        }
    }
}

/// Selects entries by mood level, or passes everything through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodFilter {
    All,
    Level(MoodLevel),
}
