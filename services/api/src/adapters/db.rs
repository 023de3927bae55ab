//! services/api/src/adapters/db.rs
//!
//! The database adapter: the concrete implementation of the `ProfileStore`
//! and `EntryStore` ports over PostgreSQL using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use lifelog_core::domain::{
    JournalEntry, MoodLevel, NewEntry, NotificationPreferences, Profile, ReminderTarget,
};
use lifelog_core::ports::{EntryStore, ProfileStore, StoreError};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter implementing the `ProfileStore` and `EntryStore` ports.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ProfileRecord {
    user_id: Uuid,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
    last_login: DateTime<Utc>,
    daily_reminders: bool,
    reminder_time: String,
    weekly_digest: bool,
    fcm_token: Option<String>,
}

impl ProfileRecord {
    fn to_domain(self) -> Profile {
        Profile {
            user_id: self.user_id,
            email: self.email,
            name: self.name,
            created_at: self.created_at,
            last_login: self.last_login,
            preferences: NotificationPreferences {
                daily_reminders: self.daily_reminders,
                reminder_time: self.reminder_time,
                weekly_digest: self.weekly_digest,
                fcm_token: self.fcm_token,
            },
        }
    }
}

#[derive(FromRow)]
struct EntryRecord {
    id: Uuid,
    user_id: Uuid,
    content: String,
    mood: i16,
    date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl EntryRecord {
    fn to_domain(self) -> Result<JournalEntry, StoreError> {
        let mood = u8::try_from(self.mood)
            .ok()
            .and_then(MoodLevel::from_level)
            .ok_or_else(|| {
                StoreError::Backend(format!(
                    "entry {} holds an invalid mood level {}",
                    self.id, self.mood
                ))
            })?;
        Ok(JournalEntry {
            id: Some(self.id),
            user_id: self.user_id,
            content: self.content,
            mood,
            date: self.date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ReminderRecord {
    user_id: Uuid,
    fcm_token: String,
    reminder_time: String,
}

impl ReminderRecord {
    fn to_domain(self) -> ReminderTarget {
        ReminderTarget {
            user_id: self.user_id,
            fcm_token: self.fcm_token,
            reminder_time: self.reminder_time,
        }
    }
}

//=========================================================================================
// `ProfileStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProfileStore for PgStore {
    async fn create_profile(&self, uid: Uuid, email: &str, name: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO profiles (user_id, email, name) VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(uid)
        .bind(email)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn get_profile(&self, uid: Uuid) -> Result<Profile, StoreError> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT user_id, email, name, created_at, last_login,
                    daily_reminders, reminder_time, weekly_digest, fcm_token
             FROM profiles WHERE user_id = $1",
        )
        .bind(uid)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::NotFound(format!("profile {uid} not found")),
            other => backend(other),
        })?;
        Ok(record.to_domain())
    }

    async fn touch_last_login(&self, uid: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE profiles SET last_login = now(), updated_at = now() WHERE user_id = $1")
            .bind(uid)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn update_preferences(
        &self,
        uid: Uuid,
        preferences: &NotificationPreferences,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE profiles
             SET daily_reminders = $1, reminder_time = $2, weekly_digest = $3,
                 fcm_token = $4, updated_at = now()
             WHERE user_id = $5",
        )
        .bind(preferences.daily_reminders)
        .bind(&preferences.reminder_time)
        .bind(preferences.weekly_digest)
        .bind(&preferences.fcm_token)
        .bind(uid)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("profile {uid} not found")));
        }
        Ok(())
    }

    async fn reminder_recipients(&self) -> Result<Vec<ReminderTarget>, StoreError> {
        let records = sqlx::query_as::<_, ReminderRecord>(
            "SELECT user_id, fcm_token, reminder_time
             FROM profiles
             WHERE fcm_token IS NOT NULL AND daily_reminders = TRUE",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(records.into_iter().map(ReminderRecord::to_domain).collect())
    }
}

//=========================================================================================
// `EntryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EntryStore for PgStore {
    async fn insert(&self, entry: NewEntry) -> Result<JournalEntry, StoreError> {
        let record = sqlx::query_as::<_, EntryRecord>(
            "INSERT INTO journal_entries (id, user_id, content, mood, date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, now(), now())
             RETURNING id, user_id, content, mood, date, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(&entry.content)
        .bind(i16::from(entry.mood.level()))
        .bind(entry.date)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        record.to_domain()
    }

    async fn entries_for_user(&self, user_id: Uuid) -> Result<Vec<JournalEntry>, StoreError> {
        let records = sqlx::query_as::<_, EntryRecord>(
            "SELECT id, user_id, content, mood, date, created_at, updated_at
             FROM journal_entries WHERE user_id = $1
             ORDER BY date DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        records.into_iter().map(EntryRecord::to_domain).collect()
    }
}
