//! crates/lifelog_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to stay independent of the concrete auth backend, document store and
//! push transport.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Identity, JournalEntry, NewEntry, NotificationPreferences, Profile, ReminderMessage,
    ReminderTarget,
};

//=========================================================================================
// Port Error Types
//=========================================================================================

/// Error codes reported by the auth provider. The session controller maps
/// these to user-facing messages; adapters map their backend's failures into
/// this closed set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("email already in use")]
    EmailAlreadyInUse,
    #[error("account not found")]
    AccountNotFound,
    #[error("wrong credential")]
    WrongCredential,
    #[error("too many requests")]
    TooManyRequests,
    #[error("permission denied")]
    PermissionDenied,
    #[error("invalid or expired verification code")]
    InvalidVerificationCode,
    #[error("invalid or expired session")]
    InvalidSession,
    #[error("network failure: {0}")]
    Network(String),
    #[error("{0}")]
    Other(String),
}

/// Document-store failures. Surfaced with the backend's raw message, no
/// translation table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Backend(String),
}

/// Push-delivery failures. The core never retries these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PushError {
    #[error("push rejected: {0}")]
    Rejected(String),
    #[error("network failure: {0}")]
    Network(String),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The external authentication provider.
///
/// Returns a stable identity projection carrying `uid`, `email`,
/// `email_verified` and the display name. The session-token operations back
/// the HTTP surface's cookie sessions.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;

    async fn sign_out(&self, uid: Uuid) -> Result<(), ProviderError>;

    async fn set_display_name(&self, uid: Uuid, name: &str) -> Result<(), ProviderError>;

    /// Re-reads the identity from the provider, refreshing the cached projection.
    async fn reload(&self, uid: Uuid) -> Result<Identity, ProviderError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;

    async fn send_verification_email(&self, uid: Uuid) -> Result<(), ProviderError>;

    /// Applies an out-of-band verification code and returns the verified uid.
    async fn apply_verification_code(&self, code: &str) -> Result<Uuid, ProviderError>;

    /// Lists the sign-in methods registered for an email; empty means no account.
    async fn lookup_sign_in_methods(&self, email: &str) -> Result<Vec<String>, ProviderError>;

    async fn create_session(
        &self,
        uid: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<String, ProviderError>;

    async fn validate_session(&self, token: &str) -> Result<Uuid, ProviderError>;

    async fn delete_session(&self, token: &str) -> Result<(), ProviderError>;
}

/// The per-user profile document in the external document store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_profile(&self, uid: Uuid, email: &str, name: &str) -> Result<(), StoreError>;

    async fn get_profile(&self, uid: Uuid) -> Result<Profile, StoreError>;

    async fn touch_last_login(&self, uid: Uuid) -> Result<(), StoreError>;

    async fn update_preferences(
        &self,
        uid: Uuid,
        preferences: &NotificationPreferences,
    ) -> Result<(), StoreError>;

    /// All users with a registered token and daily reminders enabled.
    async fn reminder_recipients(&self) -> Result<Vec<ReminderTarget>, StoreError>;
}

/// The journal-entry collection in the external document store.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Inserts an entry, assigning the id and both timestamps.
    async fn insert(&self, entry: NewEntry) -> Result<JournalEntry, StoreError>;

    /// All entries for a user, ordered by `date` descending. No pagination:
    /// the per-user entry set fits in memory by contract.
    async fn entries_for_user(&self, user_id: Uuid) -> Result<Vec<JournalEntry>, StoreError>;
}

/// The push-messaging transport. Fire-and-forget: no delivery acknowledgment
/// flows back into the core's state.
#[async_trait]
pub trait PushMessenger: Send + Sync {
    async fn send(&self, token: &str, message: &ReminderMessage) -> Result<(), PushError>;
}
