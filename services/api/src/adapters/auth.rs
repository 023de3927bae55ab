//! services/api/src/adapters/auth.rs
//!
//! The concrete `AuthProvider`: email/password accounts in PostgreSQL with
//! Argon2 hashing, opaque verification and reset codes delivered by mail,
//! and session tokens backing the HTTP surface's cookies.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use lifelog_core::domain::Identity;
use lifelog_core::ports::{AuthProvider, ProviderError};

use crate::adapters::mailer::{password_reset_email, verification_email, Mailer};

#[derive(Clone)]
pub struct PgAuthProvider {
    pool: PgPool,
    mailer: Arc<dyn Mailer>,
    base_url: String,
}

impl PgAuthProvider {
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>, base_url: String) -> Self {
        Self {
            pool,
            mailer,
            base_url,
        }
    }
}

fn provider_err(err: sqlx::Error) -> ProviderError {
    match err {
        sqlx::Error::Io(e) => ProviderError::Network(e.to_string()),
        sqlx::Error::PoolTimedOut => {
            ProviderError::Network("connection pool timed out".to_string())
        }
        other => ProviderError::Other(other.to_string()),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation),
        _ => false,
    }
}

//=========================================================================================
// Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct AuthUserRecord {
    uid: Uuid,
    email: String,
    password_hash: String,
    display_name: Option<String>,
    email_verified: bool,
    created_at: DateTime<Utc>,
}

impl AuthUserRecord {
    fn to_domain(&self) -> Identity {
        Identity {
            uid: self.uid,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            email_verified: self.email_verified,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct MailTargetRecord {
    email: String,
    display_name: Option<String>,
}

//=========================================================================================
// `AuthProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthProvider for PgAuthProvider {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ProviderError::Other(format!("failed to hash password: {e}")))?
            .to_string();

        let record = sqlx::query_as::<_, AuthUserRecord>(
            "INSERT INTO auth_users (uid, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING uid, email, password_hash, display_name, email_verified, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ProviderError::EmailAlreadyInUse
            } else {
                provider_err(e)
            }
        })?;

        Ok(record.to_domain())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let record = sqlx::query_as::<_, AuthUserRecord>(
            "SELECT uid, email, password_hash, display_name, email_verified, created_at
             FROM auth_users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ProviderError::AccountNotFound,
            other => provider_err(other),
        })?;

        let parsed_hash = PasswordHash::new(&record.password_hash)
            .map_err(|e| ProviderError::Other(format!("stored password hash is invalid: {e}")))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Err(ProviderError::WrongCredential);
        }

        Ok(record.to_domain())
    }

    async fn sign_out(&self, uid: Uuid) -> Result<(), ProviderError> {
        sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
            .bind(uid)
            .execute(&self.pool)
            .await
            .map_err(provider_err)?;
        Ok(())
    }

    async fn set_display_name(&self, uid: Uuid, name: &str) -> Result<(), ProviderError> {
        let result = sqlx::query("UPDATE auth_users SET display_name = $1 WHERE uid = $2")
            .bind(name)
            .bind(uid)
            .execute(&self.pool)
            .await
            .map_err(provider_err)?;
        if result.rows_affected() == 0 {
            return Err(ProviderError::AccountNotFound);
        }
        Ok(())
    }

    async fn reload(&self, uid: Uuid) -> Result<Identity, ProviderError> {
        let record = sqlx::query_as::<_, AuthUserRecord>(
            "SELECT uid, email, password_hash, display_name, email_verified, created_at
             FROM auth_users WHERE uid = $1",
        )
        .bind(uid)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ProviderError::AccountNotFound,
            other => provider_err(other),
        })?;
        Ok(record.to_domain())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let code = Uuid::new_v4().to_string();
        let target = sqlx::query_as::<_, MailTargetRecord>(
            "UPDATE auth_users SET reset_code = $1 WHERE email = $2
             RETURNING email, display_name",
        )
        .bind(&code)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ProviderError::AccountNotFound,
            other => provider_err(other),
        })?;

        let link = format!("{}/auth/reset?code={}", self.base_url, code);
        self.mailer
            .send(
                &target.email,
                "Reset your Lifelog password",
                &password_reset_email(target.display_name.as_deref(), &link),
            )
            .await
            .map_err(|e| ProviderError::Other(format!("failed to send reset email: {e}")))?;
        Ok(())
    }

    async fn send_verification_email(&self, uid: Uuid) -> Result<(), ProviderError> {
        let code = Uuid::new_v4().to_string();
        let target = sqlx::query_as::<_, MailTargetRecord>(
            "UPDATE auth_users SET verification_code = $1 WHERE uid = $2
             RETURNING email, display_name",
        )
        .bind(&code)
        .bind(uid)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ProviderError::AccountNotFound,
            other => provider_err(other),
        })?;

        let link = format!("{}/auth/verify?code={}", self.base_url, code);
        self.mailer
            .send(
                &target.email,
                "Verify your Lifelog email",
                &verification_email(target.display_name.as_deref(), &link),
            )
            .await
            .map_err(|e| {
                ProviderError::Other(format!("failed to send verification email: {e}"))
            })?;
        Ok(())
    }

    async fn apply_verification_code(&self, code: &str) -> Result<Uuid, ProviderError> {
        let uid: (Uuid,) = sqlx::query_as(
            "UPDATE auth_users SET email_verified = TRUE, verification_code = NULL
             WHERE verification_code = $1
             RETURNING uid",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ProviderError::InvalidVerificationCode,
            other => provider_err(other),
        })?;
        Ok(uid.0)
    }

    async fn lookup_sign_in_methods(&self, email: &str) -> Result<Vec<String>, ProviderError> {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT uid FROM auth_users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(provider_err)?;
        Ok(match exists {
            Some(_) => vec!["password".to_string()],
            None => Vec::new(),
        })
    }

    async fn create_session(
        &self,
        uid: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<String, ProviderError> {
        let token = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO auth_sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&token)
            .bind(uid)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(provider_err)?;
        Ok(token)
    }

    async fn validate_session(&self, token: &str) -> Result<Uuid, ProviderError> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT user_id, expires_at FROM auth_sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ProviderError::InvalidSession,
            other => provider_err(other),
        })?;

        if record.expires_at < Utc::now() {
            if let Err(err) = self.delete_session(token).await {
                warn!(%err, "failed to prune expired session");
            }
            return Err(ProviderError::InvalidSession);
        }
        Ok(record.user_id)
    }

    async fn delete_session(&self, token: &str) -> Result<(), ProviderError> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(provider_err)?;
        Ok(())
    }
}
