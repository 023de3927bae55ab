//! crates/lifelog_core/src/session.rs
//!
//! The session controller: single source of truth for "who is signed in".
//! It mediates every identity transition (sign-up, sign-in, sign-out,
//! password reset, email verification) and publishes the resulting state
//! through a watch channel that callers subscribe to.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use regex::Regex;
use tokio::sync::watch;
use tracing::warn;

use crate::domain::Identity;
use crate::ports::{AuthProvider, ProfileStore, ProviderError};

const INVALID_EMAIL: &str = "Please enter a valid email address.";
const WEAK_PASSWORD: &str = "Password should be at least 6 characters long.";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

//=========================================================================================
// Errors
//=========================================================================================

/// User-facing authentication failures. Every provider error code maps
/// through a fixed table; unmapped codes fall back to a templated message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),
    #[error("This email is already registered. Please sign in instead.")]
    EmailAlreadyInUse,
    #[error("No account found with this email. Please sign up first.")]
    AccountNotFound,
    #[error("Incorrect password. Please try again.")]
    WrongCredential,
    #[error("Please verify your email address before signing in. A new verification email has been sent.")]
    EmailNotVerified,
    #[error("Too many failed attempts. Please try again later.")]
    RateLimited,
    #[error("Network error. Please check your internet connection.")]
    NetworkFailure,
    #[error("Permission denied. Please try again or contact support.")]
    PermissionDenied,
    #[error("You must be signed in to do that.")]
    NotAuthenticated,
    #[error("{0}")]
    Provider(String),
}

impl SessionError {
    pub fn from_provider(err: ProviderError) -> Self {
        match err {
            ProviderError::EmailAlreadyInUse => SessionError::EmailAlreadyInUse,
            ProviderError::AccountNotFound => SessionError::AccountNotFound,
            ProviderError::WrongCredential => SessionError::WrongCredential,
            ProviderError::TooManyRequests => SessionError::RateLimited,
            ProviderError::PermissionDenied => SessionError::PermissionDenied,
            ProviderError::Network(_) => SessionError::NetworkFailure,
            ProviderError::InvalidVerificationCode => {
                SessionError::Provider("The verification code is invalid or has expired.".to_string())
            }
            ProviderError::InvalidSession => {
                SessionError::Provider("Your session has expired. Please sign in again.".to_string())
            }
            ProviderError::Other(raw) => {
                let lower = raw.to_lowercase();
                let hint = if lower.contains("email") {
                    " Please double-check the email address."
                } else if lower.contains("password") {
                    " Please double-check the password."
                } else if lower.contains("network") {
                    " Please check your internet connection."
                } else {
                    ""
                };
                SessionError::Provider(format!("Authentication error: {raw}.{hint}"))
            }
        }
    }
}

//=========================================================================================
// State
//=========================================================================================

/// The controller's observable state.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Initial state, before any provider event has been observed.
    Unknown,
    Authenticated(Identity),
    Unauthenticated,
}

//=========================================================================================
// SessionController
//=========================================================================================

/// An explicit, injectable service instance; construct once per owning
/// context and drop to tear down. Operations are NOT serialized against each
/// other: each call sets the `loading` flag at entry and clears it at exit,
/// so overlapping identity-mutating calls can race the flag and the cached
/// error. Callers are expected to await one call before issuing the next.
pub struct SessionController {
    auth: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileStore>,
    state: watch::Sender<AuthState>,
    loading: AtomicBool,
    verification_email_sent: AtomicBool,
    last_error: Mutex<Option<SessionError>>,
}

impl SessionController {
    pub fn new(auth: Arc<dyn AuthProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        Self {
            auth,
            profiles,
            state,
            loading: AtomicBool::new(false),
            verification_email_sent: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Typed subscription to the auth state. Dropping the receiver is the
    /// unsubscribe.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        match &*self.state.borrow() {
            AuthState::Authenticated(identity) => Some(identity.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn verification_email_sent(&self) -> bool {
        self.verification_email_sent.load(Ordering::SeqCst)
    }

    /// The most recent failure, cached for passive display.
    pub fn last_error(&self) -> Option<SessionError> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_error(&self) {
        self.set_error(None);
    }

    /// Reconciliation entry point for the provider's state-change events,
    /// the sole source of truth for final state. An unverified identity is
    /// forced back out: a session is never usable before the email is
    /// verified.
    pub async fn apply_provider_event(&self, user: Option<Identity>) {
        match user {
            Some(identity) if identity.email_verified => {
                self.publish(AuthState::Authenticated(identity));
            }
            Some(identity) => {
                if let Err(err) = self.auth.sign_out(identity.uid).await {
                    warn!(%err, uid = %identity.uid, "forced sign-out of unverified identity failed");
                }
                self.publish(AuthState::Unauthenticated);
            }
            None => self.publish(AuthState::Unauthenticated),
        }
    }

    /// Creates an account, its profile document and the verification email,
    /// then signs the fresh session straight back out: sign-in only becomes
    /// possible once the email is verified.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), SessionError> {
        self.run(self.sign_up_inner(email, password, name)).await
    }

    async fn sign_up_inner(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), SessionError> {
        validate_email(email)?;
        if password.chars().count() < 6 {
            return Err(SessionError::Validation(WEAK_PASSWORD.to_string()));
        }

        let methods = self
            .auth
            .lookup_sign_in_methods(email)
            .await
            .map_err(SessionError::from_provider)?;
        if !methods.is_empty() {
            return Err(SessionError::EmailAlreadyInUse);
        }

        let created = self
            .auth
            .create_account(email, password)
            .await
            .map_err(SessionError::from_provider)?;
        self.auth
            .set_display_name(created.uid, name)
            .await
            .map_err(SessionError::from_provider)?;
        let identity = self
            .auth
            .reload(created.uid)
            .await
            .map_err(SessionError::from_provider)?;

        self.profiles
            .create_profile(identity.uid, email, name)
            .await
            .map_err(|err| {
                warn!(%err, uid = %identity.uid, "failed to create profile document");
                SessionError::Provider("Failed to create user profile. Please try again.".to_string())
            })?;

        self.auth
            .send_verification_email(identity.uid)
            .await
            .map_err(SessionError::from_provider)?;
        self.verification_email_sent.store(true, Ordering::SeqCst);

        if let Err(err) = self.auth.sign_out(identity.uid).await {
            warn!(%err, uid = %identity.uid, "sign-out after sign-up failed");
        }
        self.publish(AuthState::Unauthenticated);
        Ok(())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        self.run(self.sign_in_inner(email, password)).await
    }

    async fn sign_in_inner(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        validate_email(email)?;

        let identity = self
            .auth
            .sign_in(email, password)
            .await
            .map_err(SessionError::from_provider)?;

        if !identity.email_verified {
            // Best-effort resend, then force the session back out.
            if let Err(err) = self.auth.send_verification_email(identity.uid).await {
                warn!(%err, uid = %identity.uid, "verification resend failed");
            }
            if let Err(err) = self.auth.sign_out(identity.uid).await {
                warn!(%err, uid = %identity.uid, "forced sign-out of unverified identity failed");
            }
            self.publish(AuthState::Unauthenticated);
            return Err(SessionError::EmailNotVerified);
        }

        // Best-effort: a failed lastLogin update never blocks a sign-in.
        if let Err(err) = self.profiles.touch_last_login(identity.uid).await {
            warn!(%err, uid = %identity.uid, "failed to update last login");
        }

        self.publish(AuthState::Authenticated(identity.clone()));
        Ok(identity)
    }

    /// Unconditionally clears the session.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.run(async {
            let uid = self.current_identity().map(|identity| identity.uid);
            let result = match uid {
                Some(uid) => self
                    .auth
                    .sign_out(uid)
                    .await
                    .map_err(SessionError::from_provider),
                None => Ok(()),
            };
            self.publish(AuthState::Unauthenticated);
            result
        })
        .await
    }

    /// Sends a password-reset email after checking the account exists.
    /// Session state is unchanged.
    pub async fn reset_password(&self, email: &str) -> Result<(), SessionError> {
        self.run(async {
            validate_email(email)?;
            let methods = self
                .auth
                .lookup_sign_in_methods(email)
                .await
                .map_err(SessionError::from_provider)?;
            if methods.is_empty() {
                return Err(SessionError::AccountNotFound);
            }
            self.auth
                .send_password_reset(email)
                .await
                .map_err(SessionError::from_provider)
        })
        .await
    }

    /// Re-sends the verification email for the signed-in identity.
    pub async fn send_verification_email(&self) -> Result<(), SessionError> {
        self.run(async {
            let identity = self
                .current_identity()
                .ok_or(SessionError::NotAuthenticated)?;
            self.auth
                .send_verification_email(identity.uid)
                .await
                .map_err(SessionError::from_provider)?;
            self.verification_email_sent.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await
    }

    /// Applies an out-of-band verification code, then reloads the cached
    /// identity. If the verified account is the signed-in one, the refreshed
    /// projection is re-published.
    pub async fn verify_email(&self, code: &str) -> Result<Identity, SessionError> {
        self.run(async {
            let uid = self
                .auth
                .apply_verification_code(code)
                .await
                .map_err(SessionError::from_provider)?;
            let identity = self
                .auth
                .reload(uid)
                .await
                .map_err(SessionError::from_provider)?;
            let signed_in_here = matches!(
                &*self.state.borrow(),
                AuthState::Authenticated(current) if current.uid == uid
            );
            if signed_in_here && identity.email_verified {
                self.publish(AuthState::Authenticated(identity.clone()));
            }
            Ok(identity)
        })
        .await
    }

    fn publish(&self, next: AuthState) {
        self.state.send_replace(next);
    }

    fn set_error(&self, error: Option<SessionError>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = error;
    }

    async fn run<T, F>(&self, op: F) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, SessionError>>,
    {
        self.loading.store(true, Ordering::SeqCst);
        self.set_error(None);
        let result = op.await;
        if let Err(err) = &result {
            self.set_error(Some(err.clone()));
        }
        self.loading.store(false, Ordering::SeqCst);
        result
    }
}

fn validate_email(email: &str) -> Result<(), SessionError> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(SessionError::Validation(INVALID_EMAIL.to_string()))
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NotificationPreferences, Profile, ReminderTarget};
    use crate::ports::StoreError;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use uuid::Uuid;

    #[derive(Clone)]
    struct MockAccount {
        uid: Uuid,
        password: String,
        display_name: Option<String>,
        email_verified: bool,
        verification_code: Option<String>,
    }

    #[derive(Default)]
    struct MockAuth {
        accounts: Mutex<HashMap<String, MockAccount>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl MockAuth {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn call_count(&self, call: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn identity_for(&self, email: &str, account: &MockAccount) -> Identity {
            Identity {
                uid: account.uid,
                email: email.to_string(),
                display_name: account.display_name.clone(),
                email_verified: account.email_verified,
                created_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl AuthProvider for MockAuth {
        async fn create_account(
            &self,
            email: &str,
            password: &str,
        ) -> Result<Identity, ProviderError> {
            self.record("create_account");
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                return Err(ProviderError::EmailAlreadyInUse);
            }
            let account = MockAccount {
                uid: Uuid::new_v4(),
                password: password.to_string(),
                display_name: None,
                email_verified: false,
                verification_code: None,
            };
            accounts.insert(email.to_string(), account.clone());
            Ok(self.identity_for(email, &account))
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
            self.record("sign_in");
            let accounts = self.accounts.lock().unwrap();
            let account = accounts.get(email).ok_or(ProviderError::AccountNotFound)?;
            if account.password != password {
                return Err(ProviderError::WrongCredential);
            }
            Ok(self.identity_for(email, account))
        }

        async fn sign_out(&self, _uid: Uuid) -> Result<(), ProviderError> {
            self.record("sign_out");
            Ok(())
        }

        async fn set_display_name(&self, uid: Uuid, name: &str) -> Result<(), ProviderError> {
            self.record("set_display_name");
            let mut accounts = self.accounts.lock().unwrap();
            for account in accounts.values_mut() {
                if account.uid == uid {
                    account.display_name = Some(name.to_string());
                    return Ok(());
                }
            }
            Err(ProviderError::AccountNotFound)
        }

        async fn reload(&self, uid: Uuid) -> Result<Identity, ProviderError> {
            self.record("reload");
            let accounts = self.accounts.lock().unwrap();
            accounts
                .iter()
                .find(|(_, account)| account.uid == uid)
                .map(|(email, account)| self.identity_for(email, account))
                .ok_or(ProviderError::AccountNotFound)
        }

        async fn send_password_reset(&self, _email: &str) -> Result<(), ProviderError> {
            self.record("send_password_reset");
            Ok(())
        }

        async fn send_verification_email(&self, uid: Uuid) -> Result<(), ProviderError> {
            self.record("send_verification_email");
            let mut accounts = self.accounts.lock().unwrap();
            for account in accounts.values_mut() {
                if account.uid == uid {
                    account.verification_code = Some(format!("code-{uid}"));
                    return Ok(());
                }
            }
            Err(ProviderError::AccountNotFound)
        }

        async fn apply_verification_code(&self, code: &str) -> Result<Uuid, ProviderError> {
            self.record("apply_verification_code");
            let mut accounts = self.accounts.lock().unwrap();
            for account in accounts.values_mut() {
                if account.verification_code.as_deref() == Some(code) {
                    account.email_verified = true;
                    account.verification_code = None;
                    return Ok(account.uid);
                }
            }
            Err(ProviderError::InvalidVerificationCode)
        }

        async fn lookup_sign_in_methods(&self, email: &str) -> Result<Vec<String>, ProviderError> {
            self.record("lookup_sign_in_methods");
            let accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                Ok(vec!["password".to_string()])
            } else {
                Ok(Vec::new())
            }
        }

        async fn create_session(
            &self,
            uid: Uuid,
            _expires_at: DateTime<Utc>,
        ) -> Result<String, ProviderError> {
            self.record("create_session");
            Ok(format!("session-{uid}"))
        }

        async fn validate_session(&self, _token: &str) -> Result<Uuid, ProviderError> {
            self.record("validate_session");
            Err(ProviderError::InvalidSession)
        }

        async fn delete_session(&self, _token: &str) -> Result<(), ProviderError> {
            self.record("delete_session");
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockProfiles {
        profiles: Mutex<HashMap<Uuid, Profile>>,
        last_login_touches: Mutex<usize>,
    }

    #[async_trait]
    impl ProfileStore for MockProfiles {
        async fn create_profile(
            &self,
            uid: Uuid,
            email: &str,
            name: &str,
        ) -> Result<(), StoreError> {
            let now = Utc::now();
            self.profiles.lock().unwrap().insert(
                uid,
                Profile {
                    user_id: uid,
                    email: email.to_string(),
                    name: name.to_string(),
                    created_at: now,
                    last_login: now,
                    preferences: NotificationPreferences::default(),
                },
            );
            Ok(())
        }

        async fn get_profile(&self, uid: Uuid) -> Result<Profile, StoreError> {
            self.profiles
                .lock()
                .unwrap()
                .get(&uid)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("profile {uid}")))
        }

        async fn touch_last_login(&self, _uid: Uuid) -> Result<(), StoreError> {
            *self.last_login_touches.lock().unwrap() += 1;
            Ok(())
        }

        async fn update_preferences(
            &self,
            uid: Uuid,
            preferences: &NotificationPreferences,
        ) -> Result<(), StoreError> {
            let mut profiles = self.profiles.lock().unwrap();
            let profile = profiles
                .get_mut(&uid)
                .ok_or_else(|| StoreError::NotFound(format!("profile {uid}")))?;
            profile.preferences = preferences.clone();
            Ok(())
        }

        async fn reminder_recipients(&self) -> Result<Vec<ReminderTarget>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn controller() -> (SessionController, Arc<MockAuth>, Arc<MockProfiles>) {
        let auth = Arc::new(MockAuth::default());
        let profiles = Arc::new(MockProfiles::default());
        let controller = SessionController::new(auth.clone(), profiles.clone());
        (controller, auth, profiles)
    }

    #[tokio::test]
    async fn sign_in_with_malformed_email_fails_before_any_provider_call() {
        let (controller, auth, _) = controller();

        let err = controller.sign_in("bad-email", "x").await.unwrap_err();

        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(auth.total_calls(), 0);
        assert_eq!(controller.last_error(), Some(err));
    }

    #[tokio::test]
    async fn weak_password_fails_before_any_provider_call() {
        let (controller, auth, _) = controller();

        let err = controller
            .sign_up("a@b.com", "short", "Ada")
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(auth.total_calls(), 0);
    }

    #[tokio::test]
    async fn sign_up_ends_unauthenticated_with_verification_sent() {
        let (controller, auth, profiles) = controller();

        controller
            .sign_up("ada@example.com", "hunter2", "Ada")
            .await
            .unwrap();

        assert_eq!(controller.current_state(), AuthState::Unauthenticated);
        assert!(controller.verification_email_sent());
        assert_eq!(auth.call_count("send_verification_email"), 1);
        assert_eq!(auth.call_count("sign_out"), 1);
        let uid = auth.accounts.lock().unwrap()["ada@example.com"].uid;
        assert!(profiles.profiles.lock().unwrap().contains_key(&uid));
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_fails_email_not_verified() {
        let (controller, auth, _) = controller();

        controller
            .sign_up("ada@example.com", "hunter2", "Ada")
            .await
            .unwrap();
        let err = controller
            .sign_in("ada@example.com", "hunter2")
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::EmailNotVerified);
        assert_eq!(controller.current_state(), AuthState::Unauthenticated);
        // One send at sign-up, one best-effort resend on the failed sign-in.
        assert_eq!(auth.call_count("send_verification_email"), 2);
    }

    #[tokio::test]
    async fn verified_sign_in_authenticates_and_touches_last_login() {
        let (controller, auth, profiles) = controller();

        controller
            .sign_up("ada@example.com", "hunter2", "Ada")
            .await
            .unwrap();
        let code = {
            let accounts = auth.accounts.lock().unwrap();
            accounts["ada@example.com"].verification_code.clone().unwrap()
        };
        controller.verify_email(&code).await.unwrap();

        let identity = controller
            .sign_in("ada@example.com", "hunter2")
            .await
            .unwrap();

        assert!(identity.email_verified);
        assert_eq!(identity.display_name.as_deref(), Some("Ada"));
        assert!(matches!(
            controller.current_state(),
            AuthState::Authenticated(_)
        ));
        assert_eq!(*profiles.last_login_touches.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_sign_up_fails_email_already_in_use() {
        let (controller, _, _) = controller();

        controller
            .sign_up("ada@example.com", "hunter2", "Ada")
            .await
            .unwrap();
        let err = controller
            .sign_up("ada@example.com", "hunter2", "Ada")
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::EmailAlreadyInUse);
    }

    #[tokio::test]
    async fn reset_password_for_unknown_email_fails_without_sending() {
        let (controller, auth, _) = controller();

        let err = controller
            .reset_password("nobody@example.com")
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::AccountNotFound);
        assert_eq!(auth.call_count("send_password_reset"), 0);
    }

    #[tokio::test]
    async fn sign_out_is_unconditional() {
        let (controller, auth, _) = controller();

        controller.sign_out().await.unwrap();
        assert_eq!(controller.current_state(), AuthState::Unauthenticated);

        controller
            .sign_up("ada@example.com", "hunter2", "Ada")
            .await
            .unwrap();
        let code = {
            let accounts = auth.accounts.lock().unwrap();
            accounts["ada@example.com"].verification_code.clone().unwrap()
        };
        controller.verify_email(&code).await.unwrap();
        controller
            .sign_in("ada@example.com", "hunter2")
            .await
            .unwrap();

        controller.sign_out().await.unwrap();
        assert_eq!(controller.current_state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn provider_event_with_unverified_identity_forces_sign_out() {
        let (controller, auth, _) = controller();
        let state = controller.subscribe();

        let identity = Identity {
            uid: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            display_name: None,
            email_verified: false,
            created_at: Utc::now(),
        };
        controller.apply_provider_event(Some(identity)).await;

        assert_eq!(controller.current_state(), AuthState::Unauthenticated);
        assert_eq!(auth.call_count("sign_out"), 1);
        assert!(state.has_changed().unwrap());
    }

    #[tokio::test]
    async fn subscription_observes_transitions() {
        let (controller, _, _) = controller();
        let mut state = controller.subscribe();
        assert_eq!(*state.borrow(), AuthState::Unknown);

        controller.apply_provider_event(None).await;
        state.changed().await.unwrap();
        assert_eq!(*state.borrow(), AuthState::Unauthenticated);
    }

    #[test]
    fn unmapped_provider_errors_get_a_best_guess_hint() {
        let err = SessionError::from_provider(ProviderError::Other(
            "The password policy rejected this value".to_string(),
        ));
        match err {
            SessionError::Provider(message) => {
                assert!(message.starts_with("Authentication error:"));
                assert!(message.contains("double-check the password"));
            }
            other => panic!("unexpected mapping: {other:?}"),
        }

        assert_eq!(
            SessionError::from_provider(ProviderError::Network("timed out".to_string())),
            SessionError::NetworkFailure
        );
    }
}
