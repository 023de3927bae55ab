//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use lifelog_core::journal::EntryRepository;
use lifelog_core::ports::{AuthProvider, EntryStore, ProfileStore, PushMessenger};
use lifelog_core::session::SessionController;

/// The shared application state, created once at startup and passed to all
/// handlers. Handlers talk to the ports; identity transitions go through a
/// [`SessionController`] built over them so the HTTP layer inherits the
/// core's validation, transition and error-mapping semantics.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub entries: Arc<dyn EntryStore>,
    pub push: Arc<dyn PushMessenger>,
    pub config: Arc<Config>,
}

impl AppState {
    /// A controller scoped to one request. Cookie continuity across requests
    /// lives in the provider's session table, not in the controller.
    pub fn session_controller(&self) -> SessionController {
        SessionController::new(self.auth.clone(), self.profiles.clone())
    }

    pub fn entry_repository(&self) -> EntryRepository {
        EntryRepository::new(self.entries.clone())
    }
}
