pub mod backup;
pub mod domain;
pub mod journal;
pub mod ports;
pub mod session;
pub mod stats;

pub use domain::{
    Identity, JournalEntry, MoodFilter, MoodLevel, MoodStats, NewEntry, NotificationPreferences,
    Profile, ReminderMessage, ReminderTarget, TimeWindow,
};
pub use journal::EntryRepository;
pub use ports::{
    AuthProvider, EntryStore, ProfileStore, ProviderError, PushError, PushMessenger, StoreError,
};
pub use session::{AuthState, SessionController, SessionError};
