//! crates/lifelog_core/src/journal.rs
//!
//! The entry repository: an append-only accessor for journal entries keyed
//! by user, holding the in-memory most-recent-first sequence the aggregation
//! helpers operate on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{JournalEntry, MoodStats, NewEntry};
use crate::ports::{EntryStore, StoreError};
use crate::stats;

/// Holds the current entry sequence plus a loading flag and the last error.
/// The sequence is reset only by an explicit [`clear`](Self::clear); there is
/// no automatic invalidation or expiry, entries are re-fetched wholesale
/// whenever requested.
pub struct EntryRepository {
    store: Arc<dyn EntryStore>,
    entries: RwLock<Vec<JournalEntry>>,
    loading: AtomicBool,
    last_error: Mutex<Option<StoreError>>,
}

impl EntryRepository {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self {
            store,
            entries: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Writes a new entry through the store and prepends the stored result
    /// (id and timestamps assigned) to the in-memory sequence. No retry; the
    /// failure is cached and returned.
    pub async fn add_entry(&self, entry: NewEntry) -> Result<JournalEntry, StoreError> {
        self.begin();
        match self.store.insert(entry).await {
            Ok(stored) => {
                self.entries.write().await.insert(0, stored.clone());
                self.finish(None);
                Ok(stored)
            }
            Err(err) => {
                self.finish(Some(err.clone()));
                Err(err)
            }
        }
    }

    /// Replaces the in-memory sequence wholesale with the store's
    /// date-descending result for `user_id`.
    pub async fn fetch_entries(&self, user_id: Uuid) -> Result<Vec<JournalEntry>, StoreError> {
        self.begin();
        match self.store.entries_for_user(user_id).await {
            Ok(fetched) => {
                *self.entries.write().await = fetched.clone();
                self.finish(None);
                Ok(fetched)
            }
            Err(err) => {
                self.finish(Some(err.clone()));
                Err(err)
            }
        }
    }

    /// A snapshot of the current sequence, most recent first.
    pub async fn entries(&self) -> Vec<JournalEntry> {
        self.entries.read().await.clone()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn mood_stats(&self) -> MoodStats {
        stats::mood_stats(&self.entries.read().await)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<StoreError> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn begin(&self) {
        self.loading.store(true, Ordering::SeqCst);
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn finish(&self, error: Option<StoreError>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = error;
        self.loading.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MoodLevel;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};

    /// An in-memory store that mirrors the real adapter's contract: ids and
    /// timestamps assigned on insert, date-descending reads.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<JournalEntry>>,
        fail_next: AtomicBool,
    }

    #[async_trait]
    impl EntryStore for MemoryStore {
        async fn insert(&self, entry: NewEntry) -> Result<JournalEntry, StoreError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(StoreError::Backend("store unavailable".to_string()));
            }
            let stored = JournalEntry {
                id: Some(Uuid::new_v4()),
                user_id: entry.user_id,
                content: entry.content,
                mood: entry.mood,
                date: entry.date,
                created_at: Utc::now(),
                updated_at: Some(Utc::now()),
            };
            self.rows.lock().unwrap().push(stored.clone());
            Ok(stored)
        }

        async fn entries_for_user(&self, user_id: Uuid) -> Result<Vec<JournalEntry>, StoreError> {
            let mut rows: Vec<JournalEntry> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.date.cmp(&a.date));
            Ok(rows)
        }
    }

    fn new_entry(user_id: Uuid, content: &str, mood: MoodLevel, date: &str) -> NewEntry {
        NewEntry {
            user_id,
            content: content.to_string(),
            mood,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        }
    }

    #[tokio::test]
    async fn added_entry_round_trips_through_fetch() {
        let store = Arc::new(MemoryStore::default());
        let repo = EntryRepository::new(store);
        let user = Uuid::new_v4();

        let added = repo
            .add_entry(new_entry(user, "walked the long way home", MoodLevel::Happy, "2024-03-01"))
            .await
            .unwrap();
        assert!(added.id.is_some());

        let fetched = repo.fetch_entries(user).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].content, "walked the long way home");
        assert_eq!(fetched[0].mood, MoodLevel::Happy);
        assert_eq!(fetched[0].date.to_string(), "2024-03-01");
    }

    #[tokio::test]
    async fn add_prepends_most_recent_first() {
        let store = Arc::new(MemoryStore::default());
        let repo = EntryRepository::new(store);
        let user = Uuid::new_v4();

        repo.add_entry(new_entry(user, "first", MoodLevel::Neutral, "2024-03-01"))
            .await
            .unwrap();
        repo.add_entry(new_entry(user, "second", MoodLevel::Sad, "2024-03-02"))
            .await
            .unwrap();

        let entries = repo.entries().await;
        assert_eq!(entries[0].content, "second");
        assert_eq!(entries[1].content, "first");
    }

    #[tokio::test]
    async fn fetch_replaces_the_sequence_wholesale() {
        let store = Arc::new(MemoryStore::default());
        let repo = EntryRepository::new(store.clone());
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        repo.add_entry(new_entry(user, "mine", MoodLevel::Happy, "2024-03-01"))
            .await
            .unwrap();
        store
            .insert(new_entry(other, "not mine", MoodLevel::Sad, "2024-03-02"))
            .await
            .unwrap();

        let fetched = repo.fetch_entries(user).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(repo.entries().await, fetched);
    }

    #[tokio::test]
    async fn failure_is_cached_and_rethrown() {
        let store = Arc::new(MemoryStore::default());
        store.fail_next.store(true, Ordering::SeqCst);
        let repo = EntryRepository::new(store);
        let user = Uuid::new_v4();

        let err = repo
            .add_entry(new_entry(user, "lost", MoodLevel::Neutral, "2024-03-01"))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::Backend("store unavailable".to_string()));
        assert_eq!(repo.last_error(), Some(err));
        assert!(repo.entries().await.is_empty());
        assert!(!repo.is_loading());
    }

    #[tokio::test]
    async fn clear_resets_the_sequence() {
        let store = Arc::new(MemoryStore::default());
        let repo = EntryRepository::new(store);
        let user = Uuid::new_v4();

        repo.add_entry(new_entry(user, "gone soon", MoodLevel::Happy, "2024-03-01"))
            .await
            .unwrap();
        repo.clear().await;

        assert!(repo.entries().await.is_empty());
    }
}
