use quiz_core::model::{Question, QuizSettings};
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::leaderboard_store::LeaderboardStore;
use crate::sessions::SessionLoopService;

/// Assembles app-facing services over one storage backend.
pub struct AppServices {
    clock: Clock,
    leaderboard: LeaderboardStore,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, loading the saved leaderboard.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock).await)
    }

    /// Build services over a throwaway in-memory store.
    pub async fn in_memory(clock: Clock) -> Self {
        Self::with_storage(Storage::in_memory(), clock).await
    }

    async fn with_storage(storage: Storage, clock: Clock) -> Self {
        let leaderboard = LeaderboardStore::open(clock, storage.kv).await;
        Self { clock, leaderboard }
    }

    /// A new, not yet started session over `questions`.
    #[must_use]
    pub fn new_session(&self, questions: Vec<Question>, settings: &QuizSettings) -> SessionLoopService {
        SessionLoopService::new(self.clock, questions, settings.time_per_question)
    }

    #[must_use]
    pub fn leaderboard(&self) -> &LeaderboardStore {
        &self.leaderboard
    }

    pub fn leaderboard_mut(&mut self) -> &mut LeaderboardStore {
        &mut self.leaderboard
    }
}
