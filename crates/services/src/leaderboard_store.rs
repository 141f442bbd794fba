use std::sync::Arc;

use quiz_core::model::{EntryId, Leaderboard, LeaderboardEntry, SessionResult};
use storage::repository::KeyValueStore;
use storage::{LEADERBOARD_KEY, decode_entries, encode_entries};

use crate::Clock;
use crate::error::LeaderboardError;

/// Durable, ranked collection of past results.
///
/// Keeps an in-memory copy of the board for cheap queries (`entries`, `rank_of`,
/// `is_high_score`). Writes always start from a fresh read of the backing store so a
/// second writer's entries are not silently dropped, although two writers can still
/// race between the read and the write.
pub struct LeaderboardStore {
    clock: Clock,
    store: Arc<dyn KeyValueStore>,
    key: String,
    cache: Leaderboard,
}

impl LeaderboardStore {
    /// Creates a store with an empty cache. Call [`load`](Self::load) to populate it.
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            store,
            key: LEADERBOARD_KEY.to_string(),
            cache: Leaderboard::empty(),
        }
    }

    /// Stores the board under `key` instead of [`LEADERBOARD_KEY`].
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Creates a store and loads the persisted board.
    pub async fn open(clock: Clock, store: Arc<dyn KeyValueStore>) -> Self {
        let mut this = Self::new(clock, store);
        this.load().await;
        this
    }

    /// Reads the persisted board into the cache.
    ///
    /// Missing data yields an empty board; unreadable data is logged and also yields
    /// an empty board. The result is always ranked.
    pub async fn load(&mut self) -> &[LeaderboardEntry] {
        self.cache = match self.read_persisted().await {
            Ok(board) => board,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to load leaderboard");
                Leaderboard::empty()
            }
        };
        self.cache.entries()
    }

    /// Forces a reload from the backing store.
    pub async fn refresh(&mut self) {
        self.load().await;
    }

    /// Saves a finished session, returning the new entry.
    ///
    /// Returns `None` if anything goes wrong; the failure is logged and whatever was
    /// stored before stays as it was.
    pub async fn save_score(
        &mut self,
        player_name: &str,
        result: &SessionResult,
    ) -> Option<LeaderboardEntry> {
        match self.try_save_score(player_name, result).await {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to save score");
                None
            }
        }
    }

    /// Like [`save_score`](Self::save_score), but reports why a save failed.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::Corrupt` if the stored board cannot be read back (it
    /// is left untouched rather than overwritten), or `LeaderboardError::Storage` if
    /// reading or writing fails.
    pub async fn try_save_score(
        &mut self,
        player_name: &str,
        result: &SessionResult,
    ) -> Result<LeaderboardEntry, LeaderboardError> {
        let entry = LeaderboardEntry::from_result(player_name, result, self.clock.now());

        let mut board = self.read_persisted().await?;
        board.insert(entry.clone());

        let bytes = encode_entries(board.entries())?;
        self.store.put(&self.key, &bytes).await?;

        tracing::debug!(
            entry_id = %entry.id,
            player = %entry.player_name,
            percentage = entry.percentage,
            time_taken_secs = entry.time_taken_secs,
            "score saved"
        );
        self.cache = board;
        Ok(entry)
    }

    /// Removes every saved entry. Failures are logged and otherwise ignored.
    pub async fn clear(&mut self) {
        if let Err(err) = self.try_clear().await {
            tracing::warn!(key = %self.key, error = %err, "failed to clear leaderboard");
        }
    }

    /// Like [`clear`](Self::clear), but reports failures. The cache is only emptied
    /// once the backing store has been cleared.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::Storage` if the key cannot be removed.
    pub async fn try_clear(&mut self) -> Result<(), LeaderboardError> {
        self.store.remove(&self.key).await?;
        self.cache = Leaderboard::empty();
        Ok(())
    }

    /// Whether a result would earn a place on the cached board.
    #[must_use]
    pub fn is_high_score(&self, percentage: u32, time_taken_secs: u64) -> bool {
        self.cache.is_high_score(percentage, time_taken_secs)
    }

    /// 1-based rank of an entry on the cached board, `None` if absent.
    #[must_use]
    pub fn rank_of(&self, id: &EntryId) -> Option<usize> {
        self.cache.rank_of(id)
    }

    #[must_use]
    pub fn entries(&self) -> &[LeaderboardEntry] {
        self.cache.entries()
    }

    #[must_use]
    pub fn leaderboard(&self) -> &Leaderboard {
        &self.cache
    }

    async fn read_persisted(&self) -> Result<Leaderboard, LeaderboardError> {
        let Some(bytes) = self.store.get(&self.key).await? else {
            return Ok(Leaderboard::empty());
        };
        let entries = decode_entries(&bytes).map_err(LeaderboardError::Corrupt)?;
        Ok(Leaderboard::from_entries(entries))
    }
}
