#![forbid(unsafe_code)]

pub mod records;
pub mod repository;
pub mod sqlite;

pub use records::{LEADERBOARD_KEY, LeaderboardRecord, decode_entries, encode_entries};
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
