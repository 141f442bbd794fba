//! Persisted format of the leaderboard: a JSON array of flat records.

use chrono::{DateTime, Utc};
use quiz_core::model::{EntryId, LeaderboardEntry};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Fixed key the leaderboard is stored under.
pub const LEADERBOARD_KEY: &str = "quiz-game-leaderboard";

/// Persisted shape for a leaderboard entry.
///
/// This mirrors the domain `LeaderboardEntry` so the on-device format stays stable
/// independently of the domain type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRecord {
    pub id: String,
    pub player_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub time_taken: u64,
    pub date: DateTime<Utc>,
}

impl LeaderboardRecord {
    #[must_use]
    pub fn from_entry(entry: &LeaderboardEntry) -> Self {
        Self {
            id: entry.id.as_str().to_owned(),
            player_name: entry.player_name.clone(),
            score: entry.score,
            total_questions: entry.total_questions,
            percentage: entry.percentage,
            time_taken: entry.time_taken_secs,
            date: entry.created_at,
        }
    }

    #[must_use]
    pub fn into_entry(self) -> LeaderboardEntry {
        LeaderboardEntry {
            id: EntryId::from_persisted(self.id),
            player_name: self.player_name,
            score: self.score,
            total_questions: self.total_questions,
            percentage: self.percentage,
            time_taken_secs: self.time_taken,
            created_at: self.date,
        }
    }
}

/// Serialize entries into the persisted byte format.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_entries(entries: &[LeaderboardEntry]) -> Result<Vec<u8>, StorageError> {
    let records: Vec<LeaderboardRecord> = entries.iter().map(LeaderboardRecord::from_entry).collect();
    serde_json::to_vec(&records).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse entries from the persisted byte format. Order is preserved as stored.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for anything that is not an array of records.
pub fn decode_entries(bytes: &[u8]) -> Result<Vec<LeaderboardEntry>, StorageError> {
    let records: Vec<LeaderboardRecord> =
        serde_json::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(records.into_iter().map(LeaderboardRecord::into_entry).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn reads_records_written_by_browser_clients() {
        let json = br#"[{
            "id": "1700000000000",
            "playerName": "ExistingPlayer",
            "score": 9,
            "totalQuestions": 10,
            "percentage": 90,
            "timeTaken": 100,
            "date": "2023-11-14T22:13:20.000Z"
        }]"#;
        let entries = decode_entries(json).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].player_name, "ExistingPlayer");
        assert_eq!(entries[0].id.as_str(), "1700000000000");
        assert_eq!(entries[0].created_at, fixed_now());
    }

    #[test]
    fn writes_flat_camel_case_fields() {
        let entry = LeaderboardEntry {
            id: EntryId::from_persisted("abc"),
            player_name: "Ada".into(),
            score: 8,
            total_questions: 10,
            percentage: 80,
            time_taken_secs: 120,
            created_at: fixed_now(),
        };
        let bytes = encode_entries(&[entry]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let record = &value[0];
        assert_eq!(record["playerName"], "Ada");
        assert_eq!(record["totalQuestions"], 10);
        assert_eq!(record["timeTaken"], 120);
        assert_eq!(record["date"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            decode_entries(b"invalid json"),
            Err(StorageError::Serialization(_))
        ));
        assert!(decode_entries(br#"{"not":"an array"}"#).is_err());
    }
}
