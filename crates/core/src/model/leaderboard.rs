use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::model::ids::EntryId;
use crate::model::result::SessionResult;

/// Maximum number of entries kept on the leaderboard.
pub const MAX_ENTRIES: usize = 10;

/// Name stored when the player leaves the name blank.
pub const ANONYMOUS_PLAYER: &str = "Anonymous";

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// One saved result on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub id: EntryId,
    pub player_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub time_taken_secs: u64,
    pub created_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// Builds a fresh entry for a finished session.
    #[must_use]
    pub fn from_result(player_name: &str, result: &SessionResult, now: DateTime<Utc>) -> Self {
        Self {
            id: EntryId::generate(now),
            player_name: normalize_player_name(player_name),
            score: result.score,
            total_questions: result.total_questions,
            percentage: result.percentage,
            time_taken_secs: result.time_taken_secs,
            created_at: now,
        }
    }
}

/// Trims the name; blank names become [`ANONYMOUS_PLAYER`].
#[must_use]
pub fn normalize_player_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        ANONYMOUS_PLAYER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Ranking order: higher percentage first, then faster time.
#[must_use]
pub fn rank_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    compare_scores(a.percentage, a.time_taken_secs, b.percentage, b.time_taken_secs)
}

fn compare_scores(a_pct: u32, a_time: u64, b_pct: u32, b_time: u64) -> Ordering {
    b_pct.cmp(&a_pct).then(a_time.cmp(&b_time))
}

//
// ─── LEADERBOARD ───────────────────────────────────────────────────────────────
//

/// Ranked, capped collection of entries.
///
/// Entries are always kept sorted by [`rank_order`]; the sort is stable, so among
/// equal scores the one inserted first ranks higher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    capacity: usize,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::empty()
    }
}

impl Leaderboard {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            capacity: MAX_ENTRIES,
        }
    }

    /// Builds a ranked board from entries in any order.
    ///
    /// Loaded data is sorted but not truncated, mirroring what was persisted.
    #[must_use]
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by(rank_order);
        Self {
            entries,
            capacity: MAX_ENTRIES,
        }
    }

    /// Inserts an entry, re-ranks, and evicts whatever falls past the capacity.
    pub fn insert(&mut self, entry: LeaderboardEntry) {
        self.entries.push(entry);
        self.entries.sort_by(rank_order);
        self.entries.truncate(self.capacity);
    }

    /// Whether a result with these numbers would earn a place on the board.
    ///
    /// True while the board has room, otherwise only for a strictly better score than
    /// the last entry. A tie on both percentage and time is not enough.
    #[must_use]
    pub fn is_high_score(&self, percentage: u32, time_taken_secs: u64) -> bool {
        if self.entries.len() < self.capacity {
            return true;
        }
        match self.entries.last() {
            Some(worst) => {
                compare_scores(percentage, time_taken_secs, worst.percentage, worst.time_taken_secs)
                    == Ordering::Less
            }
            None => true,
        }
    }

    /// 1-based rank of the entry, if present.
    #[must_use]
    pub fn rank_of(&self, id: &EntryId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| &entry.id == id)
            .map(|index| index + 1)
    }

    #[must_use]
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn entry(name: &str, percentage: u32, time: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            id: EntryId::generate(fixed_now()),
            player_name: name.to_string(),
            score: percentage / 10,
            total_questions: 10,
            percentage,
            time_taken_secs: time,
            created_at: fixed_now(),
        }
    }

    fn assert_ranked(board: &Leaderboard) {
        for pair in board.entries().windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.percentage > b.percentage
                    || (a.percentage == b.percentage && a.time_taken_secs <= b.time_taken_secs)
            );
        }
    }

    #[test]
    fn sorts_by_percentage_then_time() {
        let board = Leaderboard::from_entries(vec![
            entry("Player1", 70, 100),
            entry("Player2", 80, 120),
            entry("Player3", 80, 90),
        ]);
        let names: Vec<_> = board.entries().iter().map(|e| e.player_name.as_str()).collect();
        assert_eq!(names, ["Player3", "Player2", "Player1"]);
        assert_ranked(&board);
    }

    #[test]
    fn insert_truncates_to_capacity_keeping_best() {
        let mut board = Leaderboard::empty();
        for i in 0..12 {
            board.insert(entry(&format!("Player{i}"), 50 + i, 120));
            assert!(board.len() <= MAX_ENTRIES);
            assert_ranked(&board);
        }
        assert_eq!(board.len(), 10);
        assert_eq!(board.entries()[0].percentage, 61);
        assert_eq!(board.entries()[9].percentage, 52);
    }

    #[test]
    fn tied_newcomer_is_evicted_first() {
        let mut board = Leaderboard::empty();
        for i in 0..10 {
            board.insert(entry(&format!("Old{i}"), 50, 100));
        }
        board.insert(entry("Newcomer", 50, 100));
        assert!(board.entries().iter().all(|e| e.player_name != "Newcomer"));
    }

    #[test]
    fn high_score_under_capacity_is_always_true() {
        let board = Leaderboard::from_entries(vec![entry("A", 90, 10)]);
        assert!(board.is_high_score(0, 9_999));
    }

    #[test]
    fn high_score_at_capacity_needs_strictly_better() {
        let mut board = Leaderboard::empty();
        for i in 0..10 {
            board.insert(entry(&format!("P{i}"), 90 - i, 100));
        }
        // worst entry: 81%, 100s
        assert!(board.is_high_score(82, 500));
        assert!(board.is_high_score(81, 99));
        assert!(!board.is_high_score(81, 100));
        assert!(!board.is_high_score(81, 101));
        assert!(!board.is_high_score(80, 1));
    }

    #[test]
    fn rank_of_is_one_based() {
        let a = entry("A", 90, 10);
        let b = entry("B", 80, 10);
        let a_id = a.id.clone();
        let b_id = b.id.clone();
        let board = Leaderboard::from_entries(vec![b, a]);
        assert_eq!(board.rank_of(&a_id), Some(1));
        assert_eq!(board.rank_of(&b_id), Some(2));
        assert_eq!(board.rank_of(&EntryId::from_persisted("nonexistent")), None);
    }

    #[test]
    fn blank_names_become_anonymous() {
        assert_eq!(normalize_player_name("   "), ANONYMOUS_PLAYER);
        assert_eq!(normalize_player_name("  Ada "), "Ada");
    }
}
