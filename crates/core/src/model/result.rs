use crate::model::question::Question;

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// What was recorded for a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Answer {
    /// The player picked this option index. Not bounds-checked.
    Choice(usize),
    /// The countdown ran out before the player picked anything.
    TimedOut,
}

impl Answer {
    /// Flat integer view used by the persisted and display formats (`-1` for a timeout).
    #[must_use]
    pub fn as_index(self) -> i64 {
        match self {
            Answer::Choice(index) => i64::try_from(index).unwrap_or(i64::MAX),
            Answer::TimedOut => -1,
        }
    }

    #[must_use]
    pub fn is_correct_for(self, question: &Question) -> bool {
        matches!(self, Answer::Choice(index) if index == question.correct_answer())
    }
}

//
// ─── SESSION RESULT ────────────────────────────────────────────────────────────
//

/// Snapshot of a finished quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub time_taken_secs: u64,
    pub user_answers: Vec<Answer>,
    pub correct_answers: Vec<usize>,
    pub questions: Vec<Question>,
}

impl SessionResult {
    /// Answers in their flat integer form.
    #[must_use]
    pub fn answer_indices(&self) -> Vec<i64> {
        self.user_answers.iter().map(|a| a.as_index()).collect()
    }
}

/// `score / total` as a whole percentage, rounding halves up. Zero when `total` is zero.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score);
    let total = u64::from(total);
    let rounded = (score * 200 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
