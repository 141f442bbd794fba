use crate::model::question::Difficulty;

/// Default time budget per question, in seconds.
pub const DEFAULT_TIME_PER_QUESTION_SECS: u32 = 30;

/// Upper bound on how many questions a single game draws.
pub const MAX_QUESTIONS_PER_GAME: usize = 10;

/// Player-chosen options for a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    pub time_per_question: u32,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_per_question: DEFAULT_TIME_PER_QUESTION_SECS,
            category: None,
            difficulty: None,
        }
    }
}

impl QuizSettings {
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub fn with_time_per_question(mut self, secs: u32) -> Self {
        self.time_per_question = secs;
        self
    }
}
