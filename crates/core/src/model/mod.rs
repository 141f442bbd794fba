mod ids;
mod leaderboard;
mod question;
mod result;
mod settings;

pub use ids::{EntryId, ParseIdError, QuestionId};

pub use leaderboard::{
    ANONYMOUS_PLAYER, Leaderboard, LeaderboardEntry, MAX_ENTRIES, normalize_player_name,
    rank_order,
};
pub use question::{Difficulty, ParseDifficultyError, Question, QuestionDraft, QuestionError};
pub use result::{Answer, SessionResult, percentage};
pub use settings::{DEFAULT_TIME_PER_QUESTION_SECS, MAX_QUESTIONS_PER_GAME, QuizSettings};
