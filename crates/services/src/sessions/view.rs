use quiz_core::model::{Answer, Question};
use quiz_core::{SessionEngine, SessionPhase};

use super::progress::SessionProgress;

/// Presentation-agnostic picture of a running session.
///
/// Published after every tick and player action so a front end can redraw
/// without holding the engine lock.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub question_index: usize,
    pub question: Option<Question>,
    pub time_left: u32,
    pub score: u32,
    pub selected: Option<Answer>,
    pub progress: SessionProgress,
}

impl SessionSnapshot {
    #[must_use]
    pub fn of(engine: &SessionEngine) -> Self {
        Self {
            phase: engine.phase(),
            question_index: engine.current_index(),
            question: engine.current_question().cloned(),
            time_left: engine.time_left(),
            score: engine.score(),
            selected: engine.selected_answer(),
            progress: SessionProgress {
                total: engine.total_questions(),
                answered: engine.answers().len(),
                percent: engine.progress(),
                is_complete: engine.is_over(),
            },
        }
    }

    /// Whether the shown feedback is for a correct pick.
    #[must_use]
    pub fn is_selection_correct(&self) -> bool {
        match (self.selected, &self.question) {
            (Some(answer), Some(question)) => answer.is_correct_for(question),
            _ => false,
        }
    }
}
