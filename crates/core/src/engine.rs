//! Timed quiz session state machine.
//!
//! The engine is clock-agnostic: wall-clock timestamps are passed in by the caller and
//! the countdown moves only when [`SessionEngine::tick`] is called, once per second.

use chrono::{DateTime, Utc};

use crate::model::{Answer, Question, SessionResult, percentage};
use crate::time::whole_seconds_between;

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    NotStarted,
    /// Waiting for an answer; the countdown is running.
    Playing,
    /// An answer (or timeout) is recorded for the current question; the clock is frozen.
    FeedbackShown,
    Over,
}

/// What a single [`SessionEngine::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not counting down: not started, over, or feedback is shown.
    Ignored,
    /// One second elapsed, time remains.
    Counted,
    /// The countdown hit zero and the question was recorded as unanswered.
    TimedOut,
}

/// Drives one quiz attempt.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    questions: Vec<Question>,
    default_time_secs: u32,
    current: usize,
    score: u32,
    answers: Vec<Answer>,
    time_left: u32,
    started: bool,
    over: bool,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    pending: Option<Answer>,
}

impl SessionEngine {
    /// Creates an engine in the not-started state.
    ///
    /// Nothing is validated here: callers should pass at least one question and a
    /// positive default budget.
    #[must_use]
    pub fn new(questions: Vec<Question>, default_time_secs: u32) -> Self {
        Self {
            questions,
            default_time_secs,
            current: 0,
            score: 0,
            answers: Vec::new(),
            time_left: default_time_secs,
            started: false,
            over: false,
            started_at: None,
            ended_at: None,
            pending: None,
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Starts (or restarts) the session at the first question.
    ///
    /// An engine without questions goes straight to `Over` with an empty result.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.current = 0;
        self.score = 0;
        self.answers.clear();
        self.time_left = self.budget_for(0);
        self.started = true;
        self.over = false;
        self.started_at = Some(now);
        self.ended_at = None;
        self.pending = None;

        if self.questions.is_empty() {
            self.over = true;
            self.ended_at = Some(now);
        }
    }

    /// Counts down one second.
    ///
    /// Reaching zero without a submission records [`Answer::TimedOut`] and shows
    /// feedback; this happens at most once per question since the clock is frozen
    /// while feedback is shown.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase() != SessionPhase::Playing {
            return TickOutcome::Ignored;
        }

        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.pending = Some(Answer::TimedOut);
            TickOutcome::TimedOut
        } else {
            TickOutcome::Counted
        }
    }

    /// Records the player's pick for the current question and shows feedback.
    ///
    /// Returns `false` (and changes nothing) unless the session is playing with no
    /// feedback shown. The index is not checked against the options; an out-of-range
    /// pick simply scores as wrong.
    pub fn submit_answer(&mut self, index: usize) -> bool {
        if self.phase() != SessionPhase::Playing {
            return false;
        }
        self.pending = Some(Answer::Choice(index));
        true
    }

    /// Scores the recorded answer and moves to the next question, or ends the session
    /// after the last one.
    ///
    /// Returns `false` (and changes nothing) unless feedback is shown.
    pub fn advance(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase() != SessionPhase::FeedbackShown {
            return false;
        }
        let Some(answer) = self.pending.take() else {
            return false;
        };

        let correct = self
            .questions
            .get(self.current)
            .is_some_and(|q| answer.is_correct_for(q));
        if correct {
            self.score = self.score.saturating_add(1);
        }
        self.answers.push(answer);

        if self.current + 1 >= self.questions.len() {
            self.over = true;
            self.ended_at = Some(now);
        } else {
            self.current += 1;
            self.time_left = self.budget_for(self.current);
        }
        true
    }

    /// Returns to the not-started state from anywhere.
    pub fn reset(&mut self) {
        self.current = 0;
        self.score = 0;
        self.answers.clear();
        self.time_left = self.default_time_secs;
        self.started = false;
        self.over = false;
        self.started_at = None;
        self.ended_at = None;
        self.pending = None;
    }

    //
    // ─── DERIVED STATE ─────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if !self.started {
            SessionPhase::NotStarted
        } else if self.over {
            SessionPhase::Over
        } else if self.pending.is_some() {
            SessionPhase::FeedbackShown
        } else {
            SessionPhase::Playing
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// The answer awaiting [`advance`](Self::advance), if feedback is shown.
    #[must_use]
    pub fn selected_answer(&self) -> Option<Answer> {
        self.pending
    }

    #[must_use]
    pub fn is_feedback_shown(&self) -> bool {
        self.phase() == SessionPhase::FeedbackShown
    }

    /// Whether `index` is the correct option of the current question.
    #[must_use]
    pub fn is_answer_correct(&self, index: usize) -> bool {
        self.current_question()
            .is_some_and(|q| Answer::Choice(index).is_correct_for(q))
    }

    /// Completion indicator in percent: `(current + 1) / total * 100`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = (self.current + 1) as f64 / self.questions.len() as f64;
        ratio * 100.0
    }

    /// Snapshot of the attempt. Meaningful once the session is over.
    #[must_use]
    pub fn result(&self) -> SessionResult {
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        let time_taken_secs = match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => whole_seconds_between(start, end),
            _ => 0,
        };

        SessionResult {
            score: self.score,
            total_questions: total,
            percentage: percentage(self.score, total),
            time_taken_secs,
            user_answers: self.answers.clone(),
            correct_answers: self.questions.iter().map(Question::correct_answer).collect(),
            questions: self.questions.clone(),
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    #[must_use]
    pub fn default_time_secs(&self) -> u32 {
        self.default_time_secs
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.over
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    fn budget_for(&self, index: usize) -> u32 {
        self.questions
            .get(index)
            .map_or(self.default_time_secs, |q| q.time_budget(self.default_time_secs))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, QuestionId};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn question(id: u64, correct: usize, time_limit: Option<u32>) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}?"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            "General",
            Difficulty::Easy,
            time_limit,
        )
        .unwrap()
    }

    fn two_question_engine() -> SessionEngine {
        SessionEngine::new(vec![question(1, 0, None), question(2, 0, None)], 30)
    }

    #[test]
    fn new_engine_is_not_started() {
        let engine = two_question_engine();
        assert_eq!(engine.phase(), SessionPhase::NotStarted);
        assert_eq!(engine.time_left(), 30);
        assert!(engine.answers().is_empty());
    }

    #[test]
    fn two_question_run_scores_fifty_percent() {
        let mut engine = two_question_engine();
        engine.start(fixed_now());
        assert!(engine.submit_answer(0));
        assert!(engine.advance(fixed_now()));
        assert!(engine.submit_answer(1));
        assert!(engine.advance(fixed_now()));

        let result = engine.result();
        assert_eq!(result.score, 1);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.percentage, 50);
        assert_eq!(result.answer_indices(), vec![0, 1]);
        assert_eq!(result.correct_answers, vec![0, 0]);
        assert_eq!(engine.phase(), SessionPhase::Over);
    }

    #[test]
    fn start_uses_question_budget_then_default() {
        let mut engine = SessionEngine::new(vec![question(1, 0, Some(45)), question(2, 0, None)], 20);
        engine.start(fixed_now());
        assert_eq!(engine.time_left(), 45);

        engine.submit_answer(0);
        engine.advance(fixed_now());
        assert_eq!(engine.time_left(), 20);

        let mut default_first = SessionEngine::new(vec![question(1, 0, None)], 25);
        default_first.start(fixed_now());
        assert_eq!(default_first.time_left(), 25);
    }

    #[test]
    fn submit_during_feedback_keeps_first_selection() {
        let mut engine = two_question_engine();
        engine.start(fixed_now());
        assert!(engine.submit_answer(2));
        assert!(!engine.submit_answer(0));
        assert_eq!(engine.selected_answer(), Some(Answer::Choice(2)));
    }

    #[test]
    fn countdown_expiry_records_timeout_once() {
        let mut engine = SessionEngine::new(vec![question(1, 0, Some(3))], 30);
        engine.start(fixed_now());

        assert_eq!(engine.tick(), TickOutcome::Counted);
        assert_eq!(engine.tick(), TickOutcome::Counted);
        assert_eq!(engine.tick(), TickOutcome::TimedOut);
        assert_eq!(engine.time_left(), 0);
        assert_eq!(engine.phase(), SessionPhase::FeedbackShown);
        assert_eq!(engine.selected_answer(), Some(Answer::TimedOut));

        // frozen during feedback; a late manual pick cannot override the timeout
        assert_eq!(engine.tick(), TickOutcome::Ignored);
        assert_eq!(engine.time_left(), 0);
        assert!(!engine.submit_answer(0));

        assert!(engine.advance(fixed_now()));
        assert_eq!(engine.answers(), &[Answer::TimedOut]);
        assert_eq!(engine.result().answer_indices(), vec![-1]);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn tick_is_ignored_before_start_and_after_end() {
        let mut engine = SessionEngine::new(vec![question(1, 0, None)], 30);
        assert_eq!(engine.tick(), TickOutcome::Ignored);
        assert_eq!(engine.time_left(), 30);

        engine.start(fixed_now());
        engine.submit_answer(0);
        engine.advance(fixed_now());
        assert_eq!(engine.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn zero_budget_times_out_on_first_tick() {
        let mut engine = SessionEngine::new(vec![question(1, 0, None)], 0);
        engine.start(fixed_now());
        assert_eq!(engine.tick(), TickOutcome::TimedOut);
        assert_eq!(engine.time_left(), 0);
    }

    #[test]
    fn advance_requires_feedback() {
        let mut engine = two_question_engine();
        assert!(!engine.advance(fixed_now()));
        engine.start(fixed_now());
        assert!(!engine.advance(fixed_now()));
        assert_eq!(engine.current_index(), 0);
        assert!(engine.answers().is_empty());
    }

    #[test]
    fn answers_track_advances_and_stay_bounded() {
        let mut engine = SessionEngine::new((1..=3).map(|id| question(id, 1, None)).collect(), 10);
        engine.start(fixed_now());
        for expected in 1..=3 {
            engine.submit_answer(1);
            engine.advance(fixed_now());
            assert_eq!(engine.answers().len(), expected);
        }
        assert!(engine.is_over());
        assert!(!engine.submit_answer(1));
        assert!(!engine.advance(fixed_now()));
        assert_eq!(engine.answers().len(), 3);
        assert_eq!(engine.current_index(), 2);
        assert_eq!(engine.result().percentage, 100);
    }

    #[test]
    fn out_of_range_answer_scores_as_wrong() {
        let mut engine = SessionEngine::new(vec![question(1, 0, None)], 30);
        engine.start(fixed_now());
        assert!(engine.submit_answer(99));
        engine.advance(fixed_now());
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.result().answer_indices(), vec![99]);
    }

    #[test]
    fn time_taken_is_whole_seconds_between_start_and_end() {
        let start = fixed_now();
        let mut engine = SessionEngine::new(vec![question(1, 0, None)], 30);
        engine.start(start);
        assert_eq!(engine.result().time_taken_secs, 0);

        engine.submit_answer(0);
        let end = start + Duration::milliseconds(95_700);
        engine.advance(end);

        assert!(engine.ended_at().unwrap() >= engine.started_at().unwrap());
        assert_eq!(engine.result().time_taken_secs, 95);
    }

    #[test]
    fn progress_counts_current_question() {
        let mut engine = SessionEngine::new((1..=4).map(|id| question(id, 0, None)).collect(), 30);
        engine.start(fixed_now());
        assert!((engine.progress() - 25.0).abs() < f64::EPSILON);
        engine.submit_answer(0);
        engine.advance(fixed_now());
        assert!((engine.progress() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_returns_to_not_started() {
        let mut engine = two_question_engine();
        engine.start(fixed_now());
        engine.tick();
        engine.submit_answer(0);
        engine.advance(fixed_now());

        engine.reset();
        assert_eq!(engine.phase(), SessionPhase::NotStarted);
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.score(), 0);
        assert!(engine.answers().is_empty());
        assert_eq!(engine.started_at(), None);
        assert_eq!(engine.ended_at(), None);
        assert_eq!(engine.selected_answer(), None);
    }

    #[test]
    fn restart_clears_previous_attempt() {
        let mut engine = two_question_engine();
        engine.start(fixed_now());
        engine.submit_answer(0);
        engine.advance(fixed_now());
        engine.submit_answer(3);

        engine.start(fixed_now());
        assert_eq!(engine.phase(), SessionPhase::Playing);
        assert_eq!(engine.current_index(), 0);
        assert!(engine.answers().is_empty());
        assert_eq!(engine.selected_answer(), None);
    }

    #[test]
    fn empty_session_ends_on_start() {
        let mut engine = SessionEngine::new(Vec::new(), 30);
        engine.start(fixed_now());
        assert_eq!(engine.phase(), SessionPhase::Over);
        assert_eq!(engine.progress(), 0.0);
        let result = engine.result();
        assert_eq!(result.total_questions, 0);
        assert_eq!(result.percentage, 0);
    }

    #[test]
    fn correctness_check_uses_current_question() {
        let mut engine = SessionEngine::new(vec![question(1, 2, None)], 30);
        engine.start(fixed_now());
        assert!(engine.is_answer_correct(2));
        assert!(!engine.is_answer_correct(0));
    }
}
