use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::{MAX_QUESTIONS_PER_GAME, Question, QuizSettings};

/// Draws the questions for one game.
///
/// Keeps questions matching the category and difficulty filters (both must match
/// when both are set). If nothing matches, the whole bank is used instead. The pool
/// is shuffled and cut to [`MAX_QUESTIONS_PER_GAME`].
pub fn pick_questions<R: Rng + ?Sized>(
    bank: &[Question],
    settings: &QuizSettings,
    rng: &mut R,
) -> Vec<Question> {
    let mut pool: Vec<Question> = bank
        .iter()
        .filter(|q| {
            settings
                .category
                .as_deref()
                .is_none_or(|category| q.category() == category)
        })
        .filter(|q| settings.difficulty.is_none_or(|d| q.difficulty() == d))
        .cloned()
        .collect();

    if pool.is_empty() {
        tracing::debug!(
            category = ?settings.category,
            difficulty = ?settings.difficulty,
            "no questions match filters, drawing from the whole bank"
        );
        pool = bank.to_vec();
    }

    pool.shuffle(rng);
    pool.truncate(MAX_QUESTIONS_PER_GAME);
    pool
}

/// Distinct categories in the order they first appear.
#[must_use]
pub fn categories(bank: &[Question]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for question in bank {
        if !seen.iter().any(|c| c == question.category()) {
            seen.push(question.category().to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, QuestionId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn bank() -> Vec<Question> {
        let mut out = Vec::new();
        for id in 1..=15_u64 {
            let (category, difficulty) = match id % 3 {
                0 => ("Programming", Difficulty::Hard),
                1 => ("Blockchain", Difficulty::Easy),
                _ => ("Technology", Difficulty::Medium),
            };
            out.push(
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    vec!["a".into(), "b".into()],
                    0,
                    category,
                    difficulty,
                    None,
                )
                .unwrap(),
            );
        }
        out
    }

    #[test]
    fn caps_unfiltered_draw_at_ten_distinct_questions() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = pick_questions(&bank(), &QuizSettings::default(), &mut rng);
        assert_eq!(picked.len(), MAX_QUESTIONS_PER_GAME);
        let ids: HashSet<_> = picked.iter().map(Question::id).collect();
        assert_eq!(ids.len(), picked.len());
    }

    #[test]
    fn filters_by_category_and_difficulty() {
        let mut rng = StdRng::seed_from_u64(7);
        let settings = QuizSettings::default()
            .with_category("Blockchain")
            .with_difficulty(Difficulty::Easy);
        let picked = pick_questions(&bank(), &settings, &mut rng);
        assert_eq!(picked.len(), 5);
        assert!(picked.iter().all(|q| q.category() == "Blockchain"));
    }

    #[test]
    fn empty_intersection_falls_back_to_whole_bank() {
        let mut rng = StdRng::seed_from_u64(7);
        let settings = QuizSettings::default()
            .with_category("Blockchain")
            .with_difficulty(Difficulty::Hard);
        let picked = pick_questions(&bank(), &settings, &mut rng);
        assert_eq!(picked.len(), MAX_QUESTIONS_PER_GAME);
    }

    #[test]
    fn categories_keep_first_seen_order() {
        assert_eq!(categories(&bank()), ["Blockchain", "Technology", "Programming"]);
    }
}
