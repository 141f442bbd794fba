use quiz_core::SessionPhase;
use quiz_core::model::{Answer, LeaderboardEntry, Question, QuizSettings, SessionResult};
use services::{AppServices, SessionSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

pub type Input = Lines<BufReader<Stdin>>;

/// Line reader over stdin, shared by every prompt of a run.
pub fn stdin_lines() -> Input {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Plays one game on the terminal and saves the result.
pub async fn play(
    app: &mut AppServices,
    input: &mut Input,
    questions: Vec<Question>,
    settings: &QuizSettings,
    player: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = app.new_session(questions, settings);
    let mut updates = session.subscribe();

    session.start();
    loop {
        let snapshot = session.snapshot();
        match snapshot.phase {
            SessionPhase::NotStarted | SessionPhase::Over => break,
            SessionPhase::Playing => {
                print_question(&snapshot);
                loop {
                    tokio::select! {
                        line = input.next_line() => {
                            let Some(line) = line? else {
                                session.reset();
                                println!("\ninput closed, game abandoned");
                                return Ok(());
                            };
                            match parse_choice(&line) {
                                Some(index) => {
                                    session.submit_answer(index);
                                    break;
                                }
                                None => println!("enter an option number"),
                            }
                        }
                        changed = updates.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            let update = updates.borrow_and_update().clone();
                            if update.phase != SessionPhase::Playing {
                                break;
                            }
                            if matches!(update.time_left, 10 | 5) {
                                println!("  {}s left", update.time_left);
                            }
                        }
                    }
                }
            }
            SessionPhase::FeedbackShown => {
                print_feedback(&snapshot);
                wait_for_enter(input).await?;
                session.advance();
            }
        }
    }

    let result = session.result();
    print_result(&result);
    save(app, player, &result).await;
    Ok(())
}

async fn save(app: &mut AppServices, player: &str, result: &SessionResult) {
    let leaderboard = app.leaderboard_mut();
    leaderboard.refresh().await;
    if leaderboard.is_high_score(result.percentage, result.time_taken_secs) {
        println!("New high score!");
    }
    match leaderboard.save_score(player, result).await {
        Some(entry) => match leaderboard.rank_of(&entry.id) {
            Some(rank) => println!("{} placed #{rank} on the leaderboard", entry.player_name),
            None => println!("{} did not make the top {}", entry.player_name, leaderboard.leaderboard().capacity()),
        },
        None => println!("Could not save your score; the leaderboard is unchanged."),
    }
}

fn parse_choice(line: &str) -> Option<usize> {
    let number: usize = line.trim().parse().ok()?;
    number.checked_sub(1)
}

async fn wait_for_enter(input: &mut Input) -> std::io::Result<()> {
    println!("(press Enter to continue)");
    input.next_line().await?;
    Ok(())
}

fn print_question(snapshot: &SessionSnapshot) {
    let Some(question) = &snapshot.question else {
        return;
    };
    println!();
    println!(
        "Question {}/{} [{}, {}] {:.0}%  ({}s)",
        snapshot.question_index + 1,
        snapshot.progress.total,
        question.category(),
        question.difficulty(),
        snapshot.progress.percent,
        snapshot.time_left,
    );
    println!("{}", question.prompt());
    for (i, option) in question.options().iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
}

fn print_feedback(snapshot: &SessionSnapshot) {
    let Some(question) = &snapshot.question else {
        return;
    };
    let correct = question
        .options()
        .get(question.correct_answer())
        .map_or("?", String::as_str);
    match snapshot.selected {
        Some(Answer::TimedOut) => println!("Time's up! The answer was: {correct}"),
        _ if snapshot.is_selection_correct() => println!("Correct!"),
        _ => println!("Wrong. The answer was: {correct}"),
    }
}

fn print_result(result: &SessionResult) {
    println!();
    println!(
        "Score: {}/{} ({}%) in {}",
        result.score,
        result.total_questions,
        result.percentage,
        format_duration(result.time_taken_secs)
    );
    for (i, (question, answer)) in result.questions.iter().zip(&result.user_answers).enumerate() {
        let mark = if answer.is_correct_for(question) { "+" } else { "-" };
        println!("  {mark} {}. {}", i + 1, question.prompt());
    }
}

pub fn print_leaderboard(entries: &[LeaderboardEntry]) {
    if entries.is_empty() {
        println!("No scores yet.");
        return;
    }
    for (rank, entry) in entries.iter().enumerate() {
        println!(
            "{:>2}. {:<20} {:>3}%  {}/{}  {}  {}",
            rank + 1,
            entry.player_name,
            entry.percentage,
            entry.score,
            entry.total_questions,
            format_duration(entry.time_taken_secs),
            entry.created_at.format("%Y-%m-%d"),
        );
    }
}

fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_are_one_based() {
        assert_eq!(parse_choice(" 1 "), Some(0));
        assert_eq!(parse_choice("4"), Some(3));
        assert_eq!(parse_choice("0"), None);
        assert_eq!(parse_choice("abc"), None);
    }

    #[test]
    fn durations_render_as_minutes_and_seconds() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(125), "2:05");
    }
}
