mod bank;
mod play;

use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{Difficulty, QuizSettings};
use services::{AppServices, Clock, categories, pick_questions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTime { raw: String },
    InvalidDifficulty { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTime { raw } => write!(f, "invalid --time value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value: {raw} (easy, medium, hard)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app play [--db <sqlite_url>] [--questions <path>] [--time <secs>]");
    eprintln!("           [--category <name>] [--difficulty easy|medium|hard] [--player <name>]");
    eprintln!("  app leaderboard [--db <sqlite_url>]");
    eprintln!("  app clear       [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --time 30");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_QUESTIONS, QUIZ_TIME_PER_QUESTION,");
    eprintln!("  QUIZ_CATEGORY, QUIZ_DIFFICULTY, QUIZ_PLAYER, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Leaderboard,
    Clear,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "leaderboard" => Some(Self::Leaderboard),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    questions: Option<PathBuf>,
    settings: QuizSettings,
    player: Option<String>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_time(raw: String) -> Result<u32, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidTime { raw })
}

fn parse_difficulty(raw: String) -> Result<Difficulty, ArgsError> {
    raw.parse()
        .map_err(|_| ArgsError::InvalidDifficulty { raw })
}

impl Args {
    fn from_env() -> Result<Self, ArgsError> {
        let mut settings = QuizSettings::default();
        if let Some(raw) = env_var("QUIZ_TIME_PER_QUESTION") {
            settings.time_per_question = parse_time(raw)?;
        }
        if let Some(raw) = env_var("QUIZ_DIFFICULTY") {
            settings.difficulty = Some(parse_difficulty(raw)?);
        }
        settings.category = env_var("QUIZ_CATEGORY");

        Ok(Self {
            db_url: env_var("QUIZ_DB_URL")
                .map_or_else(|| normalize_sqlite_url("quiz.sqlite3".into()), normalize_sqlite_url),
            questions: env_var("QUIZ_QUESTIONS").map(PathBuf::from),
            settings,
            player: env_var("QUIZ_PLAYER"),
        })
    }

    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::from_env()?;

        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                (Command::Play, "--questions") => {
                    parsed.questions = Some(PathBuf::from(require_value(args, "--questions")?));
                }
                (Command::Play, "--time") => {
                    parsed.settings.time_per_question = parse_time(require_value(args, "--time")?)?;
                }
                (Command::Play, "--category") => {
                    parsed.settings.category = Some(require_value(args, "--category")?);
                }
                (Command::Play, "--difficulty") => {
                    parsed.settings.difficulty =
                        Some(parse_difficulty(require_value(args, "--difficulty")?)?);
                }
                (Command::Play, "--player") => {
                    parsed.player = Some(require_value(args, "--player")?);
                }
                (_, "--help" | "-h") => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn read_player_name(input: &mut play::Input) -> std::io::Result<String> {
    use tokio::io::AsyncWriteExt;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Your name: ").await?;
    stdout.flush().await?;
    Ok(input.next_line().await?.unwrap_or_default())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => Command::Play,
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::parse(cmd, &mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let mut app = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;
    tracing::info!(db = %parsed.db_url, ?cmd, "leaderboard database ready");

    match cmd {
        Command::Play => {
            let bank = match &parsed.questions {
                Some(path) => bank::from_file(path)?,
                None => bank::built_in()?,
            };
            tracing::info!(
                questions = bank.len(),
                categories = ?categories(&bank),
                "question bank loaded"
            );
            let questions = pick_questions(&bank, &parsed.settings, &mut rand::rng());
            let mut input = play::stdin_lines();
            // name is asked up front: stdin belongs to the answer loop afterwards
            let player = match parsed.player {
                Some(name) => name,
                None => read_player_name(&mut input).await?,
            };
            play::play(&mut app, &mut input, questions, &parsed.settings, &player).await
        }
        Command::Leaderboard => {
            play::print_leaderboard(app.leaderboard().entries());
            Ok(())
        }
        Command::Clear => {
            app.leaderboard_mut().try_clear().await?;
            println!("Leaderboard cleared.");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app=info,services=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
