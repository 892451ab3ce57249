use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use quiz_core::model::{CategoryId, Difficulty, UserId, onboarding_categories};
use services::{AppServices, Clock, Identity, SessionError};
use storage::bank::builtin_questions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod terminal;

use terminal::PlayExit;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUser { raw: String },
    InvalidSeed { raw: String },
    InvalidCount { raw: String },
    UnknownCategory { raw: String },
    UnknownDifficulty { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value: {raw:?}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidCount { raw } => write!(f, "invalid --count value: {raw}"),
            ArgsError::UnknownCategory { raw } => write!(f, "unknown category: {raw}"),
            ArgsError::UnknownDifficulty { raw } => write!(f, "unknown difficulty: {raw}"),
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
    eprintln!("  cargo run -p app -- practice [--db <sqlite_url>] [--user <id>] [--seed <n>] [--json-report]");
    eprintln!("  cargo run -p app -- prefs    [--db <sqlite_url>] [--user <id>]");
    eprintln!("                               [--categories <id,..>] [--count <n>] [--difficulties <easy,..>]");
    eprintln!("  cargo run -p app -- seed     [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --user guest");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_USER, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Practice,
    Prefs,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "prefs" => Some(Self::Prefs),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct PrefsEdit {
    categories: Option<BTreeSet<CategoryId>>,
    count: Option<u32>,
    difficulties: Option<BTreeSet<Difficulty>>,
}

impl PrefsEdit {
    fn is_empty(&self) -> bool {
        self.categories.is_none() && self.count.is_none() && self.difficulties.is_none()
    }
}

struct Args {
    db_url: String,
    user: UserId,
    seed: Option<u64>,
    json_report: bool,
    edit: PrefsEdit,
}

fn parse_categories(raw: &str) -> Result<BTreeSet<CategoryId>, ArgsError> {
    let known: BTreeSet<CategoryId> = onboarding_categories()
        .into_iter()
        .map(|c| c.id().clone())
        .collect();
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let id = CategoryId::new(s);
            if known.contains(&id) {
                Ok(id)
            } else {
                Err(ArgsError::UnknownCategory { raw: s.to_string() })
            }
        })
        .collect()
}

fn parse_difficulties(raw: &str) -> Result<BTreeSet<Difficulty>, ArgsError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Difficulty>()
                .map_err(|_| ArgsError::UnknownDifficulty { raw: s.to_string() })
        })
        .collect()
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut user = std::env::var("QUIZ_USER")
            .ok()
            .and_then(|value| value.parse::<UserId>().ok())
            .unwrap_or_else(UserId::guest);
        let mut seed = None;
        let mut json_report = false;
        let mut edit = PrefsEdit::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user" => {
                    let value = require_value(args, "--user")?;
                    user = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidUser { raw: value.clone() })?;
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed = value
                        .parse::<u64>()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--json-report" => json_report = true,
                "--categories" => {
                    let value = require_value(args, "--categories")?;
                    edit.categories = Some(parse_categories(&value)?);
                }
                "--count" => {
                    let value = require_value(args, "--count")?;
                    let parsed = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidCount { raw: value.clone() })?;
                    edit.count = Some(parsed);
                }
                "--difficulties" => {
                    let value = require_value(args, "--difficulties")?;
                    edit.difficulties = Some(parse_difficulties(&value)?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user,
            seed,
            json_report,
            edit,
        })
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
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
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

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn run_practice(app: &AppServices, json_report: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session_loop = app.session_loop();
    let mut session = match session_loop.start_session().await {
        Ok(session) => session,
        Err(SessionError::MissingPreferences { user }) => {
            eprintln!("No preferences saved for {user}. Choose categories first, e.g.:");
            eprintln!("  cargo run -p app -- prefs --categories cardiology,neurology");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    loop {
        // Locks are released before awaiting the restart.
        let exit = terminal::play(&mut session, &mut io::stdin().lock(), &mut io::stdout().lock())?;
        match exit {
            PlayExit::Restart => session_loop.restart(&mut session).await?,
            PlayExit::Done | PlayExit::Quit => break,
        }
    }

    if json_report && session.is_complete() {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", serde_json::to_string_pretty(&session.report())?)?;
    }
    Ok(())
}

async fn run_prefs(app: &AppServices, user: &UserId, edit: PrefsEdit) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = io::stdout().lock();
    if edit.is_empty() {
        let current = app.preferences().load(user).await;
        terminal::render_preferences(&mut out, current.as_ref())?;
        return Ok(());
    }

    let mut draft = app.preferences().load_draft(user).await;
    if let Some(categories) = edit.categories {
        draft.categories = categories;
    }
    if let Some(count) = edit.count {
        draft.question_count = count;
    }
    if let Some(difficulties) = edit.difficulties {
        draft.difficulties = difficulties;
    }

    let update = app.session_loop().save_preferences(draft).await?;
    terminal::render_preferences(&mut out, Some(&update.preferences))?;
    if !update.persisted {
        writeln!(out, "Warning: preferences could not be saved; they apply to this run only.")?;
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1).peekable();

    let first = argv.peek().cloned();
    let cmd = match first.as_deref() {
        None => Command::Practice,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Practice,
        Some(first) => {
            let cmd = Command::from_arg(first).ok_or_else(|| {
                eprintln!("unknown subcommand: {first}");
                print_usage();
                io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
            })?;
            argv.next();
            cmd
        }
    };

    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&args.db_url)?;
    let identity = Arc::new(Identity::from_user_id(args.user.clone()));
    let app = AppServices::new_sqlite(&args.db_url, Clock::system(), identity).await?;
    tracing::info!(db = %args.db_url, user = %args.user, seeded = app.seeded_bank(), "storage ready");

    match cmd {
        Command::Practice => {
            let app = match args.seed {
                Some(seed) => app.with_seed(seed),
                None => app,
            };
            run_practice(&app, args.json_report).await
        }
        Command::Prefs => run_prefs(&app, &args.user, args.edit).await,
        Command::Seed => {
            let bank = builtin_questions()?;
            app.questions().upsert_questions(&bank).await?;
            println!("Seeded {} sample questions into {}", bank.len(), args.db_url);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_are_made_absolute() {
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/q.db".into()),
            "sqlite:///tmp/q.db"
        );
        assert_eq!(normalize_sqlite_url("sqlite:/tmp/q.db".into()), "sqlite:///tmp/q.db");
        assert!(normalize_sqlite_url("quiz.db".into()).ends_with("/quiz.db"));
    }

    #[test]
    fn parses_preference_flags() {
        let mut argv = ["--categories", "cardiology, obgyn", "--count", "7", "--difficulties", "easy,HARD"]
            .into_iter()
            .map(String::from);
        let args = Args::parse(&mut argv).unwrap();

        let categories = args.edit.categories.unwrap();
        assert!(categories.contains(&CategoryId::new("obgyn")));
        assert_eq!(categories.len(), 2);
        assert_eq!(args.edit.count, Some(7));
        assert_eq!(
            args.edit.difficulties.unwrap().into_iter().collect::<Vec<_>>(),
            vec![Difficulty::Easy, Difficulty::Hard]
        );
    }

    #[test]
    fn rejects_unknown_category_and_missing_values() {
        let mut argv = ["--categories", "astrology"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(&mut argv),
            Err(ArgsError::UnknownCategory { .. })
        ));

        let mut argv = ["--count"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(&mut argv),
            Err(ArgsError::MissingValue { flag: "--count" })
        ));
    }
}
