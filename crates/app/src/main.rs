use std::fmt;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use quiz_core::model::{AnswerOutcome, AudioLocator, QuizRules, SongCatalog};
use services::{
    CatalogService, Clock, LoadOutcome, PlaybackAdapter, PlaybackError, QuizEngine,
    QuizLoopService, ResultsService, TickEvent,
};
use storage::repository::Storage;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuestions { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuestions { raw } => write!(f, "invalid --questions value: {raw}"),
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
    eprintln!(
        "  cargo run -p app -- play   [--catalog-url <url>] [--db <sqlite_url>] [--name <player>] [--questions <n>] [--resume]"
    );
    eprintln!("  cargo run -p app -- scores [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults for play:");
    eprintln!("  --catalog-url http://localhost:8080");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_CATALOG_URL, QUIZ_DB_URL, QUIZ_PLAYER");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Scores,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "scores" => Some(Self::Scores),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    catalog_url: String,
    player: Option<String>,
    questions: Option<u32>,
    resume: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut catalog_url = std::env::var("QUIZ_CATALOG_URL")
            .ok()
            .unwrap_or_else(|| "http://localhost:8080".into());
        let mut player = std::env::var("QUIZ_PLAYER").ok();
        let mut questions = None;
        let mut resume = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--catalog-url" => {
                    catalog_url = require_value(args, "--catalog-url")?;
                }
                "--name" => {
                    player = Some(require_value(args, "--name")?);
                }
                "--questions" => {
                    let value = require_value(args, "--questions")?;
                    let parsed: u32 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidQuestions { raw: value.clone() })?;
                    questions = Some(parsed);
                }
                "--resume" => {
                    resume = true;
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
            catalog_url,
            player,
            questions,
            resume,
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

/// Playback adapter for a terminal host without an audio device: it reports
/// what it would play and otherwise stays silent. Real audio output is the
/// player's job, not the quiz engine's.
struct ConsolePlayback;

impl PlaybackAdapter for ConsolePlayback {
    fn play(&self, locator: &AudioLocator) -> Result<(), PlaybackError> {
        tracing::info!(audio = locator.as_str(), "now playing");
        Ok(())
    }

    fn pause(&self) {
        tracing::debug!("playback paused");
    }

    fn resume(&self) {
        tracing::debug!("playback resumed");
    }

    fn stop(&self) {
        tracing::debug!("playback stopped");
    }

    fn position(&self) -> Option<chrono::Duration> {
        None
    }

    fn duration(&self) -> Option<chrono::Duration> {
        None
    }
}

/// Catalog fetch with the splash screen's retry pacing: a failed fetch is
/// retryable, so keep trying until the server answers.
async fn fetch_catalog_with_retry(catalog_service: &CatalogService) -> Arc<SongCatalog> {
    loop {
        match catalog_service.fetch_catalog().await {
            Ok(catalog) => {
                eprintln!("Loaded {} songs.", catalog.len());
                return Arc::new(catalog);
            }
            Err(err) => {
                tracing::warn!(error = %err, "catalog fetch failed, retrying in 3s");
                eprintln!("Could not load songs ({err}); retrying...");
                tokio::time::sleep(StdDuration::from_secs(3)).await;
            }
        }
    }
}

fn format_clock(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

enum QuestionEnd {
    Resolved(AnswerOutcome),
    Quit,
}

async fn run_question(
    loop_svc: &QuizLoopService,
    engine: &mut QuizEngine,
    input: &mut Lines<BufReader<Stdin>>,
) -> Result<QuestionEnd, Box<dyn std::error::Error>> {
    let mut ticker = tokio::time::interval(StdDuration::from_millis(250));
    let mut last_shown = i64::MAX;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match loop_svc.tick(engine).await? {
                    Some(TickEvent::Running { remaining }) => {
                        let seconds = remaining.num_seconds();
                        if seconds < last_shown {
                            last_shown = seconds;
                            eprint!("\r  time left {}   ", format_clock(seconds));
                        }
                    }
                    Some(TickEvent::Expired(outcome)) => {
                        eprintln!();
                        return Ok(QuestionEnd::Resolved(outcome));
                    }
                    None => {}
                }
            }
            line = input.next_line() => {
                let Some(line) = line? else {
                    // stdin closed: save and leave.
                    return Ok(QuestionEnd::Quit);
                };
                match line.trim() {
                    "q" => return Ok(QuestionEnd::Quit),
                    "p" => {
                        if engine.is_paused() {
                            loop_svc.resume(engine);
                            eprintln!("  resumed");
                        } else {
                            loop_svc.pause(engine);
                            eprintln!("  paused (p to resume)");
                        }
                    }
                    choice => {
                        if let Ok(number) = choice.parse::<usize>() {
                            if number >= 1 {
                                if let Some(outcome) = loop_svc.answer(engine, number - 1).await? {
                                    eprintln!();
                                    return Ok(QuestionEnd::Resolved(outcome));
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

async fn play(
    args: Args,
    loop_svc: &QuizLoopService,
    results: &ResultsService,
) -> Result<(), Box<dyn std::error::Error>> {
    let player = match args.player {
        Some(name) => {
            results.remember_player(&name).await?;
            name
        }
        None => results
            .last_player()
            .await?
            .unwrap_or_else(|| "Player".into()),
    };

    let mut engine = if args.resume {
        loop_svc.resume_or_new().await?
    } else {
        loop_svc.new_game().await?
    };

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match loop_svc.begin_question(&mut engine).await? {
            LoadOutcome::Question(view) => {
                let progress = engine.progress();
                println!();
                println!(
                    "Question {}/{}  |  score {}  |  streak {}",
                    view.question_number, view.total_questions, progress.score, progress.streak
                );
                println!("Which song is playing?");
                for (index, title) in view.option_titles.iter().enumerate() {
                    println!("  {}) {title}", index + 1);
                }
                println!("(1-{} to answer, p to pause, q to save and quit)", view.option_titles.len());

                match run_question(loop_svc, &mut engine, &mut input).await? {
                    QuestionEnd::Resolved(outcome) => {
                        let correct_title = engine
                            .question()
                            .map(|q| q.options()[outcome.correct_index].title().to_owned())
                            .unwrap_or_default();
                        if outcome.is_correct {
                            println!("Correct! +{} points", outcome.points_awarded);
                        } else if outcome.selected.is_some() {
                            println!("Wrong -- it was \"{correct_title}\"");
                        } else {
                            println!("Time's up -- it was \"{correct_title}\"");
                        }

                        let reveal = loop_svc.rules().reveal_delay_millis();
                        tokio::time::sleep(StdDuration::from_millis(reveal)).await;
                        loop_svc.advance(&mut engine, view.epoch).await?;
                    }
                    QuestionEnd::Quit => {
                        loop_svc.stop(&mut engine).await?;
                        println!("Game saved. Run with --resume to continue.");
                        return Ok(());
                    }
                }
            }
            LoadOutcome::Finished(summary) => {
                let rules = loop_svc.rules();
                println!();
                println!("Congratulations, {player}!");
                println!(
                    "Score: {} ({}%)",
                    summary.score(),
                    summary.percentage(rules)
                );
                println!(
                    "Correct: {}/{}  |  best streak {}  |  time {}",
                    summary.correct_count(),
                    summary.total_questions(),
                    summary.best_streak(),
                    format_clock(i64::try_from(summary.elapsed_seconds()).unwrap_or(i64::MAX)),
                );

                let recorded = results.record_game(&player, &summary).await?;
                if recorded.new_high_score {
                    println!("New high score!");
                } else if let Some(best) = recorded.best {
                    println!("High score: {} by {}", best.score, best.player);
                }
                return Ok(());
            }
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let results = ResultsService::new(Arc::clone(&storage.profiles));

    match cmd {
        Command::Play => {
            let catalog_service = CatalogService::new(args.catalog_url.clone())?;
            eprintln!("Loading songs from {}...", args.catalog_url);
            let catalog = fetch_catalog_with_retry(&catalog_service).await;

            let mut rules = QuizRules::default();
            if let Some(total) = args.questions {
                rules = rules.with_total_questions(total)?;
            }

            let loop_svc = QuizLoopService::new(
                Clock::default_clock(),
                catalog,
                Arc::clone(&storage.saved_games),
                Arc::new(ConsolePlayback),
            )
            .with_rules(rules);

            play(args, &loop_svc, &results).await
        }
        Command::Scores => {
            match results.high_score().await? {
                Some(best) => println!("High score: {} by {}", best.score, best.player),
                None => println!("No games finished yet."),
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
