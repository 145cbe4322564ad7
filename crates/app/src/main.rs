use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{GuessOutcome, QuizSettings, QuizSettingsDraft, RoundConfig, RoundSummary};
use services::{
    Advance, QuizLoopError, QuizLoopService, QuizSession, RoundHandle, SessionError,
    SettingsService,
};
use storage::catalog::{AssetCatalog, CatalogProvider, StaticCatalog};
use storage::repository::Storage;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_DELAY_MS: u64 = 2000;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
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

fn parse_number<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let value = require_value(args, flag)?;
    value
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw: value })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play     [--db <sqlite_url>] [--assets <dir>] [--round-size <n>]");
    eprintln!("                               [--delay-ms <ms>] [--seed <n>] [-v]");
    eprintln!("  cargo run -p app -- settings [--db <sqlite_url>] [--choices <2|4|6|8>]");
    eprintln!("                               [--regions <Region,Region,...>] [-v]");
    eprintln!();
    eprintln!("Defaults for play:");
    eprintln!("  --db sqlite:flagquiz.sqlite3");
    eprintln!("  --round-size 10, --delay-ms 2000, built-in flag list when --assets is absent");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FLAGQUIZ_DB_URL, FLAGQUIZ_ASSETS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Settings,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "settings" => Some(Self::Settings),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    assets: Option<PathBuf>,
    round_size: usize,
    delay: Duration,
    seed: Option<u64>,
    choices: Option<u32>,
    regions: Option<Vec<String>>,
    verbose: bool,
}

impl Args {
    fn from_env() -> Self {
        Self {
            db_url: normalize_sqlite_url(
                std::env::var("FLAGQUIZ_DB_URL").unwrap_or_else(|_| "sqlite:flagquiz.sqlite3".into()),
            ),
            assets: std::env::var_os("FLAGQUIZ_ASSETS").map(PathBuf::from),
            round_size: RoundConfig::DEFAULT_ROUND_SIZE,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            seed: None,
            choices: None,
            regions: None,
            verbose: false,
        }
    }

    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::from_env();

        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                (_, "--verbose" | "-v") => parsed.verbose = true,
                (_, "--help" | "-h") => {
                    print_usage();
                    std::process::exit(0);
                }
                (Command::Play, "--assets") => {
                    parsed.assets = Some(PathBuf::from(require_value(args, "--assets")?));
                }
                (Command::Play, "--round-size") => {
                    parsed.round_size = parse_number(args, "--round-size")?;
                }
                (Command::Play, "--delay-ms") => {
                    parsed.delay = Duration::from_millis(parse_number(args, "--delay-ms")?);
                }
                (Command::Play, "--seed") => parsed.seed = Some(parse_number(args, "--seed")?),
                (Command::Settings, "--choices") => {
                    parsed.choices = Some(parse_number(args, "--choices")?);
                }
                (Command::Settings, "--regions") => {
                    let value = require_value(args, "--regions")?;
                    parsed.regions = Some(
                        value
                            .split(',')
                            .map(|r| r.trim().to_string())
                            .filter(|r| !r.is_empty())
                            .collect(),
                    );
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

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

//
// ─── TERMINAL ──────────────────────────────────────────────────────────────────
//

/// Read one trimmed line; `None` on end of input.
fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn show_question(handle: &RoundHandle, assets: Option<&AssetCatalog>) {
    println!();
    println!("Question {} of {}", handle.question, handle.round_size);
    match assets {
        Some(assets) => println!("Flag: {}", assets.flag_path(&handle.item).display()),
        None => println!("Flag: [{}]", handle.item.region()),
    }
    for (i, name) in handle.choices.iter().enumerate() {
        println!("  {}) {}", i + 1, quiz_core::model::display_name(name));
    }
}

fn show_results(summary: &RoundSummary) {
    println!();
    println!(
        "{} guesses, {:.2}% correct",
        summary.total_guesses(),
        summary.average()
    );
}

fn show_settings(settings: &QuizSettings) {
    let regions: Vec<String> = settings.regions().iter().map(ToString::to_string).collect();
    println!("choices: {}", settings.choices());
    println!("regions: {}", regions.join(", "));
}

/// Message for a round that cannot start with the current region selection.
fn region_hint(err: &QuizLoopError) -> Option<String> {
    match err {
        QuizLoopError::Session(SessionError::InsufficientItems {
            available,
            required,
        }) => Some(format!(
            "Only {available} flags available for the selected regions, {required} needed. \
             Choose more regions with `settings --regions <Region,...>`."
        )),
        _ => None,
    }
}

/// Plays rounds until the user declines a reset or input ends.
async fn play(
    quiz: &QuizLoopService,
    session: &mut QuizSession,
    assets: Option<&AssetCatalog>,
    delay: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let mut handle = match quiz.start_round(session).await {
            Ok(handle) => handle,
            Err(err) => match region_hint(&err) {
                Some(hint) => {
                    println!("{hint}");
                    return Ok(());
                }
                None => return Err(err.into()),
            },
        };
        let summary = loop {
            show_question(&handle, assets);
            let mut disabled = vec![false; handle.choices.len()];
            loop {
                let Some(input) = prompt("> ")? else {
                    return Ok(());
                };
                if input.eq_ignore_ascii_case("q") {
                    return Ok(());
                }
                let Some(index) = input
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .filter(|i| *i < handle.choices.len())
                else {
                    println!("Pick 1-{}", handle.choices.len());
                    continue;
                };
                if disabled[index] {
                    println!("Already tried that one");
                    continue;
                }
                let Some(name) = handle.choices.get(index) else {
                    continue;
                };
                match session.submit_guess(name)? {
                    GuessOutcome::Correct => {
                        println!("{}!", handle.item.display_name());
                        break;
                    }
                    GuessOutcome::Incorrect => {
                        println!("Incorrect!");
                        disabled[index] = true;
                    }
                }
            }

            if handle.question < handle.round_size {
                tokio::time::sleep(delay).await;
            }
            match session.advance()? {
                Advance::Next(next) => handle = next,
                Advance::Complete(summary) => break summary,
            }
        };

        show_results(&summary);
        match prompt("Reset quiz? [Y/n] ")? {
            Some(answer) if answer.is_empty() || answer.eq_ignore_ascii_case("y") => {
                debug!("restarting quiz");
            }
            _ => return Ok(()),
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
        Some(first) if first.starts_with('-') => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with('-') {
        argv.remove(0);
    }

    let parsed = Args::parse(cmd, &mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    init_tracing(parsed.verbose);

    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    let settings = SettingsService::new(Arc::clone(&storage.settings));

    match cmd {
        Command::Settings => {
            if parsed.choices.is_some() || parsed.regions.is_some() {
                let current = settings.load().await?;
                let mut draft: QuizSettingsDraft = current.to_draft();
                if let Some(choices) = parsed.choices {
                    draft.choices = choices;
                }
                if let Some(regions) = parsed.regions {
                    draft.regions = regions;
                }
                let saved = settings.save(draft).await?;
                if saved.defaulted_region {
                    println!("No region selected; using the default region.");
                }
                info!("settings saved");
            }
            show_settings(&settings.load().await?);
            Ok(())
        }
        Command::Play => {
            let assets = parsed.assets.map(AssetCatalog::new);
            let provider: Arc<dyn CatalogProvider> = match &assets {
                Some(assets) => Arc::new(assets.clone()),
                None => Arc::new(StaticCatalog::builtin()),
            };
            let quiz = QuizLoopService::new(settings, provider).with_round_size(parsed.round_size);
            let mut session = parsed.seed.map_or_else(QuizSession::new, QuizSession::seeded);
            play(&quiz, &mut session, assets.as_ref(), parsed.delay).await
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> std::vec::IntoIter<String> {
        list.iter()
            .map(|s| (*s).to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_play_flags() {
        let parsed = Args::parse(
            Command::Play,
            &mut args(&[
                "--round-size",
                "5",
                "--delay-ms",
                "0",
                "--seed",
                "7",
                "--db",
                "sqlite::memory:",
            ]),
        )
        .unwrap();
        assert_eq!(parsed.round_size, 5);
        assert_eq!(parsed.delay, Duration::ZERO);
        assert_eq!(parsed.seed, Some(7));
        assert_eq!(parsed.db_url, "sqlite::memory:");
    }

    #[test]
    fn parses_settings_regions_list() {
        let parsed = Args::parse(
            Command::Settings,
            &mut args(&["--choices", "6", "--regions", "Europe, Asia,,"]),
        )
        .unwrap();
        assert_eq!(parsed.choices, Some(6));
        assert_eq!(
            parsed.regions,
            Some(vec!["Europe".to_string(), "Asia".to_string()])
        );
    }

    #[test]
    fn rejects_flags_of_the_other_command() {
        let err = Args::parse(Command::Settings, &mut args(&["--seed", "1"])).unwrap_err();
        assert!(matches!(err, ArgsError::UnknownArg(_)));
        let err = Args::parse(Command::Play, &mut args(&["--round-size", "ten"])).unwrap_err();
        assert!(matches!(err, ArgsError::InvalidNumber { flag: "--round-size", .. }));
    }

    #[test]
    fn too_few_flags_points_at_region_settings() {
        let err = QuizLoopError::Session(SessionError::InsufficientItems {
            available: 3,
            required: 10,
        });
        let hint = region_hint(&err).unwrap();
        assert!(hint.contains("Only 3 flags"));
        assert!(hint.contains("settings --regions"));

        let err = QuizLoopError::Session(SessionError::NoActiveRound);
        assert!(region_hint(&err).is_none());
    }

    #[test]
    fn sqlite_urls_become_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        let url = normalize_sqlite_url("sqlite:quiz.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("quiz.db"));
    }
}
