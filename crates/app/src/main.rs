use std::fmt;

use services::{AppServices, Clock, PoolConfig, SessionLimits};
use storage::repository::CardStore as _;
use tokio::net::TcpListener;
use vocab_core::model::Track;
use web::{AppState, build_router};

const DEFAULT_DB_URL: &str = "sqlite://vocab.sqlite3";
const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidBind { raw: String },
    InvalidNumber { var: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidBind { raw } => write!(f, "invalid --bind value: {raw}"),
            ArgsError::InvalidNumber { var, raw } => write!(f, "invalid {var} value: {raw}"),
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
    eprintln!("  vocab serve [--db <sqlite_url>] [--bind <addr>]");
    eprintln!("  vocab seed  [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --bind {DEFAULT_BIND}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VOCAB_DB_URL, VOCAB_BIND, VOCAB_POOL_BATCH, VOCAB_POOL_TTL_SECS,");
    eprintln!("  VOCAB_SESSION_IDLE_SECS, VOCAB_SESSION_CAPACITY, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "serve" => Some(Self::Serve),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    bind: String,
    pool: PoolConfig,
    sessions: SessionLimits,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("VOCAB_DB_URL")
            .ok()
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut bind = std::env::var("VOCAB_BIND").unwrap_or_else(|_| DEFAULT_BIND.into());
        let pool = pool_config_from_env()?;
        let sessions = session_limits_from_env()?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--bind" => {
                    let value = require_value(args, "--bind")?;
                    if value.parse::<std::net::SocketAddr>().is_err() {
                        return Err(ArgsError::InvalidBind { raw: value });
                    }
                    bind = value;
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
            bind,
            pool,
            sessions,
        })
    }
}

fn pool_config_from_env() -> Result<PoolConfig, ArgsError> {
    let mut config = PoolConfig::default();
    if let Some(batch) = env_number("VOCAB_POOL_BATCH")? {
        config = config.with_batch_size(u32::try_from(batch).unwrap_or(u32::MAX));
    }
    if let Some(ttl) = env_seconds("VOCAB_POOL_TTL_SECS")? {
        config = config.with_ttl(ttl);
    }
    Ok(config)
}

fn session_limits_from_env() -> Result<SessionLimits, ArgsError> {
    let mut limits = SessionLimits::default();
    if let Some(idle) = env_seconds("VOCAB_SESSION_IDLE_SECS")? {
        limits = limits.with_idle_ttl(idle);
    }
    if let Some(capacity) = env_number("VOCAB_SESSION_CAPACITY")? {
        limits = limits.with_capacity(usize::try_from(capacity).unwrap_or(usize::MAX));
    }
    Ok(limits)
}

fn env_seconds(var: &'static str) -> Result<Option<chrono::Duration>, ArgsError> {
    let Some(secs) = env_number(var)? else {
        return Ok(None);
    };
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .map(Some)
        .ok_or(ArgsError::InvalidNumber {
            var,
            raw: secs.to_string(),
        })
}

fn env_number(var: &'static str) -> Result<Option<u64>, ArgsError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ArgsError::InvalidNumber { var, raw }),
        Err(_) => Ok(None),
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
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

async fn serve(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let services = AppServices::new_sqlite(&args.db_url, Clock::system(), args.pool)
        .await?
        .with_session_limits(args.sessions);
    let router = build_router(AppState::from_services(&services));

    let listener = TcpListener::bind(&args.bind).await?;
    log::info!("serving vocabulary trainer on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("shutting down");
            }
        })
        .await?;
    Ok(())
}

async fn seed(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // `new_sqlite` already seeds empty tracks; report what ended up in the store.
    let services = AppServices::new_sqlite(&args.db_url, Clock::system(), args.pool).await?;
    for track in Track::ALL {
        let total = services.cards().count(track).await?;
        println!("{track}: {total} cards");
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Serve,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Serve,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if argv.first().is_some_and(|first| !first.starts_with("--")) {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    log::debug!("using database {}", parsed.db_url);

    match cmd {
        Command::Serve => serve(parsed).await,
        Command::Seed => seed(parsed).await,
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("{err}");
        std::process::exit(2);
    }
}
