mod logging;
mod shell;

use std::fmt;
use std::time::Duration;

use services::{AppServices, Clock, Collaborators};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::logging::{Verbosity, init_logging};
use crate::shell::{Command, Reply, Shell};

const DEFAULT_DB_FILE: &str = "aula.sqlite3";
const DEFAULT_LATENCY_MS: u64 = 300;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLatency { raw: String },
    InvalidDbUrl { raw: String },
    InvalidApiUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLatency { raw } => write!(f, "invalid --latency-ms value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw}"),
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
    eprintln!("  cargo run -p app -- [--db <sqlite_url> | --memory] [--api <base_url>]");
    eprintln!("                      [--latency-ms <n>] [-v|--verbose]... [-q|--quiet]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://<cwd>/{DEFAULT_DB_FILE}");
    eprintln!("  --latency-ms {DEFAULT_LATENCY_MS}");
    eprintln!("  reference data from the built-in catalogue unless --api is given");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  AULA_DB_URL, AULA_API_URL, AULA_LATENCY_MS, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StorageTarget {
    Sqlite(String),
    Memory,
}

#[derive(Debug)]
struct Args {
    storage: StorageTarget,
    api_url: Option<String>,
    latency: Duration,
    verbosity: Verbosity,
}

fn parse_latency(raw: String) -> Result<Duration, ArgsError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ArgsError::InvalidLatency { raw })
}

fn parse_api_url(raw: String) -> Result<String, ArgsError> {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ArgsError::InvalidApiUrl { raw })
    }
}

impl Args {
    /// Environment first, then flags on top.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let mut storage = StorageTarget::Sqlite(env("AULA_DB_URL").map_or_else(
            || normalize_sqlite_url(DEFAULT_DB_FILE.to_string()),
            normalize_sqlite_url,
        ));
        let mut api_url = env("AULA_API_URL")
            .filter(|value| !value.trim().is_empty())
            .map(parse_api_url)
            .transpose()?;
        let mut latency = env("AULA_LATENCY_MS")
            .map(parse_latency)
            .transpose()?
            .unwrap_or(Duration::from_millis(DEFAULT_LATENCY_MS));
        let mut verbosity = Verbosity::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    storage = StorageTarget::Sqlite(normalize_sqlite_url(value));
                }
                "--memory" => storage = StorageTarget::Memory,
                "--api" => api_url = Some(parse_api_url(require_value(args, "--api")?)?),
                "--latency-ms" => latency = parse_latency(require_value(args, "--latency-ms")?)?,
                "-v" | "--verbose" => verbosity = verbosity.louder(),
                "-q" | "--quiet" => verbosity = Verbosity::Quiet,
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(Self {
            storage,
            api_url,
            latency,
            verbosity,
        }))
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

async fn build_services(args: &Args) -> Result<AppServices, Box<dyn std::error::Error>> {
    let clock = Clock::system();
    let mut collaborators = Collaborators::simulated(args.latency, clock);
    if let Some(api_url) = &args.api_url {
        info!(%api_url, "using reference API");
        collaborators = collaborators.with_reference_api(api_url);
    }

    match &args.storage {
        StorageTarget::Memory => Ok(AppServices::in_memory(clock, collaborators)),
        StorageTarget::Sqlite(db_url) => {
            prepare_sqlite_file(db_url)?;
            info!(%db_url, "opening storage");
            Ok(AppServices::new_sqlite(db_url, clock, collaborators).await?)
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let Some(args) = parsed else {
        print_usage();
        return Ok(());
    };

    init_logging(args.verbosity);
    let services = build_services(&args).await?;
    let mut shell = Shell::start(services).await;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout
        .write_all(format!("{}\n\n> ", shell.render().await).as_bytes())
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
            continue;
        }
        let output = match Command::parse(&line) {
            Ok(command) => match shell.execute(command).await {
                Reply::Text(text) => text,
                Reply::Quit => break,
            },
            Err(err) => format!("{err}"),
        };
        stdout.write_all(format!("{output}\n\n> ").as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("shell closed");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // Binary glue: report once and exit.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
