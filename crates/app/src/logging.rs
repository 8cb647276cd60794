//! Tracing subscriber setup for the shell binary.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// How much the binary logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings and above; the shell's stdout stays readable.
    #[default]
    Normal,
    Verbose,
    Trace,
}

impl Verbosity {
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// One step louder, saturating at `Trace`.
    #[must_use]
    pub fn louder(self) -> Self {
        match self {
            Self::Quiet => Self::Normal,
            Self::Normal => Self::Verbose,
            Self::Verbose | Self::Trace => Self::Trace,
        }
    }

    fn default_directives(self) -> String {
        let level = self.level();
        format!("app={level},services={level},storage={level},aula_core={level}")
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` replaces the verbosity-derived filter when set.
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directives()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(false)
            .with_line_number(false),
    );

    // A second call keeps the first subscriber.
    let _ = subscriber.try_init();
}
