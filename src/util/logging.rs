//! Logging setup shared by the CLI and library callers
//!
//! Events go to stderr so stdout stays reserved for the JSON report. The
//! `ideacheck` target follows the configured level; `RUST_LOG` directives are
//! layered on top, and the HTTP stack is held at `warn` unless `RUST_LOG`
//! says otherwise.
//!
//! ```no_run
//! use ideacheck::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!("Application started");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_LEVEL_VAR: &str = "IDEACHECK_LOG_LEVEL";
pub const LOG_JSON_VAR: &str = "IDEACHECK_LOG_JSON";

static INIT: Once = Once::new();

const QUIET_DEPENDENCIES: [&str; 3] = ["h2=warn", "hyper=warn", "reqwest=warn"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    /// One JSON object per event instead of human-readable lines
    pub use_json: bool,
    pub include_target: bool,
    /// File and line of the call site
    pub include_location: bool,
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON with call sites and thread ids, for log shippers
    pub fn production() -> Self {
        Self {
            use_json: true,
            include_location: true,
            include_thread_ids: true,
            ..Default::default()
        }
    }

    pub fn json(mut self, use_json: bool) -> Self {
        self.use_json = use_json;
        self
    }
}

/// Parses a log level, falling back to INFO
///
/// ```
/// use ideacheck::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().parse::<Level>() {
        Ok(level) => level,
        Err(_) => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Level chosen from the command line, most specific first: an explicit
/// `--log-level`, then `-v`, then `-q`, then the environment value
pub fn resolve_level(
    explicit: Option<&str>,
    verbose: bool,
    quiet: bool,
    from_env: Option<&str>,
) -> Level {
    match (explicit, verbose, quiet) {
        (Some(level), _, _) => parse_level(level),
        (None, true, _) => Level::DEBUG,
        (None, false, true) => Level::ERROR,
        (None, false, false) => from_env.map(parse_level).unwrap_or(Level::INFO),
    }
}

/// `true`/`1`/`yes`, case-insensitive
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// Whether `IDEACHECK_LOG_JSON` asks for JSON output
pub fn json_from_env() -> bool {
    env::var(LOG_JSON_VAR).map(|v| parse_flag(&v)).unwrap_or(false)
}

fn build_filter(level: Level, rust_log_set: bool) -> EnvFilter {
    let mut directives = vec![format!("ideacheck={}", level)];
    if !rust_log_set {
        directives.extend(QUIET_DEPENDENCIES.iter().map(|d| d.to_string()));
    }

    directives
        .iter()
        .filter_map(|d| d.parse().ok())
        .fold(EnvFilter::from_default_env(), EnvFilter::add_directive)
}

/// Installs the global subscriber. Later calls, or a subscriber installed by
/// someone else, leave the existing one in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level, env::var("RUST_LOG").is_ok());

        let base = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread_ids)
            .with_thread_names(config.include_thread_ids);
        let output = if config.use_json {
            base.json().boxed()
        } else {
            base.boxed()
        };

        if let Err(e) = tracing_subscriber::registry()
            .with(filter)
            .with(output)
            .try_init()
        {
            eprintln!("Logging already initialised: {}", e);
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Reads `IDEACHECK_LOG_LEVEL` and `IDEACHECK_LOG_JSON`
pub fn init_from_env() {
    let level = env::var(LOG_LEVEL_VAR)
        .map(|v| parse_level(&v))
        .unwrap_or(Level::INFO);
    init_logging(LoggingConfig::with_level(level).json(json_from_env()));
}
