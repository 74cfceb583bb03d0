//! Logging setup for binaries and tests embedding the forwarding core
//!
//! The forwarding crates get their own verbosity, independent of whatever
//! else the host process links in. `RUST_LOG`, when set, replaces the
//! computed directives entirely.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{self, TestWriter};
use tracing_subscriber::EnvFilter;

use crate::errors::{ForwardError, ForwardResult};

/// Targets whose level follows [`LoggingConfig::proxy_level`]
pub const PROXY_TARGETS: &[&str] = &["sipfwd_forward_core", "sipfwd_sip_core"];

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Where formatted events go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Stdout,
    /// libtest's captured output, shown only for failing tests
    Test,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for the forwarding crates
    pub proxy_level: Level,
    /// Level for every other target
    pub other_level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Emit an event when a request span closes, with its timing
    pub request_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            proxy_level: Level::INFO,
            other_level: Level::WARN,
            format: LogFormat::Text,
            output: LogOutput::Stdout,
            request_spans: false,
        }
    }
}

impl LoggingConfig {
    pub fn new(proxy_level: Level) -> Self {
        LoggingConfig {
            proxy_level,
            ..Default::default()
        }
    }

    /// Verbose setup for test binaries, written through the test harness
    pub fn for_tests() -> Self {
        LoggingConfig {
            proxy_level: Level::DEBUG,
            output: LogOutput::Test,
            ..Default::default()
        }
    }

    pub fn with_other_level(mut self, level: Level) -> Self {
        self.other_level = level;
        self
    }

    pub fn with_json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    pub fn with_request_spans(mut self) -> Self {
        self.request_spans = true;
        self
    }

    /// Filter directives, e.g. `warn,sipfwd_forward_core=debug,sipfwd_sip_core=debug`
    pub fn directives(&self) -> String {
        let mut directives = level_name(self.other_level).to_string();
        for target in PROXY_TARGETS {
            directives.push_str(&format!(",{}={}", target, level_name(self.proxy_level)));
        }
        directives
    }

    fn filter(&self) -> ForwardResult<EnvFilter> {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return EnvFilter::try_from_default_env()
                .map_err(|e| ForwardError::Config(format!("Invalid {}: {}", EnvFilter::DEFAULT_ENV, e)));
        }
        EnvFilter::try_new(self.directives())
            .map_err(|e| ForwardError::Config(format!("Invalid log directives: {}", e)))
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Install the global `tracing` subscriber.
///
/// Returns [`ForwardError::Config`] when `RUST_LOG` cannot be parsed or a
/// global subscriber is already in place.
pub fn setup_logging(config: &LoggingConfig) -> ForwardResult<()> {
    let writer = match config.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Test => BoxMakeWriter::new(TestWriter::new()),
    };
    let span_events = if config.request_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(config.filter()?)
        .with_span_events(span_events)
        .with_writer(writer);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| ForwardError::Config(format!("Cannot install logger: {}", e)))?;

    tracing::info!(
        "sipfwd forwarding core v{} logging at {}",
        env!("CARGO_PKG_VERSION"),
        config.proxy_level
    );
    Ok(())
}

/// Parse a level name as found in configuration files
pub fn parse_log_level(level: &str) -> ForwardResult<Level> {
    Level::from_str(level).map_err(|_| ForwardError::Config(format!("Invalid log level: {}", level)))
}
