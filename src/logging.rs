//! Logging setup for the checklist generator.
//!
//! The library itself only emits `tracing` events. Applications that don't
//! install their own subscriber can call one of the helpers below.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that overrides the level passed to [`init_logging`].
pub const LOG_ENV_VAR: &str = "CHECKLIST_LOG";

/// Log levels, mapped onto the tracing hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors; includes checklist parse failures
    Warn,
    /// Normal operational messages
    Info,
    /// Includes the raw accumulated model response
    Debug,
    /// Includes every streamed chunk
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }

    /// The `EnvFilter` directive that enables this level for the crate.
    pub fn directive(self) -> String {
        format!(
            "appointment_checklist={}",
            self.to_tracing_level().to_string().to_lowercase()
        )
    }
}

/// Initialize logging with a specific level.
///
/// Call once at application start. `CHECKLIST_LOG`, when set, takes precedence:
///
/// ```bash
/// CHECKLIST_LOG=appointment_checklist=debug cargo run --example checklist
/// ```
///
/// # Examples
///
/// ```no_run
/// use appointment_checklist::logging::{LogLevel, init_logging};
///
/// init_logging(LogLevel::Info);
/// tracing::info!("Application starting");
/// ```
pub fn init_logging(level: LogLevel) {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .init();

    tracing::info!("Checklist logging initialized at level: {:?}", level);
}

/// Initialize logging with a custom filter string.
///
/// ```no_run
/// use appointment_checklist::logging::init_logging_with_filter;
///
/// init_logging_with_filter("appointment_checklist=debug,appointment_checklist::backend=trace");
/// ```
pub fn init_logging_with_filter(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| {
        tracing::warn!("Invalid filter string: {}, using default (info)", filter);
        EnvFilter::new(LogLevel::Info.directive())
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .init();

    tracing::info!("Checklist logging initialized with custom filter: {}", filter);
}
