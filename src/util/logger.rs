use std::path::Path;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_CONSOLE_FILTER: &str = "info,roster_backend=debug";

/// Keeps the non-blocking file writers alive. Drop it only at shutdown,
/// otherwise buffered log lines are lost.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    /// Installs console and rolling-file logging with the given file prefix
    /// (e.g. `roster-backend`, `seed-users`).
    pub fn new(file_prefix: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let guards = Self::setup_logging(file_prefix)?;
        Ok(Logger { guards })
    }

    /// Console-only logging, used when the log directory is not writable.
    pub fn console_only() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(console_filter())
            .with_target(true)
            .with_thread_ids(true)
            .try_init();
    }

    pub fn setup_logging(file_prefix: &str) -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
        let log_dir = Path::new(&log_dir);
        std::fs::create_dir_all(log_dir.join("error").join("json"))?;
        std::fs::create_dir_all(log_dir.join("json"))?;

        let file_log_level = std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let error_file_log_level = std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        // File appenders
        let general_file = rolling::daily(log_dir, format!("{file_prefix}.log"));
        let (non_blocking_general, general_guard) = non_blocking(general_file);

        let error_file = rolling::daily(log_dir.join("error"), format!("{file_prefix}-error.log"));
        let (non_blocking_error, error_guard) = non_blocking(error_file);

        let general_json_file = rolling::daily(log_dir.join("json"), format!("{file_prefix}.json"));
        let (non_blocking_json, json_guard) = non_blocking(general_json_file);

        let error_json_file = rolling::daily(log_dir.join("error").join("json"), format!("{file_prefix}-error.json"));
        let (non_blocking_error_json, error_json_guard) = non_blocking(error_json_file);

        tracing_subscriber::registry()
            .with(
                // Console output - pretty format for development
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_ansi(true)
                    .with_filter(console_filter()),
            )
            .with(
                fmt::layer()
                    .with_writer(non_blocking_general)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&file_log_level)),
            )
            .with(
                fmt::layer()
                    .with_writer(non_blocking_error)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&error_file_log_level)),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(non_blocking_json)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&file_log_level)),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(non_blocking_error_json)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&error_file_log_level)),
            )
            .try_init()?;

        Ok(vec![general_guard, error_guard, json_guard, error_json_guard])
    }
}

fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER))
}
