use std::env;
use std::path::PathBuf;

use capital_stack_core::calendar::YearMonth;
use chrono::Local;
use thiserror::Error;

const DEFAULT_STATE_DIR: &str = ".cstack";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Settings read from the environment (and `.env`) at startup.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory holding the saved finder session
    pub state_dir: PathBuf,
    pub log_filter: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CSTACK_STATE_DIR must not be empty")]
    EmptyStateDir,

    #[error("--as-of must be YYYY-MM: {0}")]
    InvalidAsOf(String),
}

impl CliConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let state_dir = match env::var("CSTACK_STATE_DIR") {
            Ok(dir) if dir.trim().is_empty() => return Err(ConfigError::EmptyStateDir),
            Ok(dir) => PathBuf::from(dir),
            Err(_) => PathBuf::from(DEFAULT_STATE_DIR),
        };

        let log_filter = env::var("CSTACK_LOG")
            .or_else(|_| env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            state_dir,
            log_filter,
        })
    }
}

/// Month new layers and empty timelines anchor to: `--as-of` if given, else today.
pub fn reference_month(as_of: Option<&str>) -> Result<YearMonth, ConfigError> {
    match as_of {
        Some(s) => s
            .parse::<YearMonth>()
            .map_err(|e| ConfigError::InvalidAsOf(e.to_string())),
        None => Ok(YearMonth::from_date(Local::now().date_naive())),
    }
}
