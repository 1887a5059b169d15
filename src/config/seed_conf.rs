use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};

use crate::config::ConfigError;

/// What the bulk seeder does after an insert fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeedFailurePolicy {
    /// Log the failure and keep going until every record was attempted.
    #[default]
    BestEffort,
    /// Stop starting new inserts after the first failure. Inserts already in
    /// flight are allowed to finish.
    FailFast,
}

/// Bulk seeding configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Number of synthetic users to create
    pub count: usize,
    /// Maximum inserts in flight at once
    pub concurrency: usize,
    pub failure_policy: SeedFailurePolicy,
    /// Run a seeding pass in the background when the server starts
    pub on_startup: bool,
}

impl SeedConfig {
    pub const DEFAULT_COUNT: usize = 15_000;
    pub const DEFAULT_CONCURRENCY: usize = 10;

    /// Load seeding configuration from environment variables
    ///
    /// - SEED_COUNT (defaults to 15000)
    /// - SEED_CONCURRENCY (defaults to 10)
    /// - SEED_FAIL_FAST (defaults to false)
    /// - SEED_ON_STARTUP (defaults to false)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading seed configuration from environment variables");

        let count = parse_var("SEED_COUNT", Self::DEFAULT_COUNT)?;
        let concurrency = parse_var("SEED_CONCURRENCY", Self::DEFAULT_CONCURRENCY)?;
        let failure_policy = if parse_flag("SEED_FAIL_FAST")? {
            SeedFailurePolicy::FailFast
        } else {
            SeedFailurePolicy::BestEffort
        };
        let on_startup = parse_flag("SEED_ON_STARTUP")?;

        let config = SeedConfig { count, concurrency, failure_policy, on_startup };
        debug!(?config, "Seed configuration");
        config.validate()?;
        Ok(config)
    }

    /// Small fail-fast run for tests.
    pub fn from_test_env() -> Self {
        SeedConfig {
            count: 20,
            concurrency: 4,
            failure_policy: SeedFailurePolicy::FailFast,
            on_startup: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            error!("Seed concurrency is 0");
            return Err(ConfigError::ValidationError("Seed concurrency must be greater than 0".to_string()));
        }
        Ok(())
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        SeedConfig {
            count: Self::DEFAULT_COUNT,
            concurrency: Self::DEFAULT_CONCURRENCY,
            failure_policy: SeedFailurePolicy::BestEffort,
            on_startup: false,
        }
    }
}

fn parse_var(name: &str, default: usize) -> Result<usize, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<usize>().map_err(|_| {
            error!("Invalid {} value: {}", name, raw);
            ConfigError::InvalidValue(format!("Invalid {} value: {}", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &str) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_bool(&raw).ok_or_else(|| {
            error!("Invalid {} value: {}", name, raw);
            ConfigError::ParseError(format!("{} must be a boolean, got {:?}", name, raw))
        }),
        Err(_) => Ok(false),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
