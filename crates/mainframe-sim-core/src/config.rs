//! Immutable simulation configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Default LPAR list when nothing is configured.
pub const DEFAULT_LPARS: &str = "LPAR1";
pub const DEFAULT_SYSPLEX: &str = "PLEX1";
pub const DEFAULT_INTERVAL_SECS: f64 = 5.0;
pub const DEFAULT_SEED: u64 = 42;

/// Validated configuration. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    lpars: Vec<String>,
    sysplex: String,
    interval: Duration,
    seed: u64,
    max_ticks: Option<u64>,
}

impl SimulationConfig {
    pub fn new(
        lpars: Vec<String>,
        sysplex: impl Into<String>,
        interval_secs: f64,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if lpars.is_empty() {
            return Err(ConfigError::EmptyLparList);
        }
        if let Some(bad) = lpars.iter().find(|l| !is_token(l)) {
            return Err(ConfigError::InvalidLpar(bad.clone()));
        }
        // One state per identifier; duplicates would share a label tuple.
        for (i, id) in lpars.iter().enumerate() {
            if lpars[..i].contains(id) {
                return Err(ConfigError::DuplicateLpar(id.clone()));
            }
        }
        let sysplex = sysplex.into();
        if !is_token(&sysplex) {
            return Err(ConfigError::InvalidSysplex(sysplex));
        }
        // Rejects NaN, negatives, overflow, and values that round down to zero.
        let interval = Duration::try_from_secs_f64(interval_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or(ConfigError::InvalidInterval(interval_secs))?;

        Ok(Self {
            lpars,
            sysplex,
            interval,
            seed,
            max_ticks: None,
        })
    }

    /// Parse a comma-separated LPAR list and validate the rest.
    pub fn from_csv(
        lpars_csv: &str,
        sysplex: impl Into<String>,
        interval_secs: f64,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::new(parse_lpar_list(lpars_csv), sysplex, interval_secs, seed)
    }

    /// Stop the driver after `ticks` ticks instead of running until shutdown.
    pub fn with_max_ticks(mut self, ticks: Option<u64>) -> Self {
        self.max_ticks = ticks;
        self
    }

    pub fn lpars(&self) -> &[String] {
        &self.lpars
    }

    pub fn sysplex(&self) -> &str {
        &self.sysplex
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval.as_secs_f64()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn max_ticks(&self) -> Option<u64> {
        self.max_ticks
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            lpars: vec![DEFAULT_LPARS.to_string()],
            sysplex: DEFAULT_SYSPLEX.to_string(),
            interval: Duration::from_secs_f64(DEFAULT_INTERVAL_SECS),
            seed: DEFAULT_SEED,
            max_ticks: None,
        }
    }
}

/// Split on commas, trim, and drop empty entries.
pub fn parse_lpar_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}
