pub mod serve;
pub mod snapshot;

use clap::Args;
use log::error;

use mainframe_sim_core::SimulationConfig;
use mainframe_sim_core::config::{
    DEFAULT_INTERVAL_SECS, DEFAULT_LPARS, DEFAULT_SEED, DEFAULT_SYSPLEX,
};

/// Simulation settings shared by every command. Each flag falls back to the
/// environment variable the exporter has always read.
#[derive(Args, Debug, Clone)]
pub struct SimArgs {
    /// Comma-separated LPAR identifiers
    #[arg(long, env = "MAINFRAME_LPARS", default_value = DEFAULT_LPARS)]
    pub lpars: String,

    /// Sysplex label applied to every series
    #[arg(long, env = "SYSPLX", default_value = DEFAULT_SYSPLEX)]
    pub sysplex: String,

    /// Seconds between ticks
    #[arg(long, env = "UPDATE_INTERVAL_SECONDS", default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: f64,

    /// RNG seed; the same seed and settings reproduce the same values
    #[arg(long, env = "RANDOM_SEED", default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

impl SimArgs {
    pub fn to_config(
        &self,
        max_ticks: Option<u64>,
    ) -> Result<SimulationConfig, mainframe_sim_core::ConfigError> {
        SimulationConfig::from_csv(&self.lpars, self.sysplex.as_str(), self.interval, self.seed)
            .map(|c| c.with_max_ticks(max_ticks))
    }
}

/// Build a validated config or exit: an invalid configuration never reaches
/// the running state.
pub fn build_config(args: &SimArgs, max_ticks: Option<u64>) -> SimulationConfig {
    match args.to_config(max_ticks) {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    }
}
