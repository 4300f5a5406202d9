//! CLI for mainframe-sim: synthetic z/OS metrics for dashboards and alert testing.

mod commands;

use clap::{Parser, Subcommand};

use commands::SimArgs;

#[derive(Parser)]
#[command(name = "mainframe-sim")]
#[command(about = "mainframe-sim: synthetic z/OS metrics for dashboards and alert testing")]
#[command(version = mainframe_sim_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulator and serve its metrics over HTTP (Prometheus format)
    Serve {
        #[command(flatten)]
        sim: SimArgs,

        /// Port to listen on
        #[arg(long, env = "EXPORTER_PORT", default_value = "8000")]
        port: u16,

        /// Bind address
        #[arg(long, env = "EXPORTER_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Stop after this many ticks (default: run until Ctrl+C)
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Run a few ticks offline and print the resulting metrics
    Snapshot {
        #[command(flatten)]
        sim: SimArgs,

        /// Number of ticks to simulate
        #[arg(long, default_value = "1")]
        ticks: u64,

        /// Output format: text (Prometheus exposition) or json (every emitted value)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            sim,
            port,
            host,
            ticks,
        } => commands::serve::run(&sim, &host, port, ticks),
        Commands::Snapshot { sim, ticks, format } => commands::snapshot::run(&sim, ticks, &format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_snapshot_flags_parse() {
        let cli = Cli::try_parse_from([
            "mainframe-sim",
            "snapshot",
            "--lpars",
            "SYSA,SYSB",
            "--sysplex",
            "PLEXA",
            "--interval",
            "2.5",
            "--seed",
            "7",
            "--ticks",
            "3",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Snapshot { sim, ticks, format } => {
                assert_eq!(sim.lpars, "SYSA,SYSB");
                assert_eq!(sim.sysplex, "PLEXA");
                assert_eq!(sim.interval, 2.5);
                assert_eq!(sim.seed, 7);
                assert_eq!(ticks, 3);
                assert_eq!(format, "json");
            }
            Commands::Serve { .. } => panic!("expected snapshot"),
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(
            Cli::try_parse_from(["mainframe-sim", "snapshot", "--format", "yaml"]).is_err()
        );
    }
}
