use std::process;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::watch;

use mainframe_sim_core::Simulation;
use mainframe_sim_server::{ExporterInfo, PrometheusSink, run_server};

use super::SimArgs;

pub fn run(args: &SimArgs, host: &str, port: u16, ticks: Option<u64>) {
    let config = super::build_config(args, ticks);
    let info = ExporterInfo {
        lpars: config.lpars().to_vec(),
        sysplex: config.sysplex().to_string(),
        interval_secs: config.interval_secs(),
    };

    let sink = match PrometheusSink::new() {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            error!("failed to register metrics: {e}");
            process::exit(1);
        }
    };
    let mut sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(e) => {
            error!("failed to initialize simulation: {e}");
            process::exit(1);
        }
    };

    let base = format!("http://{host}:{port}");
    println!("Mainframe Metrics Simulator v{}", mainframe_sim_core::VERSION);
    println!("   {base}");
    println!(
        "   {} LPAR(s) in sysplex {}, updating every {}s",
        info.lpars.len(),
        info.sysplex,
        info.interval_secs
    );
    println!();
    println!("   Endpoints:");
    println!("     GET /          API index");
    println!("     GET /metrics   Prometheus exposition (try: curl {base}/metrics)");
    println!("     GET /health    Health check");
    println!();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("failed to start runtime: {e}");
            process::exit(1);
        }
    };

    let ok = rt.block_on(async move {
        let (stop_tx, stop_rx) = watch::channel(());

        let server_sink = Arc::clone(&sink);
        let host = host.to_string();
        let mut server = tokio::spawn(async move {
            run_server(server_sink, info, &host, port, stopped(stop_rx)).await
        });

        let driver = mainframe_sim_core::run(&mut sim, sink.as_ref(), ctrl_c());
        tokio::pin!(driver);

        tokio::select! {
            outcome = &mut driver => {
                let _ = stop_tx.send(());
                let driver_ok = match outcome {
                    Ok(ticks) => {
                        info!("simulation finished after {ticks} ticks");
                        true
                    }
                    Err(e) => {
                        error!("simulation stopped: {e}");
                        false
                    }
                };
                let server_ok = match server.await {
                    Ok(Ok(())) => true,
                    Ok(Err(e)) => {
                        error!("exporter failed: {e}");
                        false
                    }
                    Err(e) => {
                        error!("exporter task failed: {e}");
                        false
                    }
                };
                driver_ok && server_ok
            }
            joined = &mut server => {
                match joined {
                    Ok(Ok(())) => warn!("exporter stopped before the simulation"),
                    Ok(Err(e)) => error!("exporter failed: {e}"),
                    Err(e) => error!("exporter task failed: {e}"),
                }
                false
            }
        }
    });

    if !ok {
        process::exit(1);
    }
}

/// Resolves on Ctrl+C. If the handler can't be installed, never resolves.
async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(e) => {
            warn!("cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves once the driver signals a stop or drops its sender.
async fn stopped(mut rx: watch::Receiver<()>) {
    let _ = rx.changed().await;
}
