//! Vortex Simulator
//!
//! Runs one routing policy over a synthetic upstream cluster, tick by tick,
//! and reports the resulting latency and load imbalance.
//!
//! # Example
//!
//! ```bash
//! # Compare policies with the same seed
//! vortex-sim --policy "Round Robin" --ticks 100000 --seed 42
//! vortex-sim --policy "Least Request" --ticks 100000 --seed 42
//!
//! # Run until Ctrl-C
//! vortex-sim --policy "Random Select" -s 30
//! ```

#![deny(missing_docs)]

mod output;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vortex_sim_core::config::{DEFAULT_CONCURRENCY, DEFAULT_SERVICE_TIME};
use vortex_sim_core::{ArrivalPattern, Simulation, SimulationConfig};

use crate::output::ImbalanceLog;

/// Ticks simulated between checks for an interrupt.
const BATCH_TICKS: u64 = 1_000;

/// Vortex load-balancing simulator
///
/// Single-threaded and reproducible when the same seed is used.
#[derive(Parser, Debug)]
#[command(name = "vortex-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of proxy nodes
    #[arg(short = 'p', long, default_value_t = 10)]
    proxies: usize,

    /// Number of upstream servers
    #[arg(short = 's', long, default_value_t = 20)]
    servers: usize,

    /// Routing policy: "Round Robin", "Random Select" or "Least Request"
    #[arg(long, default_value = "Least Request")]
    policy: String,

    /// Requests each upstream server works on at the same time
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Ticks needed to serve one request
    #[arg(long, default_value_t = DEFAULT_SERVICE_TIME)]
    service_time: u32,

    /// Ticks to simulate. When omitted, runs until interrupted.
    #[arg(short = 't', long)]
    ticks: Option<u64>,

    /// Random seed for reproducible results. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Send exactly one request per proxy per tick for this many ticks instead of random arrivals
    #[arg(long)]
    fixed_arrivals: Option<u64>,

    /// Directory receiving the per-tick imbalance file
    #[arg(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,
}

/// Entrypoint for the simulator.
///
/// The runtime is current-thread only: the simulation itself is synchronous
/// and the runtime exists to notice Ctrl-C between batches of ticks.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,vortex_sim=info,vortex_sim_core=info")),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let arrivals = match args.fixed_arrivals {
        Some(ticks) => ArrivalPattern::Fixed { per_proxy: 1, ticks },
        None => ArrivalPattern::Bernoulli,
    };

    let config = SimulationConfig::new(args.proxies, args.servers, args.policy)
        .with_concurrency(args.concurrency)
        .with_service_time(args.service_time)
        .with_seed(seed)
        .with_arrivals(arrivals);

    let mut simulation = Simulation::new(config)?;

    let (mut log, path) = ImbalanceLog::create(&args.output_dir, simulation.policy())?;
    info!(path = %path.display(), "Writing per-tick imbalance");

    let interrupted = run(&mut simulation, &mut log, args.ticks).await?;
    let lines = log.lines();
    log.finish()?;

    if interrupted {
        warn!(ticks = simulation.ticks_elapsed(), "Interrupted, reporting partial run");
    }

    let report = simulation.report();
    info!(
        policy = %report.policy,
        ticks = report.ticks,
        requests = report.requests,
        mean_latency = ?report.mean_latency,
        tail_latency = ?report.tail_latency,
        peak_imbalance = report.peak_imbalance,
        mean_imbalance = ?report.mean_imbalance,
        imbalance_lines = lines,
        seed,
        "Simulation finished"
    );

    println!("Policy: {}", report.policy);
    println!("Mean latency: {}", format_latency(report.mean_latency));
    println!("Tail latency: {}", format_latency(report.tail_latency));

    Ok(())
}

/// Tick until `limit` is reached or Ctrl-C arrives. Returns whether it was interrupted.
async fn run<W: Write>(
    simulation: &mut Simulation,
    log: &mut ImbalanceLog<W>,
    limit: Option<u64>,
) -> io::Result<bool> {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let remaining = limit.map(|limit| limit.saturating_sub(simulation.ticks_elapsed()));
        if remaining == Some(0) {
            return Ok(false);
        }

        tokio::select! {
            biased;
            result = &mut shutdown => {
                result?;
                return Ok(true);
            }
            _ = tokio::task::yield_now() => {}
        }

        let batch = remaining.map_or(BATCH_TICKS, |r| r.min(BATCH_TICKS));
        for _ in 0..batch {
            let report = simulation.tick();
            log.record(report.imbalance)?;
        }
    }
}

fn format_latency(latency: Option<u64>) -> String {
    match latency {
        Some(ticks) => format!("{ticks} ticks"),
        None => "no data".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["vortex-sim"]);
        assert_eq!(args.policy, "Least Request");
        assert_eq!(args.concurrency, 6);
        assert_eq!(args.service_time, 100);
        assert_eq!(args.ticks, None);
    }

    #[test]
    fn test_cli_accepts_policy_names_with_spaces() {
        let args = Args::parse_from(["vortex-sim", "--policy", "Round Robin", "-t", "50"]);
        assert_eq!(args.policy, "Round Robin");
        assert_eq!(args.ticks, Some(50));
    }

    #[test]
    fn test_no_data_is_reported() {
        assert_eq!(format_latency(None), "no data");
        assert_eq!(format_latency(Some(137)), "137 ticks");
    }

    #[tokio::test]
    async fn test_run_stops_at_tick_limit() {
        let config = SimulationConfig::new(2, 3, "Random Select").with_seed(1);
        let mut simulation = Simulation::new(config).unwrap();
        let mut log = ImbalanceLog::new(Vec::new());

        let interrupted = run(&mut simulation, &mut log, Some(2_500)).await.unwrap();
        assert!(!interrupted);
        assert_eq!(simulation.ticks_elapsed(), 2_500);
        assert_eq!(log.lines(), 2_500);
    }
}
