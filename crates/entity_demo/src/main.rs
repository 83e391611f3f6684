//! # entity_demo
//!
//! Builds a registry over the demo component set, runs a short showcase job,
//! then lets a pool of threads spawn walkers and pass the world clock around
//! through the execution gate. Prints the final status snapshot.

mod jobs;

use std::thread;

use anyhow::{Context, Result, anyhow, ensure};
use clap::Parser;
use components::{Position, WorldClock};
use entity_component::Component;
use entity_registry::{ExecutionGate, RegistryConfig, Status};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jobs::{AdvanceClock, Showcase, SpawnWalker};

const DEFAULT_FILTER: &str = "entity_demo=info,entity_registry=info";

#[derive(Parser)]
#[command(name = "entity_demo", about = "Concurrent entity registry demo")]
struct Args {
    /// Number of worker threads
    #[arg(short, long, default_value_t = 8)]
    threads: usize,

    /// Spawn jobs submitted by each worker
    #[arg(short, long, default_value_t = 1)]
    jobs_per_thread: usize,

    /// Print the status snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let args = Args::parse();
    ensure!(args.threads > 0, "--threads must be at least 1");

    let gate = RegistryConfig::new()
        .with_provider(&components::provider())
        .build()
        .context("failed to build the registry")?;

    gate.execute(&mut Showcase)?;
    let baseline = gate.registry().status();

    info!(
        threads = args.threads,
        jobs_per_thread = args.jobs_per_thread,
        "starting workers"
    );
    run_workers(&gate, args.threads, args.jobs_per_thread)?;

    let spawned = args.threads * args.jobs_per_thread;
    let registry = gate.registry();
    let status = registry.status();

    ensure!(
        status.entity_count() == baseline.entity_count() + spawned,
        "expected {} entities, found {}",
        baseline.entity_count() + spawned,
        status.entity_count()
    );
    let positions = |s: &Status| s.component_count(Position::type_name()).unwrap_or(0);
    ensure!(positions(&status) == positions(&baseline) + spawned);

    if spawned > 0 {
        let clock = registry
            .find_singleton_component::<WorldClock>()?
            .context("world clock went missing")?;
        ensure!(
            clock.tick == spawned as u64,
            "clock advanced {} times, expected {spawned}",
            clock.tick
        );
        let owner = registry.find_entity_with_singleton::<WorldClock>()?;
        info!(tick = clock.tick, owner = ?owner, "world clock settled");
    }

    info!(jobs = gate.jobs_executed(), "all jobs finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{status}");
    }
    Ok(())
}

fn run_workers(gate: &ExecutionGate, threads: usize, jobs_per_thread: usize) -> Result<()> {
    thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|worker| {
                scope.spawn(move || -> Result<()> {
                    let mut spawn = SpawnWalker::new(worker);
                    for _ in 0..jobs_per_thread {
                        gate.execute(&mut spawn)?;
                        let walker = spawn.last().context("spawn job produced no entity")?;
                        gate.execute_with(&mut AdvanceClock, walker)?;
                    }
                    Ok(())
                })
            })
            .collect();

        handles.into_iter().try_for_each(|handle| {
            handle
                .join()
                .map_err(|_| anyhow!("worker thread panicked"))?
        })
    })
}
