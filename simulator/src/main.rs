use anyhow::Context;
use bridge::http::{default_bind_address, HttpBridge};
use clap::Parser;
use log::{info, warn};
use sensorcore::{BatchWorker, WorkerConfig};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod bridge;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Driver for the sensorcore telemetry pipeline")]
struct Args {
    /// Run one generated workload through the worker and emit a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 1000)]
    messages: usize,
    #[arg(long, default_value_t = 100)]
    batch_size: usize,
    #[arg(long, default_value_t = 500)]
    max_points: usize,
    /// Append the offline summary to this file
    #[arg(long, default_value = "tools/data/offline_summary.log")]
    report: PathBuf,
    /// Serve the task boundary over HTTP until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = default_bind_address())]
    bind: SocketAddr,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.messages, args.batch_size, args.max_points)
    };

    let worker = Arc::new(
        BatchWorker::spawn(&WorkerConfig::default()).context("starting batch worker")?,
    );

    if args.offline {
        let result = Runner::new(workflow_config)
            .execute(&worker)
            .context("running offline workflow")?;
        let metrics = worker.metrics();

        println!(
            "Offline run -> batches {}, messages {}, imu0 {}, imu1 {}, gnss {}, rejected {}",
            result.batches,
            result.messages,
            result.imu0_samples,
            result.imu1_samples,
            result.gnss_fixes,
            metrics.rejected
        );

        let report = format!(
            "batches={} messages={} imu0={} imu1={} gnss={} latest_points={} smoothed_points={}\n",
            result.batches,
            result.messages,
            result.imu0_samples,
            result.imu1_samples,
            result.gnss_fixes,
            result.latest.imu0.len(),
            result.smoothed_imu0_angular_velocity.len()
        );
        if let Some(parent) = args.report.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&args.report)
            .with_context(|| format!("opening report {}", args.report.display()))?;
        file.write_all(report.as_bytes())?;
    }

    if args.serve {
        let bridge = HttpBridge::new(worker.clone());
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the HTTP bridge")?;
        runtime.block_on(bridge.serve(args.bind, async {
            if let Err(err) = signal::ctrl_c().await {
                warn!("failed to listen for Ctrl+C: {}", err);
            }
        }))?;
    }

    if !args.offline && !args.serve {
        info!("nothing to do; pass --offline or --serve");
    }

    if let Ok(worker) = Arc::try_unwrap(worker) {
        worker.shutdown()?;
    }

    Ok(())
}
