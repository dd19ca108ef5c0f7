use std::path::PathBuf;

use clap::Parser;
use common::config::SweepConfig;
use eyre::{Context, Result, bail};
use fio::FioProcess;
use tokio::fs::read_to_string;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod sweep;

/// Sweep fio across I/O queue depths and chart mean latency per depth.
#[derive(Parser)]
struct Cli {
    /// Job name passed to fio
    name: String,
    /// Target file or block device
    target: PathBuf,
    /// Output chart image, format picked from the extension
    output: PathBuf,
    /// Sweep configuration file (YAML); built-in defaults otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    log: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let args = Cli::parse();
    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("blk_sweep={log_level}"));
    for module in ["common", "fio", "latency_depth"] {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }
    for log in &args.log {
        env_filter = env_filter.add_directive(log.parse()?);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking))
        .init();

    if let Err(err) = run(args).await {
        error!("{err:#?}");
        return Err(err);
    }
    Ok(())
}

async fn run(args: Cli) -> Result<()> {
    if !args.target.exists() {
        bail!("target {} does not exist", args.target.display());
    }
    let target = args.target.canonicalize().context("Resolve target path")?;

    let config: SweepConfig = match &args.config {
        Some(path) => serde_yml::from_str(
            &read_to_string(path)
                .await
                .context(format!("Read config {}", path.display()))?,
        )
        .context("Parse sweep config")?,
        None => SweepConfig::default(),
    };
    config.validate()?;

    let invoker = FioProcess::new();
    invoker
        .check_available()
        .await
        .context("fio is not available on this system")?;

    let sweeps = sweep::run_sweep(&config, &invoker, &args.name, &target).await;

    let skipped = sweeps.iter().map(|sweep| sweep.skipped()).sum::<usize>();
    if skipped > 0 {
        println!(
            "Skipped {skipped} of {} invocations, see the log for details",
            sweeps.len() * config.io_depths.len()
        );
    }

    let series = sweeps.iter().map(|sweep| sweep.series()).collect::<Vec<_>>();
    latency_depth::render_latency_chart(&series, &args.name, &args.output)?;
    println!("Chart written to {}", args.output.display());
    Ok(())
}
