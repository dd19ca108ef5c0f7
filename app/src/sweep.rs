use std::path::Path;

use common::{
    config::SweepConfig,
    sweep::{DepthOutcome, InvokeError, ModeSweep, SweepPoint},
};
use fio::{FioJob, Invoker};
use tracing::{debug, error, warn};

/// Drives one invocation per configured mode at each queue depth, in
/// ascending depth order. Each invocation runs to completion before the next
/// starts; overlapping runs would contend for the target device and skew the
/// latency figures. Failed or unparseable invocations are logged and recorded
/// as skips, and the sweep always continues to the end of the depth set.
pub async fn run_sweep<I: Invoker>(
    config: &SweepConfig,
    invoker: &I,
    name: &str,
    target: &Path,
) -> Vec<ModeSweep> {
    let mut sweeps = config
        .modes
        .iter()
        .map(|&mode| ModeSweep::new(mode))
        .collect::<Vec<_>>();

    for &io_depth in &config.io_depths {
        for sweep in &mut sweeps {
            let job = FioJob::new(name, target, sweep.mode, io_depth, config);
            let outcome = match invoker.invoke(&job).await {
                Ok(result) => match result.mean_latency_ms(sweep.mode) {
                    Ok(latency_ms) => {
                        debug!(
                            "{} iodepth={io_depth} latency={latency_ms:.3}ms",
                            sweep.mode.rw()
                        );
                        DepthOutcome::Recorded(SweepPoint {
                            io_depth,
                            latency_ms,
                        })
                    }
                    Err(error) => {
                        warn!("{} iodepth={io_depth} skipped: {error}", sweep.mode.rw());
                        DepthOutcome::Skipped { io_depth, error }
                    }
                },
                Err(error) => {
                    match &error {
                        InvokeError::Failed { stderr, .. } => error!(
                            "{} iodepth={io_depth} failed: {}",
                            sweep.mode.rw(),
                            stderr.trim()
                        ),
                        other => {
                            error!("{} iodepth={io_depth} skipped: {other}", sweep.mode.rw())
                        }
                    }
                    DepthOutcome::Skipped { io_depth, error }
                }
            };
            sweep.outcomes.push(outcome);
        }
    }
    sweeps
}
