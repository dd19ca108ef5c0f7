use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::WorkloadMode;

/// One measured point: mean latency at a given queue depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub io_depth: usize,
    pub latency_ms: f64,
}

/// The plottable result of one workload mode, in ascending depth order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub mode: WorkloadMode,
    pub points: Vec<SweepPoint>,
}

impl Series {
    pub fn label(&self) -> &'static str {
        self.mode.rw()
    }
}

/// Everything that happened to one workload mode over a sweep, skips included.
#[derive(Debug)]
pub struct ModeSweep {
    pub mode: WorkloadMode,
    pub outcomes: Vec<DepthOutcome>,
}

impl ModeSweep {
    pub fn new(mode: WorkloadMode) -> Self {
        Self {
            mode,
            outcomes: Vec::new(),
        }
    }

    /// Recorded points only, in sweep order. Skipped depths leave no gap
    /// marker; the series is simply shorter than the depth set.
    pub fn series(&self) -> Series {
        Series {
            mode: self.mode,
            points: self
                .outcomes
                .iter()
                .filter_map(|outcome| match outcome {
                    DepthOutcome::Recorded(point) => Some(*point),
                    DepthOutcome::Skipped { .. } => None,
                })
                .collect(),
        }
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, DepthOutcome::Skipped { .. }))
            .count()
    }
}

/// Per-depth result of one invocation attempt.
#[derive(Debug)]
pub enum DepthOutcome {
    Recorded(SweepPoint),
    Skipped { io_depth: usize, error: InvokeError },
}

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("could not launch benchmark process: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("benchmark exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
    #[error("malformed result payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("result payload is missing {field}")]
    Missing { field: &'static str },
}
