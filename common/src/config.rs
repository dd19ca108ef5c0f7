use eyre::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::util::parse_data_size;

/// Workload parameters for one sweep. Everything except the queue depth is
/// fixed for the whole run; the depth set is walked in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub io_depths: Vec<usize>,
    pub block_size: String,
    pub size: String,
    pub direct: bool,
    pub modes: Vec<WorkloadMode>,
    pub num_jobs: usize,
    pub ioengine: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            io_depths: vec![1, 2, 4, 8, 16, 32, 64, 128, 256],
            block_size: "4k".to_owned(),
            size: "1G".to_owned(),
            direct: true,
            modes: vec![WorkloadMode::Randread, WorkloadMode::Randwrite],
            num_jobs: 1,
            ioengine: "libaio".to_owned(),
        }
    }
}

impl SweepConfig {
    /// Checked once before any benchmark invocation.
    pub fn validate(&self) -> Result<()> {
        if self.io_depths.is_empty() {
            bail!("io_depths must not be empty");
        }
        if self.io_depths[0] == 0 {
            bail!("io_depths must be positive");
        }
        if !self.io_depths.windows(2).all(|pair| pair[0] < pair[1]) {
            bail!("io_depths must be strictly ascending: {:?}", self.io_depths);
        }
        if self.modes.is_empty() {
            bail!("at least one workload mode is required");
        }
        if self.num_jobs == 0 {
            bail!("num_jobs must be positive");
        }
        parse_data_size(&self.block_size)?;
        parse_data_size(&self.size)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadMode {
    #[default]
    Randread,
    Randwrite,
}

impl WorkloadMode {
    /// The value passed to fio as `--rw=`, also used as the series label.
    pub fn rw(&self) -> &'static str {
        match self {
            WorkloadMode::Randread => "randread",
            WorkloadMode::Randwrite => "randwrite",
        }
    }
}
