use std::path::Path;

use async_trait::async_trait;
use common::{
    config::{SweepConfig, WorkloadMode},
    sweep::InvokeError,
};
use tokio::process::Command;
use tracing::debug;


use result::FioResult;

/// One fio invocation: the fixed workload knobs plus the swept queue depth.
#[derive(Debug, Clone)]
pub struct FioJob {
    pub name: String,
    pub filename: String,
    pub mode: WorkloadMode,
    pub io_depth: usize,
    pub block_size: String,
    pub size: String,
    pub direct: bool,
    pub num_jobs: usize,
    pub ioengine: String,
}

fn int(item: bool) -> u8 {
    if item { 1 } else { 0 }
}

impl FioJob {
    pub fn new(
        name: &str,
        target: &Path,
        mode: WorkloadMode,
        io_depth: usize,
        config: &SweepConfig,
    ) -> Self {
        Self {
            name: name.to_owned(),
            filename: target.to_string_lossy().into_owned(),
            mode,
            io_depth,
            block_size: config.block_size.clone(),
            size: config.size.clone(),
            direct: config.direct,
            num_jobs: config.num_jobs,
            ioengine: config.ioengine.clone(),
        }
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--name",
            "--filename",
            "--ioengine",
            "--direct",
            "--rw",
            "--bs",
            "--size",
            "--numjobs",
            "--iodepth",
        ]
        .into_iter()
        .zip(vec![
            self.name.clone(),
            self.filename.clone(),
            self.ioengine.clone(),
            int(self.direct).to_string(),
            self.mode.rw().to_owned(),
            self.block_size.clone(),
            self.size.clone(),
            self.num_jobs.to_string(),
            self.io_depth.to_string(),
        ])
        .map(|(arg, value)| format!("{arg}={value}"))
        .collect::<Vec<_>>();

        args.push("--output-format=json".to_owned());
        args
    }
}

/// Seam over the external benchmark process.
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, job: &FioJob) -> Result<FioResult, InvokeError>;
}

/// Runs the real fio binary and parses its JSON output.
#[derive(Debug, Clone)]
pub struct FioProcess {
    program: String,
}

impl Default for FioProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl FioProcess {
    pub fn new() -> Self {
        Self {
            program: "fio".to_owned(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Probes the binary so a missing fio is reported before the sweep starts.
    pub async fn check_available(&self) -> Result<(), InvokeError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .await?;
        if !output.status.success() {
            return Err(InvokeError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        debug!(
            "{} {}",
            self.program,
            String::from_utf8_lossy(&output.stdout).trim()
        );
        Ok(())
    }
}

#[async_trait]
impl Invoker for FioProcess {
    async fn invoke(&self, job: &FioJob) -> Result<FioResult, InvokeError> {
        let args = job.args();
        debug!("program={} args={}", self.program, args.join(" "));
        let output = Command::new(&self.program).args(&args).output().await?;
        if !output.status.success() {
            return Err(InvokeError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, os::unix::fs::PermissionsExt, path::PathBuf};

    use super::*;
    use crate::result::fixtures;

    fn job(mode: WorkloadMode, io_depth: usize) -> FioJob {
        FioJob::new(
            "test",
            Path::new("/dev/sdz"),
            mode,
            io_depth,
            &SweepConfig::default(),
        )
    }

    #[test]
    fn renders_the_fixed_argument_template() {
        let args = job(WorkloadMode::Randread, 32).args();
        assert_eq!(
            args,
            vec![
                "--name=test",
                "--filename=/dev/sdz",
                "--ioengine=libaio",
                "--direct=1",
                "--rw=randread",
                "--bs=4k",
                "--size=1G",
                "--numjobs=1",
                "--iodepth=32",
                "--output-format=json",
            ]
        );
    }

    #[test]
    fn buffered_write_jobs_render_direct_zero() {
        let mut config = SweepConfig::default();
        config.direct = false;
        let args = FioJob::new(
            "test",
            Path::new("/tmp/target"),
            WorkloadMode::Randwrite,
            1,
            &config,
        )
        .args();
        assert!(args.contains(&"--direct=0".to_owned()));
        assert!(args.contains(&"--rw=randwrite".to_owned()));
        assert!(args.contains(&"--iodepth=1".to_owned()));
    }

    fn fake_fio(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("fake-fio-{name}"));
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let invoker = FioProcess::with_program("/nonexistent/fio");
        let err = invoker
            .invoke(&job(WorkloadMode::Randread, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Spawn(_)));
        assert!(invoker.check_available().await.is_err());
    }

    #[tokio::test]
    async fn nonzero_exit_carries_stderr() {
        let script = fake_fio("fail.sh", "#!/bin/sh\necho device busy >&2\nexit 3\n");
        let invoker = FioProcess::with_program(script.to_string_lossy());
        let err = invoker
            .invoke(&job(WorkloadMode::Randread, 1))
            .await
            .unwrap_err();
        match err {
            InvokeError::Failed { code, stderr } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("device busy"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn canned_payload_parses() {
        let script = fake_fio(
            "ok.sh",
            &format!("#!/bin/sh\ncat <<'EOF'\n{}\nEOF\n", fixtures::RANDRW_PAYLOAD),
        );
        let invoker = FioProcess::with_program(script.to_string_lossy());
        let result = invoker
            .invoke(&job(WorkloadMode::Randread, 1))
            .await
            .unwrap();
        assert_eq!(result.jobs.len(), 1);
        assert_eq!(result.jobs[0].read.clat_ns.mean, 500_000.0);
    }

    #[tokio::test]
    async fn garbage_payload_is_a_parse_error() {
        let script = fake_fio("garbage.sh", "#!/bin/sh\necho not json\n");
        let invoker = FioProcess::with_program(script.to_string_lossy());
        let err = invoker
            .invoke(&job(WorkloadMode::Randread, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Parse(_)));
    }
}
