use std::path::PathBuf;
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tokio::time::timeout;

use crate::errors::TrialError;
use crate::model::Sample;

/// Source of one timing sample per call. The collector only talks to this
/// seam, so tests can drive it without spawning processes.
#[async_trait]
pub trait SampleSource: Send + Sync {
    async fn sample(&self, degree: u64) -> Result<Sample, TrialError>;

    /// Human-readable description of what is being invoked.
    fn describe(&self) -> String;
}

/// Runs the external benchmark executable as `<binary> <degree>`.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(binary: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn command_line(&self, degree: u64) -> String {
        format!("{} {}", self.binary.display(), degree)
    }
}

#[async_trait]
impl SampleSource for ProcessRunner {
    async fn sample(&self, degree: u64) -> Result<Sample, TrialError> {
        let command = self.command_line(degree);

        let child = Command::new(&self.binary)
            .arg(degree.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TrialError::Spawn {
                command: command.clone(),
                source,
            })?;

        let wait = child.wait_with_output();
        let output = match self.timeout {
            // dropping the wait future drops the child, which kills it
            Some(limit) => timeout(limit, wait).await.map_err(|_| TrialError::Timeout {
                command: command.clone(),
                after: limit,
            })?,
            None => wait.await,
        }
        .map_err(|source| TrialError::Spawn {
            command: command.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(TrialError::Invocation {
                command,
                status: output.status.to_string(),
                stdout,
                stderr,
            });
        }

        match parse_output(&stdout, &stderr) {
            Ok(sample) => Ok(sample),
            Err(reason) => Err(TrialError::Parse {
                command,
                reason,
                stdout,
                stderr,
            }),
        }
    }

    fn describe(&self) -> String {
        self.binary.display().to_string()
    }
}

const FLOAT: &str = r"[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?";

fn sample_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"^(?P<valid>[01]),(?P<degree>[+-]?\d+),(?P<scalar>{FLOAT}),(?P<avx>{FLOAT})\s*$"
        );
        Regex::new(&pattern).expect("sample line pattern is valid")
    })
}

/// Extracts the authoritative sample from the combined output of one run.
///
/// stdout is scanned before stderr and the last matching line wins; earlier
/// matches (warm-up, retries) are discarded.
pub fn parse_output(stdout: &str, stderr: &str) -> Result<Sample, String> {
    let re = sample_line();
    let last = stdout
        .lines()
        .chain(stderr.lines())
        .filter_map(|line| re.captures(line.trim()))
        .last()
        .ok_or_else(|| "no line matching <valid>,<degree>,<scalar_time>,<avx_time>".to_string())?;

    let degree: i64 = last["degree"]
        .parse()
        .map_err(|e| format!("degree '{}' out of range: {}", &last["degree"], e))?;
    let scalar_time = parse_time(&last["scalar"], "scalar_time")?;
    let avx_time = parse_time(&last["avx"], "avx_time")?;

    Ok(Sample {
        valid: &last["valid"] == "1",
        degree,
        scalar_time,
        avx_time,
    })
}

fn parse_time(raw: &str, field: &str) -> Result<f64, String> {
    let v: f64 = raw
        .parse()
        .map_err(|e| format!("{field} '{raw}' is not a number: {e}"))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("{field} '{raw}' must be a finite, non-negative time"));
    }
    Ok(v)
}
