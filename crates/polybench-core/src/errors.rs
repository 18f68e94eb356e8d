use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::export::Stage;

/// Configuration could not be loaded or is inconsistent.
#[derive(Debug, Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);

/// Invalid degree/repeat schedule parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("base must be >= 2 (got {0})")]
    Base(u64),
    #[error("min_exp ({min}) must not exceed max_exp ({max})")]
    ExponentRange { min: u32, max: u32 },
    #[error("repeat bounds must satisfy 1 <= min_repeats ({min}) <= max_repeats ({max})")]
    RepeatRange { min: u32, max: u32 },
    #[error("growth must be a finite value >= 1 (got {0})")]
    Growth(String),
    #[error("degree {base}^{exp} - 1 does not fit in 64 bits")]
    Overflow { base: u64, exp: u32 },
}

/// Failure of a single benchmark trial. Never fatal to a collection run.
#[derive(Debug, Error)]
pub enum TrialError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Invocation {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("`{command}` did not finish within {}s", .after.as_secs_f64())]
    Timeout { command: String, after: Duration },

    #[error("no sample recoverable from `{command}`: {reason}")]
    Parse {
        command: String,
        reason: String,
        stdout: String,
        stderr: String,
    },
}

impl TrialError {
    /// Short machine-friendly kind, used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            TrialError::Spawn { .. } => "spawn",
            TrialError::Invocation { .. } => "invocation",
            TrialError::Timeout { .. } => "timeout",
            TrialError::Parse { .. } => "parse",
        }
    }

    pub fn command(&self) -> &str {
        match self {
            TrialError::Spawn { command, .. }
            | TrialError::Invocation { command, .. }
            | TrialError::Timeout { command, .. }
            | TrialError::Parse { command, .. } => command,
        }
    }

    /// Captured (stdout, stderr), when the process ran far enough to produce any.
    pub fn captured_output(&self) -> Option<(&str, &str)> {
        match self {
            TrialError::Invocation { stdout, stderr, .. }
            | TrialError::Parse { stdout, stderr, .. } => Some((stdout, stderr)),
            TrialError::Spawn { .. } | TrialError::Timeout { .. } => None,
        }
    }
}

/// The raw table lacks required columns.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing columns {missing:?}. Found: {found:?}")]
pub struct ValidationError {
    pub missing: Vec<String>,
    pub found: Vec<String>,
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("line {line}: column '{column}' has unparsable value '{value}'")]
    Malformed {
        line: usize,
        column: String,
        value: String,
    },
}

/// No input file could be resolved for a pipeline stage.
#[derive(Debug, Error)]
#[error("no {} file found (searched: {})", .stage.label(), .dir.display())]
pub struct DiscoveryError {
    pub stage: Stage,
    pub dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_error_accessors() {
        let e = TrialError::Invocation {
            command: "bin/main 127".into(),
            status: "exit status: 3".into(),
            stdout: "out".into(),
            stderr: "err".into(),
        };
        assert_eq!(e.kind(), "invocation");
        assert_eq!(e.command(), "bin/main 127");
        assert_eq!(e.captured_output(), Some(("out", "err")));

        let t = TrialError::Timeout {
            command: "bin/main 127".into(),
            after: Duration::from_secs(5),
        };
        assert_eq!(t.kind(), "timeout");
        assert!(t.captured_output().is_none());
        assert!(t.to_string().contains("5s"));
    }

    #[test]
    fn test_validation_error_message() {
        let e = ValidationError {
            missing: vec!["avx_time".into()],
            found: vec!["valid".into(), "degree".into()],
        };
        assert_eq!(
            e.to_string(),
            r#"missing columns ["avx_time"]. Found: ["valid", "degree"]"#
        );
    }
}
