use super::args::*;
use polybench_core::config::{resolve_config, BenchConfig};
use polybench_core::errors::{ConfigError, ScheduleError};

pub mod init;
pub mod latest;
pub mod run;
pub mod schedule;
pub mod stats;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::run(args).await,
        Command::Stats(args) => stats::run(args),
        Command::Schedule(args) => schedule::run(args),
        Command::Latest(args) => latest::run(args),
        Command::Init(args) => init::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

/// Exit status for an error that escaped a command.
pub fn exit_code_for(e: &anyhow::Error) -> i32 {
    if e.downcast_ref::<ConfigError>().is_some() || e.downcast_ref::<ScheduleError>().is_some() {
        exit_codes::CONFIG_ERROR
    } else {
        exit_codes::FAILED
    }
}

pub(crate) fn load_config(args: &ConfigArgs) -> anyhow::Result<BenchConfig> {
    let cfg = resolve_config(args.config.as_deref(), &args.overrides())?;
    tracing::debug!(config = ?cfg, "configuration resolved");
    Ok(cfg)
}
