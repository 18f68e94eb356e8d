use clap::{Parser, Subcommand};
use polybench_core::config::ConfigOverrides;
use polybench_core::export::Stage;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "polybench",
    version,
    about = "Benchmark harness for scalar vs. vectorized polynomial multiplication"
)]
pub struct Cli {
    /// Emit logs as JSON lines (stderr)
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Collect samples across the schedule, then aggregate them
    Run(RunArgs),
    /// Aggregate a raw samples table into per-degree statistics
    Stats(StatsArgs),
    /// Print the degree/repeat schedule without running anything
    Schedule(ScheduleArgs),
    /// Print the most recent artifact of a stage
    Latest(LatestArgs),
    /// Write a sample config and create the data directories
    Init(InitArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Config file (default: ./polybench.yaml when present, else built-in defaults)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Benchmark executable, invoked as `<binary> <degree>`
    #[arg(long, env = "POLYBENCH_BINARY")]
    pub binary: Option<PathBuf>,

    /// Root directory holding runs/, stats/ and plots/
    #[arg(long, env = "POLYBENCH_DATA_ROOT")]
    pub data_root: Option<PathBuf>,

    /// Per-trial time limit in seconds (0 disables it)
    #[arg(long, env = "POLYBENCH_TIMEOUT_SECONDS")]
    pub timeout_seconds: Option<u64>,
}

impl ConfigArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            binary: self.binary.clone(),
            data_root: self.data_root.clone(),
            timeout_seconds: self.timeout_seconds,
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Raw table to write (default: <data_root>/runs/simd_runs_<timestamp>.csv)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Do not run the benchmark; aggregate RAW_CSV or the latest raw table
    #[arg(long, short = 's')]
    pub skip_collect: bool,

    /// Stop after collection
    #[arg(long)]
    pub skip_stats: bool,

    /// Raw table to aggregate (only with --skip-collect)
    pub raw: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Raw table to aggregate (default: latest under <data_root>/runs)
    pub raw: Option<PathBuf>,

    /// Output format for the summary on stdout: text | json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// text | json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct LatestArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// runs | stats | plots
    pub stage: Stage,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "polybench.yaml")]
    pub config: PathBuf,
}
