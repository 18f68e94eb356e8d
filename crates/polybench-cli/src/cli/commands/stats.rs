use polybench_core::export::Stage;
use polybench_core::pipeline::{aggregate_file, resolve_input};
use polybench_core::report::console;

use super::exit_codes;
use crate::cli::args::StatsArgs;

pub fn run(args: StatsArgs) -> anyhow::Result<i32> {
    let cfg = super::load_config(&args.config)?;
    let layout = cfg.layout();

    if args.raw.is_none() {
        tracing::info!(
            dir = %layout.dir(Stage::Runs).display(),
            "no raw table given; searching for the latest"
        );
    }
    let raw_path = resolve_input(&layout, Stage::Runs, args.raw.as_deref())?;
    tracing::info!(raw = %raw_path.display(), "using raw table");

    let out = aggregate_file(&raw_path, &layout.dir(Stage::Stats))?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&out.rows)?);
    } else {
        console::print_stats_table(&out.rows);
    }
    eprintln!("wrote file: {}", out.summary_path.display());

    Ok(exit_codes::OK)
}
