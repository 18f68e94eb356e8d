use polybench_core::engine::ProcessRunner;
use polybench_core::pipeline::{Pipeline, PipelineOptions, StageSelection};
use polybench_core::report::console;

use super::exit_codes;
use crate::cli::args::RunArgs;

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    // Argument validation
    if args.skip_collect && args.skip_stats {
        eprintln!("config error: --skip-collect together with --skip-stats leaves nothing to do");
        return Ok(exit_codes::CONFIG_ERROR);
    }
    if args.raw.is_some() && !args.skip_collect {
        eprintln!("config error: RAW_CSV is only read with --skip-collect");
        return Ok(exit_codes::CONFIG_ERROR);
    }
    if args.out.is_some() && args.skip_collect {
        eprintln!("config error: --out has no effect with --skip-collect");
        return Ok(exit_codes::CONFIG_ERROR);
    }

    let cfg = super::load_config(&args.config)?;
    let stages = StageSelection {
        collect: !args.skip_collect,
        aggregate: !args.skip_stats,
    };

    if stages.collect {
        // a path with a directory part must exist; bare names go through PATH
        if cfg.binary.components().count() > 1 && !cfg.binary.is_file() {
            eprintln!(
                "config error: benchmark executable not found: {}",
                cfg.binary.display()
            );
            return Ok(exit_codes::CONFIG_ERROR);
        }
        let schedule = cfg.schedule.build()?;
        tracing::info!(
            executable = %cfg.binary.display(),
            timeout_s = ?cfg.timeout().map(|d| d.as_secs()),
            "benchmark executable"
        );
        console::print_schedule(&schedule);
    }

    cfg.layout().ensure()?;

    let runner = ProcessRunner::new(&cfg.binary, cfg.timeout());
    let opts = PipelineOptions {
        stages,
        raw_input: args.raw.clone(),
        raw_output: args.out.clone(),
    };
    let outcome = Pipeline::new(&cfg, &runner).run(&opts).await?;

    let mut code = exit_codes::OK;
    if let Some(report) = &outcome.collection {
        console::print_collection_summary(report);
        if report.attempted > 0 && report.recorded == 0 {
            eprintln!("error: no trial produced a sample");
            code = exit_codes::FAILED;
        }
    }
    if let Some(agg) = &outcome.aggregate {
        console::print_stats_table(&agg.rows);
        eprintln!("wrote file: {}", agg.summary_path.display());
    } else {
        eprintln!("wrote file: {}", outcome.raw_path.display());
    }

    Ok(code)
}
