#![cfg(unix)]

use std::path::PathBuf;
use std::time::Duration;

use polybench_core::config::BenchConfig;
use polybench_core::engine::ProcessRunner;
use polybench_core::errors::DiscoveryError;
use polybench_core::export::Stage;
use polybench_core::pipeline::{Pipeline, PipelineOptions, StageSelection};
use polybench_core::schedule::ScheduleConfig;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn small_config(dir: &TempDir, binary: &str) -> BenchConfig {
    BenchConfig {
        binary: fixture(binary),
        data_root: dir.path().join("data"),
        timeout_seconds: Some(10),
        schedule: ScheduleConfig {
            base: 2,
            min_exp: 7,
            max_exp: 9,
            min_repeats: 1,
            max_repeats: 3,
            growth: Some(2.0),
        },
        ..BenchConfig::default()
    }
}

#[tokio::test]
async fn test_collect_then_aggregate() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let cfg = small_config(&dir, "bench_ok.sh");
    let runner = ProcessRunner::new(&cfg.binary, cfg.timeout());

    let outcome = Pipeline::new(&cfg, &runner)
        .run(&PipelineOptions::default())
        .await?;

    // repeats for degrees 127, 255, 511 are 3, 2, 1
    let report = outcome.collection.expect("collection ran");
    assert_eq!(report.attempted, 6);
    assert_eq!(report.recorded, 6);
    assert!(report.failures.is_empty());

    assert!(outcome.raw_path.starts_with(cfg.layout().dir(Stage::Runs)));
    let raw = std::fs::read_to_string(&outcome.raw_path)?;
    assert_eq!(raw.lines().count(), 7);

    let agg = outcome.aggregate.expect("aggregation ran");
    assert_eq!(
        agg.rows.iter().map(|r| r.degree).collect::<Vec<_>>(),
        vec![127, 255, 511]
    );
    assert!(agg.rows.iter().all(|r| (r.speedup - 4.0).abs() < 1e-9));
    assert!(agg.summary_path.starts_with(cfg.layout().dir(Stage::Stats)));
    Ok(())
}

#[tokio::test]
async fn test_failing_binary_keeps_going_and_writes_empty_table() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let cfg = small_config(&dir, "bench_fail.sh");
    let runner = ProcessRunner::new(&cfg.binary, Some(Duration::from_secs(10)));

    let outcome = Pipeline::new(&cfg, &runner)
        .run(&PipelineOptions::default())
        .await?;

    let report = outcome.collection.unwrap();
    assert_eq!(report.attempted, 6);
    assert_eq!(report.recorded, 0);
    assert_eq!(report.failures.len(), 6);
    assert!(report.failures.iter().all(|f| f.kind == "invocation"));
    assert!(outcome.aggregate.unwrap().rows.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_skip_collect_reuses_latest_raw_table() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let cfg = small_config(&dir, "bench_fail.sh");
    let runs = cfg.layout().dir(Stage::Runs);
    std::fs::create_dir_all(&runs)?;
    std::fs::write(
        runs.join("simd_runs_20240101_000000.csv"),
        "valid,degree,scalar_time,avx_time,speedup\n1,127,1.0,0.5,2.0\n",
    )?;
    std::fs::write(
        runs.join("simd_runs_20240102_000000.csv"),
        "valid,degree,scalar_time,avx_time,speedup\n1,255,3.0,1.0,3.0\n",
    )?;

    let runner = ProcessRunner::new(&cfg.binary, None);
    let opts = PipelineOptions {
        stages: StageSelection {
            collect: false,
            aggregate: true,
        },
        ..PipelineOptions::default()
    };
    let outcome = Pipeline::new(&cfg, &runner).run(&opts).await?;

    assert!(outcome.collection.is_none());
    assert!(outcome.raw_path.ends_with("simd_runs_20240102_000000.csv"));
    let agg = outcome.aggregate.unwrap();
    assert_eq!(agg.rows.len(), 1);
    assert_eq!(agg.rows[0].degree, 255);
    assert!(agg.summary_path.ends_with("simd_stats_20240102_000000.csv"));
    Ok(())
}

#[tokio::test]
async fn test_skip_collect_without_raw_table_is_discovery_error() {
    let dir = TempDir::new().unwrap();
    let cfg = small_config(&dir, "bench_ok.sh");
    let runner = ProcessRunner::new(&cfg.binary, None);
    let opts = PipelineOptions {
        stages: StageSelection {
            collect: false,
            aggregate: true,
        },
        ..PipelineOptions::default()
    };

    let err = Pipeline::new(&cfg, &runner).run(&opts).await.unwrap_err();
    let d = err.downcast_ref::<DiscoveryError>().expect("discovery error");
    assert_eq!(d.stage, Stage::Runs);
    assert!(err.to_string().starts_with("no raw samples file found"));
}
