//! One configurable pipeline: collect raw samples, then aggregate them.

use std::path::{Path, PathBuf};

use crate::config::BenchConfig;
use crate::engine::{CollectionReport, SampleCollector, SampleSource};
use crate::errors::DiscoveryError;
use crate::export::{self, DataLayout, Stage};
use crate::model::StatRow;
use crate::stats;

/// Which stages to execute. Both are on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSelection {
    pub collect: bool,
    pub aggregate: bool,
}

impl Default for StageSelection {
    fn default() -> Self {
        Self {
            collect: true,
            aggregate: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub stages: StageSelection,
    /// Raw table to aggregate when collection is skipped. Defaults to the
    /// latest file under `runs/`.
    pub raw_input: Option<PathBuf>,
    /// Where to write the raw table. Defaults to a fresh timestamped name.
    pub raw_output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    pub summary_path: PathBuf,
    pub rows: Vec<StatRow>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub raw_path: PathBuf,
    pub collection: Option<CollectionReport>,
    pub aggregate: Option<AggregateOutcome>,
}

pub struct Pipeline<'a> {
    cfg: &'a BenchConfig,
    source: &'a dyn SampleSource,
}

impl<'a> Pipeline<'a> {
    pub fn new(cfg: &'a BenchConfig, source: &'a dyn SampleSource) -> Self {
        Self { cfg, source }
    }

    pub async fn run(&self, opts: &PipelineOptions) -> anyhow::Result<PipelineOutcome> {
        let layout = self.cfg.layout();

        let (raw_path, collection) = if opts.stages.collect {
            let schedule = self.cfg.schedule.build()?;
            let raw_path = opts
                .raw_output
                .clone()
                .unwrap_or_else(|| layout.artifact_path(Stage::Runs, &export::timestamp_now()));
            let report = SampleCollector::new(self.source)
                .collect(&schedule, &raw_path)
                .await?;
            (raw_path, Some(report))
        } else {
            let raw_path = resolve_input(&layout, Stage::Runs, opts.raw_input.as_deref())?;
            tracing::info!(raw = %raw_path.display(), "collection skipped; reusing raw table");
            (raw_path, None)
        };

        let aggregate = if opts.stages.aggregate {
            Some(aggregate_file(&raw_path, &layout.dir(Stage::Stats))?)
        } else {
            None
        };

        Ok(PipelineOutcome {
            raw_path,
            collection,
            aggregate,
        })
    }
}

/// Picks the input of a stage: the explicit path if it exists, else the
/// latest artifact in the stage directory.
pub fn resolve_input(
    layout: &DataLayout,
    stage: Stage,
    explicit: Option<&Path>,
) -> Result<PathBuf, DiscoveryError> {
    match explicit {
        Some(p) if p.is_file() => Ok(p.to_path_buf()),
        Some(p) => Err(DiscoveryError {
            stage,
            dir: p.to_path_buf(),
        }),
        None => layout.latest(stage).ok_or_else(|| DiscoveryError {
            stage,
            dir: layout.dir(stage),
        }),
    }
}

/// Loads a raw table, reduces it and writes the summary next to its siblings
/// in `stats_dir`. The summary is always recomputed from scratch.
pub fn aggregate_file(raw_path: &Path, stats_dir: &Path) -> anyhow::Result<AggregateOutcome> {
    let samples = stats::load_samples(raw_path)?;
    let rows = stats::compute_stats(&samples);
    let summary_path = export::summary_path_for(raw_path, stats_dir);
    export::write_summary(&rows, &summary_path)?;

    tracing::info!(
        raw = %raw_path.display(),
        summary = %summary_path.display(),
        samples = samples.len(),
        degrees = rows.len(),
        "summary exported"
    );
    Ok(AggregateOutcome { summary_path, rows })
}
