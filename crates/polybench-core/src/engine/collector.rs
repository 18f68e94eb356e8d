use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::engine::process::SampleSource;
use crate::errors::TrialError;
use crate::model::{RawRecord, ScheduleEntry};
use crate::storage::raw_table::RawTableWriter;

/// A trial that produced no sample.
#[derive(Debug, Clone, Serialize)]
pub struct TrialFailure {
    pub degree: u64,
    /// 1-based repetition within the degree.
    pub repetition: u32,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub raw_path: PathBuf,
    pub attempted: usize,
    pub recorded: usize,
    /// Recorded samples whose correctness flag was 0.
    pub invalid: usize,
    /// Recorded samples whose echoed degree differs from the requested one.
    pub degree_mismatches: usize,
    pub failures: Vec<TrialFailure>,
    pub duration_ms: u64,
}

impl CollectionReport {
    fn new(raw_path: &Path) -> Self {
        Self {
            raw_path: raw_path.to_path_buf(),
            attempted: 0,
            recorded: 0,
            invalid: 0,
            degree_mismatches: 0,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }
}

/// Drives a [`SampleSource`] across a schedule, one trial at a time.
///
/// Trials never overlap: each one is awaited and persisted before the next
/// starts, so concurrent runs cannot skew each other's timings.
pub struct SampleCollector<'a> {
    source: &'a dyn SampleSource,
}

impl<'a> SampleCollector<'a> {
    pub fn new(source: &'a dyn SampleSource) -> Self {
        Self { source }
    }

    /// Runs the full schedule into a fresh raw table at `raw_path`.
    ///
    /// A failed trial is logged and skipped; it is never retried. Only
    /// failures to write the table abort the run.
    pub async fn collect(
        &self,
        schedule: &[ScheduleEntry],
        raw_path: &Path,
    ) -> anyhow::Result<CollectionReport> {
        let started = Instant::now();
        let mut table = RawTableWriter::create(raw_path)?;
        let mut report = CollectionReport::new(raw_path);

        tracing::info!(
            source = %self.source.describe(),
            raw = %raw_path.display(),
            degrees = schedule.len(),
            trials = schedule.iter().map(|e| e.repeat_count as usize).sum::<usize>(),
            "starting collection"
        );

        for entry in schedule {
            tracing::info!(
                degree = entry.degree,
                repeats = entry.repeat_count,
                "collecting degree"
            );
            let mut ok_for_degree = 0u32;

            for rep in 1..=entry.repeat_count {
                report.attempted += 1;
                match self.source.sample(entry.degree).await {
                    Ok(sample) => {
                        if sample.degree != entry.degree as i64 {
                            report.degree_mismatches += 1;
                            tracing::warn!(
                                requested = entry.degree,
                                reported = sample.degree,
                                "executable echoed a different degree"
                            );
                        }
                        if !sample.valid {
                            report.invalid += 1;
                            tracing::warn!(
                                degree = entry.degree,
                                repetition = rep,
                                "correctness check failed; sample kept for audit"
                            );
                        }
                        table.append(&RawRecord::from(sample))?;
                        report.recorded += 1;
                        ok_for_degree += 1;
                        tracing::debug!(
                            degree = entry.degree,
                            repetition = rep,
                            scalar_time = sample.scalar_time,
                            avx_time = sample.avx_time,
                            "trial recorded"
                        );
                    }
                    Err(e) => {
                        log_trial_failure(entry.degree, rep, &e);
                        report.failures.push(TrialFailure {
                            degree: entry.degree,
                            repetition: rep,
                            kind: e.kind(),
                            message: e.to_string(),
                        });
                    }
                }
            }

            if ok_for_degree == 0 && entry.repeat_count > 0 {
                tracing::warn!(degree = entry.degree, "no successful samples for degree");
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            raw = %table.path().display(),
            rows = table.rows_written(),
            failed = report.failures.len(),
            "collection finished"
        );
        Ok(report)
    }
}

fn log_trial_failure(degree: u64, repetition: u32, e: &TrialError) {
    match e.captured_output() {
        Some((stdout, stderr)) => tracing::error!(
            degree,
            repetition,
            kind = e.kind(),
            command = %e.command(),
            stdout = %stdout,
            stderr = %stderr,
            "trial failed: {}",
            e
        ),
        None => tracing::error!(
            degree,
            repetition,
            kind = e.kind(),
            command = %e.command(),
            "trial failed: {}",
            e
        ),
    }
}
