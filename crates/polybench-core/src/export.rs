//! File naming and lookup conventions that bind the pipeline stages together.
//!
//! Artifacts are named `<prefix>_<YYYYMMDD_HHMMSS>.<ext>`. Because the
//! timestamp is fixed-width and zero-padded, the lexicographically greatest
//! name within a stage is also the most recent one.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::model::StatRow;
use crate::storage::raw_table::fmt_f64;

pub const SUMMARY_HEADER: &str = "degree,scalar_time_min,scalar_time_mean,scalar_time_std,avx_time_min,avx_time_mean,avx_time_std,speedup";

const RAW_MARKER: &str = "runs";
const SUMMARY_MARKER: &str = "stats";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Raw trial samples.
    Runs,
    /// Per-degree summaries.
    Stats,
    /// Charts, written by an external renderer.
    Plots,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Runs, Stage::Stats, Stage::Plots];

    pub fn dir_name(self) -> &'static str {
        match self {
            Stage::Runs => "runs",
            Stage::Stats => "stats",
            Stage::Plots => "plots",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Stage::Runs => "simd_runs",
            Stage::Stats => "simd_stats",
            Stage::Plots => "simd_plots",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Stage::Runs | Stage::Stats => "csv",
            Stage::Plots => "svg",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Runs => "raw samples",
            Stage::Stats => "summary",
            Stage::Plots => "chart",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "runs" | "raw" => Ok(Stage::Runs),
            "stats" | "summary" => Ok(Stage::Stats),
            "plots" | "charts" => Ok(Stage::Plots),
            other => Err(format!("unknown stage '{other}' (expected runs|stats|plots)")),
        }
    }
}

/// `<data_root>/{runs,stats,plots}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    pub fn ensure(&self) -> anyhow::Result<()> {
        for stage in Stage::ALL {
            let dir = self.dir(stage);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn artifact_path(&self, stage: Stage, timestamp: &str) -> PathBuf {
        self.dir(stage).join(artifact_name(stage, timestamp))
    }

    pub fn latest(&self, stage: Stage) -> Option<PathBuf> {
        latest_file(&self.dir(stage), stage)
    }
}

/// Local wall-clock timestamp in the `YYYYMMDD_HHMMSS` form used in names.
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn artifact_name(stage: Stage, timestamp: &str) -> String {
    format!("{}_{}.{}", stage.prefix(), timestamp, stage.extension())
}

/// Lexicographically greatest `<prefix>*.<ext>` file in `dir`, if any.
/// A missing or unreadable directory counts as "none found".
pub fn latest_file(dir: &Path, stage: Stage) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "artifact directory not readable");
            return None;
        }
    };
    let suffix = format!(".{}", stage.extension());

    entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.starts_with(stage.prefix()) && name.ends_with(&suffix))
        .max()
        .map(|name| dir.join(name))
}

/// Summary file name derived from a raw file name: the stage marker is
/// swapped (`simd_runs_<ts>` -> `simd_stats_<ts>`); names without the marker
/// get the summary prefix prepended.
pub fn summary_file_name(raw_path: &Path) -> String {
    let base = raw_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let new_base = if base.contains(RAW_MARKER) {
        base.replace(RAW_MARKER, SUMMARY_MARKER)
    } else {
        format!("{}_{}", Stage::Stats.prefix(), base)
    };
    format!("{}.{}", new_base, Stage::Stats.extension())
}

pub fn summary_path_for(raw_path: &Path, stats_dir: &Path) -> PathBuf {
    stats_dir.join(summary_file_name(raw_path))
}

pub fn render_summary(rows: &[StatRow]) -> String {
    let mut out = String::with_capacity(SUMMARY_HEADER.len() + 1 + rows.len() * 96);
    out.push_str(SUMMARY_HEADER);
    out.push('\n');
    for r in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            r.degree,
            fmt_f64(r.scalar_time_min),
            fmt_f64(r.scalar_time_mean),
            fmt_f64(r.scalar_time_std),
            fmt_f64(r.avx_time_min),
            fmt_f64(r.avx_time_mean),
            fmt_f64(r.avx_time_std),
            fmt_f64(r.speedup),
        ));
    }
    out
}

pub fn write_summary(rows: &[StatRow], path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create summary file: {}", path.display()))?;
    let mut w = BufWriter::new(file);
    w.write_all(render_summary(rows).as_bytes())
        .and_then(|_| w.flush())
        .with_context(|| format!("failed to write summary file: {}", path.display()))?;
    Ok(())
}
