use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::errors::StatsError;
use crate::model::RawRecord;

pub const RAW_HEADER: &str = "valid,degree,scalar_time,avx_time,speedup";

/// Fixed six-decimal rendering shared by the raw and summary tables.
pub fn fmt_f64(v: f64) -> String {
    format!("{:.6}", v)
}

/// Append-only writer for the raw samples table.
///
/// Every record is flushed and synced before `append` returns, so a crash
/// mid-run keeps all previously completed trials.
pub struct RawTableWriter {
    path: PathBuf,
    file: File,
    rows: usize,
}

impl RawTableWriter {
    /// Starts a fresh table at `path`, discarding any previous content.
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to create raw table {}", path.display()))?;
        writeln!(file, "{}", RAW_HEADER)?;
        file.sync_data()?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            rows: 0,
        })
    }

    pub fn append(&mut self, record: &RawRecord) -> anyhow::Result<()> {
        let s = &record.sample;
        writeln!(
            self.file,
            "{},{},{},{},{}",
            u8::from(s.valid),
            s.degree,
            fmt_f64(s.scalar_time),
            fmt_f64(s.avx_time),
            fmt_f64(record.speedup)
        )
        .and_then(|_| self.file.flush())
        .and_then(|_| self.file.sync_data())
        .with_context(|| format!("failed to append to {}", self.path.display()))?;
        self.rows += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }
}

/// A loaded CSV table: normalized column names plus string cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    /// (1-based line number, cells)
    pub rows: Vec<(usize, Vec<String>)>,
}

impl RawTable {
    pub fn load(path: &Path) -> Result<Self, StatsError> {
        let file = File::open(path).map_err(|source| StatsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file)).map_err(|source| StatsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses plain comma-separated text. Blank lines are skipped; the first
    /// non-blank line is the header.
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut table = RawTable::default();
        let mut header_seen = false;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<String> = line.split(',').map(|c| c.trim().to_string()).collect();
            if !header_seen {
                table.columns = cells.into_iter().map(|c| normalize_column(&c)).collect();
                header_seen = true;
            } else {
                table.rows.push((idx + 1, cells));
            }
        }
        Ok(table)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Lowercases, trims and maps the legacy `avx2_time` name.
pub fn normalize_column(raw: &str) -> String {
    let c = raw.trim().trim_start_matches('\u{feff}').trim().to_lowercase();
    match c.as_str() {
        "avx2_time" => "avx_time".to_string(),
        _ => c,
    }
}
