//! Reduction of raw trial samples into per-degree statistics.

use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{StatsError, ValidationError};
use crate::model::{Sample, StatRow};
use crate::storage::raw_table::RawTable;

pub const REQUIRED_COLUMNS: [&str; 4] = ["valid", "degree", "scalar_time", "avx_time"];

/// Loads and type-checks a raw samples table, sorted by degree.
pub fn load_samples(path: &Path) -> Result<Vec<Sample>, StatsError> {
    let table = RawTable::load(path)?;
    samples_from_table(&table)
}

pub fn samples_from_table(table: &RawTable) -> Result<Vec<Sample>, StatsError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| table.column_index(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError {
            missing,
            found: table.columns.clone(),
        }
        .into());
    }

    // all present, checked above
    let idx = |name: &str| table.column_index(name).unwrap_or_default();
    let (i_valid, i_degree, i_scalar, i_avx) = (
        idx("valid"),
        idx("degree"),
        idx("scalar_time"),
        idx("avx_time"),
    );

    let mut samples = Vec::with_capacity(table.rows.len());
    for (line, cells) in &table.rows {
        let line = *line;
        let valid = parse_int(cell(cells, i_valid, line, "valid")?, line, "valid")?;
        let degree = parse_int(cell(cells, i_degree, line, "degree")?, line, "degree")?;
        let scalar_time =
            parse_float(cell(cells, i_scalar, line, "scalar_time")?, line, "scalar_time")?;
        let avx_time = parse_float(cell(cells, i_avx, line, "avx_time")?, line, "avx_time")?;

        samples.push(Sample {
            valid: valid == 1,
            degree,
            scalar_time,
            avx_time,
        });
    }

    samples.sort_by_key(|s| s.degree);
    Ok(samples)
}

fn cell<'a>(cells: &'a [String], i: usize, line: usize, column: &str) -> Result<&'a str, StatsError> {
    cells
        .get(i)
        .map(String::as_str)
        .ok_or_else(|| StatsError::Malformed {
            line,
            column: column.to_string(),
            value: String::new(),
        })
}

fn parse_int(raw: &str, line: usize, column: &str) -> Result<i64, StatsError> {
    let malformed = || StatsError::Malformed {
        line,
        column: column.to_string(),
        value: raw.to_string(),
    };
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    // tolerate integral floats such as "1.0"
    let f: f64 = raw.parse().map_err(|_| malformed())?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Ok(f as i64)
    } else {
        Err(malformed())
    }
}

/// Times must be finite; `nan` or `inf` in a time column is malformed.
fn parse_float(raw: &str, line: usize, column: &str) -> Result<f64, StatsError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(StatsError::Malformed {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Min / mean / sample standard deviation of one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub min: f64,
    pub mean: f64,
    pub std: f64,
}

impl Moments {
    /// Values are sorted first so the result does not depend on input order.
    /// A single value has an undefined sample deviation, reported as 0.0.
    pub fn of(values: &mut [f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let n = values.len() as f64;
        let min = values[0];
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() > 1 {
            let ss: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        let std = if std.is_finite() { std } else { 0.0 };

        Some(Self { min, mean, std })
    }
}

#[derive(Default)]
struct Series {
    scalar: Vec<f64>,
    avx: Vec<f64>,
}

/// Groups valid samples by degree and reduces each group to a [`StatRow`].
#[derive(Default)]
pub struct Aggregator {
    groups: BTreeMap<i64, Series>,
    skipped_invalid: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, s: &Sample) {
        if !s.valid {
            self.skipped_invalid += 1;
            return;
        }
        let g = self.groups.entry(s.degree).or_default();
        g.scalar.push(s.scalar_time);
        g.avx.push(s.avx_time);
    }

    pub fn skipped_invalid(&self) -> usize {
        self.skipped_invalid
    }

    pub fn finish(self) -> Vec<StatRow> {
        if self.groups.is_empty() {
            tracing::warn!(
                skipped_invalid = self.skipped_invalid,
                "no valid rows found in input data"
            );
            return Vec::new();
        }

        // BTreeMap iteration is already ascending by degree
        self.groups
            .into_iter()
            .filter_map(|(degree, mut g)| {
                let scalar = Moments::of(&mut g.scalar)?;
                let avx = Moments::of(&mut g.avx)?;
                Some(StatRow {
                    degree,
                    scalar_time_min: scalar.min,
                    scalar_time_mean: scalar.mean,
                    scalar_time_std: scalar.std,
                    avx_time_min: avx.min,
                    avx_time_mean: avx.mean,
                    avx_time_std: avx.std,
                    speedup: if avx.min > 0.0 {
                        scalar.min / avx.min
                    } else {
                        0.0
                    },
                })
            })
            .collect()
    }
}

pub fn compute_stats(samples: &[Sample]) -> Vec<StatRow> {
    let mut agg = Aggregator::new();
    for s in samples {
        agg.push(s);
    }
    agg.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(valid: bool, degree: i64, scalar: f64, avx: f64) -> Sample {
        Sample {
            valid,
            degree,
            scalar_time: scalar,
            avx_time: avx,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_two_samples_for_one_degree() {
        let rows = compute_stats(&[s(true, 127, 0.002, 0.0005), s(true, 127, 0.003, 0.0006)]);
        assert_eq!(rows.len(), 1);
        let r = rows[0];
        assert_eq!(r.degree, 127);
        assert!(close(r.scalar_time_min, 0.002));
        assert!(close(r.scalar_time_mean, 0.0025));
        assert!(close(r.avx_time_min, 0.0005));
        assert!(close(r.avx_time_mean, 0.00055));
        assert!(close(r.speedup, 4.0));
        // sample std of {0.002, 0.003} = 0.0005 * sqrt(2)
        assert!(close(r.scalar_time_std, 0.0005 * 2f64.sqrt()));
    }

    #[test]
    fn test_single_sample_has_zero_std() {
        let rows = compute_stats(&[s(true, 255, 0.01, 0.002)]);
        assert_eq!(rows[0].scalar_time_std, 0.0);
        assert_eq!(rows[0].avx_time_std, 0.0);
    }

    #[test]
    fn test_zero_avx_min_gives_zero_speedup() {
        let rows = compute_stats(&[s(true, 511, 0.01, 0.0), s(true, 511, 0.02, 0.001)]);
        assert_eq!(rows[0].speedup, 0.0);
    }

    #[test]
    fn test_invalid_rows_are_filtered() {
        let mut agg = Aggregator::new();
        agg.push(&s(false, 127, 100.0, 100.0));
        agg.push(&s(true, 127, 0.002, 0.0005));
        assert_eq!(agg.skipped_invalid(), 1);
        let rows = agg.finish();
        assert_eq!(rows.len(), 1);
        assert!(close(rows[0].scalar_time_min, 0.002));
    }

    #[test]
    fn test_no_valid_rows_yields_empty_summary() {
        let rows = compute_stats(&[s(false, 127, 1.0, 1.0)]);
        assert!(rows.is_empty());
        assert!(compute_stats(&[]).is_empty());
    }

    #[test]
    fn test_output_sorted_and_order_independent() {
        let a = vec![
            s(true, 1023, 0.5, 0.1),
            s(true, 127, 0.1, 0.05),
            s(true, 1023, 0.7, 0.2),
            s(true, 127, 0.3, 0.01),
        ];
        let mut b = a.clone();
        b.reverse();
        let ra = compute_stats(&a);
        let rb = compute_stats(&b);
        assert_eq!(ra, rb);
        assert_eq!(ra.iter().map(|r| r.degree).collect::<Vec<_>>(), vec![127, 1023]);
    }

    #[test]
    fn test_missing_columns_reported() {
        let t = RawTable::from_reader("Valid,degree,scalar_time\n1,127,0.1\n".as_bytes()).unwrap();
        match samples_from_table(&t) {
            Err(StatsError::Validation(v)) => {
                assert_eq!(v.missing, vec!["avx_time".to_string()]);
                assert_eq!(v.found, vec!["valid", "degree", "scalar_time"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_coercion_and_sorting() {
        let text = "valid,degree,scalar_time,avx_time,speedup\n\
                    1.0,255,1e-3,5e-4,2.0\n\
                    1,127,0.002000,0.000500,inf\n";
        let t = RawTable::from_reader(text.as_bytes()).unwrap();
        let samples = samples_from_table(&t).unwrap();
        assert_eq!(samples[0].degree, 127);
        assert_eq!(samples[1].degree, 255);
        assert!(samples.iter().all(|s| s.valid));
    }

    #[test]
    fn test_malformed_cell_reports_line() {
        let text = "valid,degree,scalar_time,avx_time\n1,127,0.1,0.1\n1,oops,0.1,0.1\n";
        let t = RawTable::from_reader(text.as_bytes()).unwrap();
        match samples_from_table(&t) {
            Err(StatsError::Malformed { line, column, value }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "degree");
                assert_eq!(value, "oops");
            }
            other => panic!("expected malformed error, got {other:?}"),
        }

        let short = RawTable::from_reader("valid,degree,scalar_time,avx_time\n1,127\n".as_bytes()).unwrap();
        assert!(matches!(
            samples_from_table(&short),
            Err(StatsError::Malformed { line: 2, .. })
        ));
    }

    #[test]
    fn test_non_finite_time_cell_is_malformed() {
        let text = "valid,degree,scalar_time,avx_time\n1,127,0.1,0.1\n1,127,nan,0.1\n";
        let t = RawTable::from_reader(text.as_bytes()).unwrap();
        match samples_from_table(&t) {
            Err(StatsError::Malformed { line, column, value }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "scalar_time");
                assert_eq!(value, "nan");
            }
            other => panic!("expected malformed error, got {other:?}"),
        }

        let text = "valid,degree,scalar_time,avx_time\n1,127,0.1,inf\n";
        let t = RawTable::from_reader(text.as_bytes()).unwrap();
        assert!(matches!(
            samples_from_table(&t),
            Err(StatsError::Malformed { line: 2, .. })
        ));
    }
}
