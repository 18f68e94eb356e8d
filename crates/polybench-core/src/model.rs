use serde::{Deserialize, Serialize};

/// One problem size and how many independent trials to run at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub degree: u64,
    pub repeat_count: u32,
}

/// A single measurement reported by the benchmark executable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Correctness check of the vectorized result passed.
    pub valid: bool,
    /// Degree as echoed by the executable, not necessarily the requested one.
    pub degree: i64,
    pub scalar_time: f64,
    pub avx_time: f64,
}

impl Sample {
    /// `scalar_time / avx_time`, or infinity when `avx_time <= 0`.
    pub fn speedup(&self) -> f64 {
        if self.avx_time > 0.0 {
            self.scalar_time / self.avx_time
        } else {
            f64::INFINITY
        }
    }
}

/// A persisted trial: the sample plus its derived speedup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub sample: Sample,
    pub speedup: f64,
}

impl From<Sample> for RawRecord {
    fn from(sample: Sample) -> Self {
        Self {
            speedup: sample.speedup(),
            sample,
        }
    }
}

/// Per-degree summary statistics over valid samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub degree: i64,
    pub scalar_time_min: f64,
    pub scalar_time_mean: f64,
    pub scalar_time_std: f64,
    pub avx_time_min: f64,
    pub avx_time_mean: f64,
    pub avx_time_std: f64,
    pub speedup: f64,
}
