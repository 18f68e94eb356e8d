//! Degree/repeat scheduling.
//!
//! Degrees are `base^p - 1` for `p` in `min_exp..=max_exp`. Small problems are
//! cheap, so they get the most repetitions; the budget decays geometrically
//! towards the largest degree and is capped at `max_repeats`.

use serde::{Deserialize, Serialize};

use crate::errors::ScheduleError;
use crate::model::ScheduleEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_base")]
    pub base: u64,
    #[serde(default = "default_min_exp")]
    pub min_exp: u32,
    #[serde(default = "default_max_exp")]
    pub max_exp: u32,
    #[serde(default = "default_min_repeats")]
    pub min_repeats: u32,
    #[serde(default = "default_max_repeats")]
    pub max_repeats: u32,
    /// Multiplier between neighbouring repeat budgets. Defaults to `base²`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth: Option<f64>,
}

fn default_base() -> u64 {
    2
}
fn default_min_exp() -> u32 {
    7
}
fn default_max_exp() -> u32 {
    17
}
fn default_min_repeats() -> u32 {
    3
}
fn default_max_repeats() -> u32 {
    30
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            min_exp: default_min_exp(),
            max_exp: default_max_exp(),
            min_repeats: default_min_repeats(),
            max_repeats: default_max_repeats(),
            growth: None,
        }
    }
}

impl ScheduleConfig {
    pub fn effective_growth(&self) -> f64 {
        self.growth.unwrap_or((self.base as f64).powi(2))
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.base < 2 {
            return Err(ScheduleError::Base(self.base));
        }
        if self.min_exp > self.max_exp {
            return Err(ScheduleError::ExponentRange {
                min: self.min_exp,
                max: self.max_exp,
            });
        }
        if self.min_repeats == 0 || self.min_repeats > self.max_repeats {
            return Err(ScheduleError::RepeatRange {
                min: self.min_repeats,
                max: self.max_repeats,
            });
        }
        let growth = self.effective_growth();
        if !growth.is_finite() || growth < 1.0 {
            return Err(ScheduleError::Growth(growth.to_string()));
        }
        if self.base.checked_pow(self.max_exp).is_none() {
            return Err(ScheduleError::Overflow {
                base: self.base,
                exp: self.max_exp,
            });
        }
        Ok(())
    }

    /// Builds the schedule in ascending-degree order.
    pub fn build(&self) -> Result<Vec<ScheduleEntry>, ScheduleError> {
        self.validate()?;

        let degrees: Vec<u64> = (self.min_exp..=self.max_exp)
            .map(|p| {
                self.base
                    .checked_pow(p)
                    .map(|v| v - 1)
                    .ok_or(ScheduleError::Overflow {
                        base: self.base,
                        exp: p,
                    })
            })
            .collect::<Result<_, _>>()?;

        let repeats = repeat_counts(
            degrees.len(),
            self.min_repeats,
            self.max_repeats,
            self.effective_growth(),
        );

        Ok(degrees
            .into_iter()
            .zip(repeats)
            .map(|(degree, repeat_count)| ScheduleEntry {
                degree,
                repeat_count,
            })
            .collect())
    }
}

/// `min_repeats * growth^i` for `i = 0..count`, reversed so the first
/// (smallest) degree receives the largest value, clipped to `max_repeats`.
pub fn repeat_counts(count: usize, min_repeats: u32, max_repeats: u32, growth: f64) -> Vec<u32> {
    let cap = max_repeats as f64;
    let mut out: Vec<u32> = (0..count)
        .map(|i| {
            // powi saturates to +inf, which min() then clips
            let raw = min_repeats as f64 * growth.powi(i.min(i32::MAX as usize) as i32);
            raw.min(cap).floor() as u32
        })
        .collect();
    out.reverse();
    out
}
