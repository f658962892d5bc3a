//! Per-year value storage with carry-forward writes.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Fixed-length store holding one value per simulated year.
///
/// Index 0 is the initial year. The length is chosen at construction and
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalSeries {
    values: Vec<f64>,
}

impl TemporalSeries {
    /// Broadcast `value` across `num_years` slots.
    pub fn constant(value: f64, num_years: usize) -> ModelResult<Self> {
        if num_years == 0 {
            return Err(ModelError::Configuration(
                "a series needs at least one year".to_string(),
            ));
        }
        Ok(Self {
            values: vec![value; num_years],
        })
    }

    /// Series counting up by one per year, starting at `start` in year 0.
    pub fn ramp(start: f64, num_years: usize) -> ModelResult<Self> {
        let mut series = Self::constant(start, num_years)?;
        series.ramp_from(0, start);
        Ok(series)
    }

    /// Number of years held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; a series holds at least one year.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at year `t`.
    pub fn get(&self, t: usize) -> ModelResult<f64> {
        self.values
            .get(t)
            .copied()
            .ok_or(ModelError::OutOfRange {
                year: t,
                len: self.values.len(),
            })
    }

    /// Overwrite year `t` and every later year with `value`.
    ///
    /// Years before `t` are left untouched. A `t` past the end writes nothing.
    pub fn set_from(&mut self, t: usize, value: f64) {
        if let Some(tail) = self.values.get_mut(t..) {
            tail.fill(value);
        }
    }

    /// Restart a counting trajectory: `start` at `t`, `start + 1` at `t + 1`, ...
    pub fn ramp_from(&mut self, t: usize, start: f64) {
        if let Some(tail) = self.values.get_mut(t..) {
            for (offset, slot) in tail.iter_mut().enumerate() {
                *slot = start + offset as f64;
            }
        }
    }

    /// Borrow every yearly value.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Convert a signed year coming from user input into an index.
pub fn checked_year(t: i64) -> ModelResult<usize> {
    usize::try_from(t).map_err(|_| ModelError::InvalidArgument(format!("negative year {t}")))
}
