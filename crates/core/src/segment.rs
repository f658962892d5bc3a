#![allow(missing_docs)]

//! Market segments drifting across the perceptual map.

use serde::{Deserialize, Serialize};

use crate::{
    error::{ModelError, ModelResult},
    models::Coords,
};

/// Tolerance applied when checking that importances sum to one.
pub const IMPORTANCE_TOLERANCE: f64 = 1e-7;

/// Yearly erosion of the acceptable price band.
pub const PRICE_DRIFT_PER_YEAR: f64 = 0.5;

/// Desired product age, scored as a Gaussian around `mean`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeCriterion {
    pub mean: f64,
    pub stdev: f64,
    pub importance: f64,
}

/// Acceptable price band in year 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceCriterion {
    pub low: f64,
    pub high: f64,
    pub importance: f64,
}

/// Weight given to distance from the ideal spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionCriterion {
    pub importance: f64,
}

/// Acceptable mean-time-between-failure band, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MtbfCriterion {
    pub low: f64,
    pub high: f64,
    pub importance: f64,
}

/// The four weighted customer buying criteria of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyingCriteria {
    pub age: AgeCriterion,
    pub price: PriceCriterion,
    pub position: PositionCriterion,
    pub mtbf: MtbfCriterion,
}

impl BuyingCriteria {
    /// Sum of the four importances.
    pub fn total_importance(&self) -> f64 {
        self.age.importance + self.price.importance + self.position.importance + self.mtbf.importance
    }

    /// Check the invariants a segment relies on.
    pub fn validate(&self) -> ModelResult<()> {
        let fields = [
            ("age mean", self.age.mean),
            ("age stdev", self.age.stdev),
            ("price low", self.price.low),
            ("price high", self.price.high),
            ("mtbf low", self.mtbf.low),
            ("mtbf high", self.mtbf.high),
        ];
        if let Some((label, value)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ModelError::Configuration(format!(
                "{label} must be finite, got {value}"
            )));
        }

        let importances = [
            ("age", self.age.importance),
            ("price", self.price.importance),
            ("position", self.position.importance),
            ("mtbf", self.mtbf.importance),
        ];
        if let Some((label, value)) = importances
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(ModelError::Configuration(format!(
                "{label} importance must be a non-negative number, got {value}"
            )));
        }

        let total = self.total_importance();
        if (total - 1.0).abs() > IMPORTANCE_TOLERANCE {
            return Err(ModelError::Configuration(format!(
                "criteria importances sum to {total}, expected 1"
            )));
        }

        if self.age.stdev <= 0.0 {
            return Err(ModelError::Configuration(format!(
                "age stdev must be positive, got {}",
                self.age.stdev
            )));
        }
        if self.price.low > self.price.high {
            return Err(ModelError::Configuration(format!(
                "price band is inverted ({} > {})",
                self.price.low, self.price.high
            )));
        }
        if self.mtbf.low > self.mtbf.high {
            return Err(ModelError::Configuration(format!(
                "mtbf band is inverted ({} > {})",
                self.mtbf.low, self.mtbf.high
            )));
        }
        Ok(())
    }
}

/// A customer segment whose centroid moves linearly through time.
///
/// Immutable after construction; every time-dependent quantity is a pure
/// function of the year.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSegment {
    name: String,
    starting_point: Coords,
    offset: Coords,
    drift: Coords,
    criteria: BuyingCriteria,
}

impl MarketSegment {
    /// Build a segment, rejecting criteria that violate their invariants.
    pub fn new(
        name: impl Into<String>,
        starting_point: Coords,
        offset: Coords,
        drift: Coords,
        criteria: BuyingCriteria,
    ) -> ModelResult<Self> {
        let name = name.into();
        criteria
            .validate()
            .map_err(|err| match err {
                ModelError::Configuration(reason) => {
                    ModelError::Configuration(format!("segment '{name}': {reason}"))
                }
                other => other,
            })?;
        Ok(Self {
            name,
            starting_point,
            offset,
            drift,
            criteria,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn criteria(&self) -> &BuyingCriteria {
        &self.criteria
    }

    pub fn starting_point(&self) -> Coords {
        self.starting_point
    }

    /// Displacement of the ideal spot from the centroid.
    pub fn offset(&self) -> Coords {
        self.offset
    }

    /// Centroid velocity per year.
    pub fn drift(&self) -> Coords {
        self.drift
    }

    /// Centroid at year `t`.
    pub fn location(&self, t: f64) -> Coords {
        self.starting_point + self.drift * t
    }

    /// Ideal spot at year `t`.
    pub fn ideal_spot(&self, t: f64) -> Coords {
        self.location(t) + self.offset
    }

    /// Acceptable price band at year `t`.
    ///
    /// Not clamped at zero; a negative band means the segment no longer buys.
    pub fn price_range(&self, t: f64) -> (f64, f64) {
        let erosion = PRICE_DRIFT_PER_YEAR * t;
        (
            self.criteria.price.low - erosion,
            self.criteria.price.high - erosion,
        )
    }

    /// Acceptable MTBF band, identical every year.
    pub fn reliability_range(&self, _t: f64) -> (f64, f64) {
        (self.criteria.mtbf.low, self.criteria.mtbf.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> BuyingCriteria {
        BuyingCriteria {
            age: AgeCriterion {
                mean: 7.0,
                stdev: 1.5,
                importance: 0.24,
            },
            price: PriceCriterion {
                low: 15.0,
                high: 25.0,
                importance: 0.53,
            },
            position: PositionCriterion { importance: 0.07 },
            mtbf: MtbfCriterion {
                low: 12000.0,
                high: 17000.0,
                importance: 0.16,
            },
        }
    }

    fn low_end() -> MarketSegment {
        MarketSegment::new(
            "Low End",
            Coords::new(2.5, 17.5),
            Coords::new(-0.8, 0.8),
            Coords::new(0.5, -0.5),
            criteria(),
        )
        .expect("valid segment")
    }

    #[test]
    fn location_and_ideal_spot_follow_drift() {
        let segment = low_end();
        assert!(segment.location(10.0).approx_eq(Coords::new(7.5, 12.5), 1e-9));
        assert!(segment
            .ideal_spot(10.0)
            .approx_eq(Coords::new(6.7, 13.3), 1e-9));
        assert!(segment
            .ideal_spot(0.0)
            .approx_eq(Coords::new(1.7, 18.3), 1e-9));
    }

    #[test]
    fn drift_is_linear_between_any_two_years() {
        let segment = low_end();
        for (t1, t2) in [(0.0, 1.0), (2.0, 7.5), (3.0, 10.0)] {
            let expected = segment.location(t1) + segment.drift() * (t2 - t1);
            assert!(segment.location(t2).approx_eq(expected, 1e-9));
        }
    }

    #[test]
    fn price_range_erodes_half_a_unit_per_year() {
        let segment = low_end();
        assert_eq!(segment.price_range(0.0), (15.0, 25.0));
        assert_eq!(segment.price_range(4.0), (13.0, 23.0));
        let (low, high) = segment.price_range(60.0);
        assert!(low < 0.0 && high < 0.0);
    }

    #[test]
    fn reliability_range_is_time_invariant() {
        let segment = low_end();
        assert_eq!(segment.reliability_range(0.0), (12000.0, 17000.0));
        assert_eq!(segment.reliability_range(9.0), (12000.0, 17000.0));
    }

    #[test]
    fn rejects_importances_not_summing_to_one() {
        let mut bad = criteria();
        bad.price.importance = 0.5;
        let err = MarketSegment::new(
            "Broken",
            Coords::new(1.0, 1.0),
            Coords::default(),
            Coords::default(),
            bad,
        )
        .unwrap_err();
        match err {
            ModelError::Configuration(reason) => assert!(reason.contains("Broken")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn accepts_sum_within_tolerance() {
        let mut nearly = criteria();
        nearly.mtbf.importance += 5e-8;
        assert!(nearly.validate().is_ok());
        nearly.mtbf.importance += 1e-6;
        assert!(nearly.validate().is_err());
    }

    #[test]
    fn rejects_degenerate_bands() {
        let mut flat = criteria();
        flat.age.stdev = 0.0;
        assert!(flat.validate().is_err());

        let mut inverted = criteria();
        inverted.price.low = 30.0;
        assert!(inverted.validate().is_err());

        let mut negative = criteria();
        negative.position.importance = -0.07;
        negative.price.importance = 0.67;
        assert!(negative.validate().is_err());
    }

    #[test]
    fn rejects_nan_and_infinite_criteria() {
        let mut nan_importance = criteria();
        nan_importance.age.importance = f64::NAN;
        let built = MarketSegment::new(
            "NaN",
            Coords::new(1.0, 1.0),
            Coords::default(),
            Coords::default(),
            nan_importance,
        );
        assert!(matches!(built, Err(ModelError::Configuration(_))));

        let mut nan_stdev = criteria();
        nan_stdev.age.stdev = f64::NAN;
        assert!(nan_stdev.validate().is_err());

        let mut open_band = criteria();
        open_band.price.high = f64::INFINITY;
        assert!(open_band.validate().is_err());
    }
}
