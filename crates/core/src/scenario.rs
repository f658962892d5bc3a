#![allow(missing_docs)]

//! Scenario files: segment geometry, buying criteria and starting products.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{ModelError, ModelResult},
    models::Coords,
    product::{Product, ProductRegistry, StatsUpdate},
    segment::{
        AgeCriterion, BuyingCriteria, MarketSegment, MtbfCriterion, PositionCriterion,
        PriceCriterion,
    },
    series::checked_year,
    simulation::Simulation,
};

/// Setup data for one market segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub name: String,
    pub starting_point: Coords,
    #[serde(default)]
    pub offset: Coords,
    pub drift: Coords,
    pub criteria: BuyingCriteria,
}

impl SegmentSpec {
    pub fn build(&self) -> ModelResult<MarketSegment> {
        MarketSegment::new(
            self.name.clone(),
            self.starting_point,
            self.offset,
            self.drift,
            self.criteria,
        )
    }
}

/// Setup data for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSpec {
    pub name: String,
    pub performance: f64,
    pub size: f64,
    pub mtbf: f64,
    #[serde(default)]
    pub price: f64,
    /// Age in year 0.
    #[serde(default)]
    pub age: f64,
}

impl ProductSpec {
    pub fn build(&self, num_years: usize) -> ModelResult<Product> {
        Ok(
            Product::new(self.name.clone(), self.size, self.performance, self.mtbf, num_years)?
                .with_price(self.price)
                .with_initial_age(self.age),
        )
    }
}

/// A planned design change applied when the driver reaches `year`.
///
/// The year is signed so malformed files surface as an argument error instead
/// of a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEdit {
    pub product: String,
    pub year: i64,
    #[serde(flatten)]
    pub update: StatsUpdate,
}

impl ScheduledEdit {
    /// Validated year index for this edit.
    pub fn year(&self) -> ModelResult<usize> {
        checked_year(self.year)
    }
}

/// Everything needed to start a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub segments: Vec<SegmentSpec>,
    #[serde(default)]
    pub products: Vec<ProductSpec>,
    #[serde(default)]
    pub edits: Vec<ScheduledEdit>,
}

impl Scenario {
    /// Read a scenario from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse scenario {}", path.display()))?;
        info!(
            segments = scenario.segments.len(),
            products = scenario.products.len(),
            "loaded scenario from {}",
            path.display()
        );
        Ok(scenario)
    }

    /// Write the scenario as pretty JSON.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialized =
            serde_json::to_string_pretty(self).context("failed to serialize scenario")?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write scenario {}", path.display()))
    }

    /// Validate the setup data and assemble a simulation spanning `num_years`.
    ///
    /// Every scheduled edit must name a known product and fall inside the
    /// horizon, so nothing is skipped once the years start running.
    pub fn build(&self, num_years: usize) -> ModelResult<Simulation> {
        let segments = self
            .segments
            .iter()
            .map(SegmentSpec::build)
            .collect::<ModelResult<Vec<_>>>()?;

        let mut products = ProductRegistry::new();
        for spec in &self.products {
            products.insert(spec.build(num_years)?)?;
        }

        for edit in &self.edits {
            let year = edit.year()?;
            if year >= num_years {
                return Err(ModelError::OutOfRange {
                    year,
                    len: num_years,
                });
            }
            if !products.contains(&edit.product) {
                return Err(ModelError::NotFound(edit.product.clone()));
            }
        }

        Simulation::new(num_years, segments, products)
    }

    /// Edits scheduled for year `t`, in file order.
    pub fn edits_for(&self, t: usize) -> ModelResult<Vec<&ScheduledEdit>> {
        let mut due = Vec::new();
        for edit in &self.edits {
            if edit.year()? == t {
                due.push(edit);
            }
        }
        Ok(due)
    }

    /// The five standard segments with one starter product each.
    pub fn builtin() -> Self {
        Self {
            segments: vec![
                segment(
                    "Low End",
                    (2.5, 17.5),
                    (-0.8, 0.8),
                    (0.5, -0.5),
                    criteria(
                        (7.0, 1.5, 0.24),
                        (15.0, 25.0, 0.53),
                        0.07,
                        (12000.0, 17000.0, 0.16),
                    ),
                ),
                segment(
                    "Traditional",
                    (5.0, 15.0),
                    (0.0, 0.0),
                    (0.7, -0.7),
                    criteria(
                        (2.0, 1.0, 0.47),
                        (20.0, 30.0, 0.23),
                        0.21,
                        (14000.0, 19000.0, 0.09),
                    ),
                ),
                segment(
                    "High End",
                    (7.5, 12.5),
                    (1.4, -1.4),
                    (0.9, -0.9),
                    criteria(
                        (0.0, 1.0, 0.29),
                        (30.0, 40.0, 0.09),
                        0.43,
                        (20000.0, 25000.0, 0.19),
                    ),
                ),
                segment(
                    "Performance",
                    (8.0, 17.0),
                    (1.4, -1.0),
                    (1.0, -0.7),
                    criteria(
                        (1.0, 1.0, 0.09),
                        (25.0, 35.0, 0.19),
                        0.29,
                        (22000.0, 27000.0, 0.43),
                    ),
                ),
                segment(
                    "Size",
                    (3.0, 12.0),
                    (1.0, -1.4),
                    (0.7, -1.0),
                    criteria(
                        (1.5, 1.0, 0.29),
                        (25.0, 35.0, 0.09),
                        0.43,
                        (16000.0, 21000.0, 0.19),
                    ),
                ),
            ],
            products: vec![
                product("Cedar", 3.0, 17.0, 14000.0, 21.0, 5.0),
                product("Cake", 5.6, 14.5, 17500.0, 28.0, 2.0),
                product("Cell", 8.0, 12.0, 23000.0, 38.0, 1.0),
                product("Coat", 9.4, 15.5, 27000.0, 33.0, 1.5),
                product("Cure", 4.0, 11.0, 21000.0, 33.0, 1.5),
            ],
            edits: Vec::new(),
        }
    }
}

fn segment(
    name: &str,
    starting_point: (f64, f64),
    offset: (f64, f64),
    drift: (f64, f64),
    criteria: BuyingCriteria,
) -> SegmentSpec {
    SegmentSpec {
        name: name.to_string(),
        starting_point: starting_point.into(),
        offset: offset.into(),
        drift: drift.into(),
        criteria,
    }
}

fn criteria(
    (age_mean, age_stdev, age_importance): (f64, f64, f64),
    (price_low, price_high, price_importance): (f64, f64, f64),
    position_importance: f64,
    (mtbf_low, mtbf_high, mtbf_importance): (f64, f64, f64),
) -> BuyingCriteria {
    BuyingCriteria {
        age: AgeCriterion {
            mean: age_mean,
            stdev: age_stdev,
            importance: age_importance,
        },
        price: PriceCriterion {
            low: price_low,
            high: price_high,
            importance: price_importance,
        },
        position: PositionCriterion {
            importance: position_importance,
        },
        mtbf: MtbfCriterion {
            low: mtbf_low,
            high: mtbf_high,
            importance: mtbf_importance,
        },
    }
}

fn product(
    name: &str,
    performance: f64,
    size: f64,
    mtbf: f64,
    price: f64,
    age: f64,
) -> ProductSpec {
    ProductSpec {
        name: name.to_string(),
        performance,
        size,
        mtbf,
        price,
        age,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_scenario_builds() -> Result<()> {
        let sim = Scenario::builtin().build(11)?;
        assert_eq!(sim.segments().len(), 5);
        assert_eq!(sim.products().len(), 5);

        let low_end = sim.segment("Low End")?;
        assert!(low_end.location(10.0).approx_eq(Coords::new(7.5, 12.5), 1e-9));
        assert!(low_end.ideal_spot(10.0).approx_eq(Coords::new(6.7, 13.3), 1e-9));

        let cake = sim.product("Cake")?;
        assert_eq!(cake.performance(Some(0))?, 5.6);
        assert_eq!(cake.size(Some(0))?, 14.5);
        assert_eq!(cake.mtbf(Some(0))?, 17500.0);
        assert_eq!(cake.age(Some(3))?, 5.0);
        Ok(())
    }

    #[test]
    fn builtin_segments_stay_in_positive_quadrant() {
        for spec in Scenario::builtin().segments {
            let segment = spec.build().expect("valid segment");
            for t in 0..11 {
                assert!(segment.location(t as f64).is_positive(), "{} at {t}", spec.name);
            }
        }
    }

    #[test]
    fn load_round_trips_through_json() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("scenarios/builtin.json");
        let scenario = Scenario::builtin();
        scenario.persist(&path)?;

        let loaded = Scenario::load(&path)?;
        assert_eq!(loaded, scenario);
        Ok(())
    }

    #[test]
    fn parses_minimal_file_with_edits() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("scenario.json");
        fs::write(
            &path,
            r#"{
  "segments": [{
    "name": "Traditional",
    "starting_point": [5.0, 15.0],
    "drift": [0.7, -0.7],
    "criteria": {
      "age": { "mean": 2.0, "stdev": 1.0, "importance": 0.47 },
      "price": { "low": 20.0, "high": 30.0, "importance": 0.23 },
      "position": { "importance": 0.21 },
      "mtbf": { "low": 14000.0, "high": 19000.0, "importance": 0.09 }
    }
  }],
  "products": [{ "name": "Cake", "performance": 5.6, "size": 14.5, "mtbf": 17500.0 }],
  "edits": [{ "product": "Cake", "year": 3, "performance": 6.0 }]
}"#,
        )?;

        let scenario = Scenario::load(&path)?;
        assert_eq!(scenario.segments[0].offset, Coords::default());
        assert_eq!(scenario.products[0].price, 0.0);

        let due = scenario.edits_for(3)?;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].update, StatsUpdate::default().performance(6.0));
        assert!(scenario.edits_for(2)?.is_empty());
        Ok(())
    }

    #[test]
    fn bad_importances_fail_the_build() {
        let mut scenario = Scenario::builtin();
        scenario.segments[0].criteria.price.importance = 0.9;
        assert!(matches!(
            scenario.build(11),
            Err(ModelError::Configuration(_))
        ));
    }

    #[test]
    fn duplicate_products_fail_the_build() {
        let mut scenario = Scenario::builtin();
        let dup = scenario.products[0].clone();
        scenario.products.push(dup);
        assert!(scenario.build(11).is_err());
    }

    #[test]
    fn negative_edit_year_is_invalid() {
        let mut scenario = Scenario::builtin();
        scenario.edits.push(ScheduledEdit {
            product: "Cake".to_string(),
            year: -2,
            update: StatsUpdate::default().size(13.0),
        });
        assert!(matches!(
            scenario.edits_for(0),
            Err(ModelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn edit_past_horizon_fails_the_build() {
        let mut scenario = Scenario::builtin();
        scenario.edits.push(ScheduledEdit {
            product: "Cake".to_string(),
            year: 15,
            update: StatsUpdate::default().size(13.0),
        });
        assert_eq!(
            scenario.build(11).unwrap_err(),
            ModelError::OutOfRange { year: 15, len: 11 }
        );
        assert!(scenario.build(16).is_ok());
    }

    #[test]
    fn edit_for_unknown_product_fails_the_build() {
        let mut scenario = Scenario::builtin();
        scenario.edits.push(ScheduledEdit {
            product: "Able".to_string(),
            year: 2,
            update: StatsUpdate::default().performance(7.0),
        });
        assert_eq!(
            scenario.build(11).unwrap_err(),
            ModelError::NotFound("Able".to_string())
        );
    }

    #[test]
    fn negative_edit_year_fails_the_build() {
        let mut scenario = Scenario::builtin();
        scenario.edits.push(ScheduledEdit {
            product: "Cake".to_string(),
            year: -1,
            update: StatsUpdate::default().size(13.0),
        });
        assert!(matches!(
            scenario.build(11),
            Err(ModelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Scenario::load("/nonexistent/scenario.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scenario.json"));
    }
}
