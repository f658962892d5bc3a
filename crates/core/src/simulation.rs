#![allow(missing_docs)]

//! Controller tying segments and products together along the year axis.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::{ModelError, ModelResult},
    product::{Listener, Product, ProductRegistry, StatsUpdate, SubscriptionId},
    scoring::{self, ScoreBreakdown},
    segment::MarketSegment,
};

/// Score of one product in one segment for a given year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    pub product: String,
    pub segment: String,
    pub year: usize,
    pub breakdown: ScoreBreakdown,
}

/// The simulated market: drifting segments plus the competing products.
///
/// This is the only entry point a front end needs: it advances time, applies
/// edits and runs the customer survey.
#[derive(Debug)]
pub struct Simulation {
    num_years: usize,
    current_year: usize,
    segments: Vec<MarketSegment>,
    products: ProductRegistry,
}

impl Simulation {
    /// Assemble a simulation; every product must span `num_years`.
    pub fn new(
        num_years: usize,
        segments: Vec<MarketSegment>,
        products: ProductRegistry,
    ) -> ModelResult<Self> {
        if num_years == 0 {
            return Err(ModelError::Configuration(
                "a simulation needs at least one year".to_string(),
            ));
        }
        for (index, segment) in segments.iter().enumerate() {
            if segments[..index]
                .iter()
                .any(|other| other.name() == segment.name())
            {
                return Err(ModelError::Configuration(format!(
                    "duplicate segment name '{}'",
                    segment.name()
                )));
            }
        }
        if let Some(product) = products.iter().find(|p| p.num_years() != num_years) {
            return Err(ModelError::Configuration(format!(
                "product '{}' spans {} years, simulation spans {num_years}",
                product.name(),
                product.num_years()
            )));
        }

        info!(
            num_years,
            segments = segments.len(),
            products = products.len(),
            "simulation ready"
        );
        Ok(Self {
            num_years,
            current_year: 0,
            segments,
            products,
        })
    }

    pub fn num_years(&self) -> usize {
        self.num_years
    }

    pub fn current_year(&self) -> usize {
        self.current_year
    }

    pub fn segments(&self) -> &[MarketSegment] {
        &self.segments
    }

    pub fn products(&self) -> &ProductRegistry {
        &self.products
    }

    pub fn segment(&self, name: &str) -> ModelResult<&MarketSegment> {
        self.segments
            .iter()
            .find(|segment| segment.name() == name)
            .ok_or_else(|| ModelError::NotFound(name.to_string()))
    }

    pub fn product(&self, name: &str) -> ModelResult<&Product> {
        self.products.get(name)
    }

    /// Attach a listener to the named product.
    pub fn subscribe(&mut self, name: &str, listener: Listener) -> ModelResult<SubscriptionId> {
        self.products.subscribe(name, listener)
    }

    pub fn unsubscribe(&mut self, name: &str, id: SubscriptionId) -> ModelResult<bool> {
        Ok(self.products.get_mut(name)?.unsubscribe(id))
    }

    /// Move every product to year `t`, in registration order.
    pub fn advance_to(&mut self, t: usize) -> ModelResult<()> {
        if t >= self.num_years {
            return Err(ModelError::OutOfRange {
                year: t,
                len: self.num_years,
            });
        }
        debug!(from = self.current_year, to = t, "advancing simulation");
        for product in self.products.iter_mut() {
            product.update_time(t)?;
        }
        self.current_year = t;
        Ok(())
    }

    /// Apply a single product edit from year `t` onwards.
    pub fn edit(&mut self, name: &str, t: usize, update: StatsUpdate) -> ModelResult<()> {
        self.products.get_mut(name)?.update_stats(t, update)
    }

    /// Take a product out of the survey.
    pub fn retire(&mut self, name: &str) -> ModelResult<()> {
        self.products.get_mut(name)?.retire();
        Ok(())
    }

    /// Score every live product against every segment at year `t`.
    ///
    /// Cards are ordered by product registration order, then segment order.
    pub fn survey(&self, t: usize) -> ModelResult<Vec<ScoreCard>> {
        let mut cards = Vec::with_capacity(self.products.len() * self.segments.len());
        for product in self.products.iter().filter(|p| p.is_alive()) {
            for segment in &self.segments {
                cards.push(ScoreCard {
                    product: product.name().to_string(),
                    segment: segment.name().to_string(),
                    year: t,
                    breakdown: scoring::score_breakdown(product, segment, t)?,
                });
            }
        }
        Ok(cards)
    }

    /// Segment in which the named product scores highest at year `t`.
    ///
    /// Returns `None` when there are no segments.
    pub fn best_segment(&self, name: &str, t: usize) -> ModelResult<Option<ScoreCard>> {
        let product = self.products.get(name)?;
        let mut best: Option<ScoreCard> = None;
        for segment in &self.segments {
            let breakdown = scoring::score_breakdown(product, segment, t)?;
            let better = best
                .as_ref()
                .map(|card| breakdown.total > card.breakdown.total)
                .unwrap_or(true);
            if better {
                best = Some(ScoreCard {
                    product: product.name().to_string(),
                    segment: segment.name().to_string(),
                    year: t,
                    breakdown,
                });
            }
        }
        Ok(best)
    }
}
