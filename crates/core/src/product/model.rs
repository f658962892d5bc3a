use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{ModelError, ModelResult},
    models::Coords,
    series::TemporalSeries,
};

use super::notify::{ChangeNotification, Listener, Listeners, SubscriptionId};

/// Attribute changes applied from a given year onwards.
///
/// Unset fields keep their current trajectory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsUpdate {
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub performance: Option<f64>,
    /// Restarts the age clock: `age` at the edit year, `age + 1` the year after.
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub mtbf: Option<f64>,
}

impl StatsUpdate {
    pub fn size(mut self, value: f64) -> Self {
        self.size = Some(value);
        self
    }

    pub fn performance(mut self, value: f64) -> Self {
        self.performance = Some(value);
        self
    }

    pub fn age(mut self, value: f64) -> Self {
        self.age = Some(value);
        self
    }

    pub fn price(mut self, value: f64) -> Self {
        self.price = Some(value);
        self
    }

    pub fn mtbf(mut self, value: f64) -> Self {
        self.mtbf = Some(value);
        self
    }

    /// True when no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.size.is_none()
            && self.performance.is_none()
            && self.age.is_none()
            && self.price.is_none()
            && self.mtbf.is_none()
    }
}

/// A product tracked across every simulated year.
///
/// All series share the same length. Age counts up by one per year unless an
/// update restarts it.
pub struct Product {
    name: String,
    size: TemporalSeries,
    performance: TemporalSeries,
    age: TemporalSeries,
    price: TemporalSeries,
    mtbf: TemporalSeries,
    alive: bool,
    current_year: usize,
    listeners: Listeners,
}

impl Product {
    /// Create a product whose initial attributes hold for every year.
    ///
    /// Price starts at zero; see [`Product::with_price`].
    pub fn new(
        name: impl Into<String>,
        size: f64,
        performance: f64,
        mtbf: f64,
        num_years: usize,
    ) -> ModelResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::Configuration(
                "product name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name,
            size: TemporalSeries::constant(size, num_years)?,
            performance: TemporalSeries::constant(performance, num_years)?,
            age: TemporalSeries::ramp(0.0, num_years)?,
            price: TemporalSeries::constant(0.0, num_years)?,
            mtbf: TemporalSeries::constant(mtbf, num_years)?,
            alive: true,
            current_year: 0,
            listeners: Listeners::default(),
        })
    }

    /// Set the launch price for every year.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price.set_from(0, price);
        self
    }

    /// Set the age held in year 0; later years count up from it.
    pub fn with_initial_age(mut self, age: f64) -> Self {
        self.age.ramp_from(0, age);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_years(&self) -> usize {
        self.size.len()
    }

    pub fn current_year(&self) -> usize {
        self.current_year
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Take the product out of production. Queries keep working.
    pub fn retire(&mut self) {
        debug!(product = %self.name, "retiring product");
        self.alive = false;
    }

    /// Move the current-year pointer and notify listeners of a time change.
    pub fn update_time(&mut self, t: usize) -> ModelResult<()> {
        self.ensure_year(t)?;
        self.current_year = t;
        debug!(product = %self.name, year = t, "product year changed");
        self.notify(t, true)
    }

    /// Apply carry-forward writes from year `t` and notify listeners.
    pub fn update_stats(&mut self, t: usize, update: StatsUpdate) -> ModelResult<()> {
        if update.is_empty() {
            return Err(ModelError::InvalidArgument(format!(
                "update for '{}' sets no attribute",
                self.name
            )));
        }
        self.ensure_year(t)?;

        if let Some(size) = update.size {
            self.size.set_from(t, size);
        }
        if let Some(performance) = update.performance {
            self.performance.set_from(t, performance);
        }
        if let Some(age) = update.age {
            self.age.ramp_from(t, age);
        }
        if let Some(price) = update.price {
            self.price.set_from(t, price);
        }
        if let Some(mtbf) = update.mtbf {
            self.mtbf.set_from(t, mtbf);
        }
        debug!(product = %self.name, year = t, ?update, "product stats updated");
        self.notify(t, false)
    }

    pub fn performance(&self, t: Option<usize>) -> ModelResult<f64> {
        self.performance.get(self.year_or_current(t))
    }

    pub fn size(&self, t: Option<usize>) -> ModelResult<f64> {
        self.size.get(self.year_or_current(t))
    }

    pub fn age(&self, t: Option<usize>) -> ModelResult<f64> {
        self.age.get(self.year_or_current(t))
    }

    pub fn price(&self, t: Option<usize>) -> ModelResult<f64> {
        self.price.get(self.year_or_current(t))
    }

    pub fn mtbf(&self, t: Option<usize>) -> ModelResult<f64> {
        self.mtbf.get(self.year_or_current(t))
    }

    /// `(performance, size)` at year `t`, or the current year.
    pub fn coords(&self, t: Option<usize>) -> ModelResult<Coords> {
        Ok(Coords::new(self.performance(t)?, self.size(t)?))
    }

    /// Register a listener; it is called on every later mutation.
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    /// Detach a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    fn year_or_current(&self, t: Option<usize>) -> usize {
        t.unwrap_or(self.current_year)
    }

    fn ensure_year(&self, t: usize) -> ModelResult<()> {
        if t >= self.num_years() {
            return Err(ModelError::OutOfRange {
                year: t,
                len: self.num_years(),
            });
        }
        Ok(())
    }

    fn notify(&mut self, t: usize, is_time_change: bool) -> ModelResult<()> {
        let notification = ChangeNotification {
            entity_name: self.name.clone(),
            year: t,
            coords: self.coords(Some(t))?,
            age: self.age.get(t)?,
            is_time_change,
        };
        if !self.listeners.is_empty() {
            debug!(
                product = %self.name,
                listeners = self.listeners.len(),
                "publishing change notification"
            );
        }
        self.listeners.publish(&notification);
        Ok(())
    }
}

impl fmt::Debug for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Product")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("performance", &self.performance)
            .field("age", &self.age)
            .field("price", &self.price)
            .field("mtbf", &self.mtbf)
            .field("alive", &self.alive)
            .field("current_year", &self.current_year)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
