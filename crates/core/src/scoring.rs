//! Customer survey scoring of a product against a segment.
//!
//! Each criterion yields a sub-score in `[0, 1]`; the total is the
//! importance-weighted sum, so it also stays within `[0, 1]`. Everything here is
//! a pure function of its inputs.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{ModelError, ModelResult},
    models::Coords,
    product::Product,
    segment::MarketSegment,
};

/// Decay base shared by the price, MTBF and positioning fine cuts.
pub const FINE_CUT_BASE: f64 = 0.8;
/// Price distance outside the band beyond which a segment will not buy.
pub const PRICE_ROUGH_CUT: f64 = 5.0;
/// MTBF shortfall below the desired value beyond which a segment will not buy.
pub const MTBF_ROUGH_CUT: f64 = 5000.0;
/// MTBF hours per unit of fine-cut decay.
pub const MTBF_DECAY_UNIT: f64 = 1000.0;
/// Radius around the centroid within which positioning saturates.
pub const FINE_CUT_RADIUS: f64 = 2.5;
/// Radius around the centroid beyond which positioning scores zero.
pub const ROUGH_CUT_RADIUS: f64 = 4.0;

/// Unweighted sub-scores plus the weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Age sub-score.
    pub age: f64,
    /// Price sub-score.
    pub price: f64,
    /// Positioning sub-score.
    pub position: f64,
    /// Reliability sub-score.
    pub mtbf: f64,
    /// Importance-weighted sum of the four.
    pub total: f64,
}

/// Gaussian bell normalised to peak at 1 when `x == mean`.
pub fn gaussian(mean: f64, stdev: f64, x: f64) -> f64 {
    let z = (x - mean) / stdev;
    (-0.5 * z * z).exp()
}

/// Age sub-score against the segment's desired mean and spread.
pub fn age_score(product_age: f64, mean: f64, stdev: f64) -> f64 {
    gaussian(mean, stdev, product_age)
}

/// Price sub-score against the band `(low, high)` for the year.
pub fn price_score(product_price: f64, price_range: (f64, f64)) -> f64 {
    let (low, high) = price_range;
    if product_price < low - PRICE_ROUGH_CUT || product_price > high + PRICE_ROUGH_CUT {
        return 0.0;
    }
    let ideal_price = (low + high) / 2.0;
    FINE_CUT_BASE.powf((product_price - ideal_price).abs())
}

/// MTBF sub-score; `desired_mtbf` is the top of the segment's band.
///
/// Reliability above the desired value scores the same as meeting it.
pub fn mtbf_score(product_mtbf: f64, desired_mtbf: f64) -> f64 {
    if product_mtbf < desired_mtbf - MTBF_ROUGH_CUT {
        return 0.0;
    }
    let shortfall = (desired_mtbf - product_mtbf).max(0.0);
    FINE_CUT_BASE.powf(shortfall / MTBF_DECAY_UNIT)
}

/// Positioning sub-score of a product relative to a segment circle.
///
/// Closeness to the ideal spot (`centroid + offset`) decays as
/// `0.8^distance`. It is multiplied by a band factor of 1 inside the fine-cut
/// radius, falling linearly to 0 at the rough-cut radius.
// TODO: the linear band between the two radii still needs sign-off from the
// product team; swap `band_factor` once they settle on a curve.
pub fn positioning_score(
    centroid: Coords,
    offset: Coords,
    product_position: Coords,
) -> ModelResult<f64> {
    if !centroid.is_positive() || !product_position.is_positive() {
        return Err(ModelError::InvalidArgument(format!(
            "positioning needs positive coordinates (centroid {centroid:?}, product {product_position:?})"
        )));
    }

    let dist_squared = product_position.distance_squared(centroid);
    if dist_squared > ROUGH_CUT_RADIUS * ROUGH_CUT_RADIUS {
        return Ok(0.0);
    }

    let ideal = centroid + offset;
    let closeness = FINE_CUT_BASE.powf(product_position.distance(ideal));
    Ok(closeness * band_factor(dist_squared.sqrt()))
}

fn band_factor(dist_from_centroid: f64) -> f64 {
    if dist_from_centroid <= FINE_CUT_RADIUS {
        1.0
    } else {
        ((ROUGH_CUT_RADIUS - dist_from_centroid) / (ROUGH_CUT_RADIUS - FINE_CUT_RADIUS)).max(0.0)
    }
}

/// Score `product` against `segment` at year `t`, with every sub-score.
pub fn score_breakdown(
    product: &Product,
    segment: &MarketSegment,
    t: usize,
) -> ModelResult<ScoreBreakdown> {
    let year = t as f64;
    let criteria = segment.criteria();

    let position_now = product.coords(Some(t))?;
    if !position_now.is_positive() {
        warn!(
            product = %product.name(),
            year = t,
            ?position_now,
            "product left the positive quadrant"
        );
    }

    let age = age_score(product.age(Some(t))?, criteria.age.mean, criteria.age.stdev);
    let price = price_score(product.price(Some(t))?, segment.price_range(year));
    let (_, desired_mtbf) = segment.reliability_range(year);
    let mtbf = mtbf_score(product.mtbf(Some(t))?, desired_mtbf);
    let position = positioning_score(segment.location(year), segment.offset(), position_now)?;

    let total = criteria.age.importance * age
        + criteria.price.importance * price
        + criteria.position.importance * position
        + criteria.mtbf.importance * mtbf;

    debug!(
        product = %product.name(),
        segment = %segment.name(),
        year = t,
        age,
        price,
        position,
        mtbf,
        total,
        "scored product"
    );

    Ok(ScoreBreakdown {
        age,
        price,
        position,
        mtbf,
        total,
    })
}

/// Weighted desirability of `product` for `segment` at year `t`.
pub fn score(product: &Product, segment: &MarketSegment, t: usize) -> ModelResult<f64> {
    Ok(score_breakdown(product, segment, t)?.total)
}
