#![warn(clippy::all, missing_docs)]

//! Core domain logic for the perceptual map predictor.
//!
//! Market segments drift through a performance × size plane year by year,
//! products carry per-year attributes with carry-forward edits, and the
//! scoring module rates every product against each segment's buying
//! criteria. Front ends drive it through [`Simulation`].

pub mod config;
pub mod error;
pub mod models;
pub mod product;
pub mod scenario;
pub mod scoring;
pub mod segment;
pub mod series;
pub mod simulation;

pub use config::AppConfig;
pub use error::{ModelError, ModelResult};
pub use models::Coords;
pub use product::{ChangeNotification, NotificationLog, Product, ProductRegistry, StatsUpdate};
pub use scenario::Scenario;
pub use scoring::{score, score_breakdown, ScoreBreakdown};
pub use segment::{BuyingCriteria, MarketSegment};
pub use series::TemporalSeries;
pub use simulation::{ScoreCard, Simulation};
