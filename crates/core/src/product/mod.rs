#![allow(missing_docs)]

//! Products, their change notifications and the name registry.

mod model;
pub mod notify;
mod registry;

pub use model::{Product, StatsUpdate};
pub use notify::{ChangeNotification, Listener, NotificationLog, SubscriptionId};
pub use registry::ProductRegistry;
