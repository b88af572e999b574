//! Value validation and storage.
//!
//! - [`ValueStore`]: resolves clusters, validates candidates, persists values
//! - [`ValidationResult`] / [`ValidationMetrics`]: the distance statistics
//!   behind an accept/reject decision
//! - [`Value`]: an accepted, immutable statement anchored to a cluster

mod stats;
mod store;
mod types;

pub use store::{ValueStore, EMPTY_CLUSTER_REASON};
pub use types::{Experience, ValidationMetrics, ValidationResult, Value, ValueValidation};
