//! Shared domain types: axes, collection table, cluster identifiers and
//! confidence tiers.

mod axis;
mod cluster_id;
mod confidence;

pub use axis::{Axis, AxisCollections};
pub use cluster_id::ClusterId;
pub use confidence::{weight_for_tier, ConfidenceTier, CONFIDENCE_TIER_KEY};

/// Payload key for the `domain` metadata carried on full-axis records.
pub const DOMAIN_KEY: &str = "domain";
