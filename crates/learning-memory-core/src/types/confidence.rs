//! Confidence tiers and their centroid weights.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Metadata key carrying an experience's confidence tier.
pub const CONFIDENCE_TIER_KEY: &str = "confidence_tier";

/// Quality label attached to an experience record.
///
/// The weight only affects centroid computation, never cluster membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Fully confirmed experience.
    Gold,
    /// Mostly confirmed experience.
    Silver,
    /// Unconfirmed experience. Fallback for missing or unknown tiers.
    #[default]
    Bronze,
    /// Experience whose hypothesis was abandoned.
    Abandoned,
}

impl ConfidenceTier {
    /// Every tier, best first.
    pub const ALL: [ConfidenceTier; 4] = [
        ConfidenceTier::Gold,
        ConfidenceTier::Silver,
        ConfidenceTier::Bronze,
        ConfidenceTier::Abandoned,
    ];

    /// Centroid weight for this tier. Always in (0, 1].
    pub fn weight(&self) -> f32 {
        match self {
            ConfidenceTier::Gold => 1.0,
            ConfidenceTier::Silver => 0.8,
            ConfidenceTier::Bronze => 0.5,
            ConfidenceTier::Abandoned => 0.2,
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Gold => "gold",
            ConfidenceTier::Silver => "silver",
            ConfidenceTier::Bronze => "bronze",
            ConfidenceTier::Abandoned => "abandoned",
        }
    }

    /// Case-insensitive parse. `None` for unrecognized names.
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|tier| tier.as_str() == lower)
    }

    /// Tier named in `payload`, falling back to bronze when missing, not a
    /// string, or unrecognized.
    pub fn from_payload(payload: &Map<String, JsonValue>) -> Self {
        payload
            .get(CONFIDENCE_TIER_KEY)
            .and_then(JsonValue::as_str)
            .and_then(Self::parse)
            .unwrap_or_default()
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight for an optional tier name, defaulting to the bronze weight.
///
/// ```
/// use learning_memory_core::types::weight_for_tier;
///
/// assert_eq!(weight_for_tier(Some("GOLD")), 1.0);
/// assert_eq!(weight_for_tier(Some("platinum")), 0.5);
/// assert_eq!(weight_for_tier(None), 0.5);
/// ```
pub fn weight_for_tier(tier: Option<&str>) -> f32 {
    tier.and_then(ConfidenceTier::parse)
        .unwrap_or_default()
        .weight()
}
