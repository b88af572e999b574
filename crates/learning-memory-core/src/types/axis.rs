//! Experience axes and the axis → collection table.
//!
//! Experiences are embedded separately along each [`Axis`] and clustered
//! independently. [`AxisCollections`] is the single lookup table from axis to
//! vector-store collection; components receive it explicitly instead of
//! re-declaring collection names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LearningError;

/// One independent semantic dimension along which experiences are clustered.
///
/// # Example
///
/// ```
/// use learning_memory_core::types::Axis;
///
/// let axis: Axis = "root_cause".parse().unwrap();
/// assert_eq!(axis, Axis::RootCause);
/// assert_eq!(axis.to_string(), "root_cause");
/// assert!("domain".parse::<Axis>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// The whole experience narrative. Carries the filterable `domain` metadata.
    Full,
    /// The strategy that was applied.
    Strategy,
    /// What was surprising about the outcome.
    Surprise,
    /// The identified root cause.
    RootCause,
}

impl Axis {
    /// Every axis, in canonical order.
    pub const ALL: [Axis; 4] = [Axis::Full, Axis::Strategy, Axis::Surprise, Axis::RootCause];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Full => "full",
            Axis::Strategy => "strategy",
            Axis::Surprise => "surprise",
            Axis::RootCause => "root_cause",
        }
    }

    /// Iterate all axes in canonical order.
    pub fn all() -> impl Iterator<Item = Axis> {
        Self::ALL.into_iter()
    }

    /// Comma-separated list of accepted names, used in error messages.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(Axis::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = LearningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|axis| axis.as_str() == s)
            .ok_or_else(|| LearningError::InvalidAxis {
                value: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

/// Maps every axis to its collection and names the values collection.
///
/// Doubles as the `[collections]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisCollections {
    /// Collection for [`Axis::Full`].
    pub full: String,
    /// Collection for [`Axis::Strategy`].
    pub strategy: String,
    /// Collection for [`Axis::Surprise`].
    pub surprise: String,
    /// Collection for [`Axis::RootCause`].
    pub root_cause: String,
    /// Collection holding persisted values.
    pub values: String,
}

impl Default for AxisCollections {
    fn default() -> Self {
        Self {
            full: "ghap_full".to_string(),
            strategy: "ghap_strategy".to_string(),
            surprise: "ghap_surprise".to_string(),
            root_cause: "ghap_root_cause".to_string(),
            values: "values".to_string(),
        }
    }
}

impl AxisCollections {
    /// Collection name holding embeddings for `axis`.
    pub fn collection(&self, axis: Axis) -> &str {
        match axis {
            Axis::Full => &self.full,
            Axis::Strategy => &self.strategy,
            Axis::Surprise => &self.surprise,
            Axis::RootCause => &self.root_cause,
        }
    }

    /// Collection name holding persisted values.
    pub fn values_collection(&self) -> &str {
        &self.values
    }

    /// Validate that names are non-empty and pairwise distinct.
    pub fn validate(&self) -> Result<(), String> {
        let mut names: Vec<&str> = Axis::all().map(|axis| self.collection(axis)).collect();
        names.push(&self.values);

        if let Some(pos) = names.iter().position(|n| n.trim().is_empty()) {
            let field = Axis::ALL
                .get(pos)
                .map(Axis::as_str)
                .unwrap_or("values");
            return Err(format!("collection name for '{}' must not be empty", field));
        }

        let mut sorted = names.clone();
        sorted.sort_unstable();
        if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(format!("collection '{}' is mapped more than once", w[0]));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_every_axis() {
        for axis in Axis::all() {
            let parsed: Axis = axis.as_str().parse().expect("canonical name parses");
            assert_eq!(parsed, axis);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_axis_with_valid_list() {
        let err = "Strategy".parse::<Axis>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'Strategy'"), "names the offending value: {}", msg);
        assert!(msg.contains("full, strategy, surprise, root_cause"), "lists valid axes: {}", msg);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Axis::RootCause).unwrap();
        assert_eq!(json, "\"root_cause\"");
        let back: Axis = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Axis::RootCause);
    }

    #[test]
    fn test_default_collections() {
        let table = AxisCollections::default();
        assert_eq!(table.collection(Axis::Full), "ghap_full");
        assert_eq!(table.collection(Axis::RootCause), "ghap_root_cause");
        assert_eq!(table.values_collection(), "values");
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_collections_reject_duplicates_and_blanks() {
        let dup = AxisCollections {
            surprise: "ghap_strategy".into(),
            ..Default::default()
        };
        assert!(dup.validate().unwrap_err().contains("ghap_strategy"));

        let blank = AxisCollections {
            values: " ".into(),
            ..Default::default()
        };
        assert!(blank.validate().unwrap_err().contains("values"));
    }
}
