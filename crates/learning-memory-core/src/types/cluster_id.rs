//! Stable textual cluster identifiers of the form `{axis}_{label}`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Axis;
use crate::error::LearningError;

/// Identifier naming one non-noise cluster on one axis.
///
/// Formatted as `{axis}_{label}` (e.g. `full_0`, `root_cause_3`). Parsing
/// splits on the *final* underscore, so axis names that themselves contain
/// underscores round-trip.
///
/// ```
/// use learning_memory_core::types::{Axis, ClusterId};
///
/// let id: ClusterId = "root_cause_3".parse().unwrap();
/// assert_eq!(id.axis, Axis::RootCause);
/// assert_eq!(id.label, 3);
/// assert_eq!(id.to_string(), "root_cause_3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClusterId {
    /// Axis the cluster belongs to.
    pub axis: Axis,
    /// Non-negative HDBSCAN label.
    pub label: u32,
}

impl ClusterId {
    /// Create an identifier.
    pub fn new(axis: Axis, label: u32) -> Self {
        Self { axis, label }
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.axis, self.label)
    }
}

impl FromStr for ClusterId {
    type Err = LearningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (axis_part, label_part) = s
            .rsplit_once('_')
            .ok_or_else(|| LearningError::invalid_cluster_id(s, "missing '_' separator"))?;

        let axis: Axis = axis_part.parse().map_err(|_| {
            LearningError::invalid_cluster_id(
                s,
                format!(
                    "unknown axis '{}' (valid: {})",
                    axis_part,
                    Axis::valid_names()
                ),
            )
        })?;

        let label: u32 = label_part.parse().map_err(|_| {
            LearningError::invalid_cluster_id(
                s,
                format!("label '{}' is not a non-negative integer", label_part),
            )
        })?;

        Ok(Self { axis, label })
    }
}

impl TryFrom<String> for ClusterId {
    type Error = LearningError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClusterId> for String {
    fn from(id: ClusterId) -> Self {
        id.to_string()
    }
}
