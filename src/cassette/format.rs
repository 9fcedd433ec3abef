//! Cassette data structures for recording and replaying native calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Operation;

/// A single recorded call to a native primitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Primitive that was called.
    pub method: Operation,
    /// Arguments passed to the primitive.
    pub input: serde_json::Value,
    /// Result handed to the completion, as `{"Ok": ..}` or `{"Err": ..}`.
    pub output: serde_json::Value,
}

/// A cassette containing a sequence of recorded calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Calls in the order their completions fired.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Parses a cassette from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid cassette document.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Renders the cassette as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if a recorded value cannot be represented in YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
