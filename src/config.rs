//! Environment-driven configuration.

use std::env;
use std::path::PathBuf;

/// Records every native call into this cassette.
pub const RECORD_VAR: &str = "FSPROMISE_RECORD";
/// Serves native calls from this cassette instead of the disk.
pub const REPLAY_VAR: &str = "FSPROMISE_REPLAY";
/// Log filter directives for the CLI subscriber.
pub const LOG_VAR: &str = "FSPROMISE_LOG";

/// Filter used when `FSPROMISE_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Cassette to record into.
    pub record: Option<PathBuf>,
    /// Cassette to replay from.
    pub replay: Option<PathBuf>,
    /// `EnvFilter` directives.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { record: None, replay: None, log_filter: DEFAULT_LOG_FILTER.to_string() }
    }
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if both record and replay are requested.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if both record and replay are requested.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let record = get(RECORD_VAR).map(PathBuf::from);
        let replay = get(REPLAY_VAR).map(PathBuf::from);
        if record.is_some() && replay.is_some() {
            return Err(format!("{RECORD_VAR} and {REPLAY_VAR} cannot be set at the same time"));
        }
        let log_filter = get(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self { record, replay, log_filter })
    }
}
