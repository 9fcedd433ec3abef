//! Records native calls into a cassette file.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::format::{Cassette, Interaction};
use crate::error::Operation;

/// Collects interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    interactions: Vec<Interaction>,
    next_seq: u64,
}

impl CassetteRecorder {
    /// Create a new recorder that will write to the given path.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into(), interactions: Vec::new(), next_seq: 0 }
    }

    /// Record an interaction. The `seq` field is assigned automatically.
    pub fn record(
        &mut self,
        method: Operation,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        let seq = self.reserve();
        self.record_at(seq, method, input, output);
    }

    /// Claim the next sequence number for a call whose result is not known yet.
    pub fn reserve(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Record an interaction under a sequence number taken from [`reserve`](Self::reserve).
    pub fn record_at(
        &mut self,
        seq: u64,
        method: Operation,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        self.interactions.push(Interaction { seq, method, input, output });
    }

    /// Number of interactions recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Where the cassette will be written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Moves everything recorded so far into a new recorder, leaving this one
    /// empty but still numbering from where it left off.
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            path: self.path.clone(),
            name: self.name.clone(),
            interactions: std::mem::take(&mut self.interactions),
            next_seq: self.next_seq,
        }
    }

    /// Finish recording and write the cassette YAML file to disk.
    ///
    /// Interactions are written in call order, whatever order they completed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(mut self) -> Result<PathBuf, std::io::Error> {
        self.interactions.sort_by_key(|interaction| interaction.seq);
        let cassette =
            Cassette { name: self.name, recorded_at: Utc::now(), interactions: self.interactions };
        let yaml = cassette.to_yaml().map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path)
    }
}
