//! Replays recorded interactions from a cassette.

use std::collections::HashMap;
use std::path::Path;

use super::format::{Cassette, Interaction};
use crate::error::Operation;

/// Serves interactions from a loaded cassette, sequentially per primitive.
pub struct CassetteReplayer {
    /// Per-method queue of interactions (in order).
    queues: HashMap<Operation, Vec<Interaction>>,
    /// Per-method cursor tracking position.
    cursors: HashMap<Operation, usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut ordered: Vec<&Interaction> = cassette.interactions.iter().collect();
        ordered.sort_by_key(|interaction| interaction.seq);

        let mut queues: HashMap<Operation, Vec<Interaction>> = HashMap::new();
        for interaction in ordered {
            queues.entry(interaction.method).or_default().push(interaction.clone());
        }
        let cursors = queues.keys().map(|k| (*k, 0)).collect();
        Self { queues, cursors }
    }

    /// Load a cassette file and create a replayer for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette = Cassette::from_yaml(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        Ok(Self::new(&cassette))
    }

    /// Number of interactions not yet served, across all methods.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.iter().map(|(method, queue)| queue.len() - self.cursors[method]).sum()
    }

    /// Return the next interaction for the given primitive.
    ///
    /// # Panics
    ///
    /// Panics if the cassette has no (more) interactions for `method`,
    /// naming what was requested and what remains.
    pub fn next_interaction(&mut self, method: Operation) -> &Interaction {
        let queue = self.queues.get(&method).unwrap_or_else(|| {
            let mut available: Vec<&str> = self.queues.keys().map(|m| m.as_str()).collect();
            available.sort_unstable();
            panic!(
                "Cassette exhausted: no interactions recorded for method={method}. \
                 Recorded methods: [{}]",
                available.join(", ")
            );
        });

        let cursor = self.cursors.get_mut(&method).expect("cursor must exist");
        assert!(
            *cursor < queue.len(),
            "Cassette exhausted: all {count} interactions for method={method} \
             have been consumed. Last interaction was seq={last_seq}.",
            count = queue.len(),
            last_seq = queue.last().map_or(0, |i| i.seq),
        );

        let interaction = &queue[*cursor];
        *cursor += 1;
        interaction
    }
}
