//! Serves recorded interactions back in order.

use std::collections::{BTreeMap, VecDeque};

use super::format::{Cassette, Interaction, Port};

/// Replays a cassette with one independent queue per `(port, method)`.
///
/// Calls on different methods may interleave differently from the recording
/// without breaking replay; calls on the same method must come in the
/// recorded order.
pub struct CassetteReplayer {
    queues: BTreeMap<(Port, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Indexes the interactions of `cassette`.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: BTreeMap<(Port, String), VecDeque<Interaction>> = BTreeMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port, interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Takes the next interaction recorded for `port::method`.
    ///
    /// # Panics
    ///
    /// Panics if the cassette never saw this call, or if every recorded call
    /// has already been served. The message lists what the cassette holds.
    pub fn next_interaction(&mut self, port: Port, method: &str) -> Interaction {
        let key = (port, method.to_string());
        let Some(queue) = self.queues.get_mut(&key) else {
            let available: Vec<String> =
                self.queues.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            panic!(
                "Cassette exhausted: no interactions recorded for {port}::{method}. \
                 Available: [{}]",
                available.join(", ")
            );
        };
        match queue.pop_front() {
            Some(interaction) => interaction,
            None => {
                panic!("Cassette exhausted: every {port}::{method} interaction has been served")
            }
        }
    }

    /// Number of interactions not yet served, across all ports.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}
