//! Caller-owned control-plane state.

use crate::config::MockSettings;
use crate::interaction::Interaction;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Mutable state shared by control-plane operations: the defaults applied to
/// new interactions and the table of registered pact interactions.
///
/// Create one per test suite and drop it at teardown. Mock interactions are
/// not tracked here; they live only in the server.
#[derive(Debug, Clone, Default)]
pub struct MockContext {
    settings: MockSettings,
    pact_interactions: BTreeMap<String, Arc<Interaction>>,
}

impl MockContext {
    pub fn new(settings: MockSettings) -> Self {
        Self {
            settings,
            pact_interactions: BTreeMap::new(),
        }
    }

    pub fn settings(&self) -> &MockSettings {
        &self.settings
    }

    pub fn default_port(&self) -> u16 {
        self.settings.default_port
    }

    pub fn consumer(&self) -> &str {
        &self.settings.consumer
    }

    pub(crate) fn set_default_port(&mut self, port: u16) {
        self.settings.default_port = port;
    }

    /// A registered pact interaction by id.
    pub fn pact_interaction(&self, id: &str) -> Option<&Arc<Interaction>> {
        self.pact_interactions.get(id)
    }

    /// All registered pact interactions, ordered by id.
    pub fn pact_interactions(&self) -> impl Iterator<Item = &Arc<Interaction>> {
        self.pact_interactions.values()
    }

    pub fn pact_interactions_for_port(&self, port: u16) -> Vec<Arc<Interaction>> {
        self.pact_interactions
            .values()
            .filter(|i| i.port() == port)
            .cloned()
            .collect()
    }

    pub fn pact_interaction_count(&self) -> usize {
        self.pact_interactions.len()
    }

    pub(crate) fn insert_pact(&mut self, interaction: Arc<Interaction>) {
        self.pact_interactions
            .insert(interaction.id().to_string(), interaction);
    }

    /// Drop `id` if it is registered on `port`.
    pub(crate) fn remove_pact(&mut self, id: &str, port: u16) -> Option<Arc<Interaction>> {
        match self.pact_interactions.get(id) {
            Some(existing) if existing.port() == port => self.pact_interactions.remove(id),
            _ => None,
        }
    }

    pub(crate) fn remove_pacts_on_port(&mut self, port: u16) -> usize {
        let before = self.pact_interactions.len();
        self.pact_interactions.retain(|_, i| i.port() != port);
        before - self.pact_interactions.len()
    }
}
