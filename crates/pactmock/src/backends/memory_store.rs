//! MemoryStore - pact interactions grouped for export.

use crate::control::InteractionStore;
use crate::interaction::Interaction;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Only pact interactions can be stored - {0}")]
    NotAPact(String),
}

/// Consumer/provider pair a pact file is written for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PactKey {
    pub consumer: String,
    pub provider: String,
}

/// Keeps every stored pact interaction in arrival order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    interactions: RwLock<Vec<Arc<Interaction>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored interactions grouped by consumer and provider.
    pub fn pacts(&self) -> BTreeMap<PactKey, Vec<Arc<Interaction>>> {
        let mut pacts: BTreeMap<PactKey, Vec<Arc<Interaction>>> = BTreeMap::new();
        for interaction in self.interactions.read().iter() {
            let key = PactKey {
                consumer: interaction.consumer().to_string(),
                provider: interaction.provider().unwrap_or_default().to_string(),
            };
            pacts.entry(key).or_default().push(Arc::clone(interaction));
        }
        pacts
    }

    pub fn all(&self) -> Vec<Arc<Interaction>> {
        self.interactions.read().clone()
    }

    pub fn len(&self) -> usize {
        self.interactions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.read().is_empty()
    }

    pub fn clear(&self) {
        self.interactions.write().clear();
    }
}

impl InteractionStore for MemoryStore {
    fn add_interaction(&self, interaction: Arc<Interaction>) -> anyhow::Result<()> {
        if interaction.is_mock() {
            return Err(StoreError::NotAPact(interaction.id().to_string()).into());
        }
        self.interactions.write().push(interaction);
        Ok(())
    }
}
