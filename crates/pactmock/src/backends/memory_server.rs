//! InMemoryServer - per-port interaction tables without a listener.
//!
//! Useful for validating interaction files and for tests that only care
//! about what was registered where.

use crate::control::MockServer;
use crate::interaction::Interaction;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServerError {
    #[error("Port {0} is already in use")]
    PortInUse(u16),
    #[error("No mock server running on port {0}")]
    NotRunning(u16),
}

#[derive(Debug, Default)]
struct PortState {
    running: bool,
    /// Registration order is preserved.
    interactions: Vec<Arc<Interaction>>,
}

/// Tracks default interactions by port.
#[derive(Debug, Default)]
pub struct InMemoryServer {
    ports: RwLock<HashMap<u16, PortState>>,
}

impl InMemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self, port: u16) -> bool {
        self.ports.read().get(&port).is_some_and(|p| p.running)
    }

    /// Interactions registered on `port`, oldest first.
    pub fn interactions(&self, port: u16) -> Vec<Arc<Interaction>> {
        self.ports
            .read()
            .get(&port)
            .map(|p| p.interactions.clone())
            .unwrap_or_default()
    }

    pub fn interaction(&self, id: &str, port: u16) -> Option<Arc<Interaction>> {
        self.ports
            .read()
            .get(&port)
            .and_then(|p| p.interactions.iter().find(|i| i.id() == id).cloned())
    }

    /// Total interactions across all ports.
    pub fn count(&self) -> usize {
        self.ports.read().values().map(|p| p.interactions.len()).sum()
    }
}

#[async_trait]
impl MockServer for InMemoryServer {
    async fn start(&self, port: u16) -> anyhow::Result<()> {
        let mut ports = self.ports.write();
        let state = ports.entry(port).or_default();
        if state.running {
            return Err(ServerError::PortInUse(port).into());
        }
        state.running = true;
        info!("In-memory mock server started on port {}", port);
        Ok(())
    }

    async fn stop(&self, port: u16) -> anyhow::Result<()> {
        let mut ports = self.ports.write();
        match ports.get_mut(&port) {
            Some(state) if state.running => {
                state.running = false;
                info!("In-memory mock server on port {} stopped", port);
                Ok(())
            }
            _ => Err(ServerError::NotRunning(port).into()),
        }
    }

    async fn add_default_interaction(
        &self,
        id: &str,
        interaction: Arc<Interaction>,
    ) -> anyhow::Result<()> {
        let mut ports = self.ports.write();
        let state = ports.entry(interaction.port()).or_default();
        match state.interactions.iter().position(|i| i.id() == id) {
            Some(index) => {
                debug!(id, "Replacing interaction with the same id");
                state.interactions[index] = interaction;
            }
            None => state.interactions.push(interaction),
        }
        Ok(())
    }

    async fn remove_default_interaction(&self, id: &str, port: u16) -> anyhow::Result<()> {
        if let Some(state) = self.ports.write().get_mut(&port) {
            state.interactions.retain(|i| i.id() != id);
        }
        Ok(())
    }

    async fn remove_default_interactions(&self, port: u16) -> anyhow::Result<()> {
        if let Some(state) = self.ports.write().get_mut(&port) {
            state.interactions.clear();
        }
        Ok(())
    }
}
