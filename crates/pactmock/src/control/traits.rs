//! Capabilities the control plane needs from its collaborators.

use crate::interaction::Interaction;
use async_trait::async_trait;
use std::sync::Arc;

/// The transport side of a mock server.
///
/// Implementations own listeners and request matching; the control plane
/// only tells them which interactions exist on which port. Every call is
/// awaited before the control-plane operation that issued it returns, and
/// errors are handed back to the caller unchanged.
#[async_trait]
pub trait MockServer: Send + Sync {
    /// Start serving on `port`.
    async fn start(&self, port: u16) -> anyhow::Result<()>;

    /// Stop serving on `port`.
    async fn stop(&self, port: u16) -> anyhow::Result<()>;

    /// Register `interaction` under `id` on the interaction's own port.
    async fn add_default_interaction(
        &self,
        id: &str,
        interaction: Arc<Interaction>,
    ) -> anyhow::Result<()>;

    /// Remove the interaction `id` from `port`. Unknown ids are the
    /// implementation's call.
    async fn remove_default_interaction(&self, id: &str, port: u16) -> anyhow::Result<()>;

    /// Remove every default interaction registered on `port`.
    async fn remove_default_interactions(&self, port: u16) -> anyhow::Result<()>;
}

/// Durable sink for pact interactions, read later for contract export.
pub trait InteractionStore: Send + Sync {
    fn add_interaction(&self, interaction: Arc<Interaction>) -> anyhow::Result<()>;
}
