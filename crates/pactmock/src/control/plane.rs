//! MockControlPlane - registration lifecycle for default interactions.
//!
//! Turns raw interaction descriptions into validated [`Interaction`]s and
//! hands them to the injected [`MockServer`]. Pact interactions are also
//! recorded in the [`MockContext`] table and forwarded to the
//! [`InteractionStore`] for export.
//!
//! Batch operations are NOT atomic. When the k-th element of a batch fails,
//! elements 1..k-1 stay registered with the server (and, for pacts, with the
//! context and the store). Callers that need a clean slate after a failed
//! batch should follow up with [`MockControlPlane::remove_default_interactions`].

use super::context::MockContext;
use super::traits::{InteractionStore, MockServer};
use crate::error::{describe, ConfigurationError, Error, Result};
use crate::handlers::{HandlerKind, Handlers};
use crate::id::{IdGenerator, UuidIdGenerator};
use crate::interaction::{port_number, Interaction, InteractionDefaults, InteractionKind};
use crate::transform::{MatcherValues, ValueTransform};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Orchestrates interaction registration against an injected server.
pub struct MockControlPlane {
    server: Arc<dyn MockServer>,
    store: Arc<dyn InteractionStore>,
    ids: Arc<dyn IdGenerator>,
    transform: Arc<dyn ValueTransform>,
}

impl MockControlPlane {
    /// Create a control plane using random ids and the matcher-value body
    /// transform.
    pub fn new(server: Arc<dyn MockServer>, store: Arc<dyn InteractionStore>) -> Self {
        Self {
            server,
            store,
            ids: Arc::new(UuidIdGenerator),
            transform: Arc::new(MatcherValues),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_transform(mut self, transform: Arc<dyn ValueTransform>) -> Self {
        self.transform = transform;
        self
    }

    /// Start the server on `port`, or on the context's default port.
    pub async fn start(&self, ctx: &MockContext, port: Option<u16>) -> Result<u16> {
        let port = resolve_port(ctx, port)?;
        self.server.start(port).await.map_err(Error::Server)?;
        info!("Mock server started on port {}", port);
        Ok(port)
    }

    /// Stop the server on `port`, or on the context's default port.
    pub async fn stop(&self, ctx: &MockContext, port: Option<u16>) -> Result<u16> {
        let port = resolve_port(ctx, port)?;
        self.server.stop(port).await.map_err(Error::Server)?;
        info!("Mock server on port {} stopped", port);
        Ok(port)
    }

    /// Change the port given to interactions built from now on. Interactions
    /// that are already registered keep their port.
    pub fn set_default_port(&self, ctx: &mut MockContext, port: u16) -> Result<()> {
        if port == 0 {
            return Err(ConfigurationError::InvalidPort(port.to_string()).into());
        }
        ctx.set_default_port(port);
        debug!(port, "Default mock port changed");
        Ok(())
    }

    /// Validate `raw` the way registration would, without registering it.
    pub fn build_interaction(
        &self,
        ctx: &MockContext,
        raw: &Value,
        kind: InteractionKind,
    ) -> Result<Interaction> {
        let defaults = InteractionDefaults {
            port: ctx.default_port(),
            consumer: ctx.consumer(),
            ids: self.ids.as_ref(),
            transform: self.transform.as_ref(),
        };
        Ok(Interaction::new(raw, kind, &defaults)?)
    }

    /// Register a mock interaction with the server and return its id.
    pub async fn add_default_mock_interaction(
        &self,
        ctx: &MockContext,
        raw: &Value,
    ) -> Result<String> {
        let interaction = Arc::new(self.build_interaction(ctx, raw, InteractionKind::Mock)?);
        let id = interaction.id().to_string();
        let port = interaction.port();

        self.server
            .add_default_interaction(&id, interaction)
            .await
            .map_err(Error::Server)?;

        debug!(id = %id, port, "Added default mock interaction");
        Ok(id)
    }

    /// Register each mock interaction in `raw` in order. `raw` must be an
    /// array. Not atomic: see the module docs.
    pub async fn add_default_mock_interactions(
        &self,
        ctx: &MockContext,
        raw: &Value,
    ) -> Result<Vec<String>> {
        let items = batch(raw)?;
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            ids.push(self.add_default_mock_interaction(ctx, item).await?);
        }
        Ok(ids)
    }

    /// Register a pact interaction with the server, the context table and the
    /// store, and return its id.
    pub async fn add_default_pact_interaction(
        &self,
        ctx: &mut MockContext,
        raw: &Value,
    ) -> Result<String> {
        let interaction = Arc::new(self.build_interaction(ctx, raw, InteractionKind::Pact)?);
        let id = interaction.id().to_string();
        let port = interaction.port();

        self.server
            .add_default_interaction(&id, Arc::clone(&interaction))
            .await
            .map_err(Error::Server)?;
        ctx.insert_pact(Arc::clone(&interaction));
        self.store
            .add_interaction(interaction)
            .map_err(Error::Store)?;

        debug!(id = %id, port, "Added default pact interaction");
        Ok(id)
    }

    /// Register each pact interaction in `raw` in order. `raw` must be an
    /// array. Not atomic: see the module docs.
    pub async fn add_default_pact_interactions(
        &self,
        ctx: &mut MockContext,
        raw: &Value,
    ) -> Result<Vec<String>> {
        let items = batch(raw)?;
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            ids.push(self.add_default_pact_interaction(ctx, item).await?);
        }
        Ok(ids)
    }

    /// Build a mock interaction from the named mock-interaction handler and
    /// register it.
    pub async fn add_mock_interaction_from_handler(
        &self,
        ctx: &MockContext,
        handlers: &Handlers,
        name: &str,
        data: &Value,
    ) -> Result<String> {
        let raw = run_handler(handlers, HandlerKind::MockInteraction, name, data)?;
        self.add_default_mock_interaction(ctx, &raw).await
    }

    /// Build a pact interaction from the named pact-interaction handler and
    /// register it.
    pub async fn add_pact_interaction_from_handler(
        &self,
        ctx: &mut MockContext,
        handlers: &Handlers,
        name: &str,
        data: &Value,
    ) -> Result<String> {
        let raw = run_handler(handlers, HandlerKind::PactInteraction, name, data)?;
        self.add_default_pact_interaction(ctx, &raw).await
    }

    /// Remove one interaction from `port` (default port when `None`).
    pub async fn remove_default_interaction(
        &self,
        ctx: &mut MockContext,
        id: &str,
        port: Option<u16>,
    ) -> Result<()> {
        if id.is_empty() {
            return Err(ConfigurationError::InvalidId(id.to_string()).into());
        }
        let port = resolve_port(ctx, port)?;

        self.server
            .remove_default_interaction(id, port)
            .await
            .map_err(Error::Server)?;
        ctx.remove_pact(id, port);

        debug!(id, port, "Removed default interaction");
        Ok(())
    }

    /// Remove every default interaction on `port` (default port when `None`).
    pub async fn remove_default_interactions(
        &self,
        ctx: &mut MockContext,
        port: Option<u16>,
    ) -> Result<()> {
        let port = resolve_port(ctx, port)?;

        self.server
            .remove_default_interactions(port)
            .await
            .map_err(Error::Server)?;
        let dropped = ctx.remove_pacts_on_port(port);

        debug!(port, dropped, "Removed default interactions");
        Ok(())
    }
}

/// Read a port from a raw argument. Must be a whole number in `1..=65535`.
pub fn port_from_value(value: &Value) -> Result<u16, ConfigurationError> {
    port_number(value).ok_or_else(|| ConfigurationError::InvalidPort(describe(Some(value))))
}

fn resolve_port(ctx: &MockContext, port: Option<u16>) -> Result<u16, ConfigurationError> {
    match port {
        None => Ok(ctx.default_port()),
        Some(0) => Err(ConfigurationError::InvalidPort("0".to_string())),
        Some(p) => Ok(p),
    }
}

fn batch(raw: &Value) -> Result<&Vec<Value>, ConfigurationError> {
    raw.as_array()
        .ok_or_else(|| ConfigurationError::InvalidInteractions(describe(Some(raw))))
}

fn run_handler(handlers: &Handlers, kind: HandlerKind, name: &str, data: &Value) -> Result<Value> {
    let handler = handlers.get(kind, name)?;
    handler(data).map_err(|source| Error::HandlerFailed {
        name: name.to_string(),
        source,
    })
}
