//! Named handler registries.
//!
//! Assertions, retries, state setup and interaction templates are referenced
//! by name elsewhere in a test suite. Each kind of handler lives in its own
//! [`Registry`]; all kinds share the same registration and lookup rules so
//! error messages stay uniform.

use crate::error::HandlerError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A user-supplied handler. Receives a JSON context and returns a JSON value.
pub type Handler = Arc<dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(func: F) -> Handler
where
    F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Arc::new(func)
}

/// The kinds of handler a suite can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Expect,
    Retry,
    Return,
    State,
    Data,
    Interaction,
    MockInteraction,
    PactInteraction,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 8] = [
        HandlerKind::Expect,
        HandlerKind::Retry,
        HandlerKind::Return,
        HandlerKind::State,
        HandlerKind::Data,
        HandlerKind::Interaction,
        HandlerKind::MockInteraction,
        HandlerKind::PactInteraction,
    ];

    /// Human-readable label used in lookup errors.
    pub fn label(&self) -> &'static str {
        match self {
            HandlerKind::Expect => "Expect",
            HandlerKind::Retry => "Retry",
            HandlerKind::Return => "Return",
            HandlerKind::State => "State",
            HandlerKind::Data => "Data",
            HandlerKind::Interaction => "Interaction",
            HandlerKind::MockInteraction => "Mock Interaction",
            HandlerKind::PactInteraction => "Pact Interaction",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Name -> handler map for a single [`HandlerKind`].
#[derive(Clone)]
pub struct Registry {
    kind: HandlerKind,
    entries: HashMap<String, Handler>,
}

impl Registry {
    pub fn new(kind: HandlerKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Register `func` under `name`, replacing any previous entry.
    ///
    /// `func` accepts either a [`Handler`] or `None`; the latter stands for a
    /// handler slot that was looked up dynamically and came back empty.
    pub fn add(
        &mut self,
        name: &str,
        func: impl Into<Option<Handler>>,
    ) -> Result<(), HandlerError> {
        if name.is_empty() {
            return Err(HandlerError::NameRequired);
        }
        let func = func.into().ok_or(HandlerError::FuncRequired)?;
        if self.entries.insert(name.to_string(), func).is_some() {
            tracing::debug!(kind = %self.kind, handler = name, "Replaced handler");
        }
        Ok(())
    }

    /// Look up the handler registered under `name`.
    pub fn get(&self, name: &str) -> Result<Handler, HandlerError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| HandlerError::NotFound {
                kind: self.kind,
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("names", &names)
            .finish()
    }
}

/// One [`Registry`] per [`HandlerKind`].
///
/// Entries live until [`Handlers::reset`] is called; nothing expires on its
/// own.
#[derive(Debug, Clone)]
pub struct Handlers {
    registries: HashMap<HandlerKind, Registry>,
}

impl Handlers {
    pub fn new() -> Self {
        let registries = HandlerKind::ALL
            .into_iter()
            .map(|kind| (kind, Registry::new(kind)))
            .collect();
        Self { registries }
    }

    pub fn registry(&self, kind: HandlerKind) -> &Registry {
        // Every kind is populated in `new`.
        &self.registries[&kind]
    }

    pub fn registry_mut(&mut self, kind: HandlerKind) -> &mut Registry {
        self.registries
            .entry(kind)
            .or_insert_with(|| Registry::new(kind))
    }

    pub fn add(
        &mut self,
        kind: HandlerKind,
        name: &str,
        func: impl Into<Option<Handler>>,
    ) -> Result<(), HandlerError> {
        self.registry_mut(kind).add(name, func)
    }

    pub fn get(&self, kind: HandlerKind, name: &str) -> Result<Handler, HandlerError> {
        self.registry(kind).get(name)
    }

    /// Drop every registered handler of every kind.
    pub fn reset(&mut self) {
        for registry in self.registries.values_mut() {
            registry.clear();
        }
        tracing::debug!("Cleared all handler registries");
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self::new()
    }
}
