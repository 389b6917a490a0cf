//! Integration tests for the mock control plane.
//!
//! Drives `MockControlPlane` against a recording server, the in-memory
//! backends and a server that rejects registrations.

use async_trait::async_trait;
use pactmock::backends::{InMemoryServer, MemoryStore};
use pactmock::control::{port_from_value, InteractionStore, MockServer};
use pactmock::error::{ConfigurationError, Error, HandlerError, InteractionError};
use pactmock::handlers::{handler, HandlerKind, Handlers};
use pactmock::id::SequentialIdGenerator;
use pactmock::interaction::Interaction;
use pactmock::{MockContext, MockControlPlane, MockSettings};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Start(u16),
    Stop(u16),
    Add(String, u16),
    Remove(String, u16),
    RemoveAll(u16),
}

/// Records every call it receives.
#[derive(Default)]
struct RecordingServer {
    calls: Mutex<Vec<Call>>,
}

impl RecordingServer {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn added(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Add(id, _) => Some(id),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl MockServer for RecordingServer {
    async fn start(&self, port: u16) -> anyhow::Result<()> {
        self.calls.lock().push(Call::Start(port));
        Ok(())
    }

    async fn stop(&self, port: u16) -> anyhow::Result<()> {
        self.calls.lock().push(Call::Stop(port));
        Ok(())
    }

    async fn add_default_interaction(
        &self,
        id: &str,
        interaction: Arc<Interaction>,
    ) -> anyhow::Result<()> {
        self.calls
            .lock()
            .push(Call::Add(id.to_string(), interaction.port()));
        Ok(())
    }

    async fn remove_default_interaction(&self, id: &str, port: u16) -> anyhow::Result<()> {
        self.calls.lock().push(Call::Remove(id.to_string(), port));
        Ok(())
    }

    async fn remove_default_interactions(&self, port: u16) -> anyhow::Result<()> {
        self.calls.lock().push(Call::RemoveAll(port));
        Ok(())
    }
}

/// Rejects every call.
struct BrokenServer;

#[async_trait]
impl MockServer for BrokenServer {
    async fn start(&self, port: u16) -> anyhow::Result<()> {
        anyhow::bail!("cannot bind {port}")
    }

    async fn stop(&self, port: u16) -> anyhow::Result<()> {
        anyhow::bail!("cannot stop {port}")
    }

    async fn add_default_interaction(
        &self,
        id: &str,
        _interaction: Arc<Interaction>,
    ) -> anyhow::Result<()> {
        anyhow::bail!("refused {id}")
    }

    async fn remove_default_interaction(&self, id: &str, _port: u16) -> anyhow::Result<()> {
        anyhow::bail!("refused {id}")
    }

    async fn remove_default_interactions(&self, port: u16) -> anyhow::Result<()> {
        anyhow::bail!("refused {port}")
    }
}

struct Fixture {
    server: Arc<RecordingServer>,
    store: Arc<MemoryStore>,
    plane: MockControlPlane,
    ctx: MockContext,
}

fn fixture() -> Fixture {
    let server = Arc::new(RecordingServer::default());
    let store = Arc::new(MemoryStore::new());
    let plane = MockControlPlane::new(server.clone(), store.clone())
        .with_id_generator(Arc::new(SequentialIdGenerator::new("int-")));
    let ctx = MockContext::new(MockSettings {
        default_port: 9393,
        consumer: "web".to_string(),
    });
    Fixture {
        server,
        store,
        plane,
        ctx,
    }
}

fn mock_interaction(path: &str) -> Value {
    json!({
        "withRequest": {"method": "GET", "path": path},
        "willRespondWith": {"status": 200}
    })
}

fn pact_interaction(path: &str) -> Value {
    json!({
        "provider": "user-service",
        "state": "users exist",
        "uponReceiving": format!("a request for {path}"),
        "withRequest": {"method": "GET", "path": path},
        "willRespondWith": {"status": 200, "body": {"id": 1}}
    })
}

#[tokio::test]
async fn test_start_and_stop_use_default_port() {
    let f = fixture();
    assert_eq!(f.plane.start(&f.ctx, None).await.unwrap(), 9393);
    assert_eq!(f.plane.stop(&f.ctx, Some(4000)).await.unwrap(), 4000);
    assert_eq!(f.server.calls(), vec![Call::Start(9393), Call::Stop(4000)]);
}

#[tokio::test]
async fn test_zero_port_is_a_configuration_error() {
    let mut f = fixture();
    let err = f.plane.start(&f.ctx, Some(0)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::InvalidPort(_))
    ));
    assert_eq!(err.to_string(), "Invalid port number provided - 0");
    assert!(f.plane.set_default_port(&mut f.ctx, 0).is_err());
    assert!(f.server.calls().is_empty());
}

#[test]
fn test_port_from_value() {
    assert_eq!(port_from_value(&json!(8080)).unwrap(), 8080);
    assert_eq!(
        port_from_value(&json!("8080")).unwrap_err(),
        ConfigurationError::InvalidPort("8080".to_string())
    );
    assert!(port_from_value(&json!(null)).is_err());
    assert!(port_from_value(&json!(-1)).is_err());
    assert!(port_from_value(&json!(65536)).is_err());
}

#[tokio::test]
async fn test_mock_interaction_goes_to_server_only() {
    let f = fixture();
    let id = f
        .plane
        .add_default_mock_interaction(&f.ctx, &mock_interaction("/health"))
        .await
        .unwrap();

    assert_eq!(id, "int-1");
    assert_eq!(f.server.calls(), vec![Call::Add("int-1".to_string(), 9393)]);
    assert_eq!(f.ctx.pact_interaction_count(), 0);
    assert!(f.store.is_empty());
}

#[tokio::test]
async fn test_pact_interaction_goes_to_table_server_and_store() {
    let mut f = fixture();
    let id = f
        .plane
        .add_default_pact_interaction(&mut f.ctx, &pact_interaction("/users"))
        .await
        .unwrap();

    assert_eq!(f.server.added(), vec![id.clone()]);
    let stored = f.ctx.pact_interaction(&id).unwrap();
    assert_eq!(stored.provider(), Some("user-service"));
    assert_eq!(stored.consumer(), "web");
    assert_eq!(f.store.len(), 1);
    assert_eq!(f.store.all()[0].id(), id);
}

#[tokio::test]
async fn test_invalid_interaction_is_not_registered() {
    let mut f = fixture();
    let mut raw = pact_interaction("/users");
    raw["withRequest"]["ignoreBody"] = json!(true);

    let err = f
        .plane
        .add_default_pact_interaction(&mut f.ctx, &raw)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Interaction(InteractionError::UnsupportedForContract("body"))
    ));
    assert!(f.server.calls().is_empty());
    assert_eq!(f.ctx.pact_interaction_count(), 0);
    assert!(f.store.is_empty());

    // The same description is a valid mock.
    assert!(f
        .plane
        .add_default_mock_interaction(&f.ctx, &raw)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_batch_returns_ids_in_order() {
    let f = fixture();
    let ids = f
        .plane
        .add_default_mock_interactions(
            &f.ctx,
            &json!([mock_interaction("/a"), mock_interaction("/b"), mock_interaction("/c")]),
        )
        .await
        .unwrap();

    assert_eq!(ids, vec!["int-1", "int-2", "int-3"]);
    assert_eq!(f.server.added(), ids);
}

#[tokio::test]
async fn test_batch_requires_array() {
    let mut f = fixture();
    let err = f
        .plane
        .add_default_mock_interactions(&f.ctx, &mock_interaction("/a"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::InvalidInteractions(_))
    ));
    assert!(err
        .to_string()
        .starts_with("Invalid interactions array passed - "));

    let err = f
        .plane
        .add_default_pact_interactions(&mut f.ctx, &json!("nope"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid interactions array passed - nope");
    assert!(f.server.calls().is_empty());
}

#[tokio::test]
async fn test_mock_batch_failure_keeps_earlier_registrations() {
    let f = fixture();
    let batch = json!([
        mock_interaction("/a"),
        mock_interaction("/b"),
        {"withRequest": {"method": "FETCH", "path": "/c"}, "willRespondWith": {"status": 200}}
    ]);

    let err = f
        .plane
        .add_default_mock_interactions(&f.ctx, &batch)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Invalid interaction request method provided - FETCH"
    );
    assert_eq!(f.server.added(), vec!["int-1", "int-2"]);
}

#[tokio::test]
async fn test_pact_batch_failure_keeps_earlier_registrations() {
    let mut f = fixture();
    let mut bad = pact_interaction("/c");
    bad["state"] = json!("");
    let batch = json!([pact_interaction("/a"), bad, pact_interaction("/d")]);

    let err = f
        .plane
        .add_default_pact_interactions(&mut f.ctx, &batch)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid state provided - ");
    assert_eq!(f.server.added(), vec!["int-1"]);
    assert_eq!(f.ctx.pact_interaction_count(), 1);
    assert_eq!(f.store.len(), 1);
}

#[tokio::test]
async fn test_set_default_port_is_not_retroactive() {
    let mut f = fixture();
    let first = f
        .plane
        .add_default_pact_interaction(&mut f.ctx, &pact_interaction("/a"))
        .await
        .unwrap();

    f.plane.set_default_port(&mut f.ctx, 5000).unwrap();
    let second = f
        .plane
        .add_default_pact_interaction(&mut f.ctx, &pact_interaction("/b"))
        .await
        .unwrap();

    assert_eq!(f.ctx.pact_interaction(&first).unwrap().port(), 9393);
    assert_eq!(f.ctx.pact_interaction(&second).unwrap().port(), 5000);
    assert_eq!(f.ctx.pact_interactions_for_port(5000).len(), 1);
    assert_eq!(
        f.server.calls(),
        vec![Call::Add(first, 9393), Call::Add(second, 5000)]
    );
}

#[tokio::test]
async fn test_remove_default_interaction() {
    let mut f = fixture();
    let id = f
        .plane
        .add_default_pact_interaction(&mut f.ctx, &pact_interaction("/a"))
        .await
        .unwrap();

    // Wrong port leaves the table entry alone.
    f.plane
        .remove_default_interaction(&mut f.ctx, &id, Some(4000))
        .await
        .unwrap();
    assert!(f.ctx.pact_interaction(&id).is_some());

    f.plane
        .remove_default_interaction(&mut f.ctx, &id, None)
        .await
        .unwrap();
    assert!(f.ctx.pact_interaction(&id).is_none());

    // Unknown ids are passed through to the server.
    f.plane
        .remove_default_interaction(&mut f.ctx, "unknown", None)
        .await
        .unwrap();

    let calls = f.server.calls();
    assert_eq!(calls[1], Call::Remove(id.clone(), 4000));
    assert_eq!(calls[2], Call::Remove(id, 9393));
    assert_eq!(calls[3], Call::Remove("unknown".to_string(), 9393));
}

#[tokio::test]
async fn test_remove_requires_id_and_port() {
    let mut f = fixture();
    let err = f
        .plane
        .remove_default_interaction(&mut f.ctx, "", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::InvalidId(_))
    ));

    let err = f
        .plane
        .remove_default_interaction(&mut f.ctx, "a", Some(0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::InvalidPort(_))
    ));
    assert!(f.server.calls().is_empty());
}

#[tokio::test]
async fn test_remove_default_interactions_by_port() {
    let mut f = fixture();
    let mut on_other_port = pact_interaction("/b");
    on_other_port["port"] = json!(4000);
    f.plane
        .add_default_pact_interactions(&mut f.ctx, &json!([pact_interaction("/a"), on_other_port]))
        .await
        .unwrap();

    f.plane
        .remove_default_interactions(&mut f.ctx, None)
        .await
        .unwrap();

    assert_eq!(f.ctx.pact_interaction_count(), 1);
    assert_eq!(f.ctx.pact_interactions().next().unwrap().port(), 4000);
    assert_eq!(f.server.calls().last(), Some(&Call::RemoveAll(9393)));
}

#[tokio::test]
async fn test_server_errors_propagate_unchanged() {
    let plane = MockControlPlane::new(Arc::new(BrokenServer), Arc::new(MemoryStore::new()));
    let mut ctx = MockContext::default();

    let err = plane.start(&ctx, Some(8000)).await.unwrap_err();
    assert!(matches!(err, Error::Server(_)));
    assert_eq!(err.to_string(), "cannot bind 8000");

    let mut raw = pact_interaction("/a");
    raw["id"] = json!("fixed");
    let err = plane
        .add_default_pact_interaction(&mut ctx, &raw)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "refused fixed");
    assert_eq!(ctx.pact_interaction_count(), 0);
}

#[tokio::test]
async fn test_store_errors_propagate() {
    struct FullStore;
    impl InteractionStore for FullStore {
        fn add_interaction(&self, _interaction: Arc<Interaction>) -> anyhow::Result<()> {
            anyhow::bail!("store is full")
        }
    }

    let server = Arc::new(RecordingServer::default());
    let plane = MockControlPlane::new(server.clone(), Arc::new(FullStore));
    let mut ctx = MockContext::default();

    let err = plane
        .add_default_pact_interaction(&mut ctx, &pact_interaction("/a"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert_eq!(err.to_string(), "store is full");
    // Server registration already happened.
    assert_eq!(server.added().len(), 1);
}

#[tokio::test]
async fn test_interactions_from_handlers() {
    let mut f = fixture();
    let mut handlers = Handlers::new();
    handlers
        .add(
            HandlerKind::MockInteraction,
            "get user",
            handler(|data| {
                Ok(json!({
                    "withRequest": {"method": "GET", "path": format!("/users/{}", data["id"])},
                    "willRespondWith": {"status": 200, "body": {"id": data["id"]}}
                }))
            }),
        )
        .unwrap();
    handlers
        .add(
            HandlerKind::PactInteraction,
            "user exists",
            handler(|_| Ok(pact_interaction("/users/1"))),
        )
        .unwrap();

    let id = f
        .plane
        .add_mock_interaction_from_handler(&f.ctx, &handlers, "get user", &json!({"id": 7}))
        .await
        .unwrap();
    assert_eq!(id, "int-1");

    let id = f
        .plane
        .add_pact_interaction_from_handler(&mut f.ctx, &handlers, "user exists", &Value::Null)
        .await
        .unwrap();
    assert!(f.ctx.pact_interaction(&id).is_some());

    let err = f
        .plane
        .add_mock_interaction_from_handler(&f.ctx, &handlers, "user exists", &Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Handler(HandlerError::NotFound { .. })));
    assert_eq!(
        err.to_string(),
        "Custom Mock Interaction Handler Not Found - user exists"
    );
}

#[tokio::test]
async fn test_failing_handler_is_reported() {
    let f = fixture();
    let mut handlers = Handlers::new();
    handlers
        .add(
            HandlerKind::MockInteraction,
            "broken",
            handler(|_| anyhow::bail!("no template")),
        )
        .unwrap();

    let err = f
        .plane
        .add_mock_interaction_from_handler(&f.ctx, &handlers, "broken", &Value::Null)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Handler `broken` failed: no template");
    assert!(f.server.calls().is_empty());
}

#[tokio::test]
async fn test_in_memory_backends() {
    let server = Arc::new(InMemoryServer::new());
    let store = Arc::new(MemoryStore::new());
    let plane = MockControlPlane::new(server.clone(), store.clone());
    let mut ctx = MockContext::default();

    plane.start(&ctx, None).await.unwrap();
    assert!(server.is_running(9393));
    let err = plane.start(&ctx, None).await.unwrap_err();
    assert_eq!(err.to_string(), "Port 9393 is already in use");

    let mock_id = plane
        .add_default_mock_interaction(&ctx, &mock_interaction("/a"))
        .await
        .unwrap();
    let pact_id = plane
        .add_default_pact_interaction(&mut ctx, &pact_interaction("/b"))
        .await
        .unwrap();

    assert_eq!(server.interactions(9393).len(), 2);
    assert!(server.interaction(&mock_id, 9393).unwrap().is_mock());
    let pacts = store.pacts();
    assert_eq!(pacts.len(), 1);
    let (key, interactions) = pacts.iter().next().unwrap();
    assert_eq!(key.consumer, "consumer");
    assert_eq!(key.provider, "user-service");
    assert_eq!(interactions[0].id(), pact_id);

    plane
        .remove_default_interaction(&mut ctx, &mock_id, None)
        .await
        .unwrap();
    assert_eq!(server.count(), 1);
    plane.remove_default_interactions(&mut ctx, None).await.unwrap();
    assert_eq!(server.count(), 0);
    assert_eq!(ctx.pact_interaction_count(), 0);
    // Exported pacts outlive removal from the server.
    assert_eq!(store.len(), 1);

    plane.stop(&ctx, None).await.unwrap();
    assert!(!server.is_running(9393));
    let err = plane.stop(&ctx, None).await.unwrap_err();
    assert_eq!(err.to_string(), "No mock server running on port 9393");
}

#[test]
fn test_memory_store_rejects_mocks() {
    let plane = MockControlPlane::new(
        Arc::new(InMemoryServer::new()),
        Arc::new(MemoryStore::new()),
    );
    let ctx = MockContext::default();
    let interaction = plane
        .build_interaction(
            &ctx,
            &mock_interaction("/a"),
            pactmock::interaction::InteractionKind::Mock,
        )
        .unwrap();

    let store = MemoryStore::new();
    let err = store.add_interaction(Arc::new(interaction)).unwrap_err();
    assert!(err.to_string().starts_with("Only pact interactions can be stored"));
}
