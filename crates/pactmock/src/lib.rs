//! Interaction contracts and mock registration for consumer-driven contract
//! tests.
//!
//! A test describes the requests it will send and the responses it expects
//! as raw JSON interactions. [`interaction::Interaction`] validates and
//! normalizes them, [`control::MockControlPlane`] registers them with an
//! injected mock server, and [`handlers::Handlers`] resolves the named
//! functions (assertions, retries, state setup, interaction templates) the
//! rest of a suite refers to.

pub mod backends;
pub mod config;
pub mod control;
pub mod error;
pub mod handlers;
pub mod id;
pub mod interaction;
pub mod transform;

pub use config::MockSettings;
pub use control::{MockContext, MockControlPlane};
pub use error::{Error, Result};
