//! Mock control plane.
//!
//! This module provides:
//! - `MockControlPlane`: registers and removes default interactions
//! - `MockContext`: caller-owned defaults and pact interaction table
//! - `MockServer` / `InteractionStore`: capabilities injected by the caller
//!
//! The control plane never touches the network. Listening, matching and
//! answering requests belong to the `MockServer` implementation.

mod context;
mod plane;
mod traits;

pub use context::MockContext;
pub use plane::{port_from_value, MockControlPlane};
pub use traits::{InteractionStore, MockServer};
