//! Interaction contract model.
//!
//! This module provides:
//! - `Interaction`: the validated, immutable request/response aggregate
//! - `InteractionRequest` / `InteractionResponse`: normalized descriptors
//! - `Method` and `InteractionKind`
//!
//! Everything downstream of [`Interaction::new`] treats interactions as
//! trusted; no other component re-validates them.
//!
//! ## Module Structure
//!
//! - `types`: method enumeration, interaction kind, raw value helpers
//! - `request`: `withRequest` normalization
//! - `response`: `willRespondWith` normalization and body transform
//! - `core`: the `Interaction` aggregate

mod core;
mod request;
mod response;
mod types;


pub use self::core::{Interaction, InteractionDefaults};
pub use request::InteractionRequest;
pub use response::InteractionResponse;
pub use types::{InteractionKind, Method};

pub(crate) use types::port_number;
