//! Extension protocol identity model.
//!
//! # Responsibility
//! - Define the value types that key every proxy request and callback.
//! - Keep identity construction (URI validation, id generation) in one place.
//!
//! # Invariants
//! - `ActivityDescriptor` equality is plain field equality.
//! - Extension URIs are validated before they enter any registry.

pub mod activity;
pub mod resource;
pub mod uri;
