//! Extension wire protocol.
//!
//! # Responsibility
//! - Define the closed error code set and the JSON documents exchanged
//!   between a document and an extension.
//!
//! # Invariants
//! - Error code integers are stable across releases.
//! - Success is decided only by an exact `method` string match.

pub mod error_code;
pub mod message;
