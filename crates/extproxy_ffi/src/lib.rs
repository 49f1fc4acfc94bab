//! Foreign-call boundary for the extension proxy runtime.

pub mod api;
