//! Extension proxy runtime.
//!
//! This module routes registration, command, event and lifecycle traffic
//! between a document and host-implemented extensions. Proxies hold host
//! bindings weakly; registrars resolve URIs to proxies; the mediator drives
//! one session on the document side.

pub mod binding;
pub mod mediator;
pub mod proxy;
pub mod registrar;
