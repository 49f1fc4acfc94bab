//! Ownership and threading primitives shared by proxies and the FFI layer.
//!
//! # Responsibility
//! - Hold host-owned objects without owning them (`HostRef`).
//! - Hand out opaque integer handles for shared core objects (`HandleTable`).
//! - Move work from arbitrary threads onto the core thread (`ExtensionExecutor`).
//!
//! # Invariants
//! - Every `HostRef` access upgrades afresh; a dead host object is a no-op.
//! - Handles are never reused within one table.
//! - Executor locks are never held while a task runs.

pub mod executor;
pub mod handle;
pub mod host_ref;
