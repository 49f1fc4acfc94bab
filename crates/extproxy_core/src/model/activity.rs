//! Session and activity descriptors.
//!
//! # Responsibility
//! - Identify one rendering session and the extension activities inside it.
//!
//! # Invariants
//! - Descriptors are immutable values; equality and hashing use all fields.
//! - Generated ids are UUID v4 strings and are never reused.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// One top-level rendering session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionDescriptor {
    id: String,
}

impl SessionDescriptor {
    /// Creates a session with a freshly generated unique id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Creates a session for an id that already exists on the host side.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for SessionDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies one extension activity as `(uri, session, activity_id)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActivityDescriptor {
    uri: String,
    session: SessionDescriptor,
    #[serde(rename = "activityId")]
    activity_id: String,
}

impl ActivityDescriptor {
    /// Creates an activity with a generated activity id.
    pub fn new(uri: impl Into<String>, session: SessionDescriptor) -> Self {
        Self::with_id(uri, session, Uuid::new_v4().to_string())
    }

    pub fn with_id(
        uri: impl Into<String>,
        session: SessionDescriptor,
        activity_id: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            session,
            activity_id: activity_id.into(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn session(&self) -> &SessionDescriptor {
        &self.session
    }

    pub fn activity_id(&self) -> &str {
        &self.activity_id
    }
}

impl Display for ActivityDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}#{}/{}",
            self.uri,
            self.session.id(),
            self.activity_id
        )
    }
}
