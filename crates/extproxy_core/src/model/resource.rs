//! Opaque platform resource handle.

use serde::{Deserialize, Serialize};

/// Names a platform resource (for example a rendering surface) that the host
/// prepared for an extension. Only the id crosses the proxy; the resource
/// itself stays with the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHolder {
    #[serde(rename = "resourceId")]
    resource_id: String,
}

impl ResourceHolder {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
        }
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }
}
