//! Node and virtual machine value types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CnsError, CnsResult};

/// Scheme prefix carried by the provider ID of a vSphere-backed node.
pub const PROVIDER_ID_SCHEME: &str = "vsphere://";

/// Handle to the virtual machine backing a cluster node.
///
/// Resolved once at registration time from the node's provider ID and
/// owned by the registry entry thereafter. `uuid` is the BIOS uuid the
/// provider reports for the VM; `moref` is the provider's managed
/// object reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachine {
    pub uuid: String,
    pub moref: String,
}

impl VirtualMachine {
    pub fn new(uuid: impl Into<String>, moref: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            moref: moref.into(),
        }
    }
}

impl fmt::Display for VirtualMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (uuid {})", self.moref, self.uuid)
    }
}

/// A registered cluster compute node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Stable cluster-assigned name, unique within the registry.
    pub name: String,
    /// The virtual machine backing this node.
    pub vm: VirtualMachine,
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.vm)
    }
}

/// Raw node payload delivered by the membership event source.
///
/// Either field may be absent or malformed. Validation happens in the
/// membership listener, never in the event source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeObject {
    pub name: Option<String>,
    pub provider_id: Option<String>,
}

impl NodeObject {
    pub fn new(name: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            provider_id: Some(provider_id.into()),
        }
    }

    /// Extract the VM uuid from the provider ID.
    ///
    /// Accepts both the schemed form `vsphere://<uuid>` and a bare uuid.
    /// An absent or empty provider ID is rejected.
    pub fn provider_uuid(&self) -> CnsResult<String> {
        let raw = self.provider_id.as_deref().unwrap_or("");
        let uuid = raw.strip_prefix(PROVIDER_ID_SCHEME).unwrap_or(raw);
        if uuid.is_empty() {
            return Err(CnsError::InvalidProviderId {
                provider_id: raw.to_string(),
            });
        }
        Ok(uuid.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_uuid_with_scheme() {
        let obj = NodeObject::new("node-1", "vsphere://4237f0e3-1a2b-3c4d-5e6f-abcdef012345");
        assert_eq!(
            obj.provider_uuid().unwrap(),
            "4237f0e3-1a2b-3c4d-5e6f-abcdef012345"
        );
    }

    #[test]
    fn test_provider_uuid_bare() {
        let obj = NodeObject::new("node-1", "4237f0e3-1a2b-3c4d-5e6f-abcdef012345");
        assert_eq!(
            obj.provider_uuid().unwrap(),
            "4237f0e3-1a2b-3c4d-5e6f-abcdef012345"
        );
    }

    #[test]
    fn test_provider_uuid_empty() {
        let obj = NodeObject::new("node-1", "");
        assert!(matches!(
            obj.provider_uuid(),
            Err(CnsError::InvalidProviderId { .. })
        ));
    }

    #[test]
    fn test_provider_uuid_scheme_only() {
        let obj = NodeObject::new("node-1", "vsphere://");
        assert!(matches!(
            obj.provider_uuid(),
            Err(CnsError::InvalidProviderId { .. })
        ));
    }

    #[test]
    fn test_provider_uuid_absent() {
        let obj = NodeObject {
            name: Some("node-1".to_string()),
            provider_id: None,
        };
        assert!(obj.provider_uuid().is_err());
    }
}
