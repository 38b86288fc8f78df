//! Error types for the topology resolver.
//!
//! Every registry or accessor failure aborts the enclosing computation
//! and carries the node / provider identifiers needed to log it
//! meaningfully. The only place an error is swallowed is the membership
//! listener, which warns about malformed events and drops them.

use serde::{Deserialize, Serialize};

/// Unified error type for all registry and topology operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum CnsError {
    /// A provider uuid could not be resolved to a virtual machine handle.
    /// Registration fails; a future membership event may retry.
    #[error("cannot resolve uuid {uuid:?} to a virtual machine")]
    Resolution { uuid: String },

    /// A lookup or unregistration referenced an unknown node name.
    #[error("node {name:?} not found")]
    NodeNotFound { name: String },

    /// The registry holds no nodes but at least one is required.
    #[error("no nodes registered")]
    EmptyRegistry,

    /// The intersection engine was invoked over an empty node list.
    #[error("empty node list")]
    EmptyNodeList,

    /// The running datastore intersection collapsed to empty. Names the
    /// node whose accessible set caused the collapse.
    #[error("no shared datastores found for node {node:?}")]
    NoSharedDatastores { node: String },

    /// A membership event carried an absent or malformed provider ID.
    #[error("invalid provider ID {provider_id:?}")]
    InvalidProviderId { provider_id: String },

    /// The caller's cancellation token fired mid-computation.
    #[error("operation cancelled")]
    Cancelled,

    /// Transport or provider failure reported by the vCenter accessor.
    #[error("vCenter error: {0}")]
    Vcenter(String),
}

/// Result alias used throughout the resolver.
pub type CnsResult<T> = Result<T, CnsError>;
