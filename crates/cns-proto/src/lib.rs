//! # cns-proto
//!
//! Shared data model and error types for the CNS node-to-datastore
//! topology resolver.
//!
//! This crate defines the node and virtual machine handles, the
//! datastore value type, topology constraint types, and the unified
//! error taxonomy used by all resolver components.

pub mod datastore;
pub mod defaults;
pub mod error;
pub mod node;
pub mod topology;

// Re-export commonly used types at the crate root
pub use datastore::DatastoreInfo;
pub use error::{CnsError, CnsResult};
pub use node::{Node, NodeObject, VirtualMachine};
pub use topology::{DatastoreTopologyMap, TopologyRequirement, TopologySegments};
