//! # cns-topology
//!
//! Node-to-datastore topology resolution for a vSphere-backed cluster.
//!
//! The crate tracks which compute nodes exist (driven by cluster
//! membership events) and answers which datastores are simultaneously
//! reachable from a set of nodes, optionally filtered by zone/region
//! topology constraints. Volume provisioning uses the answer to pick a
//! datastore that every node which might mount the volume can reach.
//!
//! The registry is in-memory and best-effort: it is rebuilt from live
//! membership events on process start and is never persisted.

pub mod listener;
pub mod manager;
pub mod mock;
pub mod nodes;
pub mod shared;
pub mod topology;
pub mod vcenter;

// Re-export commonly used types at the crate root
pub use listener::{MembershipListener, RegistryCommand};
pub use manager::NodeManager;
pub use mock::MockVcenter;
pub use nodes::Nodes;
pub use shared::shared_datastores_for_nodes;
pub use tokio_util::sync::CancellationToken;
pub use vcenter::Vcenter;
