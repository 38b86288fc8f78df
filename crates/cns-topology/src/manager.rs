//! Node registry.
//!
//! Maps stable node names to their resolved virtual machine handles,
//! kept consistent with the cluster membership event stream by the
//! listener. The lock is held only across map mutation and snapshot
//! copies, never across a vCenter call, so membership updates are never
//! stalled by a slow topology resolution and vice versa.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use cns_proto::{CnsError, CnsResult, Node};

use crate::vcenter::Vcenter;

/// Registry of cluster compute nodes.
pub struct NodeManager {
    vcenter: Arc<dyn Vcenter>,
    nodes: RwLock<HashMap<String, Node>>,
}

impl NodeManager {
    pub fn new(vcenter: Arc<dyn Vcenter>) -> Self {
        Self {
            vcenter,
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve `uuid` to a VM handle and insert the node under `name`.
    ///
    /// Re-registering an existing name replaces its handle (idempotent
    /// overwrite). Resolution failures are returned without retrying; a
    /// future membership event may retry.
    pub async fn register_node(
        &self,
        cancel: &CancellationToken,
        uuid: &str,
        name: &str,
    ) -> CnsResult<()> {
        // Resolve before taking the lock.
        let vm = self.vcenter.resolve_vm(cancel, uuid).await.map_err(|e| {
            error!("failed to resolve uuid {:?} for node {:?}: {}", uuid, name, e);
            e
        })?;

        let mut nodes = self.nodes.write().await;
        let node = Node {
            name: name.to_string(),
            vm,
        };
        if nodes.insert(name.to_string(), node).is_some() {
            debug!("node {:?} re-registered, handle replaced", name);
        } else {
            info!("node {:?} registered", name);
        }
        Ok(())
    }

    /// Remove the node registered under `name`.
    pub async fn unregister_node(&self, name: &str) -> CnsResult<()> {
        let mut nodes = self.nodes.write().await;
        match nodes.remove(name) {
            Some(_) => {
                info!("node {:?} unregistered", name);
                Ok(())
            }
            None => Err(CnsError::NodeNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Look up the node registered under `name`.
    pub async fn node_by_name(&self, name: &str) -> CnsResult<Node> {
        let nodes = self.nodes.read().await;
        nodes.get(name).cloned().ok_or_else(|| CnsError::NodeNotFound {
            name: name.to_string(),
        })
    }

    /// Snapshot of all registered nodes.
    ///
    /// Fails with `EmptyRegistry` when no nodes are known; callers that
    /// need at least one node treat that as fatal for their operation.
    pub async fn all_nodes(&self) -> CnsResult<Vec<Node>> {
        let nodes = self.nodes.read().await;
        if nodes.is_empty() {
            return Err(CnsError::EmptyRegistry);
        }
        Ok(nodes.values().cloned().collect())
    }

    /// Number of registered nodes.
    pub async fn node_count(&self) -> usize {
        self.nodes.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockVcenter;

    async fn setup() -> (Arc<MockVcenter>, NodeManager, CancellationToken) {
        let vcenter = Arc::new(MockVcenter::new());
        let manager = NodeManager::new(vcenter.clone());
        (vcenter, manager, CancellationToken::new())
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let (vcenter, manager, cancel) = setup().await;
        let vm = vcenter.add_vm("uuid-1", &[]).await;

        manager.register_node(&cancel, "uuid-1", "node-1").await.unwrap();

        let node = manager.node_by_name("node-1").await.unwrap();
        assert_eq!(node.name, "node-1");
        assert_eq!(node.vm, vm);
    }

    #[tokio::test]
    async fn test_register_overwrites_existing_name() {
        let (vcenter, manager, cancel) = setup().await;
        vcenter.add_vm("uuid-1", &[]).await;
        let vm2 = vcenter.add_vm("uuid-2", &[]).await;

        manager.register_node(&cancel, "uuid-1", "node-1").await.unwrap();
        manager.register_node(&cancel, "uuid-2", "node-1").await.unwrap();

        assert_eq!(manager.node_count().await, 1);
        let node = manager.node_by_name("node-1").await.unwrap();
        assert_eq!(node.vm, vm2);
    }

    #[tokio::test]
    async fn test_register_resolution_failure() {
        let (_vcenter, manager, cancel) = setup().await;

        let result = manager.register_node(&cancel, "no-such-uuid", "node-1").await;
        assert!(matches!(result, Err(CnsError::Resolution { .. })));
        assert_eq!(manager.node_count().await, 0);
    }

    #[tokio::test]
    async fn test_unregister_unknown_name() {
        let (vcenter, manager, cancel) = setup().await;
        vcenter.add_vm("uuid-1", &[]).await;
        manager.register_node(&cancel, "uuid-1", "node-1").await.unwrap();

        let result = manager.unregister_node("node-2").await;
        assert!(matches!(result, Err(CnsError::NodeNotFound { .. })));
        // Registry unchanged.
        assert_eq!(manager.node_count().await, 1);
    }

    #[tokio::test]
    async fn test_unregister() {
        let (vcenter, manager, cancel) = setup().await;
        vcenter.add_vm("uuid-1", &[]).await;
        manager.register_node(&cancel, "uuid-1", "node-1").await.unwrap();

        manager.unregister_node("node-1").await.unwrap();
        assert!(matches!(
            manager.node_by_name("node-1").await,
            Err(CnsError::NodeNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_all_nodes_empty_registry() {
        let (_vcenter, manager, _cancel) = setup().await;

        let result = manager.all_nodes().await;
        assert!(matches!(result, Err(CnsError::EmptyRegistry)));
    }

    #[tokio::test]
    async fn test_all_nodes_snapshot() {
        let (vcenter, manager, cancel) = setup().await;
        vcenter.add_vm("uuid-1", &[]).await;
        vcenter.add_vm("uuid-2", &[]).await;
        manager.register_node(&cancel, "uuid-1", "node-1").await.unwrap();
        manager.register_node(&cancel, "uuid-2", "node-2").await.unwrap();

        let mut names: Vec<String> = manager
            .all_nodes()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["node-1", "node-2"]);
    }
}
