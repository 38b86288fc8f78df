//! Public resolver facade.
//!
//! `Nodes` ties the registry, the membership listener, and the
//! intersection engine together and exposes the API the provisioning
//! logic consumes: cluster-wide shared datastores, topology-filtered
//! shared datastores, and node lookup.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use cns_proto::{
    CnsResult, DatastoreInfo, DatastoreTopologyMap, Node, TopologyRequirement,
};

use crate::listener::MembershipListener;
use crate::manager::NodeManager;
use crate::shared::shared_datastores_for_nodes;
use crate::topology::shared_datastores_for_segments;
use crate::vcenter::Vcenter;

/// Node registry plus topology resolution over it.
pub struct Nodes {
    manager: Arc<NodeManager>,
    vcenter: Arc<dyn Vcenter>,
}

impl Nodes {
    pub fn new(vcenter: Arc<dyn Vcenter>) -> Self {
        Self {
            manager: Arc::new(NodeManager::new(vcenter.clone())),
            vcenter,
        }
    }

    /// The underlying registry, for direct registration or wiring a
    /// custom event source.
    pub fn manager(&self) -> &Arc<NodeManager> {
        &self.manager
    }

    /// Spawn a membership listener feeding this registry. `cancel` stops
    /// the apply task.
    pub fn start_listener(
        &self,
        cancel: CancellationToken,
    ) -> (MembershipListener, JoinHandle<()>) {
        MembershipListener::spawn(self.manager.clone(), cancel)
    }

    /// Look up a registered node by name.
    pub async fn node_by_name(&self, name: &str) -> CnsResult<Node> {
        self.manager.node_by_name(name).await
    }

    /// Datastores accessible to every node in the cluster.
    pub async fn shared_datastores_in_cluster(
        &self,
        cancel: &CancellationToken,
    ) -> CnsResult<Vec<DatastoreInfo>> {
        let nodes = self.manager.all_nodes().await.map_err(|e| {
            error!("failed to snapshot nodes from the registry: {}", e);
            e
        })?;
        shared_datastores_for_nodes(cancel, self.vcenter.as_ref(), &nodes).await
    }

    /// Shared accessible datastores for the given topology requirement,
    /// along with the map from datastore URL to the topology segments
    /// each datastore satisfies.
    ///
    /// Preferred segment sets are resolved first; the requisite list is
    /// consulted only when the preferred pass yields no datastores. With
    /// neither list supplied (or both passes empty) the result is an
    /// empty sequence and empty map, not an error: "no topology-
    /// constrained shared datastore found" is for the caller to
    /// interpret.
    pub async fn shared_datastores_in_topology(
        &self,
        cancel: &CancellationToken,
        requirement: &TopologyRequirement,
        zone_key: &str,
        region_key: &str,
    ) -> CnsResult<(Vec<DatastoreInfo>, DatastoreTopologyMap)> {
        debug!(
            "resolving topology requirement {:?} with zone key {:?}, region key {:?}",
            requirement, zone_key, region_key
        );
        let nodes = self.manager.all_nodes().await.map_err(|e| {
            error!("failed to snapshot nodes from the registry: {}", e);
            e
        })?;

        let mut shared = Vec::new();
        let mut topology_map = DatastoreTopologyMap::new();
        if !requirement.preferred.is_empty() {
            debug!("using preferred topology");
            (shared, topology_map) = shared_datastores_for_segments(
                cancel,
                self.vcenter.as_ref(),
                &nodes,
                &requirement.preferred,
                zone_key,
                region_key,
            )
            .await?;
        }
        if shared.is_empty() && !requirement.requisite.is_empty() {
            debug!("preferred topology yielded nothing, using requisite topology");
            (shared, topology_map) = shared_datastores_for_segments(
                cancel,
                self.vcenter.as_ref(),
                &nodes,
                &requirement.requisite,
                zone_key,
                region_key,
            )
            .await?;
        }
        Ok((shared, topology_map))
    }
}
