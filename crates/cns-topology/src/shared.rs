//! Datastore intersection engine.
//!
//! Computes the set of datastores reachable from every node in a list.
//! The first node's accessible list is the canonical ordering basis;
//! each subsequent node's list narrows it by URL equality. A collapse
//! to empty is a terminal failure naming the node that caused it, not
//! an empty success: a volume placed on a datastore not every node can
//! reach would be unmountable.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use cns_proto::{CnsError, CnsResult, DatastoreInfo, Node};

use crate::vcenter::Vcenter;

/// Intersect the accessible-datastore sets of `nodes` by URL.
///
/// Fails with `EmptyNodeList` on an empty node list, with
/// `NoSharedDatastores` naming the offending node when the intersection
/// collapses, and propagates any accessor failure unchanged (no
/// partial result).
pub async fn shared_datastores_for_nodes(
    cancel: &CancellationToken,
    vcenter: &dyn Vcenter,
    nodes: &[Node],
) -> CnsResult<Vec<DatastoreInfo>> {
    if nodes.is_empty() {
        return Err(CnsError::EmptyNodeList);
    }

    let mut shared: Vec<DatastoreInfo> = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(CnsError::Cancelled);
        }
        debug!("fetching accessible datastores for node {}", node);
        let accessible = vcenter.accessible_datastores(cancel, &node.vm).await?;
        if i == 0 {
            shared = accessible;
        } else {
            // Keep the running set's relative order; membership is
            // decided by URL only.
            shared.retain(|ds| accessible.iter().any(|a| a.url == ds.url));
        }
        if shared.is_empty() {
            error!("no shared datastores after intersecting node {}", node);
            return Err(CnsError::NoSharedDatastores {
                node: node.name.clone(),
            });
        }
    }
    Ok(shared)
}
