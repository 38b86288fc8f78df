//! Zone/region partitioning and per-segment-set resolution.
//!
//! For each topology segment set, the full node list is partitioned down
//! to the nodes whose VM resides in the set's zone and region, the
//! partition is intersected, and every resulting datastore is recorded
//! against the segment map it satisfied. Partitions and intersections
//! run sequentially; there is no internal parallelism.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use cns_proto::{
    CnsError, CnsResult, DatastoreInfo, DatastoreTopologyMap, Node, TopologyRequirement,
    TopologySegments,
};

use crate::shared::shared_datastores_for_nodes;
use crate::vcenter::Vcenter;

/// Nodes whose VM resides in the given zone and region. Empty zone or
/// region values are wildcards and do not filter.
pub(crate) async fn nodes_in_zone_region(
    cancel: &CancellationToken,
    vcenter: &dyn Vcenter,
    nodes: &[Node],
    zone_key: &str,
    region_key: &str,
    zone: &str,
    region: &str,
) -> CnsResult<Vec<Node>> {
    let mut matched = Vec::new();
    for node in nodes {
        if cancel.is_cancelled() {
            return Err(CnsError::Cancelled);
        }
        let inside = vcenter
            .is_in_zone_region(cancel, &node.vm, zone_key, region_key, zone, region)
            .await
            .map_err(|e| {
                error!(
                    "zone/region test failed for node {} (zone {:?}, region {:?}): {}",
                    node, zone, region, e
                );
                e
            })?;
        if inside {
            matched.push(node.clone());
        }
    }
    Ok(matched)
}

/// Run one pass over a list of segment sets (either the preferred or the
/// requisite list), accumulating shared datastores and the topology map.
///
/// Empty partitions contribute nothing; a failed intersection or
/// accessor call aborts the whole pass. The result sequence is a plain
/// concatenation across segment sets and is deliberately not
/// deduplicated — downstream placement may rely on the multiplicity.
pub(crate) async fn shared_datastores_for_segments(
    cancel: &CancellationToken,
    vcenter: &dyn Vcenter,
    nodes: &[Node],
    segment_sets: &[TopologySegments],
    zone_key: &str,
    region_key: &str,
) -> CnsResult<(Vec<DatastoreInfo>, DatastoreTopologyMap)> {
    let mut shared = Vec::new();
    let mut topology_map = DatastoreTopologyMap::new();

    for segments in segment_sets {
        let zone = segments.get(zone_key).map(String::as_str).unwrap_or("");
        let region = segments.get(region_key).map(String::as_str).unwrap_or("");
        debug!("resolving segment set: zone {:?}, region {:?}", zone, region);

        let partition =
            nodes_in_zone_region(cancel, vcenter, nodes, zone_key, region_key, zone, region)
                .await?;
        if partition.is_empty() {
            debug!("no nodes in zone {:?} / region {:?}", zone, region);
            continue;
        }

        let shared_in_partition = shared_datastores_for_nodes(cancel, vcenter, &partition)
            .await
            .map_err(|e| {
                error!(
                    "failed to get shared datastores in zone {:?} / region {:?}: {}",
                    zone, region, e
                );
                e
            })?;

        // Record only the keys actually supplied by this segment set.
        let recorded = TopologyRequirement::segments(zone_key, region_key, zone, region);
        for ds in &shared_in_partition {
            topology_map
                .entry(ds.url.clone())
                .or_default()
                .push(recorded.clone());
        }
        shared.extend(shared_in_partition);
    }
    Ok((shared, topology_map))
}
