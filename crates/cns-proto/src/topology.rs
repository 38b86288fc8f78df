//! Topology constraint and result types.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// One placement domain: an ordered set of label key → value pairs
/// (typically a zone and/or region label).
pub type TopologySegments = BTreeMap<String, String>;

/// Map from datastore URL to the segment maps under which that datastore
/// was found shared, in segment-set evaluation order. A datastore shared
/// in several placement domains appears once with several entries.
pub type DatastoreTopologyMap = HashMap<String, Vec<TopologySegments>>;

/// Placement constraint supplied by the provisioning caller.
///
/// `preferred` segment sets are evaluated first and strictly shadow
/// `requisite`: the requisite list is only consulted when the preferred
/// pass yields no datastores. Both lists empty means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyRequirement {
    pub preferred: Vec<TopologySegments>,
    pub requisite: Vec<TopologySegments>,
}

impl TopologyRequirement {
    pub fn new(preferred: Vec<TopologySegments>, requisite: Vec<TopologySegments>) -> Self {
        Self {
            preferred,
            requisite,
        }
    }

    /// Build a segment set from optional zone/region values, keyed by the
    /// given label keys. Empty values are omitted (wildcard).
    pub fn segments(
        zone_key: &str,
        region_key: &str,
        zone: &str,
        region: &str,
    ) -> TopologySegments {
        let mut segments = TopologySegments::new();
        if !zone.is_empty() {
            segments.insert(zone_key.to_string(), zone.to_string());
        }
        if !region.is_empty() {
            segments.insert(region_key.to_string(), region.to_string());
        }
        segments
    }
}
