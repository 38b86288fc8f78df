//! In-process mock accessor.
//!
//! `MockVcenter` holds its inventory in memory and performs no network
//! I/O, making it suitable for development and tests. VM fixtures carry
//! an accessible-datastore list and placement labels, and individual
//! calls can be made to fail to exercise abort paths.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use cns_proto::topology::TopologySegments;
use cns_proto::{CnsError, CnsResult, DatastoreInfo, VirtualMachine};

use crate::vcenter::Vcenter;

struct VmFixture {
    vm: VirtualMachine,
    datastores: Vec<DatastoreInfo>,
    labels: TopologySegments,
    fail_datastores: bool,
    fail_zone_test: bool,
}

/// Mock accessor backed by an in-memory VM inventory, keyed by uuid.
#[derive(Default)]
pub struct MockVcenter {
    vms: RwLock<HashMap<String, VmFixture>>,
}

impl MockVcenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a VM fixture with the given accessible datastores and return
    /// its handle. The moref is assigned sequentially (`vm-1`, `vm-2`...).
    pub async fn add_vm(&self, uuid: &str, datastores: &[DatastoreInfo]) -> VirtualMachine {
        let mut vms = self.vms.write().await;
        let vm = VirtualMachine::new(uuid, format!("vm-{}", vms.len() + 1));
        vms.insert(
            uuid.to_string(),
            VmFixture {
                vm: vm.clone(),
                datastores: datastores.to_vec(),
                labels: TopologySegments::new(),
                fail_datastores: false,
                fail_zone_test: false,
            },
        );
        vm
    }

    /// Set a placement label (e.g. a zone or region) on a VM fixture.
    pub async fn set_label(&self, uuid: &str, key: &str, value: &str) {
        let mut vms = self.vms.write().await;
        if let Some(fixture) = vms.get_mut(uuid) {
            fixture.labels.insert(key.to_string(), value.to_string());
        }
    }

    /// Make `accessible_datastores` fail for the given VM.
    pub async fn fail_datastores(&self, uuid: &str, fail: bool) {
        let mut vms = self.vms.write().await;
        if let Some(fixture) = vms.get_mut(uuid) {
            fixture.fail_datastores = fail;
        }
    }

    /// Make `is_in_zone_region` fail for the given VM.
    pub async fn fail_zone_test(&self, uuid: &str, fail: bool) {
        let mut vms = self.vms.write().await;
        if let Some(fixture) = vms.get_mut(uuid) {
            fixture.fail_zone_test = fail;
        }
    }
}

#[async_trait]
impl Vcenter for MockVcenter {
    async fn resolve_vm(
        &self,
        cancel: &CancellationToken,
        uuid: &str,
    ) -> CnsResult<VirtualMachine> {
        if cancel.is_cancelled() {
            return Err(CnsError::Cancelled);
        }
        let vms = self.vms.read().await;
        vms.get(uuid)
            .map(|fixture| fixture.vm.clone())
            .ok_or_else(|| CnsError::Resolution {
                uuid: uuid.to_string(),
            })
    }

    async fn accessible_datastores(
        &self,
        cancel: &CancellationToken,
        vm: &VirtualMachine,
    ) -> CnsResult<Vec<DatastoreInfo>> {
        if cancel.is_cancelled() {
            return Err(CnsError::Cancelled);
        }
        let vms = self.vms.read().await;
        let fixture = vms.get(&vm.uuid).ok_or_else(|| CnsError::Resolution {
            uuid: vm.uuid.clone(),
        })?;
        if fixture.fail_datastores {
            return Err(CnsError::Vcenter(format!(
                "injected datastore listing fault for {}",
                vm.moref
            )));
        }
        Ok(fixture.datastores.clone())
    }

    async fn is_in_zone_region(
        &self,
        cancel: &CancellationToken,
        vm: &VirtualMachine,
        zone_key: &str,
        region_key: &str,
        zone: &str,
        region: &str,
    ) -> CnsResult<bool> {
        if cancel.is_cancelled() {
            return Err(CnsError::Cancelled);
        }
        let vms = self.vms.read().await;
        let fixture = vms.get(&vm.uuid).ok_or_else(|| CnsError::Resolution {
            uuid: vm.uuid.clone(),
        })?;
        if fixture.fail_zone_test {
            return Err(CnsError::Vcenter(format!(
                "injected zone lookup fault for {}",
                vm.moref
            )));
        }
        let zone_matches =
            zone.is_empty() || fixture.labels.get(zone_key).map(String::as_str) == Some(zone);
        let region_matches = region.is_empty()
            || fixture.labels.get(region_key).map(String::as_str) == Some(region);
        Ok(zone_matches && region_matches)
    }
}
