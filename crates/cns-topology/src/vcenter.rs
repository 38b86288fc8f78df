//! Storage-provider accessor seam.
//!
//! The resolver never talks to the provider directly; everything goes
//! through this trait so the backend (live vCenter session, in-process
//! mock) can be swapped transparently. Session management, reconnects,
//! and credentials live entirely behind the implementation.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use cns_proto::{CnsResult, DatastoreInfo, VirtualMachine};

/// Accessor used to resolve and query the virtual machines backing
/// cluster nodes.
///
/// Methods may block on external I/O. Every call takes the caller's
/// cancellation token and must give up promptly once it fires, returning
/// `CnsError::Cancelled` rather than partial data. Transient failures
/// are reported as errors and never retried here; retry policy belongs
/// to the caller.
#[async_trait]
pub trait Vcenter: Send + Sync {
    /// Resolve a VM uuid (extracted from a node's provider ID) to a
    /// virtual machine handle.
    async fn resolve_vm(
        &self,
        cancel: &CancellationToken,
        uuid: &str,
    ) -> CnsResult<VirtualMachine>;

    /// All datastores the VM can currently reach.
    async fn accessible_datastores(
        &self,
        cancel: &CancellationToken,
        vm: &VirtualMachine,
    ) -> CnsResult<Vec<DatastoreInfo>>;

    /// Whether the VM resides in the given zone and region, looked up
    /// under the given label keys. An empty zone or region value is a
    /// wildcard and matches any placement.
    async fn is_in_zone_region(
        &self,
        cancel: &CancellationToken,
        vm: &VirtualMachine,
        zone_key: &str,
        region_key: &str,
        zone: &str,
        region: &str,
    ) -> CnsResult<bool>;
}
