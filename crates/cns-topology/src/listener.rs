//! Membership listener.
//!
//! Bridges the cluster membership event stream into registry mutations.
//! Raw add/delete payloads are validated up front and turned into
//! [`RegistryCommand`]s on a bounded mpsc channel; a single consumer
//! task applies them to the registry in order. Malformed events are
//! warned about and dropped, a failed apply is warned about and
//! skipped, and the consumer never exits on a bad event. Transient
//! registry errors self-heal on the next event or the next full
//! resolution pass.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use cns_proto::defaults::DEFAULT_MEMBERSHIP_CHANNEL_SIZE;
use cns_proto::NodeObject;

use crate::manager::NodeManager;

/// A validated registry mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCommand {
    Register { uuid: String, name: String },
    Unregister { name: String },
}

/// Validates membership events and feeds them to the registry apply task.
pub struct MembershipListener {
    cmd_tx: mpsc::Sender<RegistryCommand>,
}

impl MembershipListener {
    /// Spawn the apply task and return the listener handle.
    ///
    /// The task runs until `cancel` fires or the listener (and every
    /// cloned sender) is dropped; on drop it drains the queued commands
    /// before exiting.
    pub fn spawn(
        manager: Arc<NodeManager>,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(DEFAULT_MEMBERSHIP_CHANNEL_SIZE);
        let handle = tokio::spawn(apply_loop(manager, cmd_rx, cancel));
        (Self { cmd_tx }, handle)
    }

    /// Membership "add" callback.
    ///
    /// Extracts the node name and provider uuid from the payload; either
    /// being malformed or absent drops the event with a warning. The
    /// event source never sees an error.
    pub fn node_added(&self, obj: &NodeObject) {
        let Some(name) = obj.name.as_deref().filter(|n| !n.is_empty()) else {
            warn!("add event without a node name, dropping: {:?}", obj);
            return;
        };
        let uuid = match obj.provider_uuid() {
            Ok(uuid) => uuid,
            Err(e) => {
                warn!("add event for node {:?} has a bad provider ID, dropping: {}", name, e);
                return;
            }
        };
        self.enqueue(RegistryCommand::Register {
            uuid,
            name: name.to_string(),
        });
    }

    /// Membership "delete" callback.
    pub fn node_deleted(&self, obj: &NodeObject) {
        let Some(name) = obj.name.as_deref().filter(|n| !n.is_empty()) else {
            warn!("delete event without a node name, dropping: {:?}", obj);
            return;
        };
        self.enqueue(RegistryCommand::Unregister {
            name: name.to_string(),
        });
    }

    fn enqueue(&self, cmd: RegistryCommand) {
        // try_send so a slow consumer can never stall the event source.
        // A dropped command is healed by the next full resync.
        if let Err(e) = self.cmd_tx.try_send(cmd) {
            warn!("membership command queue full, dropping: {}", e);
        }
    }
}

async fn apply_loop(
    manager: Arc<NodeManager>,
    mut cmd_rx: mpsc::Receiver<RegistryCommand>,
    cancel: CancellationToken,
) {
    loop {
        let cmd = tokio::select! {
            _ = cancel.cancelled() => break,
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };
        match cmd {
            RegistryCommand::Register { uuid, name } => {
                if let Err(e) = manager.register_node(&cancel, &uuid, &name).await {
                    warn!("failed to register node {:?}: {}", name, e);
                }
            }
            RegistryCommand::Unregister { name } => {
                if let Err(e) = manager.unregister_node(&name).await {
                    warn!("failed to unregister node {:?}: {}", name, e);
                }
            }
        }
    }
    debug!("membership apply loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockVcenter;
    use cns_proto::node::PROVIDER_ID_SCHEME;

    async fn setup() -> (Arc<MockVcenter>, Arc<NodeManager>) {
        let vcenter = Arc::new(MockVcenter::new());
        let manager = Arc::new(NodeManager::new(vcenter.clone()));
        (vcenter, manager)
    }

    fn provider_id(uuid: &str) -> String {
        format!("{}{}", PROVIDER_ID_SCHEME, uuid)
    }

    #[tokio::test]
    async fn test_add_event_registers_node() {
        let (vcenter, manager) = setup().await;
        vcenter.add_vm("uuid-1", &[]).await;

        let (listener, handle) = MembershipListener::spawn(manager.clone(), CancellationToken::new());
        listener.node_added(&NodeObject::new("node-1", provider_id("uuid-1")));

        // Dropping the listener closes the channel; the apply task drains
        // the queue before exiting.
        drop(listener);
        handle.await.unwrap();

        assert_eq!(manager.node_count().await, 1);
        assert!(manager.node_by_name("node-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_event_unregisters_node() {
        let (vcenter, manager) = setup().await;
        vcenter.add_vm("uuid-1", &[]).await;

        let (listener, handle) = MembershipListener::spawn(manager.clone(), CancellationToken::new());
        listener.node_added(&NodeObject::new("node-1", provider_id("uuid-1")));
        listener.node_deleted(&NodeObject::new("node-1", provider_id("uuid-1")));

        drop(listener);
        handle.await.unwrap();

        assert_eq!(manager.node_count().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_add_event_dropped() {
        let (_vcenter, manager) = setup().await;

        let (listener, handle) = MembershipListener::spawn(manager.clone(), CancellationToken::new());
        // No name.
        listener.node_added(&NodeObject {
            name: None,
            provider_id: Some(provider_id("uuid-1")),
        });
        // No provider ID.
        listener.node_added(&NodeObject {
            name: Some("node-1".to_string()),
            provider_id: None,
        });
        // Empty provider ID with scheme only.
        listener.node_added(&NodeObject::new("node-2", PROVIDER_ID_SCHEME));

        drop(listener);
        handle.await.unwrap();

        assert_eq!(manager.node_count().await, 0);
    }

    #[tokio::test]
    async fn test_register_failure_does_not_stop_consumer() {
        let (vcenter, manager) = setup().await;
        vcenter.add_vm("uuid-2", &[]).await;

        let (listener, handle) = MembershipListener::spawn(manager.clone(), CancellationToken::new());
        // uuid-1 is unknown to the accessor: registration fails, is
        // logged, and the next event is still applied.
        listener.node_added(&NodeObject::new("node-1", provider_id("uuid-1")));
        listener.node_added(&NodeObject::new("node-2", provider_id("uuid-2")));

        drop(listener);
        handle.await.unwrap();

        assert_eq!(manager.node_count().await, 1);
        assert!(manager.node_by_name("node-2").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unknown_node_is_non_fatal() {
        let (vcenter, manager) = setup().await;
        vcenter.add_vm("uuid-1", &[]).await;

        let (listener, handle) = MembershipListener::spawn(manager.clone(), CancellationToken::new());
        listener.node_deleted(&NodeObject::new("ghost", ""));
        listener.node_added(&NodeObject::new("node-1", provider_id("uuid-1")));

        drop(listener);
        handle.await.unwrap();

        assert_eq!(manager.node_count().await, 1);
    }

    #[tokio::test]
    async fn test_cancel_stops_consumer() {
        let (_vcenter, manager) = setup().await;
        let cancel = CancellationToken::new();

        let (listener, handle) = MembershipListener::spawn(manager, cancel.clone());
        cancel.cancel();
        handle.await.unwrap();
        drop(listener);
    }
}
