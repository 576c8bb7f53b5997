//! In-memory appliance for tests and mock mode.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use lbsync_id::{ListenerId, LoadBalancerId, MemberId, PoolId};
use lbsync_model::{DeviceHandle, Listener, LoadBalancer, Member, Pool};
use tokio::sync::RwLock;
use tracing::debug;

use crate::facade::{CreateOutcome, DeleteOutcome, DeviceResources};
use crate::inventory::DeviceInventory;

#[derive(Default)]
struct State {
    loadbalancers: BTreeMap<LoadBalancerId, LoadBalancer>,
    listeners: BTreeMap<ListenerId, Listener>,
    pools: BTreeMap<PoolId, Pool>,
    members: BTreeMap<MemberId, Member>,
}

/// An appliance stand-in holding configuration in memory.
///
/// Implements both the write facade and the read inventory, scoped to the
/// single partition named in its handle. Used by the test suites and by the
/// agent's mock device mode.
pub struct InMemoryDevice {
    handle: DeviceHandle,
    state: RwLock<State>,
    fail_creates: bool,
}

impl InMemoryDevice {
    pub fn new(handle: DeviceHandle) -> Self {
        Self {
            handle,
            state: RwLock::new(State::default()),
            fail_creates: false,
        }
    }

    /// A device that rejects every create, for failure-path tests.
    pub fn failing(handle: DeviceHandle) -> Self {
        Self {
            handle,
            state: RwLock::new(State::default()),
            fail_creates: true,
        }
    }

    fn check_partition(&self, partition: &str) -> Result<()> {
        if partition != self.handle.partition {
            bail!(
                "unknown partition {partition:?} on device {}",
                self.handle.hostname
            );
        }
        Ok(())
    }

    fn check_create(&self, partition: &str) -> Result<()> {
        self.check_partition(partition)?;
        if self.fail_creates {
            bail!("device {} rejected create", self.handle.hostname);
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceResources for InMemoryDevice {
    async fn create_loadbalancer(
        &self,
        partition: &str,
        spec: &LoadBalancer,
    ) -> Result<CreateOutcome> {
        self.check_create(partition)?;
        let mut state = self.state.write().await;
        if state.loadbalancers.contains_key(&spec.id) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        debug!(device = %self.handle.hostname, id = %spec.id, "loadbalancer created");
        state.loadbalancers.insert(spec.id, spec.clone());
        Ok(CreateOutcome::Created)
    }

    async fn create_listener(&self, partition: &str, spec: &Listener) -> Result<CreateOutcome> {
        self.check_create(partition)?;
        let mut state = self.state.write().await;
        if state.listeners.contains_key(&spec.id) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        state.listeners.insert(spec.id, spec.clone());
        Ok(CreateOutcome::Created)
    }

    async fn create_pool(&self, partition: &str, spec: &Pool) -> Result<CreateOutcome> {
        self.check_create(partition)?;
        let mut state = self.state.write().await;
        if state.pools.contains_key(&spec.id) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        // Members are tracked individually, not on the pool record.
        let mut pool = spec.clone();
        pool.members = Vec::new();
        state.pools.insert(pool.id, pool);
        Ok(CreateOutcome::Created)
    }

    async fn create_member(&self, partition: &str, spec: &Member) -> Result<CreateOutcome> {
        self.check_create(partition)?;
        let mut state = self.state.write().await;
        if state.members.contains_key(&spec.id) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        state.members.insert(spec.id, spec.clone());
        Ok(CreateOutcome::Created)
    }

    async fn delete_loadbalancer(
        &self,
        partition: &str,
        id: &LoadBalancerId,
    ) -> Result<DeleteOutcome> {
        self.check_partition(partition)?;
        let mut state = self.state.write().await;
        Ok(match state.loadbalancers.remove(id) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }

    async fn delete_listener(&self, partition: &str, id: &ListenerId) -> Result<DeleteOutcome> {
        self.check_partition(partition)?;
        let mut state = self.state.write().await;
        Ok(match state.listeners.remove(id) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }

    async fn delete_pool(&self, partition: &str, id: &PoolId) -> Result<DeleteOutcome> {
        self.check_partition(partition)?;
        let mut state = self.state.write().await;
        Ok(match state.pools.remove(id) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }

    async fn delete_member(&self, partition: &str, id: &MemberId) -> Result<DeleteOutcome> {
        self.check_partition(partition)?;
        let mut state = self.state.write().await;
        Ok(match state.members.remove(id) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }
}

#[async_trait]
impl DeviceInventory for InMemoryDevice {
    fn handle(&self) -> &DeviceHandle {
        &self.handle
    }

    async fn loadbalancers(&self) -> Result<Vec<LoadBalancer>> {
        let state = self.state.read().await;
        Ok(state.loadbalancers.values().cloned().collect())
    }

    async fn listeners(&self) -> Result<Vec<Listener>> {
        let state = self.state.read().await;
        Ok(state.listeners.values().cloned().collect())
    }

    async fn pools(&self) -> Result<Vec<Pool>> {
        let state = self.state.read().await;
        Ok(state.pools.values().cloned().collect())
    }

    async fn members(&self, pool: &PoolId) -> Result<Vec<Member>> {
        let state = self.state.read().await;
        Ok(state
            .members
            .values()
            .filter(|m| m.pool_id == *pool)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lbsync_id::{DeviceId, ProjectId};

    fn handle() -> DeviceHandle {
        DeviceHandle {
            id: DeviceId::new(),
            hostname: "bigip-1.example".to_string(),
            partition: "lbsync".to_string(),
        }
    }

    fn loadbalancer() -> LoadBalancer {
        LoadBalancer {
            id: LoadBalancerId::new(),
            project_id: ProjectId::new(),
            name: None,
            vip_address: "192.0.2.5".to_string(),
            admin_state_up: true,
        }
    }

    #[tokio::test]
    async fn test_create_is_idempotent_by_outcome() {
        let device = InMemoryDevice::new(handle());
        let lb = loadbalancer();

        let first = device.create_loadbalancer("lbsync", &lb).await.unwrap();
        let second = device.create_loadbalancer("lbsync", &lb).await.unwrap();

        assert_eq!(first, CreateOutcome::Created);
        assert_eq!(second, CreateOutcome::AlreadyExists);
        assert!(second.already_existed());
        assert_eq!(device.loadbalancers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_absent_is_not_found() {
        let device = InMemoryDevice::new(handle());
        let outcome = device
            .delete_loadbalancer("lbsync", &LoadBalancerId::new())
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_unknown_partition_is_an_error() {
        let device = InMemoryDevice::new(handle());
        let err = device
            .create_loadbalancer("Common", &loadbalancer())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown partition"));
    }

    #[tokio::test]
    async fn test_failing_device_rejects_creates() {
        let device = InMemoryDevice::failing(handle());
        assert!(device
            .create_loadbalancer("lbsync", &loadbalancer())
            .await
            .is_err());

        // Deletes still work; only creates are rejected.
        let outcome = device
            .delete_pool("lbsync", &PoolId::new())
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
    }
}
