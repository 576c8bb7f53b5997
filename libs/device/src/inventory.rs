//! Read side of the fleet: what actually exists on the appliances.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use lbsync_id::{AgentId, PoolId, ProjectId};
use lbsync_model::{DeviceHandle, Listener, LoadBalancer, Member, Pool};
use lbsync_resync::ResourceSource;

/// Configuration state readable from one appliance.
///
/// Pools are reported without members; members are a separate query, mirroring
/// the shape of the control-plane source so the same collector drives both.
#[async_trait]
pub trait DeviceInventory: Send + Sync {
    /// The handle this inventory reads from.
    fn handle(&self) -> &DeviceHandle;

    async fn loadbalancers(&self) -> Result<Vec<LoadBalancer>>;

    async fn listeners(&self) -> Result<Vec<Listener>>;

    async fn pools(&self) -> Result<Vec<Pool>>;

    async fn members(&self, pool: &PoolId) -> Result<Vec<Member>>;
}

/// Adapts a fleet of device inventories into a [`ResourceSource`].
///
/// Queries union each resource kind across all devices. Records configured on
/// more than one appliance (the normal case for a clustered fleet) are
/// deduplicated: by id for loadbalancers, listeners, and pools, and by
/// address+port endpoint for members.
pub struct DeviceSource {
    devices: Vec<Arc<dyn DeviceInventory>>,
}

impl DeviceSource {
    pub fn new(devices: Vec<Arc<dyn DeviceInventory>>) -> Self {
        Self { devices }
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

#[async_trait]
impl ResourceSource for DeviceSource {
    /// The fleet as a whole is the agent's scope, so the agent id does not
    /// narrow anything here.
    async fn loadbalancers_by_agent(&self, _agent: &AgentId) -> Result<Vec<LoadBalancer>> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for device in &self.devices {
            for lb in device.loadbalancers().await? {
                if seen.insert(lb.id) {
                    out.push(lb);
                }
            }
        }
        Ok(out)
    }

    async fn listeners_by_project(&self, project: &ProjectId) -> Result<Vec<Listener>> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for device in &self.devices {
            for listener in device.listeners().await? {
                if listener.project_id == *project && seen.insert(listener.id) {
                    out.push(listener);
                }
            }
        }
        Ok(out)
    }

    async fn pools_by_project(&self, project: &ProjectId) -> Result<Vec<Pool>> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for device in &self.devices {
            for pool in device.pools().await? {
                if pool.project_id == *project && seen.insert(pool.id) {
                    out.push(pool);
                }
            }
        }
        Ok(out)
    }

    async fn members_by_pool(&self, pool: &PoolId) -> Result<Vec<Member>> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for device in &self.devices {
            for member in device.members(pool).await? {
                if seen.insert((member.address.clone(), member.protocol_port)) {
                    out.push(member);
                }
            }
        }
        Ok(out)
    }
}
