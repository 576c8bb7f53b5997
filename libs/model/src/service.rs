//! Service payloads pushed to appliances.

use lbsync_id::DeviceId;
use serde::{Deserialize, Serialize};

use crate::{Listener, LoadBalancer, Pool};

/// Addressing record for one appliance.
///
/// The fleet is an explicit owned collection of these handles; there is no
/// process-wide device registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHandle {
    pub id: DeviceId,
    pub hostname: String,
    /// Partition (namespace) on the appliance that this agent configures.
    pub partition: String,
}

/// The denormalized configuration for one loadbalancer, as deployed to a
/// device: the loadbalancer itself plus its listeners and pools (members
/// attached).
///
/// `targets` names the devices an operation applies to. Callers build a
/// `ServiceSpec` with `targets` empty; the fan-out applier narrows each
/// per-device copy to a single handle and never touches the caller's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub loadbalancer: LoadBalancer,
    #[serde(default)]
    pub listeners: Vec<Listener>,
    #[serde(default)]
    pub pools: Vec<Pool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<DeviceHandle>,
}

impl ServiceSpec {
    /// A spec narrowed to a single target device.
    pub fn for_target(&self, target: DeviceHandle) -> Self {
        let mut spec = self.clone();
        spec.targets = vec![target];
        spec
    }
}
