//! The loadbalancer resource hierarchy.

use lbsync_id::{ListenerId, LoadBalancerId, MemberId, PoolId, ProjectId};
use serde::{Deserialize, Serialize};

/// Frontend protocol spoken by a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Tcp,
    Http,
    Https,
    TerminatedHttps,
}

/// Balancing algorithm configured on a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LbAlgorithm {
    RoundRobin,
    LeastConnections,
    SourceIp,
}

impl Default for LbAlgorithm {
    fn default() -> Self {
        Self::RoundRobin
    }
}

/// Root of the hierarchy; the unit by which an agent owns work.
///
/// Created and destroyed by the control plane, read-only to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub id: LoadBalancerId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub name: Option<String>,
    pub vip_address: String,
    #[serde(default = "default_admin_state")]
    pub admin_state_up: bool,
}

/// A frontend bound to one loadbalancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub id: ListenerId,
    pub project_id: ProjectId,
    pub loadbalancer_id: LoadBalancerId,
    pub protocol: Protocol,
    pub protocol_port: u16,
}

/// A backend pool. `members` is attached by the resource collector as a side
/// effect of the first pool fetch for the owning project; sources are free to
/// return pools without members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub project_id: ProjectId,
    pub loadbalancer_id: LoadBalancerId,
    #[serde(default)]
    pub lb_algorithm: LbAlgorithm,
    #[serde(default)]
    pub members: Vec<Member>,
}

/// A backend endpoint inside a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub pool_id: PoolId,
    pub address: String,
    pub protocol_port: u16,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl Member {
    /// The address+port pair that identifies a member across control plane
    /// and appliance, independent of either side's record id.
    pub fn endpoint(&self) -> (&str, u16) {
        (self.address.as_str(), self.protocol_port)
    }
}

fn default_admin_state() -> bool {
    true
}

fn default_weight() -> u32 {
    1
}
