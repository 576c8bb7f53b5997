//! The query interface a collector consumes.

use anyhow::Result;
use async_trait::async_trait;
use lbsync_id::{AgentId, PoolId, ProjectId};
use lbsync_model::{Listener, LoadBalancer, Member, Pool};

/// A provider of loadbalancer configuration state.
///
/// Implemented by the control-plane client (desired state) and by the device
/// fleet adapter (actual state). Implementations do their own transport and
/// may fail per query; the collector never retries and never caches a failed
/// fetch.
#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// All loadbalancers owned by the given agent.
    async fn loadbalancers_by_agent(&self, agent: &AgentId) -> Result<Vec<LoadBalancer>>;

    /// All listeners belonging to the given project.
    async fn listeners_by_project(&self, project: &ProjectId) -> Result<Vec<Listener>>;

    /// All pools belonging to the given project. Sources are not required to
    /// attach members; the collector fetches them separately.
    async fn pools_by_project(&self, project: &ProjectId) -> Result<Vec<Pool>>;

    /// All members of the given pool.
    async fn members_by_pool(&self, pool: &PoolId) -> Result<Vec<Member>>;
}
