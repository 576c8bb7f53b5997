//! The per-appliance CRUD facade.

use anyhow::Result;
use async_trait::async_trait;
use lbsync_id::{ListenerId, LoadBalancerId, MemberId, PoolId};
use lbsync_model::{Listener, LoadBalancer, Member, Pool};

/// Result of a create operation. An object that was already present is a
/// success, reported as its own variant so callers can log or count it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

impl CreateOutcome {
    pub fn already_existed(&self) -> bool {
        matches!(self, Self::AlreadyExists)
    }
}

/// Result of a delete operation. Deleting an absent object is a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Configuration operations against one appliance.
///
/// Objects are named on the appliance by their control-plane id and scoped to
/// a partition (the appliance-side namespace this agent owns). Transport and
/// vendor API details live entirely behind implementations; everything that
/// is not an already-exists/not-found case is an error.
#[async_trait]
pub trait DeviceResources: Send + Sync {
    async fn create_loadbalancer(
        &self,
        partition: &str,
        spec: &LoadBalancer,
    ) -> Result<CreateOutcome>;

    async fn create_listener(&self, partition: &str, spec: &Listener) -> Result<CreateOutcome>;

    async fn create_pool(&self, partition: &str, spec: &Pool) -> Result<CreateOutcome>;

    async fn create_member(&self, partition: &str, spec: &Member) -> Result<CreateOutcome>;

    async fn delete_loadbalancer(
        &self,
        partition: &str,
        id: &LoadBalancerId,
    ) -> Result<DeleteOutcome>;

    async fn delete_listener(&self, partition: &str, id: &ListenerId) -> Result<DeleteOutcome>;

    async fn delete_pool(&self, partition: &str, id: &PoolId) -> Result<DeleteOutcome>;

    async fn delete_member(&self, partition: &str, id: &MemberId) -> Result<DeleteOutcome>;
}
