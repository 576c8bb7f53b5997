//! Identity extraction strategies.
//!
//! The comparator never looks inside resource records directly; a filter
//! turns each side's records into comparable identifier sets. Sides may use
//! different filters, which is what lets a device inventory with vendor
//! naming be compared against control-plane records.

use std::collections::{BTreeMap, BTreeSet};

use lbsync_id::{ListenerId, LoadBalancerId, PoolId};
use lbsync_model::{Listener, LoadBalancer, Member, Pool};

/// Extracts comparable identities from resource records.
pub trait IdFilter: Send + Sync {
    fn loadbalancer_ids(&self, resources: &[LoadBalancer]) -> BTreeSet<LoadBalancerId>;

    fn listener_ids(&self, resources: &[Listener]) -> BTreeSet<ListenerId>;

    fn pool_ids(&self, resources: &[Pool]) -> BTreeSet<PoolId>;

    /// Pool-id → attached members, for the hierarchical member diff.
    fn pool_members(&self, pools: &[Pool]) -> BTreeMap<PoolId, Vec<Member>>;
}

/// The default strategy: identity is the record id, members are whatever the
/// collector attached to each pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFilter;

impl IdFilter for StandardFilter {
    fn loadbalancer_ids(&self, resources: &[LoadBalancer]) -> BTreeSet<LoadBalancerId> {
        resources.iter().map(|r| r.id).collect()
    }

    fn listener_ids(&self, resources: &[Listener]) -> BTreeSet<ListenerId> {
        resources.iter().map(|r| r.id).collect()
    }

    fn pool_ids(&self, resources: &[Pool]) -> BTreeSet<PoolId> {
        resources.iter().map(|r| r.id).collect()
    }

    fn pool_members(&self, pools: &[Pool]) -> BTreeMap<PoolId, Vec<Member>> {
        pools
            .iter()
            .map(|p| (p.id, p.members.clone()))
            .collect()
    }
}
