//! Drift report records.

use chrono::{DateTime, Utc};
use lbsync_id::{ListenerId, LoadBalancerId, PoolId, ProjectId};
use lbsync_model::Member;
use serde::{Deserialize, Serialize};

/// Members missing from one pool on the subject side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMemberDrift {
    pub pool_id: PoolId,
    pub members: Vec<Member>,
}

/// Everything the benchmark side has that the subject side is missing.
///
/// All identifier lists are sorted, so equal drift always serializes
/// identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Name of the benchmark collector.
    pub benchmark: String,

    /// Name of the subject collector.
    pub subject: String,

    pub generated_at: DateTime<Utc>,

    pub missing_projects: Vec<ProjectId>,
    pub missing_loadbalancers: Vec<LoadBalancerId>,
    pub missing_listeners: Vec<ListenerId>,
    pub missing_pools: Vec<PoolId>,
    pub missing_members: Vec<PoolMemberDrift>,
}

impl DriftReport {
    /// True when the subject is fully in sync with the benchmark.
    pub fn is_empty(&self) -> bool {
        self.missing_projects.is_empty()
            && self.missing_loadbalancers.is_empty()
            && self.missing_listeners.is_empty()
            && self.missing_pools.is_empty()
            && self.missing_members.is_empty()
    }

    /// Total count of missing resources across all kinds.
    pub fn total_missing(&self) -> usize {
        self.missing_projects.len()
            + self.missing_loadbalancers.len()
            + self.missing_listeners.len()
            + self.missing_pools.len()
            + self
                .missing_members
                .iter()
                .map(|d| d.members.len())
                .sum::<usize>()
    }
}
