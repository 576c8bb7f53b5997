//! Per-agent resource collection with lazy per-project caches.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use lbsync_id::{AgentId, ProjectId};
use lbsync_model::{Listener, LoadBalancer, Pool};
use tracing::debug;

use crate::error::ResyncError;
use crate::source::ResourceSource;

/// A snapshot-in-progress of one side of a comparison.
///
/// Loadbalancers are loaded eagerly at construction and define the project
/// set for the collector's lifetime. Listeners and pools are fetched lazily,
/// at most once per project; pool members are attached as a side effect of
/// the first pool fetch. Instances are built per comparison and discarded
/// afterwards.
///
/// Methods take `&mut self`: a collector is sequential by design, and the
/// borrow checker is what keeps two diffs from racing one instance's caches.
pub struct ResourceCollector {
    source: Arc<dyn ResourceSource>,
    agent: AgentId,
    loadbalancers: BTreeMap<ProjectId, Vec<LoadBalancer>>,
    listeners: BTreeMap<ProjectId, Vec<Listener>>,
    pools: BTreeMap<ProjectId, Vec<Pool>>,
}

impl ResourceCollector {
    /// Eagerly fetch the agent's loadbalancers and group them by project.
    pub async fn collect(
        source: Arc<dyn ResourceSource>,
        agent: AgentId,
    ) -> Result<Self, ResyncError> {
        let all = source.loadbalancers_by_agent(&agent).await?;

        let mut loadbalancers: BTreeMap<ProjectId, Vec<LoadBalancer>> = BTreeMap::new();
        for lb in all {
            loadbalancers.entry(lb.project_id).or_default().push(lb);
        }

        debug!(
            agent = %agent,
            project_count = loadbalancers.len(),
            "collected loadbalancers"
        );

        Ok(Self {
            source,
            agent,
            loadbalancers,
            listeners: BTreeMap::new(),
            pools: BTreeMap::new(),
        })
    }

    /// The agent this collector was built for.
    pub fn agent(&self) -> &AgentId {
        &self.agent
    }

    /// The projects known to this collector. Fixed at construction.
    pub fn projects(&self) -> BTreeSet<ProjectId> {
        self.loadbalancers.keys().copied().collect()
    }

    /// Cached loadbalancers for a project; empty for an unknown project.
    /// Never queries the source.
    pub fn loadbalancers(&self, project: &ProjectId) -> Vec<LoadBalancer> {
        self.loadbalancers.get(project).cloned().unwrap_or_default()
    }

    /// Listeners for a project, fetched from the source at most once per
    /// collector instance. Unknown projects yield an empty list without a
    /// source query.
    pub async fn listeners(&mut self, project: &ProjectId) -> Result<Vec<Listener>, ResyncError> {
        if !self.loadbalancers.contains_key(project) {
            return Ok(Vec::new());
        }

        if let Some(cached) = self.listeners.get(project) {
            return Ok(cached.clone());
        }

        let fetched = self.source.listeners_by_project(project).await?;
        debug!(project = %project, count = fetched.len(), "cached listeners");
        self.listeners.insert(*project, fetched.clone());

        Ok(fetched)
    }

    /// Pools for a project, with members attached. Same cache contract as
    /// [`listeners`](Self::listeners); the cached-return path never touches
    /// members again.
    pub async fn pools(&mut self, project: &ProjectId) -> Result<Vec<Pool>, ResyncError> {
        if !self.loadbalancers.contains_key(project) {
            return Ok(Vec::new());
        }

        if let Some(cached) = self.pools.get(project) {
            return Ok(cached.clone());
        }

        // Members are attached to the freshly fetched list rather than by
        // going back through `pools`: re-entering the accessor before the
        // cache write would fetch the project forever. The cache write comes
        // last, so a failed member query leaves the project uncached and the
        // next call refetches everything.
        let mut fetched = self.source.pools_by_project(project).await?;
        for pool in &mut fetched {
            pool.members = self.source.members_by_pool(&pool.id).await?;
        }

        debug!(
            project = %project,
            count = fetched.len(),
            "cached pools with members"
        );
        self.pools.insert(*project, fetched.clone());

        Ok(fetched)
    }
}
