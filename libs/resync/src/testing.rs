//! Scripted in-memory source for collector and comparator tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use lbsync_id::{AgentId, ListenerId, LoadBalancerId, MemberId, PoolId, ProjectId};
use lbsync_model::{Listener, LoadBalancer, Member, Pool, Protocol};

use crate::source::ResourceSource;

/// Per-query-kind counters, so tests can assert exactly how many fetches a
/// collector issued.
#[derive(Default)]
pub(crate) struct QueryCounts {
    loadbalancers: AtomicUsize,
    listeners: AtomicUsize,
    pools: AtomicUsize,
    members: AtomicUsize,
}

impl QueryCounts {
    pub fn loadbalancer_queries(&self) -> usize {
        self.loadbalancers.load(Ordering::SeqCst)
    }

    pub fn listener_queries(&self) -> usize {
        self.listeners.load(Ordering::SeqCst)
    }

    pub fn pool_queries(&self) -> usize {
        self.pools.load(Ordering::SeqCst)
    }

    pub fn member_queries(&self) -> usize {
        self.members.load(Ordering::SeqCst)
    }
}

/// A [`ResourceSource`] over fixed record sets, with query counting and
/// injectable failures.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    loadbalancers: Vec<LoadBalancer>,
    listeners: Vec<Listener>,
    pools: Vec<Pool>,
    members: BTreeMap<PoolId, Vec<Member>>,
    pub counts: QueryCounts,
    pool_failures: AtomicUsize,
    member_failures: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_loadbalancer(&mut self, lb: LoadBalancer) {
        self.loadbalancers.push(lb);
    }

    pub fn push_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Register a pool and the members a `members_by_pool` query returns for
    /// it. The pool itself is served without members attached, as a real
    /// source would.
    pub fn push_pool(&mut self, pool: Pool, members: Vec<Member>) {
        self.members.insert(pool.id, members);
        self.pools.push(pool);
    }

    pub fn members_for(&self, pool: &PoolId) -> Vec<Member> {
        self.members.get(pool).cloned().unwrap_or_default()
    }

    /// Make the next `n` pool queries fail.
    pub fn fail_pool_queries(&self, n: usize) {
        self.pool_failures.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` member queries fail.
    pub fn fail_member_queries(&self, n: usize) {
        self.member_failures.store(n, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ResourceSource for ScriptedSource {
    async fn loadbalancers_by_agent(&self, _agent: &AgentId) -> Result<Vec<LoadBalancer>> {
        self.counts.loadbalancers.fetch_add(1, Ordering::SeqCst);
        Ok(self.loadbalancers.clone())
    }

    async fn listeners_by_project(&self, project: &ProjectId) -> Result<Vec<Listener>> {
        self.counts.listeners.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .listeners
            .iter()
            .filter(|l| l.project_id == *project)
            .cloned()
            .collect())
    }

    async fn pools_by_project(&self, project: &ProjectId) -> Result<Vec<Pool>> {
        self.counts.pools.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.pool_failures) {
            anyhow::bail!("scripted pool query failure");
        }

        Ok(self
            .pools
            .iter()
            .filter(|p| p.project_id == *project)
            .cloned()
            .map(|mut p| {
                p.members = Vec::new();
                p
            })
            .collect())
    }

    async fn members_by_pool(&self, pool: &PoolId) -> Result<Vec<Member>> {
        self.counts.members.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.member_failures) {
            anyhow::bail!("scripted member query failure");
        }

        Ok(self.members_for(pool))
    }
}

pub(crate) fn loadbalancer(project: ProjectId) -> LoadBalancer {
    LoadBalancer {
        id: LoadBalancerId::new(),
        project_id: project,
        name: None,
        vip_address: "192.0.2.1".to_string(),
        admin_state_up: true,
    }
}

pub(crate) fn listener(lb: &LoadBalancer, port: u16) -> Listener {
    Listener {
        id: ListenerId::new(),
        project_id: lb.project_id,
        loadbalancer_id: lb.id,
        protocol: Protocol::Http,
        protocol_port: port,
    }
}

pub(crate) fn pool(lb: &LoadBalancer) -> Pool {
    Pool {
        id: PoolId::new(),
        project_id: lb.project_id,
        loadbalancer_id: lb.id,
        lb_algorithm: Default::default(),
        members: Vec::new(),
    }
}

pub(crate) fn member(pool: &Pool, address: &str, port: u16) -> Member {
    Member {
        id: MemberId::new(),
        pool_id: pool.id,
        address: address.to_string(),
        protocol_port: port,
        weight: 1,
    }
}

/// A small two-project topology behind a single scripted source.
pub(crate) struct Fixture {
    pub source: Arc<ScriptedSource>,
    pub agent: AgentId,
    pub project_a: ProjectId,
    pub project_b: ProjectId,
}

impl Fixture {
    /// Project A: one loadbalancer, two listeners, two pools (two members
    /// and one member). Project B: one loadbalancer, one listener, one
    /// empty pool.
    pub fn two_projects() -> Self {
        let project_a = ProjectId::new();
        let project_b = ProjectId::new();

        let mut source = ScriptedSource::new();

        let lb_a = loadbalancer(project_a);
        source.push_listener(listener(&lb_a, 80));
        source.push_listener(listener(&lb_a, 443));
        let pool_a1 = pool(&lb_a);
        let members_a1 = vec![
            member(&pool_a1, "10.0.0.1", 80),
            member(&pool_a1, "10.0.0.2", 80),
        ];
        source.push_pool(pool_a1, members_a1);
        let pool_a2 = pool(&lb_a);
        let members_a2 = vec![member(&pool_a2, "10.0.1.1", 8080)];
        source.push_pool(pool_a2, members_a2);
        source.push_loadbalancer(lb_a);

        let lb_b = loadbalancer(project_b);
        source.push_listener(listener(&lb_b, 80));
        source.push_pool(pool(&lb_b), Vec::new());
        source.push_loadbalancer(lb_b);

        Self {
            source: Arc::new(source),
            agent: AgentId::new(),
            project_a,
            project_b,
        }
    }
}
