//! Hierarchical comparison of two collected snapshots.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use lbsync_id::{ListenerId, LoadBalancerId, PoolId, ProjectId};
use lbsync_model::{Listener, LoadBalancer, Pool};
use tracing::debug;

use crate::collector::ResourceCollector;
use crate::error::ResyncError;
use crate::filter::IdFilter;
use crate::report::{DriftReport, PoolMemberDrift};

/// One named side of a comparison.
struct Side {
    name: String,
    collector: ResourceCollector,
    filter: Arc<dyn IdFilter>,
    projects: BTreeSet<ProjectId>,
}

impl Side {
    fn from_map(
        map: BTreeMap<String, ResourceCollector>,
        filter: Arc<dyn IdFilter>,
        role: &str,
    ) -> Result<Self, ResyncError> {
        if map.len() != 1 {
            return Err(ResyncError::invalid(format!(
                "{role} side requires exactly one named collector, got {}",
                map.len()
            )));
        }

        let (name, collector) = map.into_iter().next().expect("len checked above");
        let projects = collector.projects();

        Ok(Self {
            name,
            collector,
            filter,
            projects,
        })
    }

    fn all_loadbalancers(&self) -> Vec<LoadBalancer> {
        let mut out = Vec::new();
        for project in &self.projects {
            out.extend(self.collector.loadbalancers(project));
        }
        out
    }

    async fn all_listeners(&mut self) -> Result<Vec<Listener>, ResyncError> {
        let projects: Vec<ProjectId> = self.projects.iter().copied().collect();
        let mut out = Vec::new();
        for project in &projects {
            out.extend(self.collector.listeners(project).await?);
        }
        Ok(out)
    }

    async fn all_pools(&mut self) -> Result<Vec<Pool>, ResyncError> {
        let projects: Vec<ProjectId> = self.projects.iter().copied().collect();
        let mut out = Vec::new();
        for project in &projects {
            out.extend(self.collector.pools(project).await?);
        }
        Ok(out)
    }
}

/// Compares a fixed benchmark snapshot against a swappable subject snapshot.
///
/// The benchmark is supplied at construction as a single-entry name →
/// collector mapping; anything else is a configuration error. The subject is
/// supplied (and may later be replaced) through [`compare_to`](Self::compare_to).
///
/// All `missing_*` results are sorted by identifier, so the same drift always
/// reports identically.
pub struct Comparator {
    benchmark: Side,
    subject: Option<Side>,
}

impl Comparator {
    pub fn new(
        benchmark: BTreeMap<String, ResourceCollector>,
        filter: Arc<dyn IdFilter>,
    ) -> Result<Self, ResyncError> {
        let benchmark = Side::from_map(benchmark, filter, "benchmark")?;
        debug!(
            benchmark = %benchmark.name,
            project_count = benchmark.projects.len(),
            "comparator created"
        );

        Ok(Self {
            benchmark,
            subject: None,
        })
    }

    /// Set (or replace) the subject side. The benchmark side is fixed for
    /// the comparator's lifetime.
    pub fn compare_to(
        &mut self,
        subject: BTreeMap<String, ResourceCollector>,
        filter: Arc<dyn IdFilter>,
    ) -> Result<(), ResyncError> {
        let subject = Side::from_map(subject, filter, "subject")?;
        debug!(
            benchmark = %self.benchmark.name,
            subject = %subject.name,
            "subject attached"
        );
        self.subject = Some(subject);
        Ok(())
    }

    pub fn benchmark_name(&self) -> &str {
        &self.benchmark.name
    }

    pub fn subject_name(&self) -> Option<&str> {
        self.subject.as_ref().map(|s| s.name.as_str())
    }

    fn subject_mut(subject: &mut Option<Side>) -> Result<&mut Side, ResyncError> {
        subject
            .as_mut()
            .ok_or_else(|| ResyncError::invalid("no subject attached; call compare_to first"))
    }

    /// Projects the benchmark knows that the subject does not.
    pub fn missing_projects(&self) -> Result<Vec<ProjectId>, ResyncError> {
        let subject = self
            .subject
            .as_ref()
            .ok_or_else(|| ResyncError::invalid("no subject attached; call compare_to first"))?;

        Ok(self
            .benchmark
            .projects
            .difference(&subject.projects)
            .copied()
            .collect())
    }

    /// Benchmark loadbalancers absent from the subject, across all projects
    /// each side knows.
    pub async fn missing_loadbalancers(&mut self) -> Result<Vec<LoadBalancerId>, ResyncError> {
        let subject = Self::subject_mut(&mut self.subject)?;

        let bench_ids = self
            .benchmark
            .filter
            .loadbalancer_ids(&self.benchmark.all_loadbalancers());
        let subject_ids = subject.filter.loadbalancer_ids(&subject.all_loadbalancers());

        Ok(bench_ids.difference(&subject_ids).copied().collect())
    }

    /// Benchmark listeners absent from the subject.
    pub async fn missing_listeners(&mut self) -> Result<Vec<ListenerId>, ResyncError> {
        let subject = Self::subject_mut(&mut self.subject)?;

        let bench = self.benchmark.all_listeners().await?;
        let bench_ids = self.benchmark.filter.listener_ids(&bench);
        let found = subject.all_listeners().await?;
        let subject_ids = subject.filter.listener_ids(&found);

        Ok(bench_ids.difference(&subject_ids).copied().collect())
    }

    /// Benchmark pools absent from the subject.
    pub async fn missing_pools(&mut self) -> Result<Vec<PoolId>, ResyncError> {
        let subject = Self::subject_mut(&mut self.subject)?;

        let bench = self.benchmark.all_pools().await?;
        let bench_ids = self.benchmark.filter.pool_ids(&bench);
        let found = subject.all_pools().await?;
        let subject_ids = subject.filter.pool_ids(&found);

        Ok(bench_ids.difference(&subject_ids).copied().collect())
    }

    /// Benchmark members absent from the subject, grouped by pool.
    ///
    /// One level deeper than the other diffs: pools are matched by id, then
    /// members inside matched pools are matched by address+port endpoint. A
    /// benchmark pool the subject lacks entirely contributes all of its
    /// members, unless it has none.
    pub async fn missing_members(&mut self) -> Result<Vec<PoolMemberDrift>, ResyncError> {
        let subject = Self::subject_mut(&mut self.subject)?;

        let bench_pools = self.benchmark.all_pools().await?;
        let bench_members = self.benchmark.filter.pool_members(&bench_pools);
        let subject_pools = subject.all_pools().await?;
        let subject_members = subject.filter.pool_members(&subject_pools);

        let mut drift = Vec::new();
        for (pool_id, members) in bench_members {
            let missing = match subject_members.get(&pool_id) {
                None => members,
                Some(present) => {
                    let endpoints: BTreeSet<(String, u16)> = present
                        .iter()
                        .map(|m| (m.address.clone(), m.protocol_port))
                        .collect();

                    members
                        .into_iter()
                        .filter(|m| !endpoints.contains(&(m.address.clone(), m.protocol_port)))
                        .collect()
                }
            };

            if !missing.is_empty() {
                drift.push(PoolMemberDrift {
                    pool_id,
                    members: missing,
                });
            }
        }

        Ok(drift)
    }

    /// Run every diff and aggregate the result.
    pub async fn drift_report(&mut self) -> Result<DriftReport, ResyncError> {
        let subject_name = self
            .subject_name()
            .ok_or_else(|| ResyncError::invalid("no subject attached; call compare_to first"))?
            .to_string();

        Ok(DriftReport {
            benchmark: self.benchmark.name.clone(),
            subject: subject_name,
            generated_at: Utc::now(),
            missing_projects: self.missing_projects()?,
            missing_loadbalancers: self.missing_loadbalancers().await?,
            missing_listeners: self.missing_listeners().await?,
            missing_pools: self.missing_pools().await?,
            missing_members: self.missing_members().await?,
        })
    }
}
