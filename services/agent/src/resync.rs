//! Resync loop for reconciling fleet state.
//!
//! Each pass:
//! - Snapshots desired state from the control plane and actual state from
//!   the fleet inventory
//! - Diffs the two snapshots hierarchically
//! - Re-deploys missing loadbalancer services across the fleet and removes
//!   orphaned ones
//! - Reports the drift back to the control plane

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use lbsync_device::{apply_across, deploy_service, remove_orphan};
use lbsync_id::LoadBalancerId;
use lbsync_resync::{
    Comparator, DriftReport, IdFilter, ResourceCollector, StandardFilter,
};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::client::ControlPlaneClient;
use crate::fleet::Fleet;

/// Resync loop configuration.
pub struct ResyncConfig {
    /// Interval between resync passes.
    pub interval: Duration,
}

impl Default for ResyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

/// Drives periodic reconciliation of the fleet against the control plane.
pub struct ResyncRunner {
    client: Arc<ControlPlaneClient>,
    fleet: Arc<Fleet>,
    config: ResyncConfig,
}

fn named(name: &str, collector: ResourceCollector) -> BTreeMap<String, ResourceCollector> {
    BTreeMap::from([(name.to_string(), collector)])
}

impl ResyncRunner {
    pub fn new(client: Arc<ControlPlaneClient>, fleet: Arc<Fleet>, config: ResyncConfig) -> Self {
        Self {
            client,
            fleet,
            config,
        }
    }

    /// Run the resync loop until shutdown.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            "Starting resync loop"
        );

        let mut interval = tokio::time::interval(self.config.interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.resync_once().await {
                        Ok(report) if report.is_empty() => debug!("resync pass clean"),
                        Ok(report) => info!(
                            total_missing = report.total_missing(),
                            "resync pass found drift"
                        ),
                        Err(e) => error!(error = %e, "Resync failed"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Resync loop shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Perform a single resync pass. Fails atomically: any source or fan-out
    /// failure aborts the pass, and the next tick starts over from fresh
    /// snapshots.
    pub async fn resync_once(&self) -> Result<DriftReport> {
        debug!("Starting resync pass");
        let agent = self.client.agent_id();
        let filter: Arc<dyn IdFilter> = Arc::new(StandardFilter);

        let benchmark = ResourceCollector::collect(self.client.clone(), agent).await?;
        let subject = ResourceCollector::collect(Arc::new(self.fleet.source()), agent).await?;

        let mut comparator = Comparator::new(named("control-plane", benchmark), filter.clone())?;
        comparator.compare_to(named("fleet", subject), filter)?;
        let report = comparator.drift_report().await?;

        if report.is_empty() {
            debug!("fleet in sync with control plane");
        } else {
            info!(
                missing_projects = report.missing_projects.len(),
                missing_loadbalancers = report.missing_loadbalancers.len(),
                missing_listeners = report.missing_listeners.len(),
                missing_pools = report.missing_pools.len(),
                missing_member_pools = report.missing_members.len(),
                "drift detected"
            );
        }

        for missing in &report.missing_loadbalancers {
            self.redeploy(missing).await?;
        }

        for orphan in &self.extra_loadbalancers().await? {
            self.remove_from_fleet(orphan).await;
        }

        if let Err(e) = self.client.report_drift(&report).await {
            warn!(error = %e, "failed to report drift");
        }

        Ok(report)
    }

    /// Fetch the service spec for a missing loadbalancer and fan it out
    /// across every device in the fleet.
    async fn redeploy(&self, missing: &LoadBalancerId) -> Result<()> {
        let spec = self.client.service_spec(missing).await?;
        let handles = self.fleet.handles();
        let fleet = self.fleet.clone();

        apply_across(&handles, &spec, move |device, spec| {
            let fleet = fleet.clone();
            async move {
                let resources = fleet
                    .resources_for(&device.id)
                    .ok_or_else(|| anyhow::anyhow!("unknown device {}", device.hostname))?;
                deploy_service(resources.as_ref(), &device.partition, &spec).await
            }
        })
        .await?;

        info!(loadbalancer = %missing, "missing service re-deployed");
        Ok(())
    }

    /// Loadbalancers present on the fleet that the control plane no longer
    /// assigns to this agent: the reverse comparison, fleet as benchmark.
    async fn extra_loadbalancers(&self) -> Result<Vec<LoadBalancerId>> {
        let agent = self.client.agent_id();
        let filter: Arc<dyn IdFilter> = Arc::new(StandardFilter);

        let fleet_side = ResourceCollector::collect(Arc::new(self.fleet.source()), agent).await?;
        let plan_side = ResourceCollector::collect(self.client.clone(), agent).await?;

        let mut comparator = Comparator::new(named("fleet", fleet_side), filter.clone())?;
        comparator.compare_to(named("control-plane", plan_side), filter)?;

        Ok(comparator.missing_loadbalancers().await?)
    }

    /// Best-effort orphan removal; a failing device is logged and skipped so
    /// the rest of the fleet still converges.
    async fn remove_from_fleet(&self, orphan: &LoadBalancerId) {
        for device in self.fleet.devices() {
            if let Err(e) = remove_orphan(
                device.inventory.as_ref(),
                device.resources.as_ref(),
                &device.handle.partition,
                orphan,
            )
            .await
            {
                warn!(
                    device = %device.handle.hostname,
                    loadbalancer = %orphan,
                    error = %e,
                    "orphan removal failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resync_config_default() {
        let config = ResyncConfig::default();
        assert_eq!(config.interval, Duration::from_secs(30));
    }
}
