//! Control plane API client for the resync agent.
//!
//! Provides the desired-state queries the collector consumes, plus:
//! - Fetching the full service spec for one loadbalancer
//! - Reporting drift back to the control plane

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use lbsync_id::{AgentId, LoadBalancerId, PoolId, ProjectId};
use lbsync_model::{Listener, LoadBalancer, Member, Pool, ServiceSpec};
use lbsync_resync::{DriftReport, ResourceSource};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, error};

use crate::config::Config;

#[derive(Debug, Deserialize)]
struct LoadBalancersResponse {
    loadbalancers: Vec<LoadBalancer>,
}

#[derive(Debug, Deserialize)]
struct ListenersResponse {
    listeners: Vec<Listener>,
}

#[derive(Debug, Deserialize)]
struct PoolsResponse {
    pools: Vec<Pool>,
}

#[derive(Debug, Deserialize)]
struct MembersResponse {
    members: Vec<Member>,
}

/// Control plane API client.
pub struct ControlPlaneClient {
    client: reqwest::Client,
    base_url: String,
    agent_id: AgentId,
}

impl ControlPlaneClient {
    /// Create a new control plane client.
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.control_plane_url.trim_end_matches('/').to_string(),
            agent_id: config.agent_id,
        }
    }

    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!(url = %url, "control plane query");
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, url = %url, "control plane query failed");
            anyhow::bail!("control plane query failed: {} - {}", status, body);
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetch the deployable service spec for one loadbalancer.
    pub async fn service_spec(&self, loadbalancer: &LoadBalancerId) -> Result<ServiceSpec> {
        let url = format!("{}/v2.0/loadbalancers/{}/service", self.base_url, loadbalancer);
        self.get_json(url).await
    }

    /// Report a drift snapshot to the control plane.
    pub async fn report_drift(&self, report: &DriftReport) -> Result<()> {
        let url = format!(
            "{}/v2.0/agents/{}/drift-reports",
            self.base_url, self.agent_id
        );

        let response = self.client.post(&url).json(report).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "failed to report drift");
            anyhow::bail!("failed to report drift: {} - {}", status, body);
        }

        Ok(())
    }
}

#[async_trait]
impl ResourceSource for ControlPlaneClient {
    async fn loadbalancers_by_agent(&self, agent: &AgentId) -> Result<Vec<LoadBalancer>> {
        let url = format!("{}/v2.0/agents/{}/loadbalancers", self.base_url, agent);
        let response: LoadBalancersResponse = self.get_json(url).await?;
        Ok(response.loadbalancers)
    }

    async fn listeners_by_project(&self, project: &ProjectId) -> Result<Vec<Listener>> {
        let url = format!("{}/v2.0/projects/{}/listeners", self.base_url, project);
        let response: ListenersResponse = self.get_json(url).await?;
        Ok(response.listeners)
    }

    async fn pools_by_project(&self, project: &ProjectId) -> Result<Vec<Pool>> {
        let url = format!("{}/v2.0/projects/{}/pools", self.base_url, project);
        let response: PoolsResponse = self.get_json(url).await?;
        Ok(response.pools)
    }

    async fn members_by_pool(&self, pool: &PoolId) -> Result<Vec<Member>> {
        let url = format!("{}/v2.0/pools/{}/members", self.base_url, pool);
        let response: MembersResponse = self.get_json(url).await?;
        Ok(response.members)
    }
}
