//! HTTP behavior of the control plane client.

use lbsync_agent::client::ControlPlaneClient;
use lbsync_agent::config::Config;
use lbsync_id::{AgentId, LoadBalancerId, PoolId, ProjectId};
use lbsync_model::{LoadBalancer, ServiceSpec};
use lbsync_resync::ResourceSource;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, agent_id: AgentId) -> Config {
    Config {
        agent_id,
        control_plane_url: server.uri(),
        partition: "lbsync".to_string(),
        resync_interval_secs: 30,
        log_level: "info".to_string(),
        mock_fleet_size: 0,
    }
}

fn loadbalancer(project: ProjectId) -> LoadBalancer {
    LoadBalancer {
        id: LoadBalancerId::new(),
        project_id: project,
        name: Some("web".to_string()),
        vip_address: "192.0.2.10".to_string(),
        admin_state_up: true,
    }
}

#[tokio::test]
async fn test_loadbalancers_by_agent_parses_response() {
    let server = MockServer::start().await;
    let agent_id = AgentId::new();
    let lb = loadbalancer(ProjectId::new());

    Mock::given(method("GET"))
        .and(path(format!("/v2.0/agents/{agent_id}/loadbalancers")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "loadbalancers": [lb] })),
        )
        .mount(&server)
        .await;

    let client = ControlPlaneClient::new(&config_for(&server, agent_id));
    let lbs = client.loadbalancers_by_agent(&agent_id).await.unwrap();

    assert_eq!(lbs, vec![lb]);
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    let agent_id = AgentId::new();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = ControlPlaneClient::new(&config_for(&server, agent_id));

    let err = client
        .members_by_pool(&PoolId::new())
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("503"), "unexpected error: {msg}");
    assert!(msg.contains("maintenance"), "unexpected error: {msg}");
}

#[tokio::test]
async fn test_service_spec_fetch() {
    let server = MockServer::start().await;
    let agent_id = AgentId::new();
    let lb = loadbalancer(ProjectId::new());
    let spec = ServiceSpec {
        loadbalancer: lb.clone(),
        listeners: Vec::new(),
        pools: Vec::new(),
        targets: Vec::new(),
    };

    Mock::given(method("GET"))
        .and(path(format!("/v2.0/loadbalancers/{}/service", lb.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(&spec))
        .mount(&server)
        .await;

    let client = ControlPlaneClient::new(&config_for(&server, agent_id));
    let fetched = client.service_spec(&lb.id).await.unwrap();

    assert_eq!(fetched, spec);
}
