//! Pushing and removing service configuration on one appliance.

use anyhow::{Context, Result};
use lbsync_id::LoadBalancerId;
use lbsync_model::ServiceSpec;
use tracing::{debug, info};

use crate::facade::{CreateOutcome, DeviceResources};
use crate::inventory::DeviceInventory;

/// Push a service spec onto one appliance in hierarchy order: loadbalancer,
/// listeners, pools, then each pool's members.
///
/// Re-deploying an already-configured service is a successful no-op; every
/// already-exists outcome is logged and skipped.
pub async fn deploy_service(
    device: &dyn DeviceResources,
    partition: &str,
    service: &ServiceSpec,
) -> Result<()> {
    let lb = &service.loadbalancer;

    let outcome = device
        .create_loadbalancer(partition, lb)
        .await
        .with_context(|| format!("creating loadbalancer {}", lb.id))?;
    log_outcome("loadbalancer", &lb.id.to_string(), outcome);

    for listener in &service.listeners {
        let outcome = device
            .create_listener(partition, listener)
            .await
            .with_context(|| format!("creating listener {}", listener.id))?;
        log_outcome("listener", &listener.id.to_string(), outcome);
    }

    for pool in &service.pools {
        let outcome = device
            .create_pool(partition, pool)
            .await
            .with_context(|| format!("creating pool {}", pool.id))?;
        log_outcome("pool", &pool.id.to_string(), outcome);

        for member in &pool.members {
            let outcome = device
                .create_member(partition, member)
                .await
                .with_context(|| format!("creating member {}", member.id))?;
            log_outcome("member", &member.id.to_string(), outcome);
        }
    }

    info!(loadbalancer = %lb.id, "service deployed");
    Ok(())
}

fn log_outcome(kind: &str, id: &str, outcome: CreateOutcome) {
    if outcome.already_existed() {
        debug!(kind, id, "already present, skipped");
    } else {
        debug!(kind, id, "created");
    }
}

/// Remove a loadbalancer the control plane no longer knows about, bottom-up:
/// members, pools, listeners, then the loadbalancer itself.
///
/// The device's own inventory is the source of what to delete, since the
/// control plane has nothing left to say about an orphan. Objects that are
/// already gone are tolerated.
pub async fn remove_orphan(
    inventory: &dyn DeviceInventory,
    device: &dyn DeviceResources,
    partition: &str,
    orphan: &LoadBalancerId,
) -> Result<()> {
    let pools = inventory.pools().await?;
    for pool in pools.iter().filter(|p| p.loadbalancer_id == *orphan) {
        for member in inventory.members(&pool.id).await? {
            device.delete_member(partition, &member.id).await?;
        }
        device.delete_pool(partition, &pool.id).await?;
    }

    let listeners = inventory.listeners().await?;
    for listener in listeners.iter().filter(|l| l.loadbalancer_id == *orphan) {
        device.delete_listener(partition, &listener.id).await?;
    }

    let outcome = device.delete_loadbalancer(partition, orphan).await?;
    info!(loadbalancer = %orphan, ?outcome, "orphan removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDevice;
    use lbsync_id::{DeviceId, ListenerId, MemberId, PoolId, ProjectId};
    use lbsync_model::{DeviceHandle, Listener, LoadBalancer, Member, Pool, Protocol};

    fn handle() -> DeviceHandle {
        DeviceHandle {
            id: DeviceId::new(),
            hostname: "bigip-1.example".to_string(),
            partition: "lbsync".to_string(),
        }
    }

    fn service() -> ServiceSpec {
        let project = ProjectId::new();
        let lb = LoadBalancer {
            id: LoadBalancerId::new(),
            project_id: project,
            name: Some("web".to_string()),
            vip_address: "192.0.2.10".to_string(),
            admin_state_up: true,
        };
        let listener = Listener {
            id: ListenerId::new(),
            project_id: project,
            loadbalancer_id: lb.id,
            protocol: Protocol::Http,
            protocol_port: 80,
        };
        let pool_id = PoolId::new();
        let member = Member {
            id: MemberId::new(),
            pool_id,
            address: "10.0.0.1".to_string(),
            protocol_port: 8080,
            weight: 1,
        };
        let pool = Pool {
            id: pool_id,
            project_id: project,
            loadbalancer_id: lb.id,
            lb_algorithm: Default::default(),
            members: vec![member],
        };

        ServiceSpec {
            loadbalancer: lb,
            listeners: vec![listener],
            pools: vec![pool],
            targets: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_deploy_builds_the_full_hierarchy() {
        let device = InMemoryDevice::new(handle());
        let spec = service();

        deploy_service(&device, "lbsync", &spec).await.unwrap();

        assert_eq!(device.loadbalancers().await.unwrap().len(), 1);
        assert_eq!(device.listeners().await.unwrap().len(), 1);
        let pools = device.pools().await.unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(device.members(&pools[0].id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_redeploy_is_a_no_op() {
        let device = InMemoryDevice::new(handle());
        let spec = service();

        deploy_service(&device, "lbsync", &spec).await.unwrap();
        deploy_service(&device, "lbsync", &spec).await.unwrap();

        assert_eq!(device.loadbalancers().await.unwrap().len(), 1);
        assert_eq!(device.listeners().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_orphan_tears_down_bottom_up() {
        let device = InMemoryDevice::new(handle());
        let spec = service();
        deploy_service(&device, "lbsync", &spec).await.unwrap();

        remove_orphan(&device, &device, "lbsync", &spec.loadbalancer.id)
            .await
            .unwrap();

        assert!(device.loadbalancers().await.unwrap().is_empty());
        assert!(device.listeners().await.unwrap().is_empty());
        assert!(device.pools().await.unwrap().is_empty());
        assert!(device
            .members(&spec.pools[0].id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_orphan_is_tolerated() {
        let device = InMemoryDevice::new(handle());
        remove_orphan(&device, &device, "lbsync", &LoadBalancerId::new())
            .await
            .unwrap();
    }
}
