//! The appliance fleet this agent owns.

use std::sync::Arc;

use lbsync_device::{DeviceInventory, DeviceResources, DeviceSource, InMemoryDevice};
use lbsync_id::DeviceId;
use lbsync_model::DeviceHandle;

/// One appliance: its handle plus the read and write seams onto it.
pub struct FleetDevice {
    pub handle: DeviceHandle,
    pub resources: Arc<dyn DeviceResources>,
    pub inventory: Arc<dyn DeviceInventory>,
}

/// An explicit, owned collection of appliances. Built once at startup and
/// passed to the components that need it; there is no global registry.
pub struct Fleet {
    devices: Vec<FleetDevice>,
}

impl Fleet {
    pub fn new(devices: Vec<FleetDevice>) -> Self {
        Self { devices }
    }

    /// A fleet of in-memory mock devices, for dev and tests.
    pub fn mock(size: usize, partition: &str) -> Self {
        let devices = (0..size)
            .map(|i| {
                let handle = DeviceHandle {
                    id: DeviceId::new(),
                    hostname: format!("mock-bigip-{i}.local"),
                    partition: partition.to_string(),
                };
                Self::wrap(Arc::new(InMemoryDevice::new(handle.clone())), handle)
            })
            .collect();

        Self { devices }
    }

    /// Wrap one device implementing both seams into a fleet entry.
    pub fn wrap(device: Arc<InMemoryDevice>, handle: DeviceHandle) -> FleetDevice {
        FleetDevice {
            handle,
            resources: device.clone(),
            inventory: device,
        }
    }

    pub fn devices(&self) -> &[FleetDevice] {
        &self.devices
    }

    pub fn handles(&self) -> Vec<DeviceHandle> {
        self.devices.iter().map(|d| d.handle.clone()).collect()
    }

    pub fn resources_for(&self, id: &DeviceId) -> Option<Arc<dyn DeviceResources>> {
        self.devices
            .iter()
            .find(|d| d.handle.id == *id)
            .map(|d| d.resources.clone())
    }

    /// The fleet's read side, as a resource source for the subject collector.
    pub fn source(&self) -> DeviceSource {
        DeviceSource::new(self.devices.iter().map(|d| d.inventory.clone()).collect())
    }
}
