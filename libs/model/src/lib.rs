//! Resource records for the loadbalancer configuration hierarchy.
//!
//! These are the wire shapes shared by the control-plane API and the device
//! inventory: loadbalancer → listener → pool → member. The records are plain
//! data; ownership and caching rules live in `lbsync-resync`.

mod resources;
mod service;

pub use resources::{LbAlgorithm, Listener, LoadBalancer, Member, Pool, Protocol};
pub use service::{DeviceHandle, ServiceSpec};
