//! lbsync Resync Agent Library
//!
//! The resync agent owns a fleet of load-balancing appliances on behalf of
//! the control plane. It periodically snapshots the desired loadbalancer →
//! listener → pool → member hierarchy from the control plane, compares it
//! against what the fleet actually has, reports the drift, and converges the
//! fleet: missing services are re-deployed, orphaned ones removed.
//!
//! ## Modules
//!
//! - `client`: control plane API client (desired-state source + reporting)
//! - `config`: environment-driven configuration
//! - `fleet`: the owned appliance collection and its read/write seams
//! - `resync`: the periodic reconciliation loop

pub mod client;
pub mod config;
pub mod fleet;
pub mod resync;

// Re-export commonly used types
pub use client::ControlPlaneClient;
pub use fleet::{Fleet, FleetDevice};
pub use resync::{ResyncConfig, ResyncRunner};
