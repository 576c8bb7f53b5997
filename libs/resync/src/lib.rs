//! Drift detection for loadbalancer configuration.
//!
//! This library compares the loadbalancer → listener → pool → member
//! hierarchy two [`ResourceSource`]s report for the same agent and computes
//! what the benchmark side has that the subject side is missing. Key concepts:
//!
//! - **Benchmark**: the desired state, as recorded by the control plane.
//! - **Subject**: the state being checked, usually an appliance fleet.
//! - **Drift**: resources present on the benchmark but absent from the subject.
//!
//! # Invariants
//!
//! - A collector's project set is fixed at construction and never grows
//! - Each project's listener and pool caches fill at most once per collector
//! - Pool members are attached exactly once, on the first pool fetch
//! - Failed fetches are never cached; the next call retries
//!
//! A [`ResourceCollector`] lives for a single comparison and is then
//! discarded; nothing is persisted across resync passes.

mod collector;
mod comparator;
mod error;
mod filter;
mod report;
mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use collector::ResourceCollector;
pub use comparator::Comparator;
pub use error::ResyncError;
pub use filter::{IdFilter, StandardFilter};
pub use report::{DriftReport, PoolMemberDrift};
pub use source::ResourceSource;
