//! Appliance-facing plumbing for the lbsync agent.
//!
//! - [`DeviceResources`]: the per-appliance CRUD facade. Idempotency is
//!   expressed in outcomes ([`CreateOutcome`], [`DeleteOutcome`]) rather than
//!   errors, so callers branch on values.
//! - [`DeviceInventory`] + [`DeviceSource`]: the read side; a fleet of
//!   inventories adapts into a `ResourceSource` for the subject half of a
//!   comparison.
//! - [`apply_across`]: fan one configuration operation out over the fleet,
//!   isolate per-device failures, and surface them in aggregate.
//! - [`InMemoryDevice`]: an appliance stand-in for tests and mock mode.

mod deploy;
mod facade;
mod fanout;
mod inventory;
mod memory;

pub use deploy::{deploy_service, remove_orphan};
pub use facade::{CreateOutcome, DeleteOutcome, DeviceResources};
pub use fanout::{apply_across, DeviceFailure, FanoutError};
pub use inventory::{DeviceInventory, DeviceSource};
pub use memory::InMemoryDevice;
