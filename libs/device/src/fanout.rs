//! Concurrent fan-out of one operation across the fleet.

use std::fmt;
use std::future::Future;

use anyhow::Result;
use futures_util::future::join_all;
use lbsync_model::{DeviceHandle, ServiceSpec};
use tracing::error;

/// One device's failure during a fan-out.
#[derive(Debug)]
pub struct DeviceFailure {
    pub device: DeviceHandle,
    pub error: anyhow::Error,
}

/// Aggregate failure of a fan-out. Every failed device is recorded, in fleet
/// order; `Display` leads with the first so a caller that only logs the error
/// still sees a concrete cause.
#[derive(Debug)]
pub struct FanoutError {
    attempted: usize,
    failures: Vec<DeviceFailure>,
}

impl FanoutError {
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn failures(&self) -> &[DeviceFailure] {
        &self.failures
    }

    /// The first failure in fleet order.
    pub fn first(&self) -> &DeviceFailure {
        &self.failures[0]
    }
}

impl fmt::Display for FanoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.first();
        write!(
            f,
            "{} of {} device applications failed; first: {}: {}",
            self.failures.len(),
            self.attempted,
            first.device.hostname,
            first.error
        )
    }
}

impl std::error::Error for FanoutError {}

/// Apply one operation across every device in the fleet concurrently.
///
/// Each invocation receives its own copy of the service payload, narrowed to
/// that single device via [`ServiceSpec::for_target`]; the caller's payload
/// is never touched. All invocations are spawned up front and joined before
/// returning, so one device's failure never short-circuits its siblings, and
/// there is no way to cancel the rest once the fan-out has started.
///
/// Failures (including a panicking invocation) are isolated per device,
/// logged, and returned together as a [`FanoutError`].
pub async fn apply_across<F, Fut>(
    fleet: &[DeviceHandle],
    service: &ServiceSpec,
    op: F,
) -> Result<(), FanoutError>
where
    F: Fn(DeviceHandle, ServiceSpec) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let mut tasks = Vec::with_capacity(fleet.len());
    for device in fleet {
        let per_device = service.for_target(device.clone());
        tasks.push(tokio::spawn(op(device.clone(), per_device)));
    }

    // join_all preserves fleet order, which fixes which failure is "first".
    let results = join_all(tasks).await;

    let mut failures = Vec::new();
    for (device, joined) in fleet.iter().zip(results) {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(join_err) => Err(anyhow::anyhow!("device task panicked: {join_err}")),
        };

        if let Err(err) = outcome {
            error!(
                device = %device.hostname,
                error = %err,
                "device application failed"
            );
            failures.push(DeviceFailure {
                device: device.clone(),
                error: err,
            });
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(FanoutError {
            attempted: fleet.len(),
            failures,
        })
    }
}
