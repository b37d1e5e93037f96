//! Bounded fan-out of device tasks.

use std::num::NonZeroUsize;
use std::sync::Arc;

use log::{debug, error};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::device::{Device, DeviceResult, FailureKind};
use super::runner::{JobContext, run_device};
use crate::driver::Connector;

/// Run every device through [`run_device`] with at most `max_concurrency`
/// sessions open at once.
///
/// Results come back in completion order. Every device yields exactly one
/// result: a task that dies without reporting (a panic inside the session
/// client) is recorded as an execution failure for its device.
pub async fn run_all<C>(
    connector: Arc<C>,
    devices: &[Device],
    ctx: Arc<JobContext>,
    max_concurrency: NonZeroUsize,
) -> Vec<DeviceResult>
where
    C: Connector + 'static,
{
    let limiter = Arc::new(Semaphore::new(max_concurrency.get()));
    let mut tasks = JoinSet::new();

    for (index, device) in devices.iter().cloned().enumerate() {
        let connector = Arc::clone(&connector);
        let ctx = Arc::clone(&ctx);
        let limiter = Arc::clone(&limiter);

        tasks.spawn(async move {
            let _permit = limiter.acquire_owned().await.ok();
            debug!("starting {}", device);
            (index, run_device(connector.as_ref(), &device, &ctx).await)
        });
    }

    let mut reported = vec![false; devices.len()];
    let mut results = Vec::with_capacity(devices.len());

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                reported[index] = true;
                results.push(result);
            }
            Err(e) => error!("device task aborted: {}", e),
        }
    }

    for (device, done) in devices.iter().zip(reported) {
        if !done {
            results.push(DeviceResult::failure(
                device.clone(),
                FailureKind::Execution,
                "execution failed: device task aborted unexpectedly",
            ));
        }
    }

    results
}
