//! Per-device task: connect, push the change, read it back, disconnect.

use log::{debug, info, warn};

use super::device::{Device, DeviceResult, FailureKind};
use crate::acl::{self, AclChangeRequest, CommandSequence, SequencerOptions};
use crate::driver::{Connector, Driver};
use crate::error::Result;
use crate::transport::Credential;

/// Read-only state shared by every device task in a job.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub credential: Credential,
    pub request: AclChangeRequest,
    pub sequencer: SequencerOptions,
}

/// Apply the job's change to one device.
///
/// Never fails: every error is folded into the returned [`DeviceResult`].
/// The session is closed on every path once it has been opened.
pub async fn run_device<C: Connector>(connector: &C, device: &Device, ctx: &JobContext) -> DeviceResult {
    let platform = match device.platform() {
        Ok(platform) => platform,
        Err(e) => {
            warn!("error {}: {}", device.hostname, e);
            return DeviceResult::failure(device.clone(), FailureKind::UnsupportedPlatform, e.to_string());
        }
    };

    let sequence = acl::build_sequence(platform, &ctx.request, &ctx.sequencer);

    let mut session = match connector
        .connect(&device.hostname, platform, &ctx.credential)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            warn!("error {}: {}", device.hostname, e);
            return DeviceResult::failure(
                device.clone(),
                FailureKind::Connection,
                format!("connection failed: {}", e),
            );
        }
    };

    let outcome = execute(&mut session, &sequence).await;

    if let Err(e) = session.close().await {
        warn!("{}: error closing session: {}", device.hostname, e);
    }

    match outcome {
        Ok(output) => {
            info!("{} completed", device.hostname);
            DeviceResult::success(device.clone(), output)
        }
        Err(e) => {
            warn!("error {}: {}", device.hostname, e);
            DeviceResult::failure(
                device.clone(),
                FailureKind::Execution,
                format!("execution failed: {}", e),
            )
        }
    }
}

async fn execute<D: Driver>(session: &mut D, sequence: &CommandSequence) -> Result<String> {
    let responses = session
        .send_config(&sequence.setup, sequence.delay_factor)
        .await?;
    for response in responses {
        let response = response.into_result()?;
        debug!("'{}' accepted in {:?}", response.command, response.elapsed);
    }

    let verify = session.send_command(&sequence.verify).await?.into_result()?;
    Ok(verify.result)
}
