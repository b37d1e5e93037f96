//! One ACL change across an inventory of devices.
//!
//! A job runs in four stages:
//!
//! 1. [`acquire_credential`] checks the operator's credential on the first device.
//! 2. [`run_all`] fans [`run_device`] out over the inventory, bounded by `threads`.
//! 3. [`validate`] compares read-back line counts per platform.
//! 4. The caller prints and optionally exports the [`JobReport`].

mod config;
mod coordinator;
mod credentials;
mod device;
mod report;
mod runner;
mod validate;

pub use config::{JobConfig, SshSettings};
pub use coordinator::run_all;
pub use credentials::{CredentialPrompt, TerminalPrompt, acquire_credential, confirm_change};
pub use device::{Device, DeviceResult, FailureKind, Outcome};
pub use report::{JobReport, export_file_name};
pub use runner::{JobContext, run_device};
pub use validate::{LineCount, ValidationSummary, validate};

use std::sync::Arc;

use log::info;

use crate::driver::Connector;
use crate::error::{ConfigError, Result};

/// Verify the credential, apply the change everywhere, and summarize.
///
/// Fails only before fan-out (credential check); per-device problems are
/// reported in the returned [`JobReport`].
pub async fn run_job<C, P>(config: &JobConfig, connector: Arc<C>, prompt: &mut P) -> Result<JobReport>
where
    C: Connector + 'static,
    P: CredentialPrompt,
{
    let canary = config.canary().ok_or(ConfigError::Invalid {
        field: "device_list",
        message: "must name at least one device".to_string(),
    })?;
    let max_concurrency = config.max_concurrency()?;

    let credential = acquire_credential(connector.as_ref(), canary, prompt).await?;

    let ctx = Arc::new(JobContext {
        credential,
        request: config.change_request(),
        sequencer: config.sequencer_options(),
    });

    info!(
        "applying {} ({}) to {} devices, {} at a time",
        config.acl_name,
        config.mode(),
        config.device_list.len(),
        max_concurrency
    );
    let results = run_all(connector, &config.device_list, ctx, max_concurrency).await;
    let summary = validate(&results);

    Ok(JobReport { results, summary })
}
