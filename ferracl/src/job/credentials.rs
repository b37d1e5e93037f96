//! Interactive credential collection and the canary check.
//!
//! The credential is verified against one device before any fan-out so a
//! mistyped password is never replayed across the inventory in parallel.

use dialoguer::{Confirm, Input, Password};
use log::{info, warn};

use super::device::Device;
use crate::acl::AclMode;
use crate::driver::{Connector, Driver};
use crate::error::{JobError, Result};
use crate::transport::Credential;

/// Source of operator input.
pub trait CredentialPrompt {
    /// Ask for a username and password.
    fn ask(&mut self) -> Result<Credential>;

    /// Tell the operator the last credential was rejected by `host`.
    fn rejected(&mut self, host: &str);
}

/// Prompts on the controlling terminal. The password is not echoed.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn ask(&mut self) -> Result<Credential> {
        let username: String = Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(|e| JobError::Prompt(e.to_string()))?;
        let password = Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| JobError::Prompt(e.to_string()))?;
        Ok(Credential::new(username, password))
    }

    fn rejected(&mut self, host: &str) {
        eprintln!("Authentication failed on {host}, please try again");
    }
}

/// Prompt until a credential logs in to `canary`.
///
/// Rejected credentials re-prompt without limit. A timeout or any other
/// connection error aborts the job, as does a canary whose device type is
/// not supported.
pub async fn acquire_credential<C, P>(connector: &C, canary: &Device, prompt: &mut P) -> Result<Credential>
where
    C: Connector,
    P: CredentialPrompt,
{
    let platform = canary.platform()?;

    loop {
        let credential = prompt.ask()?;
        info!("checking credential against {}", canary.hostname);

        match connector.connect(&canary.hostname, platform, &credential).await {
            Ok(mut session) => {
                if let Err(e) = session.close().await {
                    warn!("{}: error closing canary session: {}", canary.hostname, e);
                }
                return Ok(credential);
            }
            Err(e) if e.is_auth_failure() => {
                warn!("authentication failed on {}", canary.hostname);
                prompt.rejected(&canary.hostname);
            }
            Err(e) if e.is_timeout() => {
                return Err(JobError::CanaryTimeout {
                    host: canary.hostname.clone(),
                }
                .into());
            }
            Err(e) => {
                return Err(JobError::Canary {
                    host: canary.hostname.clone(),
                    source: Box::new(e),
                }
                .into());
            }
        }
    }
}

/// Ask the operator to confirm the change before anything is touched.
pub fn confirm_change(acl_name: &str, mode: AclMode) -> Result<bool> {
    println!("{acl_name} will be modified using mode {mode}");
    let confirmed = Confirm::new()
        .with_prompt("Is this correct?")
        .default(false)
        .interact()
        .map_err(|e| JobError::Prompt(e.to_string()))?;
    Ok(confirmed)
}
