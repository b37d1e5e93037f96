//! In-memory [`Connector`] for exercising the job layer without devices.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::ExposeSecret;

use crate::driver::{Connector, Driver, Response};
use crate::error::{ChannelError, Result, TransportError};
use crate::platform::Platform;
use crate::transport::Credential;

/// How a fake device reacts to one connection attempt.
#[derive(Debug, Clone)]
pub(crate) enum Behavior {
    /// Accept everything; `show` commands return `output`.
    Succeed { output: String },
    /// Reject the login.
    AuthFailure,
    /// Never answer the login.
    Timeout,
    /// Refuse the TCP connection.
    Refused,
    /// Flag the last configuration line as invalid input.
    RejectConfig,
    /// Drop the shell when the read-back command is sent.
    DropOnVerify,
    /// Panic while connecting.
    Panic,
}

/// Everything one session saw, captured when it is dropped.
#[derive(Debug, Clone)]
pub(crate) struct SessionRecord {
    pub host: String,
    pub platform: Platform,
    pub config: Vec<String>,
    pub delay_factor: Option<u32>,
    pub commands: Vec<String>,
    pub closed: bool,
}

#[derive(Default)]
struct Shared {
    records: Mutex<Vec<SessionRecord>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    connects: AtomicUsize,
}

impl Shared {
    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Fake device fleet keyed by hostname.
///
/// Each connect pops the host's next scripted behavior; hosts without a
/// script succeed with `default_output`.
pub(crate) struct FakeConnector {
    scripts: Mutex<HashMap<String, VecDeque<Behavior>>>,
    default_output: String,
    password: Option<String>,
    latency: Duration,
    shared: Arc<Shared>,
}

impl FakeConnector {
    pub fn new(default_output: impl Into<String>) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            default_output: default_output.into(),
            password: None,
            latency: Duration::ZERO,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Queue behaviors for successive connections to `host`.
    pub fn script(self, host: &str, behaviors: impl IntoIterator<Item = Behavior>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(host.to_string())
            .or_default()
            .extend(behaviors);
        self
    }

    /// Reject logins whose secret differs from `password`.
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Time each connection takes to open.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn records(&self) -> Vec<SessionRecord> {
        self.shared.records.lock().unwrap().clone()
    }

    pub fn record_for(&self, host: &str) -> Option<SessionRecord> {
        self.records().into_iter().find(|r| r.host == host)
    }

    pub fn max_active(&self) -> usize {
        self.shared.max_active.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.shared.connects.load(Ordering::SeqCst)
    }

    fn next_behavior(&self, host: &str) -> Behavior {
        self.scripts
            .lock()
            .unwrap()
            .get_mut(host)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Behavior::Succeed {
                output: self.default_output.clone(),
            })
    }
}

impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn connect(
        &self,
        host: &str,
        platform: Platform,
        credential: &Credential,
    ) -> Result<FakeSession> {
        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        self.shared.enter();
        let behavior = self.next_behavior(host);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let wrong_password = self
            .password
            .as_deref()
            .is_some_and(|pw| pw != credential.secret.expose_secret());

        let failure = match behavior {
            Behavior::Panic => {
                self.shared.leave();
                panic!("fake device {host} crashed");
            }
            Behavior::AuthFailure => Some(TransportError::AuthenticationFailed {
                user: credential.username.clone(),
            }),
            _ if wrong_password => Some(TransportError::AuthenticationFailed {
                user: credential.username.clone(),
            }),
            Behavior::Timeout => Some(TransportError::Timeout(Duration::from_secs(30))),
            Behavior::Refused => Some(TransportError::ConnectionFailed {
                host: host.to_string(),
                port: 22,
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            }),
            _ => None,
        };
        if let Some(err) = failure {
            self.shared.leave();
            return Err(err.into());
        }

        Ok(FakeSession {
            record: SessionRecord {
                host: host.to_string(),
                platform,
                config: Vec::new(),
                delay_factor: None,
                commands: Vec::new(),
                closed: false,
            },
            behavior,
            shared: self.shared.clone(),
        })
    }
}

pub(crate) struct FakeSession {
    record: SessionRecord,
    behavior: Behavior,
    shared: Arc<Shared>,
}

impl Driver for FakeSession {
    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.record.closed = true;
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        self.record.commands.push(command.to_string());
        let output = match &self.behavior {
            Behavior::DropOnVerify => {
                return Err(ChannelError::Closed.into());
            }
            Behavior::Succeed { output } => output.clone(),
            _ => String::new(),
        };
        Ok(Response::new(
            command,
            output.clone(),
            output,
            format!("{}#", self.record.host),
            Duration::from_millis(5),
        ))
    }

    async fn send_config(&mut self, lines: &[String], delay_factor: Option<u32>) -> Result<Vec<Response>> {
        self.record.config.extend(lines.iter().cloned());
        self.record.delay_factor = delay_factor;
        let rejected = matches!(self.behavior, Behavior::RejectConfig);
        let last = lines.len().saturating_sub(1);

        Ok(lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let prompt = format!("{}(config)#", self.record.host);
                if rejected && i == last {
                    let result = "% Invalid input detected at '^' marker.".to_string();
                    Response::new(line, result.clone(), result, prompt, Duration::ZERO)
                        .with_failure("% Invalid input detected")
                } else {
                    Response::new(line, "", "", prompt, Duration::ZERO)
                }
            })
            .collect())
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.shared.leave();
        if let Ok(mut records) = self.shared.records.lock() {
            records.push(self.record.clone());
        }
    }
}
