//! PTY shell channel with prompt-terminated reads.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

/// Interactive shell channel on a device.
///
/// Writes are line-oriented; reads accumulate output until a prompt regex
/// matches in the buffer tail.
pub struct PtyChannel {
    channel: Channel<Msg>,
    buffer: PatternBuffer,
    is_open: bool,
}

impl PtyChannel {
    pub(crate) fn new(channel: Channel<Msg>) -> Self {
        Self {
            channel,
            buffer: PatternBuffer::default(),
            is_open: true,
        }
    }

    /// Send one line of input followed by a newline.
    pub async fn send(&mut self, input: &str) -> Result<()> {
        trace!("send: {:?}", input);
        self.write_line(input).await
    }

    /// Send a line that must not appear in logs (e.g., an enable secret).
    pub async fn send_hidden(&mut self, input: &str) -> Result<()> {
        trace!("send: <hidden>");
        self.write_line(input).await
    }

    async fn write_line(&mut self, input: &str) -> Result<()> {
        if !self.is_open {
            return Err(ChannelError::Closed.into());
        }
        let line = format!("{input}\n");
        self.channel
            .data(line.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `pattern` matches, returning everything up to and including
    /// the match. Anything received after the match stays buffered for the
    /// next read.
    pub async fn read_until_pattern(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>> {
        let now = tokio::time::Instant::now();
        // Far enough out to never fire when `timeout` cannot be added.
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365));

        loop {
            if let Some((_, end)) = self.buffer.find_in_tail(pattern) {
                return Ok(self.buffer.take_until(end));
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PatternTimeout(timeout))?;

            match msg {
                Some(ChannelMsg::Data { ref data }) => {
                    self.buffer.extend(data);
                }
                Some(ChannelMsg::ExtendedData { ref data, .. }) => {
                    self.buffer.extend(data);
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    self.is_open = false;
                    return Err(ChannelError::Closed.into());
                }
                Some(_) => {}
            }
        }
    }

    /// Close the shell channel.
    pub async fn close(mut self) -> Result<()> {
        self.is_open = false;
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}
