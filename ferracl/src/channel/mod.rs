//! Channel layer for prompt-driven PTY reads.
//!
//! Output from the device is ANSI-stripped into a [`PatternBuffer`] and
//! searched for a prompt regex; only the tail of the buffer is scanned.

mod buffer;
mod pty;

pub use buffer::PatternBuffer;
pub use pty::PtyChannel;
