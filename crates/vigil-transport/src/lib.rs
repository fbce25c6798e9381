//! vigil-transport — remote command execution over SSH.
//!
//! Every call opens its own authenticated session, runs one command, and
//! tears the session down again. No connection pooling: targets are polled
//! on an interval measured in minutes, so session reuse buys nothing and
//! a stale pooled connection would be one more thing to go wrong.
//!
//! The [`CommandRunner`] trait is the seam between the transport and
//! everything above it; tests substitute scripted fakes for [`SshRunner`].

pub mod error;
pub mod ssh;

pub use error::TransportError;
pub use ssh::{CommandRunner, ExecOutput, SshRunner};
