//! solys2tracker-proto: Solys2 command protocol and TCP client.
//!
//! The Solys2 speaks a line-oriented ASCII protocol. Every request is a
//! two-letter command code with space-separated arguments, terminated by a
//! carriage return. The instrument answers with a single line that either
//! echoes the command code followed by the result values, or reports a
//! failure as `NO <code>`.
//!
//! # Key Components
//!
//! - [`Command`] - Request encoding
//! - [`parse_reply`] - Reply decoding and error mapping
//! - [`Solys2Client`] - Authenticated request/response session
//! - [`Positioner`] - Motion seam used by the control layer

mod client;
mod command;
mod error;
mod reply;

pub use client::{Positioner, Solys2Client, TcpTransport, Transport, DEFAULT_TIMEOUT};
pub use command::{Command, Motor};
pub use error::{DeviceError, Error, Result};
pub use reply::{parse_f64, parse_reply};
