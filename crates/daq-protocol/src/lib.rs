//! Host Protocol Library
//!
//! This crate provides parsing and encoding for the plain-text serial
//! protocol spoken by the virtual DAQ board:
//!
//! - **Inbound**: `s<flag>,<rate>,<bits>` settings updates and `i` info
//!   requests, framed as LF-terminated lines
//! - **Outbound**: `READY`/`OK` acknowledgments, info replies, and
//!   comma-joined sample lines, all CRLF-terminated
//!
//! # Architecture
//!
//! - [`LineCodec`]: a streaming framer that turns raw byte chunks into
//!   whitespace-trimmed lines, handling partial data
//! - [`HostCommand`]: the typed command produced from one inbound line,
//!   matched exhaustively by the board
//! - [`Reply`]: the typed outbound message, encoded to wire bytes
//!
//! The outbound grammar parses in both directions: the board encodes an
//! [`InfoReply`], and a host-side consumer can parse it back with
//! [`InfoReply::parse`]; the round trip preserves the reported settings.
//!
//! # Example
//!
//! ```rust
//! use daq_protocol::{HostCommand, LineCodec};
//!
//! let mut codec = LineCodec::new();
//! codec.push_bytes(b"s1,50,101000\r\n");
//!
//! let line = codec.next_line().unwrap();
//! match HostCommand::parse(&line) {
//!     Ok(HostCommand::Settings(update)) => {
//!         assert!(update.sampling);
//!         assert_eq!(update.rate_hz, 50);
//!         assert_eq!(update.mask.active_count(), 2);
//!     }
//!     other => panic!("unexpected parse: {other:?}"),
//! }
//! ```

pub mod codec;
pub mod command;
pub mod error;
pub mod reply;

pub use codec::LineCodec;
pub use command::{ChannelMask, HostCommand, SettingsUpdate};
pub use error::ParseError;
pub use reply::{parse_sample_line, InfoReply, Reply, LINE_TERMINATOR};
