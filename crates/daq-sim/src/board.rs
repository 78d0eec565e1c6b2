//! Virtual acquisition board
//!
//! Owns the channel catalog, the session state, and a value source, and
//! turns inbound command lines into state changes and queued replies.
//! Replies are queued as encoded wire bytes; the protocol loop drains the
//! queue to the transport. The board itself never sleeps and never touches
//! the transport.

use std::collections::VecDeque;

use daq_protocol::{HostCommand, InfoReply, Reply};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{ChannelCatalog, ReadError, SyntheticSource, ValueSource};
use crate::session::SessionState;

/// Configuration for creating a virtual board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Optional name prefixed to info replies
    #[serde(default)]
    pub board_name: Option<String>,
    /// Channel labels in id order
    pub labels: Vec<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            board_name: None,
            labels: ChannelCatalog::default().labels().to_vec(),
        }
    }
}

/// A simulated acquisition board driving one serial session
pub struct VirtualBoard {
    board_name: Option<String>,
    catalog: ChannelCatalog,
    session: SessionState,
    source: Box<dyn ValueSource>,
    /// Pending outbound lines (wire-encoded)
    pending_output: VecDeque<Vec<u8>>,
}

impl VirtualBoard {
    /// Create a board over a catalog and value source
    pub fn new(catalog: ChannelCatalog, source: Box<dyn ValueSource>) -> Self {
        let session = SessionState::new(&catalog);
        Self {
            board_name: None,
            catalog,
            session,
            source,
            pending_output: VecDeque::new(),
        }
    }

    /// Create a board from configuration
    pub fn from_config(config: BoardConfig, source: Box<dyn ValueSource>) -> Self {
        let mut board = Self::new(ChannelCatalog::new(config.labels), source);
        board.board_name = config.board_name;
        board
    }

    /// Create a board backed by the deterministic placeholder source
    pub fn with_synthetic_source(config: BoardConfig) -> Self {
        let source = SyntheticSource::new(config.labels.len());
        Self::from_config(config, Box::new(source))
    }

    /// Name reported in info replies, if configured
    pub fn board_name(&self) -> Option<&str> {
        self.board_name.as_deref()
    }

    /// The immutable channel catalog
    pub fn catalog(&self) -> &ChannelCatalog {
        &self.catalog
    }

    /// The current session state
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Whether the sampling loop should run
    pub fn sampling_enabled(&self) -> bool {
        self.session.sampling()
    }

    /// Current sample rate in Hz
    pub fn rate_hz(&self) -> u32 {
        self.session.rate_hz()
    }

    /// Interpret one inbound line
    ///
    /// Well-formed settings updates mutate the session and queue `OK`; info
    /// requests queue a report; everything else (unknown commands and
    /// malformed settings alike) is dropped without a reply and without any
    /// state change.
    pub fn process_line(&mut self, line: &str) {
        match HostCommand::parse(line) {
            Ok(HostCommand::Settings(update)) => match self.session.apply(&update) {
                Ok(()) => {
                    debug!(
                        sampling = self.session.sampling(),
                        rate_hz = self.session.rate_hz(),
                        active = %self.session.active(),
                        "settings updated"
                    );
                    self.queue_reply(Reply::Ok);
                }
                Err(e) => warn!("rejected settings command: {e}"),
            },
            Ok(HostCommand::Info) => {
                let reply = self.info_reply();
                self.queue_reply(Reply::Info(reply));
            }
            Ok(HostCommand::Unknown(raw)) => debug!("ignoring unknown command {raw:?}"),
            Err(e) => warn!("malformed command: {e}"),
        }
    }

    /// Read every active channel and queue one sample line
    ///
    /// Values are collected in catalog order before any byte is queued, so a
    /// failed read aborts the whole line rather than emitting a partial one.
    /// Zero active channels queue an empty (still terminated) line.
    pub fn sample(&mut self) -> Result<(), ReadError> {
        let mut values = Vec::with_capacity(self.session.active_count());
        for channel in 0..self.catalog.channel_count() {
            if self.session.is_active(channel) {
                values.push(self.source.read(channel)?);
            }
        }
        self.queue_reply(Reply::Sample(values));
        Ok(())
    }

    /// Snapshot of catalog and settings for an info reply
    pub fn info_reply(&self) -> InfoReply {
        InfoReply {
            board_name: self.board_name.clone(),
            rate_hz: self.session.rate_hz(),
            labels: self.catalog.labels().to_vec(),
            mask: self.session.active().clone(),
        }
    }

    /// Queue a reply, encoded to wire bytes
    pub fn queue_reply(&mut self, reply: Reply) {
        self.pending_output.push_back(reply.encode());
    }

    /// Take the next pending outbound line
    pub fn take_output(&mut self) -> Option<Vec<u8>> {
        self.pending_output.pop_front()
    }

    /// Check if there is pending output
    pub fn has_output(&self) -> bool {
        !self.pending_output.is_empty()
    }
}
