//! Sampling session state
//!
//! One mutable record per serial session: whether sampling runs, how fast,
//! and over which channels. Exactly one writer exists (the command
//! interpreter, called from the protocol loop), so no locking is involved.

use daq_protocol::{ChannelMask, ParseError, SettingsUpdate};

use crate::catalog::ChannelCatalog;

/// Startup sampling rate in Hz
pub const DEFAULT_RATE_HZ: u32 = 100;

/// Mutable sampling settings for one session
///
/// The mask length is fixed at construction and never changes; a settings
/// update with a mask of any other length is rejected without touching any
/// field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    sampling: bool,
    rate_hz: u32,
    active: ChannelMask,
    // Cached projection of `active`; recomputed on every applied update
    active_count: usize,
}

impl SessionState {
    /// Startup state: sampling off, default rate, only channel 0 active
    pub fn new(catalog: &ChannelCatalog) -> Self {
        let active = catalog.default_mask();
        let active_count = active.active_count();
        Self {
            sampling: false,
            rate_hz: DEFAULT_RATE_HZ,
            active,
            active_count,
        }
    }

    /// Whether sampling is currently enabled
    pub fn sampling(&self) -> bool {
        self.sampling
    }

    /// Current sample rate in Hz, always >= 1
    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    /// Active-channel flags in catalog order
    pub fn active(&self) -> &ChannelMask {
        &self.active
    }

    /// Number of active channels
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Whether one channel is in the sampling subset
    pub fn is_active(&self, channel: usize) -> bool {
        self.active.is_active(channel)
    }

    /// Apply a fully-parsed settings update
    ///
    /// The update's mask must match the session's channel count; on any
    /// error the state is left bit-for-bit unchanged.
    pub fn apply(&mut self, update: &SettingsUpdate) -> Result<(), ParseError> {
        if update.mask.len() != self.active.len() {
            return Err(ParseError::MaskLength {
                expected: self.active.len(),
                actual: update.mask.len(),
            });
        }

        self.sampling = update.sampling;
        self.rate_hz = update.rate_hz;
        self.active = update.mask.clone();
        self.active_count = self.active.active_count();
        Ok(())
    }
}
