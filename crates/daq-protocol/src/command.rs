//! Typed host command representation
//!
//! One line from the host parses into exactly one [`HostCommand`]. The first
//! character selects the command family; settings lines are tokenized into
//! typed fields rather than sliced positionally.

use std::fmt;

use crate::error::ParseError;

/// Fixed-length set of per-channel flags, one entry per catalog channel
///
/// The wire form is a string of `'0'`/`'1'` characters in catalog order,
/// e.g. `101000` for channels 0 and 2 of a six-channel board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMask(Vec<bool>);

impl ChannelMask {
    /// Parse from a string of `'0'`/`'1'` characters in catalog order
    pub fn from_bits(bits: &str) -> Result<Self, ParseError> {
        if bits.is_empty() {
            return Err(ParseError::InvalidMask(bits.to_string()));
        }
        bits.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(ParseError::InvalidMask(bits.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Mask of `len` channels with only `channel` active
    pub fn single(len: usize, channel: usize) -> Self {
        Self((0..len).map(|i| i == channel).collect())
    }

    /// Mask of `len` channels, none active
    pub fn none(len: usize) -> Self {
        Self(vec![false; len])
    }

    /// Number of channels covered by the mask
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the mask covers zero channels
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `channel` is active; out-of-range ids read as inactive
    pub fn is_active(&self, channel: usize) -> bool {
        self.0.get(channel).copied().unwrap_or(false)
    }

    /// Number of active channels
    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|&&active| active).count()
    }

    /// Iterate flags in catalog order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<bool>> for ChannelMask {
    fn from(flags: Vec<bool>) -> Self {
        Self(flags)
    }
}

impl fmt::Display for ChannelMask {
    /// Renders the wire bit string, e.g. `101000`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &active in &self.0 {
            write!(f, "{}", if active { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// Parsed fields of a settings-update line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// Whether sampling is enabled
    pub sampling: bool,
    /// Target sample rate in Hz, always >= 1
    pub rate_hz: u32,
    /// Requested active-channel flags in catalog order
    pub mask: ChannelMask,
}

impl SettingsUpdate {
    /// Tokenize a settings line: `s<flag>,<rate>,<bits>`
    ///
    /// The flag is the second character of field 0 and must be `'0'` or
    /// `'1'`. A rate of zero is rejected; the session invariant requires a
    /// rate of at least 1 Hz. Mask length is validated later against the
    /// catalog, which this layer does not know.
    fn parse(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 3 {
            return Err(ParseError::FieldCount {
                expected: 3,
                actual: fields.len(),
            });
        }

        let sampling = match fields[0].chars().nth(1) {
            Some('1') => true,
            Some('0') => false,
            _ => return Err(ParseError::InvalidFlag(fields[0].to_string())),
        };

        let rate_hz = fields[1]
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidRate(fields[1].to_string()))?;
        if rate_hz == 0 {
            return Err(ParseError::InvalidRate(fields[1].to_string()));
        }

        let mask = ChannelMask::from_bits(fields[2])?;

        Ok(Self {
            sampling,
            rate_hz,
            mask,
        })
    }
}

/// One parsed line from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// `s<flag>,<rate>,<bits>`: update the sampling settings
    Settings(SettingsUpdate),
    /// `i`: report capabilities and current settings (remainder ignored)
    Info,
    /// Anything else; the board silently ignores it
    Unknown(String),
}

impl HostCommand {
    /// Parse one whitespace-trimmed line
    ///
    /// Lines that belong to no command family parse as [`HostCommand::Unknown`];
    /// an `Err` is returned only for a malformed settings line.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        match line.chars().next() {
            Some('s') => SettingsUpdate::parse(line).map(HostCommand::Settings),
            Some('i') => Ok(HostCommand::Info),
            _ => Ok(HostCommand::Unknown(line.to_string())),
        }
    }
}
