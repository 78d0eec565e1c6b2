//! Outbound reply encoding and host-side parsing
//!
//! Every board message is a CRLF-terminated text line. The same grammar is
//! used in both directions: the board encodes replies, a host consumer parses
//! them back, and the round trip preserves the reported settings.

use crate::command::ChannelMask;
use crate::error::ParseError;

/// Terminator appended to every outbound line
pub const LINE_TERMINATOR: &str = "\r\n";

/// Capability and settings report sent in response to an info request
///
/// Wire form: `<name?>,<channel_count>,<rate_hz>,<label_0>,...,<flag_0>,...`
/// with the board-name prefix present only when the deployment configures
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoReply {
    /// Optional board name prefix (deployment-dependent)
    pub board_name: Option<String>,
    /// Current sample rate in Hz
    pub rate_hz: u32,
    /// Channel labels in catalog order
    pub labels: Vec<String>,
    /// Active-channel flags in catalog order
    pub mask: ChannelMask,
}

impl InfoReply {
    /// Number of channels described by this reply
    pub fn channel_count(&self) -> usize {
        self.labels.len()
    }

    /// Parse an info reply line (without terminator)
    ///
    /// Accepts both the named and the nameless form: the first field is taken
    /// as a board name unless it is a plain decimal (a purely numeric board
    /// name is indistinguishable from a channel count and parses as the
    /// nameless form).
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidInfo(line.to_string());

        let fields: Vec<&str> = line.split(',').collect();
        let rest = match fields.first() {
            Some(first) if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) => {
                &fields[..]
            }
            Some(first) if !first.is_empty() => &fields[1..],
            _ => return Err(invalid()),
        };
        let board_name = if rest.len() == fields.len() {
            None
        } else {
            Some(fields[0].to_string())
        };

        if rest.len() < 2 {
            return Err(invalid());
        }
        let channel_count = rest[0].parse::<usize>().map_err(|_| invalid())?;
        let rate_hz = rest[1].parse::<u32>().map_err(|_| invalid())?;
        if rest.len() != 2 + 2 * channel_count || channel_count == 0 {
            return Err(invalid());
        }

        let labels: Vec<String> = rest[2..2 + channel_count]
            .iter()
            .map(|label| label.to_string())
            .collect();

        let flag_fields = &rest[2 + channel_count..];
        if flag_fields.iter().any(|flag| flag.len() != 1) {
            return Err(invalid());
        }
        let mask = ChannelMask::from_bits(&flag_fields.concat())?;

        Ok(Self {
            board_name,
            rate_hz,
            labels,
            mask,
        })
    }

    fn encode_fields(&self) -> String {
        let mut fields: Vec<String> = Vec::with_capacity(3 + 2 * self.labels.len());
        if let Some(name) = &self.board_name {
            fields.push(name.clone());
        }
        fields.push(self.labels.len().to_string());
        fields.push(self.rate_hz.to_string());
        fields.extend(self.labels.iter().cloned());
        fields.extend(
            self.mask
                .iter()
                .map(|active| String::from(if active { "1" } else { "0" })),
        );
        fields.join(",")
    }
}

/// One outbound message from the board
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Startup handshake line
    Ready,
    /// Settings acknowledgment
    Ok,
    /// Capability/settings report
    Info(InfoReply),
    /// One line of active-channel readings in catalog order
    Sample(Vec<f64>),
}

impl Reply {
    /// Encode to wire bytes, CRLF-terminated
    pub fn encode(&self) -> Vec<u8> {
        let mut line = match self {
            Reply::Ready => "READY".to_string(),
            Reply::Ok => "OK".to_string(),
            Reply::Info(info) => info.encode_fields(),
            Reply::Sample(values) => encode_sample(values),
        };
        line.push_str(LINE_TERMINATOR);
        line.into_bytes()
    }
}

fn encode_sample(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a sample line into channel readings (host side)
///
/// An empty line is a valid sample of zero active channels.
pub fn parse_sample_line(line: &str) -> Result<Vec<f64>, ParseError> {
    if line.is_empty() {
        return Ok(Vec::new());
    }
    line.split(',')
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidValue(field.to_string()))
        })
        .collect()
}
