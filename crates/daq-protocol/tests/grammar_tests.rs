//! Property tests for the host protocol grammar
//!
//! These exercise the parse/encode pair from both directions: every line the
//! board can emit parses back to the value that produced it, and junk input
//! never misparses into a settings update.

use daq_protocol::{
    parse_sample_line, ChannelMask, HostCommand, InfoReply, Reply,
};
use proptest::prelude::*;

fn flag_char() -> impl Strategy<Value = char> {
    prop_oneof![Just('0'), Just('1')]
}

fn channel_bits() -> impl Strategy<Value = String> {
    proptest::collection::vec(flag_char(), 1..=16).prop_map(|chars| chars.into_iter().collect())
}

/// Label + active flag per channel, so labels and mask always agree in length
fn catalog_entries() -> impl Strategy<Value = Vec<(String, bool)>> {
    proptest::collection::vec(("[A-Z][a-z0-9]{0,5}", any::<bool>()), 1..=8)
}

proptest! {
    #[test]
    fn settings_line_parses(
        flag in flag_char(),
        rate in 1u32..=100_000,
        bits in channel_bits(),
    ) {
        let line = format!("s{flag},{rate},{bits}");
        let HostCommand::Settings(update) = HostCommand::parse(&line).unwrap() else {
            return Err(TestCaseError::fail("expected settings command"));
        };
        prop_assert_eq!(update.sampling, flag == '1');
        prop_assert_eq!(update.rate_hz, rate);
        prop_assert_eq!(update.mask.to_string(), bits.clone());
        prop_assert_eq!(
            update.mask.active_count(),
            bits.chars().filter(|&c| c == '1').count()
        );
    }

    #[test]
    fn non_settings_lines_never_parse_as_settings(line in "[^s][ -~]{0,40}") {
        let parsed = HostCommand::parse(&line).unwrap();
        prop_assert!(!matches!(parsed, HostCommand::Settings(_)));
    }

    #[test]
    fn info_reply_roundtrip(
        name in proptest::option::of("[a-z][a-z0-9-]{0,11}"),
        rate in 1u32..=100_000,
        entries in catalog_entries(),
    ) {
        let (labels, flags): (Vec<String>, Vec<bool>) = entries.into_iter().unzip();
        let reply = InfoReply {
            board_name: name,
            rate_hz: rate,
            labels,
            mask: ChannelMask::from(flags),
        };
        let line = String::from_utf8(Reply::Info(reply.clone()).encode()).unwrap();
        let parsed = InfoReply::parse(line.trim_end()).unwrap();
        prop_assert_eq!(parsed, reply);
    }

    #[test]
    fn sample_line_roundtrip(
        values in proptest::collection::vec(-1.0e6f64..1.0e6, 0..=16),
    ) {
        let line = String::from_utf8(Reply::Sample(values.clone()).encode()).unwrap();
        let parsed = parse_sample_line(line.trim_end()).unwrap();
        prop_assert_eq!(parsed, values);
    }
}
