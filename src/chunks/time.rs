//! tIME (last-modification time) parser

use crate::{metadata::Timestamp, primitives::read_be_u16};
use log::warn;

/// Exact tIME payload length
pub const TIME_SIZE: usize = 7;

/// Parse a tIME payload
///
/// Returns `None` unless the payload is exactly 7 bytes. Values are not
/// checked against the calendar.
pub fn parse_time(data: &[u8]) -> Option<Timestamp> {
    if data.len() != TIME_SIZE {
        warn!(
            "Ignoring tIME chunk of {} bytes (expected {})",
            data.len(),
            TIME_SIZE
        );
        return None;
    }

    Some(Timestamp::new(
        read_be_u16(data, 0),
        data[2],
        data[3],
        data[4],
        data[5],
        data[6],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        let ts = parse_time(&[0x07, 0xE8, 1, 15, 10, 30, 45]).unwrap();
        assert_eq!(ts.year, 2024);
        assert_eq!(ts.month, 1);
        assert_eq!(ts.day, 15);
        assert_eq!(ts.datetime, "2024-01-15 10:30:45");
    }

    #[test]
    fn test_parse_time_wrong_length() {
        assert!(parse_time(&[0x07, 0xE8, 1, 15, 10, 30]).is_none());
        assert!(parse_time(&[0x07, 0xE8, 1, 15, 10, 30, 45, 0]).is_none());
        assert!(parse_time(&[]).is_none());
    }

    #[test]
    fn test_parse_time_passes_out_of_range_values() {
        let ts = parse_time(&[0x00, 0x05, 13, 32, 25, 61, 99]).unwrap();
        assert_eq!(ts.month, 13);
        assert_eq!(ts.datetime, "0005-13-32 25:61:99");
    }
}
