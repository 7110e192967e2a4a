//! Map Parser
//!
//! Turns map-file lines into `CityRecord`s. One city per line:
//! `<name> [north=<name>] [east=<name>] [south=<name>] [west=<name>]`.

use std::io::{self, BufRead, Read};

use crate::components::{CityRecord, Direction};
use crate::error::WorldError;

/// Longest accepted line, in bytes
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Parses one line. Blank lines yield `None`.
///
/// `line_number` is 1-based and only used in error messages.
pub fn parse_line(line_number: u64, line: &str) -> Result<Option<CityRecord>, WorldError> {
    if line.len() > MAX_LINE_LEN {
        return Err(WorldError::MalformedLine {
            line: line_number,
            reason: format!("line longer than {} bytes", MAX_LINE_LEN),
        });
    }

    let mut tokens = line.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };

    let mut record = CityRecord::new(name);
    let mut seen = [false; 4];
    for token in tokens {
        let (keyword, target) = token.split_once('=').ok_or_else(|| WorldError::MalformedLine {
            line: line_number,
            reason: format!("`{}` is not of the form direction=city", token),
        })?;
        if target.contains('=') {
            return Err(WorldError::MalformedLine {
                line: line_number,
                reason: format!("`{}` is not of the form direction=city", token),
            });
        }
        let direction = Direction::from_keyword(keyword).ok_or_else(|| WorldError::MalformedLine {
            line: line_number,
            reason: format!(
                "invalid direction `{}` (should be north, east, south or west)",
                keyword
            ),
        })?;

        if seen[direction.index()] {
            return Err(WorldError::DuplicateDirection {
                line: line_number,
                direction,
            });
        }
        seen[direction.index()] = true;

        // `north=` is accepted and means no link
        if !target.is_empty() {
            record.links[direction.index()] = Some(target.to_string());
        }
    }

    Ok(Some(record))
}

/// Parses a whole map, stopping at the first bad line.
///
/// Reads at most one line limit (plus its terminator) at a time, so an
/// overlong line is rejected without buffering it whole.
pub fn parse_map<R: BufRead>(mut reader: R) -> Result<Vec<CityRecord>, WorldError> {
    let limit = MAX_LINE_LEN as u64 + 2;
    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut line_number = 0;
    loop {
        buf.clear();
        let read = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        line_number += 1;

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        } else if read as u64 == limit {
            return Err(WorldError::MalformedLine {
                line: line_number,
                reason: format!("line longer than {} bytes", MAX_LINE_LEN),
            });
        }

        let line = std::str::from_utf8(&buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if let Some(record) = parse_line(line_number, line)? {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        let record = parse_line(1, "Foo north=Bar west=Baz south=Qu-ux")
            .unwrap()
            .unwrap();

        assert_eq!(record.name, "Foo");
        assert_eq!(record.link(Direction::North), Some("Bar"));
        assert_eq!(record.link(Direction::East), None);
        assert_eq!(record.link(Direction::South), Some("Qu-ux"));
        assert_eq!(record.link(Direction::West), Some("Baz"));
    }

    #[test]
    fn test_parse_name_only_and_extra_whitespace() {
        let record = parse_line(1, "  Lonely \t ").unwrap().unwrap();

        assert_eq!(record, CityRecord::new("Lonely"));
    }

    #[test]
    fn test_blank_line_is_skipped() {
        assert!(parse_line(3, "").unwrap().is_none());
        assert!(parse_line(3, "   ").unwrap().is_none());
    }

    #[test]
    fn test_duplicated_direction() {
        let err = parse_line(1, "Foo south=Bar south=Qu-ux").unwrap_err();

        assert!(matches!(
            err,
            WorldError::DuplicateDirection {
                line: 1,
                direction: Direction::South
            }
        ));
        assert!(err.to_string().contains("duplicated connection"));
    }

    #[test]
    fn test_empty_target_still_counts_as_duplicate() {
        let err = parse_line(2, "Foo north= north=Bar").unwrap_err();

        assert!(matches!(err, WorldError::DuplicateDirection { line: 2, .. }));
    }

    #[test]
    fn test_missing_separator() {
        let err = parse_line(4, "Foo north").unwrap_err();

        assert!(matches!(err, WorldError::MalformedLine { line: 4, .. }));
    }

    #[test]
    fn test_unknown_direction() {
        let err = parse_line(1, "Foo up=Bar").unwrap_err();
        assert!(err.to_string().contains("invalid direction `up`"));

        // keywords are case-sensitive
        let err = parse_line(1, "Foo North=Bar").unwrap_err();
        assert!(matches!(err, WorldError::MalformedLine { .. }));
    }

    #[test]
    fn test_double_separator() {
        let err = parse_line(1, "Foo north=Bar=Baz").unwrap_err();

        assert!(matches!(err, WorldError::MalformedLine { .. }));
    }

    #[test]
    fn test_line_too_long() {
        let line = format!("Foo north={}", "x".repeat(MAX_LINE_LEN));
        let err = parse_line(9, &line).unwrap_err();

        assert!(matches!(err, WorldError::MalformedLine { line: 9, .. }));
    }

    #[test]
    fn test_parse_map_reports_line_number() {
        let map = "Foo south=Qu-ux\n\nQu-ux north=Foo north=Bar\n";
        let err = parse_map(map.as_bytes()).unwrap_err();

        assert!(matches!(err, WorldError::DuplicateDirection { line: 3, .. }));
    }

    #[test]
    fn test_parse_map_skips_blank_lines() {
        let map = "Foo south=Qu-ux\n\nQu-ux north=Foo";
        let records = parse_map(map.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "Qu-ux");
    }

    #[test]
    fn test_parse_map_crlf() {
        let map = "Foo south=Qu-ux\r\nQu-ux north=Foo\r\n";
        let records = parse_map(map.as_bytes()).unwrap();

        assert_eq!(records[0].link(Direction::South), Some("Qu-ux"));
        assert_eq!(records[1].link(Direction::North), Some("Foo"));
    }

    #[test]
    fn test_parse_map_rejects_endless_line() {
        // never yields a newline; must fail after one line's worth of bytes
        let endless = std::io::BufReader::new(std::io::repeat(b'x'));
        let err = parse_map(endless).unwrap_err();

        assert!(matches!(err, WorldError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_map_long_line_after_good_ones() {
        let map = format!("Foo\nBar\n{}\n", "x".repeat(MAX_LINE_LEN + 10));
        let err = parse_map(map.as_bytes()).unwrap_err();

        assert!(matches!(err, WorldError::MalformedLine { line: 3, .. }));
    }
}
