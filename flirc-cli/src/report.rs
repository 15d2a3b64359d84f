use anyhow::{bail, Context, Result};
use flirc_keys::{decode, CodeTable, KeyEvent};

/// Parse a report written as hex, e.g. `01 24 16`, `012416` or `01:24:16`.
pub fn parse_report(args: &[String]) -> Result<Vec<u8>> {
    let hex: String = args
        .iter()
        .flat_map(|a| a.split(|c: char| c.is_whitespace() || c == ':' || c == ','))
        .map(|part| part.trim_start_matches("0x").trim_start_matches("0X"))
        .flat_map(|part| {
            // A lone digit is one byte, not half of one.
            if part.len() == 1 {
                vec!['0', part.chars().next().unwrap_or('0')]
            } else {
                part.chars().collect()
            }
        })
        .collect();

    if hex.is_empty() {
        bail!("empty report");
    }
    decode_hex_bytes(&hex)
}

/// Human-readable decode result for one report.
pub fn describe_report(report: &[u8], table: &CodeTable) -> Result<String> {
    let event = decode(report).context("decoding report")?;
    Ok(match event {
        KeyEvent::Release => "release (no key)".to_string(),
        KeyEvent::Press(key) => format!(
            "code 0x{:X} raw 0x{:02X} {:?}: {}",
            key.code,
            key.raw_code,
            key.section,
            key.describe(table)
        ),
    })
}

fn decode_hex_bytes(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        bail!("odd number of hex characters");
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .with_context(|| format!("invalid hex at position {}", i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flirc_keys::Section;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_forms() {
        let expected = vec![0x01, 0x24, 0x16];
        assert_eq!(parse_report(&args(&["01", "24", "16"])).unwrap(), expected);
        assert_eq!(parse_report(&args(&["012416"])).unwrap(), expected);
        assert_eq!(parse_report(&args(&["01:24:16"])).unwrap(), expected);
        assert_eq!(parse_report(&args(&["0x01 0x24 0x16"])).unwrap(), expected);
        assert_eq!(parse_report(&args(&["1", "24", "16"])).unwrap(), expected);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_report(&args(&[])).is_err());
        assert!(parse_report(&args(&["012"])).is_err());
        assert!(parse_report(&args(&["zz"])).is_err());
    }

    #[test]
    fn test_describe() {
        let mut table = CodeTable::new();
        table.insert(Section::Plain, 0x16, "A");
        assert_eq!(
            describe_report(&[1, 0x24, 0x16], &table).unwrap(),
            "code 0x12416 raw 0x16 Plain: LA+RS+A"
        );
        assert_eq!(
            describe_report(&[1, 0, 0], &table).unwrap(),
            "release (no key)"
        );
        assert!(describe_report(&[1], &table).is_err());
    }
}
