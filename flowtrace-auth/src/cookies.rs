//! Parsing the `Cookie` request header into name/value pairs.

/// Parse a `Cookie: a=1; b=2` header value into `(name, value)` pairs.
/// Malformed segments (no `=`) are skipped.
pub fn parse_cookies(header_value: &str) -> Vec<(String, String)> {
    header_value
        .split(';')
        .filter_map(|segment| {
            let segment = segment.trim();
            let (name, value) = segment.split_once('=')?;
            if name.is_empty() {
                return None;
            }
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_cookies() {
        let pairs = parse_cookies("session=abc123; csrf=xyz");
        assert_eq!(
            pairs,
            vec![
                ("session".to_string(), "abc123".to_string()),
                ("csrf".to_string(), "xyz".to_string()),
            ]
        );
    }

    #[test]
    fn skips_malformed_segments() {
        let pairs = parse_cookies("session=abc; ; =novalue; ok=1");
        assert_eq!(
            pairs,
            vec![("session".to_string(), "abc".to_string()), ("ok".to_string(), "1".to_string())]
        );
    }
}
