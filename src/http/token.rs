// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP token and header value syntax checks (RFC 7230)

/// Lookup table for the RFC 7230 `tchar` set, indexed by ASCII code
static TCHAR: [bool; 128] = build_tchar_table();

const fn build_tchar_table() -> [bool; 128] {
    let mut table = [false; 128];
    let mut i = 0;
    while i < 128 {
        let c = i as u8;
        table[i] = c.is_ascii_alphanumeric()
            || matches!(
                c,
                b'!' | b'#'
                    | b'$'
                    | b'%'
                    | b'&'
                    | b'\''
                    | b'*'
                    | b'+'
                    | b'-'
                    | b'.'
                    | b'^'
                    | b'_'
                    | b'`'
                    | b'|'
                    | b'~'
            );
        i += 1;
    }
    table
}

/// Check that `value` is a legal HTTP token (method names, header names)
pub fn is_valid_http_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| (c as u32) < 128 && TCHAR[c as usize])
}

/// Check that `value` can be used as an HTTP header value
///
/// Empty values are allowed. Anything else must not start or end with
/// whitespace and must not contain CR, LF or NUL.
pub fn is_valid_header_value(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }

    let is_ws = |c: char| c == ' ' || c == '\t';
    if value.starts_with(is_ws) || value.ends_with(is_ws) {
        return false;
    }

    !value.contains(['\r', '\n', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tokens() {
        assert!(is_valid_http_token("GET"));
        assert!(is_valid_http_token("PATCH"));
        assert!(is_valid_http_token("x-custom-header"));
        assert!(is_valid_http_token("!#$%&'*+-.^_`|~09azAZ"));
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(!is_valid_http_token(""));
        assert!(!is_valid_http_token("GE T"));
        assert!(!is_valid_http_token("a:b"));
        assert!(!is_valid_http_token("(comment)"));
        assert!(!is_valid_http_token("caf\u{e9}"));
        assert!(!is_valid_http_token("\u{7f}"));
    }

    #[test]
    fn test_header_values() {
        assert!(is_valid_header_value(""));
        assert!(is_valid_header_value("text/html; charset=utf-8"));
        assert!(is_valid_header_value("a b"));
        assert!(!is_valid_header_value(" leading"));
        assert!(!is_valid_header_value("trailing\t"));
        assert!(!is_valid_header_value("split\r\nInjected: 1"));
        assert!(!is_valid_header_value("nul\0byte"));
    }
}
