//! The `KEY:VALUE` block that precedes the SGML body of an OFX 1.x file.

/// The single header profile the importer accepts.
pub const REQUIRED_HEADER: &[(&str, &str)] = &[
    ("OFXHEADER", "100"),
    ("DATA", "OFXSGML"),
    ("VERSION", "102"),
    ("SECURITY", "NONE"),
    ("ENCODING", "USASCII"),
    ("CHARSET", "1252"),
    ("COMPRESSION", "NONE"),
    ("OLDFILEUID", "NONE"),
    ("NEWFILEUID", "NONE"),
];

const BODY_MARKER: &str = "<ofx";

/// Splits `text` at the first `<OFX` (any case) into the header block and the
/// body starting at the marker. `None` when there is no marker at all.
pub fn split_header(text: &str) -> Option<(&str, &str)> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let at = text.to_ascii_lowercase().find(BODY_MARKER)?;
    Some(text.split_at(at))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderIssue {
    Missing(&'static str),
    Mismatch {
        key: &'static str,
        expected: &'static str,
        found: String,
    },
}

/// Returns the first problem found in `header`, walking the required keys in
/// table order. `None` means the header is acceptable.
pub fn check(header: &str) -> Option<HeaderIssue> {
    let entries: Vec<(&str, &str)> = header
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect();

    for &(key, expected) in REQUIRED_HEADER {
        let mut seen = false;
        for &(k, v) in entries.iter().filter(|(k, _)| k.eq_ignore_ascii_case(key)) {
            seen = true;
            if !v.eq_ignore_ascii_case(expected) {
                tracing::debug!(key = k, value = v, "unexpected OFX header value");
                return Some(HeaderIssue::Mismatch {
                    key,
                    expected,
                    found: v.to_string(),
                });
            }
        }
        if !seen {
            return Some(HeaderIssue::Missing(key));
        }
    }
    None
}

pub fn validate(header: &str) -> bool {
    check(header).is_none()
}
