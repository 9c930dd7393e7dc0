//! Repairs OFX 1.x SGML into XML by closing value tags.
//!
//! SGML exports leave leaf elements open (`<TRNAMT>-49.99` followed by a line
//! break). The strict transcoder relies on each tag, or tag plus value, sitting
//! on its own line; values must not contain `<`/`>` or span lines.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SgmlMode {
    /// One tag per line; any line outside that shape aborts the import.
    #[default]
    Strict,
    /// Closes every unclosed `<TAG>value` run and keeps stray text lines.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}: {text:?}")]
pub struct MalformedLine {
    pub line: usize,
    pub reason: &'static str,
    pub text: String,
}

pub fn transcode(sgml: &str, mode: SgmlMode) -> Result<String, MalformedLine> {
    match mode {
        SgmlMode::Strict => transcode_strict(sgml),
        SgmlMode::Lenient => Ok(transcode_lenient(sgml)),
    }
}

fn transcode_strict(sgml: &str) -> Result<String, MalformedLine> {
    let mut lines = Vec::new();

    for (idx, raw) in sgml.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let closed = close_line(line).map_err(|reason| MalformedLine {
            line: idx + 1,
            reason,
            text: line.to_string(),
        })?;
        lines.push(closed);
    }

    Ok(lines.join("\n"))
}

fn close_line(line: &str) -> Result<Cow<'_, str>, &'static str> {
    if !line.starts_with('<') {
        return Err("line does not start with a tag");
    }
    if line.ends_with('>') {
        return Ok(Cow::Borrowed(line));
    }
    // Not ending in '>' means it cannot end in "/>" either: tag plus value.
    let name = tag_name(line).ok_or("tag is not terminated")?;
    Ok(Cow::Owned(format!("{line}</{name}>")))
}

/// Name of the tag that opens `line`, without any attributes.
fn tag_name(line: &str) -> Option<&str> {
    let end = line.find('>')?;
    line[1..end].split_whitespace().next()
}

fn re_value_tag() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"<(\w+)>([^<\r\n]+)").expect("invalid regex"))
}

fn transcode_lenient(sgml: &str) -> String {
    let mut out = String::with_capacity(sgml.len() + sgml.len() / 4);
    let mut last = 0;

    for caps in re_value_tag().captures_iter(sgml) {
        let (Some(whole), Some(name), Some(value)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        out.push_str(&sgml[last..whole.end()]);
        last = whole.end();

        // Whitespace after a container tag is not a value.
        if value.as_str().trim().is_empty() || is_closed(&sgml[last..], name.as_str()) {
            continue;
        }
        out.push_str("</");
        out.push_str(name.as_str());
        out.push('>');
    }

    out.push_str(&sgml[last..]);
    out
}

fn is_closed(rest: &str, name: &str) -> bool {
    let close = format!("</{name}>");
    rest.get(..close.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(&close))
}
