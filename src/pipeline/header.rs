//! Header fields from the first page's text.
//!
//! Each label is searched independently; a label that does not appear is
//! simply absent from [`HeaderInfo`]. Both ASCII and full-width colons are
//! accepted, since the form mixes them between revisions.

use crate::output::HeaderInfo;
use once_cell::sync::Lazy;
use regex::Regex;

/// Header labels, in the order they are reported.
pub const HEADER_LABELS: [&str; 7] = [
    "编号",
    "采购单号",
    "供应商",
    "采购日期",
    "到厂时间",
    "联系人",
    "付款条件",
];

/// One compiled pattern per label, same order as [`HEADER_LABELS`].
static HEADER_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    HEADER_LABELS
        .iter()
        .map(|&label| (label, Regex::new(&label_pattern(label)).unwrap()))
        .collect()
});

fn label_pattern(label: &str) -> String {
    // 编号 is also the tail of 采购单号 / 料件编号; require it not to follow
    // another Han character.
    let guard = if label == "编号" {
        r"(?:^|[^\p{Han}])"
    } else {
        ""
    };
    // The supplier name may contain single spaces; it ends at a run of two
    // or more spaces or at the end of the line.
    let value = if label == "供应商" {
        r"(.+?)(?:[ \t\u{3000}]{2,}|$)"
    } else {
        r"(\S+)"
    };
    format!(r"(?m){guard}{label}[ \t]*[:：][ \t\u{{3000}}]*{value}")
}

/// Extract every labelled header field present in `text`.
pub fn extract_header(text: &str) -> HeaderInfo {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut header = HeaderInfo::default();

    for (label, re) in HEADER_PATTERNS.iter() {
        let Some(caps) = re.captures(&text) else {
            continue;
        };
        let value = caps.get(1).map_or("", |m| m.as_str()).trim();
        if !value.is_empty() {
            header.fields.push((label.to_string(), value.to_string()));
        }
    }

    header
}
