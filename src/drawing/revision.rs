//! Revision tokens: what the order expects and what the drawing says.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// A bare revision token such as `A02`, `B/01` or `C.3`.
static REVISION_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][/.]?\d+$").unwrap());

/// The revision label in a drawing's title block: `版本号: A02`,
/// `版本：REV.B/01`, `版本 REV B01`.
static DRAWING_REVISION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:版本号|版本)\s*[:：]?\s*(?:(?i:REV)\.?\s*[:：]?\s*)?([A-Za-z0-9][A-Za-z0-9/.\-]*)")
        .unwrap()
});

/// Where an expected revision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionSource {
    /// Typed into the order's reply column.
    Reply,
    /// Last word of the product description.
    Description,
}

pub fn is_revision_token(token: &str) -> bool {
    REVISION_TOKEN_RE.is_match(token)
}

/// The reply text, trimmed, taken verbatim.
pub fn from_reply(reply: &str) -> Option<String> {
    let reply = reply.trim();
    (!reply.is_empty()).then(|| reply.to_string())
}

/// The last whitespace-separated word of `description`, if it is a
/// revision token.
pub fn from_description(description: &str) -> Option<String> {
    description
        .split_whitespace()
        .last()
        .filter(|t| is_revision_token(t))
        .map(str::to_string)
}

/// The revision the order asks for: reply first, then description.
pub fn expected_revision(reply: &str, description: &str) -> Option<(String, RevisionSource)> {
    from_reply(reply)
        .map(|r| (r, RevisionSource::Reply))
        .or_else(|| from_description(description).map(|r| (r, RevisionSource::Description)))
}

/// Revision label found in one page of drawing text.
pub fn from_drawing_text(text: &str) -> Option<String> {
    DRAWING_REVISION_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// The first page, in order, that carries a revision label.
pub fn from_drawing_pages<S: AsRef<str>>(pages: &[S]) -> Option<String> {
    pages.iter().find_map(|p| from_drawing_text(p.as_ref()))
}
