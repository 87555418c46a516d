//! The news payload: a (source, headline) pair.
//!
//! Two encodings are accepted on the wire:
//!
//! ```text
//! {"source":"BBC","headline":"Some News"}
//! <news><source>BBC</source><headline>Some News</headline></news>
//! ```
//!
//! Field order is fixed (source, then headline) and both forms round-trip
//! losslessly.

use crate::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};

const ROOT_TAG: &str = "news";
const SOURCE_TAG: &str = "source";
const HEADLINE_TAG: &str = "headline";

/// A news item as submitted by a reporter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewsItem {
    /// Agency that reported the news (e.g. "BBC").
    pub source: String,
    /// The headline text.
    pub headline: String,
}

impl NewsItem {
    /// Create a news item, rejecting blank fields.
    pub fn new(source: impl Into<String>, headline: impl Into<String>) -> ProtocolResult<Self> {
        let item = Self {
            source: source.into(),
            headline: headline.into(),
        };
        item.validate()?;
        Ok(item)
    }

    /// Check that both fields carry non-blank text.
    pub fn validate(&self) -> ProtocolResult<()> {
        if self.source.trim().is_empty() {
            return Err(ProtocolError::MalformedPayload(
                "source must not be blank".to_string(),
            ));
        }
        if self.headline.trim().is_empty() {
            return Err(ProtocolError::MalformedPayload(
                "headline must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Encode as the two-element XML document.
    pub fn to_xml(&self) -> String {
        format!(
            "<{root}><{src}>{}</{src}><{hl}>{}</{hl}></{root}>",
            escape(&self.source),
            escape(&self.headline),
            root = ROOT_TAG,
            src = SOURCE_TAG,
            hl = HEADLINE_TAG,
        )
    }

    /// Decode the two-element XML document.
    pub fn from_xml(xml: &str) -> ProtocolResult<Self> {
        let body = strip_element(xml.trim(), ROOT_TAG)?;
        let (source, rest) = take_element(body.trim_start(), SOURCE_TAG)?;
        let (headline, rest) = take_element(rest.trim_start(), HEADLINE_TAG)?;
        if !rest.trim().is_empty() {
            return Err(ProtocolError::MalformedPayload(format!(
                "unexpected content after <{}>",
                HEADLINE_TAG
            )));
        }

        Self::new(unescape(source)?, unescape(headline)?)
    }

    /// Encode as a compact JSON byte buffer (used for pushed datagrams).
    pub fn to_bytes(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode from a JSON byte buffer, validating the fields.
    pub fn from_bytes(bytes: &[u8]) -> ProtocolResult<Self> {
        let item: Self = serde_json::from_slice(bytes)
            .map_err(|e| ProtocolError::MalformedPayload(e.to_string()))?;
        item.validate()?;
        Ok(item)
    }
}

impl std::fmt::Display for NewsItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.source, self.headline)
    }
}

/// Return the inner text of `<tag>…</tag>` when it spans the whole input.
fn strip_element<'a>(input: &'a str, tag: &str) -> ProtocolResult<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    input
        .strip_prefix(open.as_str())
        .and_then(|rest| rest.strip_suffix(close.as_str()))
        .ok_or_else(|| ProtocolError::MalformedPayload(format!("expected <{}> element", tag)))
}

/// Split a leading `<tag>text</tag>` off the input.
fn take_element<'a>(input: &'a str, tag: &str) -> ProtocolResult<(&'a str, &'a str)> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let rest = input
        .strip_prefix(open.as_str())
        .ok_or_else(|| ProtocolError::MalformedPayload(format!("expected <{}> element", tag)))?;
    let end = rest
        .find(close.as_str())
        .ok_or_else(|| ProtocolError::MalformedPayload(format!("unterminated <{}>", tag)))?;
    let text = &rest[..end];
    if text.contains('<') {
        return Err(ProtocolError::MalformedPayload(format!(
            "<{}> must contain text only",
            tag
        )));
    }
    Ok((text, &rest[end + close.len()..]))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(text: &str) -> ProtocolResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let end = tail
            .find(';')
            .ok_or_else(|| ProtocolError::MalformedPayload("unterminated entity".to_string()))?;
        let decoded = match &tail[..=end] {
            "&amp;" => '&',
            "&lt;" => '<',
            "&gt;" => '>',
            "&quot;" => '"',
            "&apos;" => '\'',
            other => {
                return Err(ProtocolError::MalformedPayload(format!(
                    "unknown entity {}",
                    other
                )))
            }
        };
        out.push(decoded);
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
