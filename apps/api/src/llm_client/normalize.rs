//! Recovers a single JSON value from a model's free-text reply.
//!
//! Models are told to answer with bare JSON, but routinely wrap it in a
//! markdown fence or surround it with a sentence of prose. Recovery is a
//! two-step affair:
//!
//! 1. [`classify`] decides which fence (if any) holds the payload and hands
//!    back its body as a [`Fence`] variant.
//! 2. [`normalize`] parses that body and conforms it to the [`ReplyShape`]
//!    requested by the caller.
//!
//! Nothing here guesses at repairs: a reply that does not parse is reported
//! as [`NormalizeError::MalformedResponse`] with a bounded excerpt.

use serde_json::Value;
use thiserror::Error;

const FENCE: &str = "```";

/// Maximum number of characters of the raw reply quoted back in errors.
pub const EXCERPT_CHARS: usize = 500;

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("model reply is not valid JSON ({reason}); reply begins: {excerpt}")]
    MalformedResponse { reason: String, excerpt: String },

    #[error("model reply has the wrong shape: expected {expected}, found {found}")]
    InvalidShape {
        expected: &'static str,
        found: &'static str,
    },
}

/// The shape a caller requires of the recovered value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// An object or an array, returned as parsed.
    Structured,
    /// An array. A lone object is wrapped into a one-element array and the
    /// result is cut to `limit` items when one is given. Short arrays are
    /// never padded.
    List { limit: Option<usize> },
}

/// Where the JSON payload sits inside a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fence<'a> {
    /// No fence marker at all; the whole (trimmed) reply.
    Bare(&'a str),
    /// Body of the first ```` ```json ```` block.
    Tagged(&'a str),
    /// Body of the first fenced block with no tag or a non-JSON tag.
    Untagged(&'a str),
}

impl<'a> Fence<'a> {
    pub fn body(&self) -> &'a str {
        match self {
            Fence::Bare(body) | Fence::Tagged(body) | Fence::Untagged(body) => body,
        }
    }
}

/// Classifies the fence layout of `text`.
///
/// A ```` ```json ```` opener anywhere outside a JSON string literal wins,
/// even when an earlier stray marker would otherwise pair with it. Without
/// one, the first fenced block is used. A block's body ends at the first
/// fence marker that is not inside a JSON string literal; an unterminated
/// block runs to the end of the text.
pub fn classify(text: &str) -> Fence<'_> {
    let text = text.trim();

    let mut cursor = 0;
    while let Some(offset) = closing_fence(&text[cursor..]) {
        let opener = cursor + offset + FENCE.len();
        let (tag, rest) = split_tag(&text[opener..]);
        if tag.eq_ignore_ascii_case("json") {
            return Fence::Tagged(block_body(rest));
        }
        cursor = opener;
    }

    match text.find(FENCE) {
        Some(offset) => {
            let (_, rest) = split_tag(&text[offset + FENCE.len()..]);
            Fence::Untagged(block_body(rest))
        }
        None => Fence::Bare(text),
    }
}

/// Splits the info string (`json`, `javascript`, ...) off the text that
/// follows an opening fence.
fn split_tag(after_fence: &str) -> (&str, &str) {
    let tag_len = after_fence
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+')))
        .unwrap_or(after_fence.len());
    after_fence.split_at(tag_len)
}

/// Trimmed body of a block, up to its closing fence or the end of the text.
fn block_body(rest: &str) -> &str {
    match closing_fence(rest) {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

/// Byte offset of the first fence marker outside a JSON string literal.
/// String state resets at line breaks since JSON strings cannot span lines.
fn closing_fence(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut in_string = false;
    let mut escaped = false;

    for i in 0..bytes.len() {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' || b == b'\n' {
                in_string = false;
            }
        } else if b == b'"' {
            in_string = true;
        } else if bytes[i..].starts_with(FENCE.as_bytes()) {
            return Some(i);
        }
    }
    None
}

/// Recovers the JSON value in `raw` and conforms it to `shape`.
pub fn normalize(raw: &str, shape: ReplyShape) -> Result<Value, NormalizeError> {
    let value = recover_json(raw)?;
    conform(value, shape)
}

/// Parses the payload of `raw` without any shape requirement.
pub fn recover_json(raw: &str) -> Result<Value, NormalizeError> {
    let trimmed = raw.trim();

    // A reply that is already valid JSON is never split on backticks that
    // live inside its string values.
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let candidate = classify(trimmed).body();
    serde_json::from_str(candidate).map_err(|e| NormalizeError::MalformedResponse {
        reason: e.to_string(),
        excerpt: excerpt(trimmed),
    })
}

/// Applies the caller's shape requirement to an already parsed value.
pub fn conform(value: Value, shape: ReplyShape) -> Result<Value, NormalizeError> {
    match shape {
        ReplyShape::Structured => match value {
            Value::Object(_) | Value::Array(_) => Ok(value),
            other => Err(NormalizeError::InvalidShape {
                expected: "an object or an array",
                found: kind_of(&other),
            }),
        },
        ReplyShape::List { limit } => {
            let mut items = match value {
                Value::Array(items) => items,
                Value::Object(_) => vec![value],
                other => {
                    return Err(NormalizeError::InvalidShape {
                        expected: "an array",
                        found: kind_of(&other),
                    })
                }
            };
            if let Some(limit) = limit {
                items.truncate(limit);
            }
            Ok(Value::Array(items))
        }
    }
}

/// First [`EXCERPT_CHARS`] characters of `text`, cut on a char boundary.
pub fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
