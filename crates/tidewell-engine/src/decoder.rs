// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strict decoder for generator output.
//!
//! Accepted line grammar, after trimming:
//!
//! ```text
//! <digits> "." <text> "[" <type> "]" <text> ":" <message>
//! ```
//!
//! The bracketed token and the colon may sit anywhere after the ordinal, so
//! `1. **[FOCUS]**: ...` and `1. Try this [FOCUS]: ...` both decode. The
//! colon must follow the closing bracket.
//!
//! Each line decodes to a [`DecodedLine`] or a [`LineRejection`]. When no
//! line decodes, the whole response becomes one CUSTOM recommendation.

use std::sync::LazyLock;

use regex::Regex;
use tidewell_core::types::{MAX_MESSAGE_CHARS, truncate_chars};
use tidewell_core::{RecommendationDraft, RecommendationSource, RecommendationType};

static ORDINAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.").unwrap());

/// A line that matched the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLine {
    pub kind: RecommendationType,
    pub message: String,
}

/// Why a line was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRejection {
    Blank,
    /// Does not start with `<digits>.`.
    MissingOrdinal,
    /// No `[TYPE]` after the ordinal.
    MissingType,
    /// No `:` after the closing bracket.
    MissingColon,
    EmptyMessage,
}

/// Decode a single line.
pub fn decode_line(line: &str) -> Result<DecodedLine, LineRejection> {
    let line = line.trim();
    if line.is_empty() {
        return Err(LineRejection::Blank);
    }
    let ordinal = ORDINAL.find(line).ok_or(LineRejection::MissingOrdinal)?;
    let rest = &line[ordinal.end()..];

    let open = rest.find('[').ok_or(LineRejection::MissingType)?;
    let inner = &rest[open + 1..];
    let close = inner.find(']').ok_or(LineRejection::MissingType)?;
    let token = inner[..close].trim();

    let after = &inner[close + 1..];
    let colon = after.find(':').ok_or(LineRejection::MissingColon)?;
    let message = after[colon + 1..].trim();
    if message.is_empty() {
        return Err(LineRejection::EmptyMessage);
    }

    Ok(DecodedLine {
        kind: RecommendationType::from_token(token),
        message: message.to_string(),
    })
}

/// Decode every line of a response, in order.
pub fn decode_lines(raw: &str) -> Vec<Result<DecodedLine, LineRejection>> {
    raw.lines().map(decode_line).collect()
}

/// Result of decoding a whole response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoding {
    /// At least one line matched.
    Decoded(Vec<DecodedLine>),
    /// Nothing matched; carries the raw text capped to the message limit.
    Unstructured(String),
    /// The response had no visible content.
    Empty,
}

impl Decoding {
    /// Materialise as AI-sourced drafts. `Empty` yields nothing.
    pub fn into_drafts(self, user_id: &str) -> Vec<RecommendationDraft> {
        let ai = |kind, message: String| {
            RecommendationDraft::new(user_id, kind, message, RecommendationSource::Ai)
        };
        match self {
            Decoding::Decoded(lines) => lines.into_iter().map(|l| ai(l.kind, l.message)).collect(),
            Decoding::Unstructured(text) => vec![ai(RecommendationType::Custom, text)],
            Decoding::Empty => Vec::new(),
        }
    }
}

/// Decode a full response.
pub fn decode_response(raw: &str) -> Decoding {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decoding::Empty;
    }
    let decoded: Vec<DecodedLine> = decode_lines(trimmed).into_iter().flatten().collect();
    if decoded.is_empty() {
        Decoding::Unstructured(truncate_chars(trimmed, MAX_MESSAGE_CHARS))
    } else {
        Decoding::Decoded(decoded)
    }
}
