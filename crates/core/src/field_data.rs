//! Field data encoding for `^FD` payloads.
//!
//! Device field data is single-byte text terminated by `^FS`. A `^` or `~`
//! inside the payload would be read as the start of a new command, so every
//! resolved value passes through [`FieldData::encode`] before it is written.
//! Depending on [`ReservedCharPolicy`] the reserved prefixes are either
//! rejected or hex-escaped behind `^FH\` (`^` -> `\5E`, `~` -> `\7E`).

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CompileError;

/// Hex indicator written with `^FH`.
pub const HEX_INDICATOR: u8 = b'\\';

/// What to do when resolved field data contains `^` or `~`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservedCharPolicy {
    /// Fail compilation with [`CompileError::ReservedCharacter`].
    #[default]
    Reject,
    /// Emit the field under `^FH\` with the reserved bytes hex-escaped.
    HexEscape,
}

/// Field data ready to be written after `^FD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldData<'a> {
    text: Cow<'a, str>,
    hex_escaped: bool,
}

impl<'a> FieldData<'a> {
    /// Wrap `text` without any checks.
    ///
    /// Used for fixed captions and for [`LabelElement::render`](crate::LabelElement::render),
    /// which emits stored fields as-is.
    pub fn verbatim(text: &'a str) -> Self {
        Self {
            text: Cow::Borrowed(text),
            hex_escaped: false,
        }
    }

    /// Check `raw` for non-ASCII and reserved characters and encode it under
    /// `policy`.
    ///
    /// Data without reserved characters is borrowed unchanged and written in
    /// the plain `^FD` form regardless of policy.
    pub fn encode(
        raw: impl Into<Cow<'a, str>>,
        policy: ReservedCharPolicy,
    ) -> Result<Self, CompileError> {
        let raw = raw.into();
        let mut reserved = None;
        for (offset, ch) in raw.char_indices() {
            if !ch.is_ascii() {
                return Err(CompileError::NonAscii {
                    field_data: raw.to_string(),
                    ch,
                    offset,
                });
            }
            if reserved.is_none() && is_reserved(ch) {
                reserved = Some((offset, ch));
            }
        }

        let Some((offset, ch)) = reserved else {
            return Ok(Self {
                text: raw,
                hex_escaped: false,
            });
        };

        match policy {
            ReservedCharPolicy::Reject => Err(CompileError::ReservedCharacter {
                field_data: raw.into_owned(),
                ch,
                offset,
            }),
            ReservedCharPolicy::HexEscape => Ok(Self {
                text: Cow::Owned(encode_hex_escapes(&raw)),
                hex_escaped: true,
            }),
        }
    }

    /// The encoded payload, without the `^FD` opcode.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the payload must be preceded by `^FH\`.
    pub fn is_hex_escaped(&self) -> bool {
        self.hex_escaped
    }

    /// Write `[^FH\]^FD{prefix}{payload}^FS`.
    pub(crate) fn write_field(&self, out: &mut String, prefix: &str) {
        if self.hex_escaped {
            out.push_str("^FH\\");
        }
        out.push_str("^FD");
        out.push_str(prefix);
        out.push_str(&self.text);
        out.push_str("^FS");
    }
}

impl fmt::Display for FieldData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Characters that begin a device command.
fn is_reserved(ch: char) -> bool {
    matches!(ch, '^' | '~')
}

/// Hex-escape `^`, `~`, and the indicator itself.
fn encode_hex_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        if is_reserved(ch) || ch == HEX_INDICATOR as char {
            out.push(HEX_INDICATOR as char);
            out.push_str(&format!("{:02X}", ch as u32));
        } else {
            out.push(ch);
        }
    }
    out
}

/// A malformed hex escape sequence at a specific byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexEscapeError {
    /// Byte offset of the indicator character within the content string.
    pub offset: usize,
    /// Human-readable description of the error.
    pub message: String,
}

/// Decode `^FH` hex escapes back into the bytes the printer will print.
///
/// Returns every malformed sequence when decoding fails.
pub fn decode_hex_escapes(content: &str, indicator: u8) -> Result<Vec<u8>, Vec<HexEscapeError>> {
    let mut output = Vec::with_capacity(content.len());
    let mut errors = Vec::new();
    let bytes = content.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != indicator {
            output.push(bytes[i]);
            i += 1;
            continue;
        }
        match (hex_value(bytes.get(i + 1)), hex_value(bytes.get(i + 2))) {
            (Some(hi), Some(lo)) => output.push((hi << 4) | lo),
            _ if i + 2 >= bytes.len() => {
                errors.push(HexEscapeError {
                    offset: i,
                    message: format!(
                        "incomplete hex escape at offset {i} (expected '{}XX')",
                        indicator as char
                    ),
                });
                break;
            }
            _ => errors.push(HexEscapeError {
                offset: i,
                message: format!(
                    "invalid hex escape at offset {i} (expected two hex digits after '{}')",
                    indicator as char
                ),
            }),
        }
        i += 3;
    }

    if errors.is_empty() {
        Ok(output)
    } else {
        Err(errors)
    }
}

fn hex_value(b: Option<&u8>) -> Option<u8> {
    match *b? {
        b @ b'0'..=b'9' => Some(b - b'0'),
        b @ b'A'..=b'F' => Some(b - b'A' + 10),
        b @ b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}
