//! Placeholder tokens and substitution contexts.
//!
//! A placeholder is a `${name}` substring inside element text or bar code
//! content. Substitution is purely textual and happens before field data is
//! encoded; substituted values are never re-scanned.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::CompileError;

/// Flat field mapping supplied by the record-lookup collaborator.
pub type FieldMap = BTreeMap<String, String>;

/// Field names produced by record lookup.
pub mod keys {
    /// Product SKU (model number).
    pub const SKU: &str = "sku";
    /// Product description.
    pub const DESCRIPTION: &str = "description";
    /// Device serial number.
    pub const SERIAL: &str = "serial";
    /// Device IMEI.
    pub const IMEI: &str = "imei";
}

/// Read-only view of a substitution context.
pub trait FieldSource {
    /// Value for `name`, if the context has one.
    fn field(&self, name: &str) -> Option<&str>;
}

impl FieldSource for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<S: std::hash::BuildHasher> FieldSource for HashMap<String, String, S> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn field(&self, name: &str) -> Option<&str> {
        (**self).field(name)
    }
}

/// How to handle a placeholder whose name is absent from the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Leave the `${name}` token in the output verbatim.
    #[default]
    Passthrough,
    /// Replace the token with an empty string.
    Empty,
    /// Fail with [`CompileError::MissingField`].
    Fail,
}

/// One `${name}` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// The name between `${` and `}`.
    pub name: &'a str,
    /// Byte range of the whole token, including delimiters.
    pub range: Range<usize>,
}

/// Iterator over the placeholders in a string. See [`placeholders`].
#[derive(Debug, Clone)]
pub struct Placeholders<'a> {
    text: &'a str,
    pos: usize,
}

/// Scan `text` for `${name}` tokens, left to right.
///
/// The name runs to the first `}`. `${}` and an unterminated `${` are
/// ordinary text.
pub fn placeholders(text: &str) -> Placeholders<'_> {
    Placeholders { text, pos: 0 }
}

impl<'a> Iterator for Placeholders<'a> {
    type Item = Placeholder<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.text.get(self.pos..)?;
            let open = self.pos + rest.find("${")?;
            let name_start = open + 2;
            let close = name_start + self.text[name_start..].find('}')?;
            if close == name_start {
                self.pos = name_start;
                continue;
            }
            self.pos = close + 1;
            return Some(Placeholder {
                name: &self.text[name_start..close],
                range: open..close + 1,
            });
        }
    }
}

/// Replace every placeholder in `text` using `source`.
///
/// Text with no placeholders is returned borrowed.
pub fn substitute<'a>(
    text: &'a str,
    source: &dyn FieldSource,
    policy: MissingFieldPolicy,
) -> Result<Cow<'a, str>, CompileError> {
    let mut tokens = placeholders(text).peekable();
    if tokens.peek().is_none() {
        return Ok(Cow::Borrowed(text));
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in tokens {
        out.push_str(&text[last..token.range.start]);
        match source.field(token.name) {
            Some(value) => out.push_str(value),
            None => match policy {
                MissingFieldPolicy::Passthrough => {
                    log::warn!("no value for placeholder ${{{}}}; left as-is", token.name);
                    out.push_str(&text[token.range.clone()]);
                }
                MissingFieldPolicy::Empty => {
                    log::debug!("no value for placeholder ${{{}}}; emptied", token.name);
                }
                MissingFieldPolicy::Fail => {
                    return Err(CompileError::MissingField {
                        name: token.name.to_string(),
                    });
                }
            },
        }
        last = token.range.end;
    }
    out.push_str(&text[last..]);
    Ok(Cow::Owned(out))
}
