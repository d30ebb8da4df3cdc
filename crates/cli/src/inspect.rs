//! Field-data extraction for `assetlabel inspect`.
//!
//! Shows the literal text each `^FD` field will print, with `^FH` escapes
//! decoded. This is a scanner for programs produced by this toolchain, not a
//! general ZPL parser.

use asset_label_core::decode_hex_escapes;
use asset_label_core::field_data::HEX_INDICATOR;
use serde::Serialize;

/// One `^FD ... ^FS` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct FieldText {
    /// Byte offset of the `^FD` command.
    pub(crate) offset: usize,
    /// Whether the field was written under `^FH`.
    pub(crate) hex_escaped: bool,
    /// Printed text.
    pub(crate) text: String,
}

/// Collect every field in `program`.
pub(crate) fn field_texts(program: &str) -> anyhow::Result<Vec<FieldText>> {
    let hex_prefix = format!("^FH{}", char::from(HEX_INDICATOR));
    let mut fields = Vec::new();
    let mut search_from = 0;

    while let Some(found) = program[search_from..].find("^FD") {
        let offset = search_from + found;
        let start = offset + 3;
        let end = program[start..]
            .find("^FS")
            .map_or(program.len(), |i| start + i);
        let raw = &program[start..end];
        let hex_escaped = program[..offset].ends_with(&hex_prefix);

        let text = if hex_escaped {
            let bytes = decode_hex_escapes(raw, HEX_INDICATOR).map_err(|errors| {
                let detail: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
                anyhow::anyhow!("malformed hex escape in field at {offset}: {}", detail.join("; "))
            })?;
            String::from_utf8_lossy(&bytes).into_owned()
        } else {
            raw.to_string()
        };

        fields.push(FieldText {
            offset,
            hex_escaped,
            text,
        });
        search_from = end;
    }

    Ok(fields)
}
