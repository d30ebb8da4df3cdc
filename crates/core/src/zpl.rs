//! Low-level ZPL statement writer.
//!
//! [`ZplWriter`] appends opcodes to a single output string with no
//! separators. Elements, the template compiler, and the canned generators
//! all emit through it so every program shares one grammar:
//!
//! ```text
//! ^XA ^PW{width} ^LL{height} <fields...> ^XZ
//! ```

use crate::field_data::FieldData;

/// Encoding-mode prefix written in front of Code 128 field data.
pub const CODE128_AUTO: &str = ">:";

/// Appends ZPL statements to an owned buffer.
#[derive(Debug, Default, Clone)]
pub struct ZplWriter {
    out: String,
}

impl ZplWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// `^XA`: start of a label format.
    pub fn start(&mut self) -> &mut Self {
        self.out.push_str("^XA");
        self
    }

    /// `^PW{width}^LL{length}`: print width and label length in dots.
    pub fn page(&mut self, width: u32, length: u32) -> &mut Self {
        self.push_fmt(format_args!("^PW{width}^LL{length}"))
    }

    /// `^FO{x},{y}`: field origin (top-left of the field).
    pub fn field_origin(&mut self, x: u32, y: u32) -> &mut Self {
        self.push_fmt(format_args!("^FO{x},{y}"))
    }

    /// `^FT{x},{y}`: field typeset (baseline of the field).
    pub fn field_typeset(&mut self, x: u32, y: u32) -> &mut Self {
        self.push_fmt(format_args!("^FT{x},{y}"))
    }

    /// `^A0N,{height},{width}`: scalable font 0, normal orientation.
    pub fn font(&mut self, height: u32, width: u32) -> &mut Self {
        self.push_fmt(format_args!("^A0N,{height},{width}"))
    }

    /// `^FB{width},1,0,L`: single-line, left-justified field block.
    pub fn single_line_block(&mut self, width: u32) -> &mut Self {
        self.push_fmt(format_args!("^FB{width},1,0,L"))
    }

    /// `^BY2,3,{height}`: bar code defaults (module width 2, ratio 3).
    pub fn barcode_defaults(&mut self, height: u32) -> &mut Self {
        self.push_fmt(format_args!("^BY2,3,{height}"))
    }

    /// `^BCN,,{Y|N},N`: Code 128, normal orientation, optional
    /// interpretation line.
    pub fn code128(&mut self, interpretation_line: bool) -> &mut Self {
        let line = if interpretation_line { 'Y' } else { 'N' };
        self.push_fmt(format_args!("^BCN,,{line},N"))
    }

    /// `^FD{data}^FS` (or `^FH\^FD...^FS` for hex-escaped data).
    pub fn field_data(&mut self, data: &FieldData<'_>) -> &mut Self {
        data.write_field(&mut self.out, "");
        self
    }

    /// `^FD>:{data}^FS`: Code 128 field data in automatic mode.
    pub fn barcode_data(&mut self, data: &FieldData<'_>) -> &mut Self {
        data.write_field(&mut self.out, CODE128_AUTO);
        self
    }

    /// Fixed caption text; never escaped.
    pub fn caption(&mut self, text: &str) -> &mut Self {
        self.field_data(&FieldData::verbatim(text))
    }

    /// `^FO{x},{y}^GB{w},{h},{thickness}^FS`: graphic box.
    pub fn graphic_box(&mut self, x: u32, y: u32, w: u32, h: u32, thickness: u32) -> &mut Self {
        self.field_origin(x, y)
            .push_fmt(format_args!("^GB{w},{h},{thickness}^FS"))
    }

    /// `^PQ1,1,1,Y`: one label, no pause.
    pub fn print_quantity_one(&mut self) -> &mut Self {
        self.push("^PQ1,1,1,Y")
    }

    /// `^MMC,Y`: cutter print mode with pre-peel.
    pub fn cutter_mode(&mut self) -> &mut Self {
        self.push("^MMC,Y")
    }

    /// `^XZ`: end of the label format.
    pub fn end(&mut self) -> &mut Self {
        self.push("^XZ")
    }

    /// Append already-rendered ZPL.
    pub fn push(&mut self, zpl: &str) -> &mut Self {
        self.out.push_str(zpl);
        self
    }

    /// Consume the writer and return the program text.
    pub fn finish(self) -> String {
        self.out
    }

    fn push_fmt(&mut self, args: std::fmt::Arguments<'_>) -> &mut Self {
        use std::fmt::Write;
        // Writing into a String cannot fail.
        let _ = self.out.write_fmt(args);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_envelope() {
        let mut w = ZplWriter::new();
        w.start().page(710, 305).end();
        assert_eq!(w.finish(), "^XA^PW710^LL305^XZ");
    }

    #[test]
    fn text_and_barcode_statements() {
        let mut w = ZplWriter::new();
        w.field_typeset(45, 164)
            .barcode_defaults(69)
            .code128(false)
            .barcode_data(&FieldData::verbatim("SN1"));
        w.field_origin(17, 13).font(47, 48).caption("SKU:");
        assert_eq!(
            w.finish(),
            "^FT45,164^BY2,3,69^BCN,,N,N^FD>:SN1^FS^FO17,13^A0N,47,48^FDSKU:^FS"
        );
    }

    #[test]
    fn graphic_box_is_self_terminated() {
        let mut w = ZplWriter::new();
        w.graphic_box(17, 13, 677, 181, 8);
        assert_eq!(w.finish(), "^FO17,13^GB677,181,8^FS");
    }
}
