//! Fixed-layout label generators.
//!
//! Each generator is a pure function of its scalar arguments that returns a
//! complete program (`^XA` … `^XZ`) for one physical label stock. None of
//! them go through [`LabelTemplate`](crate::LabelTemplate); the asset-tag
//! geometry is shared with the built-in templates through [`AssetTagLayout`].
//!
//! User-supplied values are encoded with [`FieldData::encode`] under the
//! given [`ReservedCharPolicy`]; fixed captions are written verbatim.

use chrono::NaiveDate;

use crate::field_data::{FieldData, ReservedCharPolicy};
use crate::zpl::ZplWriter;
use crate::{BarcodeElement, CompileError, LabelElement, LabelTemplate, TextElement};

/// Asset tag stock: 508 x 203 dots (2.5" x 1" at 203 dpi).
pub const ASSET_TAG_SIZE: (u32, u32) = (508, 203);
/// Serial and generic bar code stock.
pub const SERIAL_LABEL_SIZE: (u32, u32) = (711, 305);
/// SKU card and device summary stock.
pub const CARD_SIZE: (u32, u32) = (710, 305);

/// Date format printed on serial labels.
pub const SERIAL_DATE_FORMAT: &str = "%m/%d/%Y";

const OWNER_CAPTION: &str = "Property of ADT, LLC";
const HELP_DESK_CAPTION: &str = "Help Desk:";
const HELP_DESK_PHONE: &str = "1-877-238-4357";
const FACILITY: &str = "IT Depot";
const LOCATION: &str = "Springville";

// ── Asset tag ───────────────────────────────────────────────────────────

/// Vertical placement of the asset-tag blocks.
///
/// The serial block sits lower when it is alone on the tag and moves up to
/// make room when an IMEI block follows it. Only `y` offsets differ between
/// the two layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetTagLayout {
    /// Baseline row of the `S/N:` caption and serial text.
    pub serial_text_y: u32,
    /// Top of the serial bar code.
    pub serial_barcode_y: u32,
    /// Rows of the IMEI text and bar code, when present.
    pub imei: Option<(u32, u32)>,
}

impl AssetTagLayout {
    /// Serial-only tag.
    pub const SERIAL_ONLY: Self = Self {
        serial_text_y: 60,
        serial_barcode_y: 113,
        imei: None,
    };

    /// Serial block followed by an IMEI block.
    pub const WITH_IMEI: Self = Self {
        serial_text_y: 64,
        serial_barcode_y: 92,
        imei: Some((135, 163)),
    };

    const CAPTION_X: u32 = 14;
    const SERIAL_X: u32 = 81;
    const IMEI_X: u32 = 101;
    const BARCODE_X: u32 = 15;
    const BARCODE_HEIGHT: u32 = 40;
    const FIELD_FONT: u32 = 27;
    const HEADER_FONT: u32 = 18;

    /// Header rows shared by both layouts.
    fn header() -> [TextElement; 3] {
        [
            TextElement::new(OWNER_CAPTION, Self::CAPTION_X, 29, Self::HEADER_FONT),
            TextElement::new(HELP_DESK_CAPTION, 318, 24, Self::HEADER_FONT),
            TextElement::new(HELP_DESK_PHONE, 318, 43, Self::HEADER_FONT),
        ]
    }

    /// The layout as a template with `${serial}` / `${imei}` placeholders.
    pub fn to_template(self, name: &str) -> LabelTemplate {
        let (width, height) = ASSET_TAG_SIZE;
        let mut t = LabelTemplate::new(name, width, height);
        for el in Self::header() {
            t.push(el);
        }
        t.push(TextElement::new("S/N:", Self::CAPTION_X, self.serial_text_y, Self::FIELD_FONT));
        t.push(TextElement::new("${serial}", Self::SERIAL_X, self.serial_text_y, Self::FIELD_FONT));
        t.push(BarcodeElement::new(
            "${serial}",
            Self::BARCODE_X,
            self.serial_barcode_y,
            Self::BARCODE_HEIGHT,
        ));
        if let Some((text_y, barcode_y)) = self.imei {
            t.push(TextElement::new("IMEI:", Self::CAPTION_X, text_y, Self::FIELD_FONT));
            t.push(TextElement::new("${imei}", Self::IMEI_X, text_y, Self::FIELD_FONT));
            t.push(BarcodeElement::new(
                "${imei}",
                Self::BARCODE_X,
                barcode_y,
                Self::BARCODE_HEIGHT,
            ));
        }
        t
    }
}

/// Asset tag: owner header, serial text + bar code, and an IMEI text + bar
/// code block when `imei` is present and not blank.
///
/// Ends with `^MMC,Y` (cutter mode) before `^XZ`.
pub fn asset_tag(
    serial: &str,
    imei: Option<&str>,
    policy: ReservedCharPolicy,
) -> Result<String, CompileError> {
    let imei = imei.filter(|s| !s.trim().is_empty());
    let layout = if imei.is_some() {
        AssetTagLayout::WITH_IMEI
    } else {
        AssetTagLayout::SERIAL_ONLY
    };
    let serial = FieldData::encode(serial, policy)?;
    let imei = imei.map(|v| FieldData::encode(v, policy)).transpose()?;

    let (width, height) = ASSET_TAG_SIZE;
    let mut w = ZplWriter::new();
    w.start().page(width, height);
    for el in AssetTagLayout::header() {
        w.push(&el.render());
    }
    value_block(&mut w, "S/N:", AssetTagLayout::SERIAL_X, layout.serial_text_y, &serial);
    barcode_block(&mut w, layout.serial_barcode_y, &serial);
    if let (Some(imei), Some((text_y, barcode_y))) = (&imei, layout.imei) {
        value_block(&mut w, "IMEI:", AssetTagLayout::IMEI_X, text_y, imei);
        barcode_block(&mut w, barcode_y, imei);
    }
    w.cutter_mode().end();
    Ok(w.finish())
}

fn value_block(w: &mut ZplWriter, caption: &str, value_x: u32, y: u32, value: &FieldData<'_>) {
    let font = AssetTagLayout::FIELD_FONT;
    w.field_origin(AssetTagLayout::CAPTION_X, y)
        .font(font, font)
        .caption(caption);
    w.field_origin(value_x, y).font(font, font).field_data(value);
}

fn barcode_block(w: &mut ZplWriter, y: u32, value: &FieldData<'_>) {
    w.field_origin(AssetTagLayout::BARCODE_X, y)
        .barcode_defaults(AssetTagLayout::BARCODE_HEIGHT)
        .code128(false)
        .barcode_data(value);
}

// ── Serial label ────────────────────────────────────────────────────────

/// Serial label dated today (local time).
pub fn serial_label(
    sku: &str,
    serial: &str,
    policy: ReservedCharPolicy,
) -> Result<String, CompileError> {
    serial_label_dated(sku, serial, chrono::Local::now().date_naive(), policy)
}

/// Serial label: boxed serial text + bar code, facility caption, print
/// date (`MM/dd/yyyy`), and SKU.
pub fn serial_label_dated(
    sku: &str,
    serial: &str,
    date: NaiveDate,
    policy: ReservedCharPolicy,
) -> Result<String, CompileError> {
    let sku = FieldData::encode(sku, policy)?;
    let serial = FieldData::encode(serial, policy)?;
    let date = date.format(SERIAL_DATE_FORMAT).to_string();

    let (width, height) = SERIAL_LABEL_SIZE;
    let mut w = ZplWriter::new();
    w.start().page(width, height);
    w.field_typeset(45, 73).font(45, 45).caption("Serial Number:");
    w.graphic_box(18, 11, 675, 172, 8);
    w.field_typeset(335, 71).font(34, 33).field_data(&serial);
    w.barcode_defaults(69)
        .field_typeset(45, 164)
        .code128(false)
        .barcode_data(&serial);
    w.field_typeset(18, 234).font(33, 31).caption(FACILITY);
    w.field_typeset(18, 275).font(33, 31).caption(LOCATION);
    w.field_typeset(193, 277).font(28, 28).caption(&date);
    w.field_typeset(494, 274).font(39, 38).caption("SKU:");
    w.field_typeset(574, 274).font(39, 38).field_data(&sku);
    w.print_quantity_one().end();
    Ok(w.finish())
}

// ── Generic bar code ────────────────────────────────────────────────────

/// Any value as a bar code with the value echoed underneath. Uses the
/// serial-label stock.
pub fn generic_barcode(barcode: &str, policy: ReservedCharPolicy) -> Result<String, CompileError> {
    let value = FieldData::encode(barcode, policy)?;

    let (width, height) = SERIAL_LABEL_SIZE;
    let mut w = ZplWriter::new();
    w.start().page(width, height);
    w.field_typeset(45, 73).font(45, 45).caption("Barcode:");
    w.barcode_defaults(69)
        .field_typeset(45, 164)
        .code128(false)
        .barcode_data(&value);
    w.field_typeset(45, 210).font(30, 30).field_data(&value);
    w.print_quantity_one().end();
    Ok(w.finish())
}

// ── SKU card ────────────────────────────────────────────────────────────

/// SKU card: bordered large SKU text with an interpreted SKU bar code, and
/// the description on a single line underneath.
pub fn sku_card(
    sku: &str,
    description: &str,
    policy: ReservedCharPolicy,
) -> Result<String, CompileError> {
    let sku = FieldData::encode(sku, policy)?;
    let description = FieldData::encode(description, policy)?;

    let (width, height) = CARD_SIZE;
    let mut w = ZplWriter::new();
    w.start().page(width, height);
    w.graphic_box(17, 13, 677, 181, 8);
    w.field_typeset(35, 66).font(47, 48).caption("SKU:");
    w.field_typeset(280, 145).font(110, 108).field_data(&sku);
    w.barcode_defaults(74)
        .field_typeset(50, 150)
        .code128(true)
        .barcode_data(&sku);
    w.field_typeset(50, 272)
        .font(38, 14)
        .single_line_block(600)
        .field_data(&description);
    w.print_quantity_one().end();
    Ok(w.finish())
}

// ── Device summary (image) label ────────────────────────────────────────

/// Caption printed next to a non-blank custom prefix.
pub const PREFIX_CAPTION: &str = "Custom Prefix:";

/// Device summary label: framed summary line, device SKU, optional custom
/// prefix row, and a "Completed" check box.
///
/// The prefix caption and value slots are always emitted; both are empty
/// when `prefix` is `None` or blank.
pub fn image_label(
    summary: &str,
    device_sku: &str,
    prefix: Option<&str>,
    policy: ReservedCharPolicy,
) -> Result<String, CompileError> {
    let summary = FieldData::encode(summary, policy)?;
    let device_sku = FieldData::encode(device_sku, policy)?;
    let (caption, prefix) = match prefix.filter(|p| !p.trim().is_empty()) {
        Some(p) => (PREFIX_CAPTION, FieldData::encode(p, policy)?),
        None => ("", FieldData::verbatim("")),
    };

    let (width, height) = CARD_SIZE;
    let mut w = ZplWriter::new();
    w.start().page(width, height);
    w.graphic_box(20, 20, 670, 265, 3);
    w.graphic_box(20, 100, 670, 3, 3);
    w.field_typeset(40, 80)
        .font(40, 40)
        .single_line_block(650)
        .field_data(&summary);
    w.field_typeset(35, 150).font(35, 35).caption("Device SKU:");
    w.field_typeset(280, 150).font(35, 35).field_data(&device_sku);
    w.field_typeset(35, 200).font(35, 35).caption(caption);
    w.field_typeset(280, 200).font(35, 35).field_data(&prefix);
    w.field_typeset(500, 270).font(30, 30).caption("Completed");
    w.graphic_box(643, 240, 40, 40, 2);
    w.print_quantity_one().end();
    Ok(w.finish())
}
