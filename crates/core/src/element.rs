//! Label element model.
//!
//! Every visual primitive implements [`LabelElement`]. The compiler only ever
//! talks to the trait, so adding a new kind of element (an image, a line)
//! means writing one more implementation and registering a decoder in an
//! [`ElementRegistry`]; the existing variants never change.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::compile::FieldEncoder;
use crate::field_data::FieldData;
use crate::zpl::ZplWriter;
use crate::{CompileError, TemplateError};

/// One positionable primitive on a label.
///
/// [`emit`](Self::emit) is the only rendering an element provides.
/// [`render`](Self::render) and [`data_fields`](Self::data_fields) are both
/// derived from it, so preview output, compiled output and placeholder
/// discovery agree.
pub trait LabelElement: fmt::Debug + Send + Sync {
    /// Type tag used in template documents (e.g. `"text"`).
    fn kind(&self) -> &'static str;

    /// Write the element to `out`, passing every data field through
    /// `fields` before it is emitted.
    fn emit(&self, out: &mut ZplWriter, fields: &dyn FieldEncoder) -> Result<(), CompileError>;

    /// Render the element with its stored fields emitted verbatim.
    ///
    /// Pure: identical field values produce identical output.
    fn render(&self) -> String {
        let mut out = ZplWriter::new();
        if let Err(err) = self.emit(&mut out, &Verbatim) {
            log::warn!("{} element failed to render: {err}", self.kind());
        }
        out.finish()
    }

    /// Check element-level invariants (positive sizes).
    fn validate(&self) -> Result<(), CompileError> {
        Ok(())
    }

    /// Raw data fields that may contain placeholder tokens, in emission order.
    fn data_fields(&self) -> Vec<String> {
        let recorder = Recorder::default();
        if let Err(err) = self.emit(&mut ZplWriter::new(), &recorder) {
            log::warn!("{} element failed to render: {err}", self.kind());
        }
        recorder.fields.into_inner()
    }

    /// Serialize the element, including its `type` tag.
    ///
    /// Elements that cannot be stored keep the default, which fails.
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        Err(serde::ser::Error::custom(format!(
            "{} elements cannot be serialized",
            self.kind()
        )))
    }
}

/// Passes stored text through unchanged.
struct Verbatim;

impl FieldEncoder for Verbatim {
    fn encode<'r>(&self, raw: &'r str) -> Result<FieldData<'r>, CompileError> {
        Ok(FieldData::verbatim(raw))
    }
}

/// Collects every raw field an element emits.
#[derive(Default)]
struct Recorder {
    fields: RefCell<Vec<String>>,
}

impl FieldEncoder for Recorder {
    fn encode<'r>(&self, raw: &'r str) -> Result<FieldData<'r>, CompileError> {
        self.fields.borrow_mut().push(raw.to_string());
        Ok(FieldData::verbatim(raw))
    }
}

// ── Text ────────────────────────────────────────────────────────────────

/// A run of text in scalable font 0.
///
/// `^FO{x},{y}^A0N,{fontSize},{fontSize}^FD{text}^FS`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextElement {
    /// Left edge in dots.
    pub x: u32,
    /// Top edge in dots.
    pub y: u32,
    /// Text to print; may contain `${name}` placeholders.
    pub text: String,
    /// Character height and width in dots.
    pub font_size: u32,
}

impl TextElement {
    /// Type tag for text elements.
    pub const KIND: &'static str = "text";

    /// Create a text element.
    pub fn new(text: impl Into<String>, x: u32, y: u32, font_size: u32) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            font_size,
        }
    }

}

impl Default for TextElement {
    fn default() -> Self {
        Self::new("Sample Text", 0, 0, 30)
    }
}

impl LabelElement for TextElement {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn emit(&self, out: &mut ZplWriter, fields: &dyn FieldEncoder) -> Result<(), CompileError> {
        let data = fields.encode(&self.text)?;
        out.field_origin(self.x, self.y)
            .font(self.font_size, self.font_size)
            .field_data(&data);
        Ok(())
    }

    fn validate(&self) -> Result<(), CompileError> {
        positive("text.fontSize", self.font_size)
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        tagged(Self::KIND, self)
    }
}

// ── Barcode ─────────────────────────────────────────────────────────────

/// A Code 128 bar code without an interpretation line.
///
/// `^FO{x},{y}^BY2,3,{height}^BCN,,N,N^FD>:{content}^FS`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarcodeElement {
    /// Left edge in dots.
    pub x: u32,
    /// Top edge in dots.
    pub y: u32,
    /// Encoded data; usually a placeholder such as `${serial}`.
    pub content: String,
    /// Bar height in dots.
    pub height: u32,
}

impl BarcodeElement {
    /// Type tag for bar code elements.
    pub const KIND: &'static str = "barcode";

    /// Create a bar code element.
    pub fn new(content: impl Into<String>, x: u32, y: u32, height: u32) -> Self {
        Self {
            x,
            y,
            content: content.into(),
            height,
        }
    }

}

impl Default for BarcodeElement {
    fn default() -> Self {
        Self::new("${serial}", 0, 0, 50)
    }
}

impl LabelElement for BarcodeElement {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn emit(&self, out: &mut ZplWriter, fields: &dyn FieldEncoder) -> Result<(), CompileError> {
        let data = fields.encode(&self.content)?;
        out.field_origin(self.x, self.y)
            .barcode_defaults(self.height)
            .code128(false)
            .barcode_data(&data);
        Ok(())
    }

    fn validate(&self) -> Result<(), CompileError> {
        positive("barcode.height", self.height)
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        tagged(Self::KIND, self)
    }
}

pub(crate) fn positive(field: &'static str, value: u32) -> Result<(), CompileError> {
    if value == 0 {
        Err(CompileError::InvalidDimension { field, value })
    } else {
        Ok(())
    }
}

/// Serialize `element` and insert its `type` tag.
fn tagged<T: Serialize>(kind: &str, element: &T) -> Result<serde_json::Value, serde_json::Error> {
    let mut value = serde_json::to_value(element)?;
    if let serde_json::Value::Object(map) = &mut value {
        map.insert("type".into(), serde_json::Value::String(kind.into()));
    }
    Ok(value)
}

// ── Registry ────────────────────────────────────────────────────────────

/// Builds an element from its JSON object (the `type` tag is still present).
pub type ElementDecoder = fn(serde_json::Value) -> Result<Box<dyn LabelElement>, serde_json::Error>;

/// Maps document `type` tags to element decoders.
#[derive(Clone)]
pub struct ElementRegistry {
    decoders: BTreeMap<String, ElementDecoder>,
}

impl ElementRegistry {
    /// A registry with no element kinds.
    pub fn empty() -> Self {
        Self {
            decoders: BTreeMap::new(),
        }
    }

    /// Register (or replace) the decoder for `kind`.
    pub fn register(&mut self, kind: impl Into<String>, decoder: ElementDecoder) -> &mut Self {
        self.decoders.insert(kind.into(), decoder);
        self
    }

    /// Registered type tags, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }

    /// Decode the element at position `index` of a template document.
    pub fn decode(
        &self,
        index: usize,
        value: serde_json::Value,
    ) -> Result<Box<dyn LabelElement>, TemplateError> {
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(TemplateError::MissingElementKind { index })?;
        let decoder = self
            .decoders
            .get(kind)
            .ok_or_else(|| TemplateError::UnknownElementKind {
                kind: kind.to_string(),
            })?;
        Ok(decoder(value)?)
    }
}

impl Default for ElementRegistry {
    /// Text and bar code elements.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(TextElement::KIND, decode_as::<TextElement>)
            .register(BarcodeElement::KIND, decode_as::<BarcodeElement>);
        registry
    }
}

impl fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRegistry")
            .field("kinds", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Decoder for any deserializable element type. Unknown fields, including
/// the `type` tag, are ignored.
pub fn decode_as<T>(value: serde_json::Value) -> Result<Box<dyn LabelElement>, serde_json::Error>
where
    T: LabelElement + DeserializeOwned + 'static,
{
    Ok(Box::new(serde_json::from_value::<T>(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_render_grammar() {
        let el = TextElement::new("Help Desk:", 318, 24, 18);
        assert_eq!(el.render(), "^FO318,24^A0N,18,18^FDHelp Desk:^FS");
    }

    #[test]
    fn text_render_contains_origin_and_font() {
        let el = TextElement::new("x", 35, 66, 47);
        assert!(el.render().contains("^FO35,66^A0N,47,47"));
    }

    #[test]
    fn barcode_render_grammar() {
        let el = BarcodeElement::new("${serial}", 15, 113, 41);
        assert_eq!(el.render(), "^FO15,113^BY2,3,41^BCN,,N,N^FD>:${serial}^FS");
    }

    #[test]
    fn render_is_deterministic() {
        let el = BarcodeElement::new("ABC", 1, 2, 3);
        assert_eq!(el.render(), el.render());
    }

    #[test]
    fn zero_sizes_fail_validation() {
        assert_eq!(
            TextElement::new("a", 0, 0, 0).validate(),
            Err(CompileError::InvalidDimension {
                field: "text.fontSize",
                value: 0
            })
        );
        assert!(BarcodeElement::new("a", 0, 0, 0).validate().is_err());
        assert!(BarcodeElement::default().validate().is_ok());
    }

    #[test]
    fn json_uses_type_tag_and_camel_case() {
        let value = TextElement::new("S/N:", 14, 60, 27).to_json().unwrap();
        assert_eq!(
            value,
            json!({"type": "text", "x": 14, "y": 60, "text": "S/N:", "fontSize": 27})
        );
    }

    #[test]
    fn registry_decodes_with_defaults() {
        let registry = ElementRegistry::default();
        let el = registry.decode(0, json!({"type": "barcode", "y": 92})).unwrap();
        assert_eq!(el.kind(), "barcode");
        assert_eq!(el.render(), "^FO0,92^BY2,3,50^BCN,,N,N^FD>:${serial}^FS");
    }

    #[test]
    fn registry_rejects_unknown_and_untagged() {
        let registry = ElementRegistry::default();
        assert!(matches!(
            registry.decode(0, json!({"type": "image"})),
            Err(TemplateError::UnknownElementKind { kind }) if kind == "image"
        ));
        assert!(matches!(
            registry.decode(3, json!({"x": 1})),
            Err(TemplateError::MissingElementKind { index: 3 })
        ));
    }

    #[test]
    fn negative_coordinates_are_malformed() {
        let registry = ElementRegistry::default();
        assert!(matches!(
            registry.decode(0, json!({"type": "text", "x": -5})),
            Err(TemplateError::Json(_))
        ));
    }

    /// Only the required methods; everything else is derived from `emit`.
    #[derive(Debug)]
    struct Caption {
        top: &'static str,
        bottom: &'static str,
    }

    impl LabelElement for Caption {
        fn kind(&self) -> &'static str {
            "caption"
        }

        fn emit(
            &self,
            out: &mut ZplWriter,
            fields: &dyn FieldEncoder,
        ) -> Result<(), CompileError> {
            let top = fields.encode(self.top)?;
            let bottom = fields.encode(self.bottom)?;
            out.field_origin(0, 0).font(20, 20).field_data(&top);
            out.field_origin(0, 30).font(20, 20).field_data(&bottom);
            Ok(())
        }
    }

    #[test]
    fn minimal_element_gets_render_and_fields_from_emit() {
        let el = Caption {
            top: "Asset ${serial}",
            bottom: "Help Desk",
        };
        assert_eq!(
            el.render(),
            "^FO0,0^A0N,20,20^FDAsset ${serial}^FS^FO0,30^A0N,20,20^FDHelp Desk^FS"
        );
        assert_eq!(el.data_fields(), ["Asset ${serial}", "Help Desk"]);
        assert!(el.validate().is_ok());
        assert!(el.to_json().is_err());
    }

    #[test]
    fn builtin_data_fields_are_the_stored_text() {
        let text = TextElement::new("S/N: ${serial}", 0, 0, 9);
        assert_eq!(text.data_fields(), ["S/N: ${serial}"]);
        assert_eq!(BarcodeElement::default().data_fields(), ["${serial}"]);
    }

    #[test]
    fn registry_lists_kinds() {
        let kinds: Vec<_> = ElementRegistry::default().kinds().map(String::from).collect();
        assert_eq!(kinds, ["barcode", "text"]);
    }
}
