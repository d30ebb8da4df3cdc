//! Template compiler.
//!
//! [`compile`] turns a [`LabelTemplate`] plus a substitution context into a
//! complete device program:
//!
//! ```text
//! ^XA^PW{width}^LL{height}{element}...^XZ
//! ```
//!
//! Compilation is a pure function of its inputs. The template is only
//! borrowed, nothing is cached, and all validation happens before the
//! program is returned, so no partial program ever reaches a printer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::field_data::{FieldData, ReservedCharPolicy};
use crate::fields::{FieldSource, MissingFieldPolicy, placeholders, substitute};
use crate::template::LabelTemplate;
use crate::zpl::ZplWriter;
use crate::CompileError;

/// Policies applied while resolving field data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Unresolved placeholder handling.
    pub missing: MissingFieldPolicy,
    /// `^` / `~` handling in resolved field data.
    pub reserved: ReservedCharPolicy,
}

/// Turns a raw element field into the field data that is written.
///
/// [`LabelElement::emit`](crate::LabelElement::emit) calls this for every data
/// field it writes.
pub trait FieldEncoder {
    /// Encode `raw` for output.
    fn encode<'r>(&self, raw: &'r str) -> Result<FieldData<'r>, CompileError>;
}

/// Substitutes placeholders and encodes the result as field data.
pub struct FieldResolver<'a> {
    source: &'a dyn FieldSource,
    options: CompileOptions,
}

impl<'a> FieldResolver<'a> {
    /// Resolve against `source` under `options`.
    pub fn new(source: &'a dyn FieldSource, options: CompileOptions) -> Self {
        Self { source, options }
    }

    /// Substitute placeholders in `raw` and encode the result.
    pub fn resolve<'r>(&self, raw: &'r str) -> Result<FieldData<'r>, CompileError> {
        let text = substitute(raw, self.source, self.options.missing)?;
        FieldData::encode(text, self.options.reserved)
    }
}

impl FieldEncoder for FieldResolver<'_> {
    fn encode<'r>(&self, raw: &'r str) -> Result<FieldData<'r>, CompileError> {
        self.resolve(raw)
    }
}

/// Compile `template` against `fields` with default options.
pub fn compile(template: &LabelTemplate, fields: &dyn FieldSource) -> Result<String, CompileError> {
    compile_with(template, fields, CompileOptions::default())
}

/// Compile `template` against `fields` with explicit `options`.
pub fn compile_with(
    template: &LabelTemplate,
    fields: &dyn FieldSource,
    options: CompileOptions,
) -> Result<String, CompileError> {
    template.validate()?;

    let resolver = FieldResolver::new(fields, options);
    let mut out = ZplWriter::new();
    out.start().page(template.width, template.height);
    for element in &template.elements {
        element.emit(&mut out, &resolver)?;
    }
    out.end();

    log::debug!(
        "compiled template {:?}: {} element(s)",
        template.name,
        template.elements.len()
    );
    Ok(out.finish())
}

/// Every placeholder name used by `template`, sorted and de-duplicated.
pub fn template_variables(template: &LabelTemplate) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for raw in template.elements.iter().flat_map(|el| el.data_fields()) {
        names.extend(placeholders(&raw).map(|p| p.name.to_string()));
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldMap;
    use crate::{BarcodeElement, TextElement};

    fn ctx(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_template_is_bare_envelope() {
        let t = LabelTemplate::new("empty", 710, 305);
        assert_eq!(compile(&t, &FieldMap::new()).unwrap(), "^XA^PW710^LL305^XZ");
    }

    #[test]
    fn invalid_dimension_fails_before_output() {
        let t = LabelTemplate::new("bad", 710, 0).with(TextElement::default());
        assert!(matches!(
            compile(&t, &FieldMap::new()),
            Err(CompileError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn elements_emit_in_order() {
        let t = LabelTemplate::new("t", 100, 50)
            .with(BarcodeElement::new("${serial}", 15, 92, 40))
            .with(TextElement::new("S/N: ${serial}", 14, 64, 27));
        let zpl = compile(&t, &ctx(&[("serial", "ABC123")])).unwrap();
        assert_eq!(
            zpl,
            "^XA^PW100^LL50\
             ^FO15,92^BY2,3,40^BCN,,N,N^FD>:ABC123^FS\
             ^FO14,64^A0N,27,27^FDS/N: ABC123^FS\
             ^XZ"
        );
    }

    #[test]
    fn reserved_value_rejected_by_default() {
        let t = LabelTemplate::default().with(TextElement::new("${description}", 0, 0, 20));
        let err = compile(&t, &ctx(&[("description", "50^ off")])).unwrap_err();
        assert!(matches!(err, CompileError::ReservedCharacter { ch: '^', .. }));
    }

    #[test]
    fn reserved_value_hex_escaped_on_request() {
        let t = LabelTemplate::new("t", 10, 10).with(TextElement::new("${d}", 0, 0, 20));
        let options = CompileOptions {
            reserved: ReservedCharPolicy::HexEscape,
            ..CompileOptions::default()
        };
        let zpl = compile_with(&t, &ctx(&[("d", "~A")]), options).unwrap();
        assert_eq!(zpl, r"^XA^PW10^LL10^FO0,0^A0N,20,20^FH\^FD\7EA^FS^XZ");
    }

    #[test]
    fn template_is_not_mutated() {
        let t = LabelTemplate::default().with(TextElement::new("${sku}", 1, 1, 10));
        compile(&t, &ctx(&[("sku", "K")])).unwrap();
        assert_eq!(t.elements[0].data_fields(), ["${sku}"]);
    }

    #[test]
    fn variables_are_sorted_and_unique() {
        let t = LabelTemplate::default()
            .with(TextElement::new("${serial} ${imei}", 0, 0, 10))
            .with(BarcodeElement::new("${serial}", 0, 0, 10));
        let vars: Vec<_> = template_variables(&t).into_iter().collect();
        assert_eq!(vars, ["imei", "serial"]);
    }

    #[test]
    fn options_deserialize_lowercase() {
        let o: CompileOptions =
            serde_json::from_str(r#"{"missing":"fail","reserved":"hexescape"}"#).unwrap();
        assert_eq!(o.missing, MissingFieldPolicy::Fail);
        assert_eq!(o.reserved, ReservedCharPolicy::HexEscape);
    }
}
