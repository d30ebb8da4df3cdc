//! Compiler properties: determinism, placeholder resolution, missing-field
//! policies, and the canned asset-tag layout switch.

use std::collections::HashMap;
use std::thread;

use asset_label_core::canned::asset_tag;
use asset_label_core::{
    BarcodeElement, CompileError, CompileOptions, FieldMap, LabelElement, LabelTemplate,
    MissingFieldPolicy, ReservedCharPolicy, TextElement, compile, compile_with,
};

fn fields(pairs: &[(&str, &str)]) -> FieldMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn asset_template() -> LabelTemplate {
    LabelTemplate::new("Asset", 508, 203)
        .with(TextElement::new("S/N:", 14, 64, 27))
        .with(TextElement::new("${serial}", 81, 64, 27))
        .with(BarcodeElement::new("${serial}", 15, 92, 40))
        .with(TextElement::new("${imei}", 101, 135, 27))
}

#[test]
fn compile_is_deterministic() {
    let t = asset_template();
    let ctx = fields(&[("serial", "C02XK1"), ("imei", "3569")]);
    let first = compile(&t, &ctx).unwrap();
    let second = compile(&t, &ctx).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn compile_is_safe_across_threads() {
    let t = asset_template();
    let expected = compile(&t, &fields(&[("serial", "S")])).unwrap();
    thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| compile(&t, &fields(&[("serial", "S")])).unwrap()))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

#[test]
fn text_element_structure() {
    let t = LabelTemplate::default().with(TextElement::new("SKU:", 35, 66, 47));
    let zpl = compile(&t, &FieldMap::new()).unwrap();
    assert!(zpl.contains("^FO35,66^A0N,47,47"), "got {zpl}");
}

#[test]
fn barcode_placeholder_is_resolved() {
    let t = LabelTemplate::default().with(BarcodeElement::new("${serial}", 0, 0, 50));
    let zpl = compile(&t, &fields(&[("serial", "ABC123")])).unwrap();
    assert!(zpl.contains("^FD>:ABC123^FS"), "got {zpl}");
}

#[test]
fn missing_placeholder_passes_through_by_default() {
    let t = LabelTemplate::default().with(TextElement::new("${imei}", 0, 0, 30));
    let zpl = compile(&t, &fields(&[("serial", "S1")])).unwrap();
    assert!(zpl.contains("^FD${imei}^FS"), "got {zpl}");
}

#[test]
fn missing_placeholder_policies_are_configurable() {
    let t = asset_template();
    let ctx = fields(&[("serial", "S1")]);

    let empty = compile_with(
        &t,
        &ctx,
        CompileOptions {
            missing: MissingFieldPolicy::Empty,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(empty.contains("^FO101,135^A0N,27,27^FD^FS"));

    let err = compile_with(
        &t,
        &ctx,
        CompileOptions {
            missing: MissingFieldPolicy::Fail,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        CompileError::MissingField {
            name: "imei".into()
        }
    );
}

#[test]
fn zero_element_template_is_bare_envelope() {
    let t = LabelTemplate::new("blank", 710, 305);
    assert_eq!(compile(&t, &FieldMap::new()).unwrap(), "^XA^PW710^LL305^XZ");
}

#[test]
fn hashmap_context_works_like_fieldmap() {
    let t = asset_template();
    let mut ctx = HashMap::new();
    ctx.insert("serial".to_string(), "S1".to_string());
    ctx.insert("imei".to_string(), "I1".to_string());
    assert_eq!(
        compile(&t, &ctx).unwrap(),
        compile(&t, &fields(&[("serial", "S1"), ("imei", "I1")])).unwrap()
    );
}

#[test]
fn non_ascii_value_fails_compilation() {
    let t = asset_template();
    let err = compile(&t, &fields(&[("serial", "Ñ1"), ("imei", "1")])).unwrap_err();
    assert!(matches!(err, CompileError::NonAscii { ch: 'Ñ', .. }));
}

#[test]
fn asset_tag_without_imei_only_moves_serial_block() {
    let policy = ReservedCharPolicy::Reject;
    let solo = asset_tag("SN42", None, policy).unwrap();
    let pair = asset_tag("SN42", Some("990001"), policy).unwrap();

    assert!(!solo.contains("990001"));
    assert!(!solo.contains("IMEI:"));
    assert_eq!(solo.matches("^BCN").count(), 1);
    assert_eq!(pair.matches("^BCN").count(), 2);

    // Same serial statements, different rows.
    assert!(solo.contains("^FO81,60^A0N,27,27^FDSN42^FS"));
    assert!(pair.contains("^FO81,64^A0N,27,27^FDSN42^FS"));
    assert!(solo.contains("^FO15,113^BY2,3,40^BCN,,N,N^FD>:SN42^FS"));
    assert!(pair.contains("^FO15,92^BY2,3,40^BCN,,N,N^FD>:SN42^FS"));
}

#[test]
fn unresolved_compile_matches_element_previews() {
    let t = asset_template();
    let previews: String = t.elements.iter().map(|el| el.render()).collect();
    assert_eq!(
        compile(&t, &FieldMap::new()).unwrap(),
        format!("^XA^PW508^LL203{previews}^XZ")
    );
}
