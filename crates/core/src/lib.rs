//! Asset label core library.
//!
//! Turns label descriptions into ZPL device programs. The main entry points
//! are [`compile`] for stored [`LabelTemplate`]s and the generators in
//! [`canned`] for the fixed label stocks. Nothing in this crate performs I/O
//! except the [`TemplateStore`].

#![warn(missing_docs)]

/// Fixed-layout label generators.
pub mod canned;
/// Template compiler.
pub mod compile;
/// Label element trait, built-in elements, and the element registry.
pub mod element;
mod error;
/// `^FD` payload encoding and `^FH` hex escapes.
pub mod field_data;
/// Placeholder scanning and substitution.
pub mod fields;
/// Record lookup seam.
pub mod lookup;
/// JSON template store.
pub mod store;
/// Label templates.
pub mod template;
/// Low-level ZPL statement writer.
pub mod zpl;

// ── Convenience re-exports ──────────────────────────────────────────────────

pub use compile::{
    CompileOptions, FieldEncoder, FieldResolver, compile, compile_with, template_variables,
};
pub use element::{BarcodeElement, ElementRegistry, LabelElement, TextElement};
pub use error::{CompileError, LookupError, TemplateError};
pub use field_data::{FieldData, ReservedCharPolicy, decode_hex_escapes};
pub use fields::{FieldMap, FieldSource, MissingFieldPolicy, placeholders};
pub use lookup::{DeviceRecord, RecordLookup, StaticRecords};
pub use store::TemplateStore;
pub use template::LabelTemplate;
