//! Label templates and their JSON documents.

use serde::{Deserialize, Serialize};

use crate::element::{ElementRegistry, LabelElement, positive};
use crate::{CompileError, TemplateError};

/// Default print width in dots (`^PW710`).
pub const DEFAULT_WIDTH: u32 = 710;
/// Default label length in dots (`^LL305`).
pub const DEFAULT_HEIGHT: u32 = 305;

/// An ordered set of elements plus page dimensions.
///
/// Elements are emitted in sequence order; the device draws them in that
/// order with no implicit layering.
#[derive(Debug)]
pub struct LabelTemplate {
    /// Display name; also the basis of the stored file name.
    pub name: String,
    /// Print width in dots.
    pub width: u32,
    /// Label length in dots.
    pub height: u32,
    /// Elements in render order.
    pub elements: Vec<Box<dyn LabelElement>>,
}

impl LabelTemplate {
    /// An empty template.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Append an element (builder style).
    pub fn with(mut self, element: impl LabelElement + 'static) -> Self {
        self.elements.push(Box::new(element));
        self
    }

    /// Append an element.
    pub fn push(&mut self, element: impl LabelElement + 'static) {
        self.elements.push(Box::new(element));
    }

    /// Check page dimensions, then every element.
    pub fn validate(&self) -> Result<(), CompileError> {
        positive("template.width", self.width)?;
        positive("template.height", self.height)?;
        self.elements.iter().try_for_each(|el| el.validate())
    }

    /// Decode a template document with the default element kinds.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        Self::from_json_with(json, &ElementRegistry::default())
    }

    /// Decode a template document using `registry` for element kinds.
    pub fn from_json_with(json: &str, registry: &ElementRegistry) -> Result<Self, TemplateError> {
        let doc: TemplateDocument = serde_json::from_str(json)?;
        let elements = doc
            .elements
            .into_iter()
            .enumerate()
            .map(|(i, value)| registry.decode(i, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: doc.name,
            width: doc.width,
            height: doc.height,
            elements,
        })
    }

    /// Encode the template as a pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String, TemplateError> {
        let doc = TemplateDocument {
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            elements: self
                .elements
                .iter()
                .map(|el| el.to_json())
                .collect::<Result<_, _>>()?,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

impl Default for LabelTemplate {
    fn default() -> Self {
        Self::new("New Template", DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// On-disk shape of a template.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct TemplateDocument {
    name: String,
    width: u32,
    height: u32,
    elements: Vec<serde_json::Value>,
}

impl Default for TemplateDocument {
    fn default() -> Self {
        Self {
            name: "New Template".into(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            elements: Vec::new(),
        }
    }
}
