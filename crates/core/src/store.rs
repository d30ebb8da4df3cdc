//! Directory-backed template store.
//!
//! Templates live as one JSON document per file. Opening a store seeds the
//! built-in asset-tag templates when their files are missing; existing files
//! are never overwritten on open.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::canned::AssetTagLayout;
use crate::element::ElementRegistry;
use crate::{LabelTemplate, TemplateError};

/// File name of the built-in serial-only asset tag.
pub const STANDARD_ASSET_TAG: &str = "Standard_Asset_Tag.json";
/// File name of the built-in asset tag with an IMEI block.
pub const ASSET_TAG_WITH_IMEI: &str = "Asset_Tag_with_IMEI.json";

/// Directory name used when no template directory is configured.
pub const DEFAULT_DIR_NAME: &str = "ADT_Label_Templates";

/// Built-in templates, in seeding order.
pub fn builtin_templates() -> Vec<LabelTemplate> {
    vec![
        AssetTagLayout::SERIAL_ONLY.to_template("Standard Asset Tag"),
        AssetTagLayout::WITH_IMEI.to_template("Asset Tag with IMEI"),
    ]
}

/// File name a template is stored under: characters outside
/// `[A-Za-z0-9.-]` become `_`, then `.json` is appended.
pub fn file_name_for(name: &str) -> String {
    let mut file: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    file.push_str(".json");
    file
}

/// A single path component that is not `.` or `..`.
fn is_plain_file_name(name: &str) -> bool {
    !name.contains(['/', '\\']) && Path::new(name).file_name() == Some(OsStr::new(name))
}

/// Templates stored as JSON files in one directory.
#[derive(Debug)]
pub struct TemplateStore {
    dir: PathBuf,
    registry: ElementRegistry,
}

impl TemplateStore {
    /// Open (creating if needed) the store at `dir` and seed the built-ins.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, TemplateError> {
        Self::open_with(dir, ElementRegistry::default())
    }

    /// Like [`open`](Self::open) with a custom element registry.
    pub fn open_with(
        dir: impl Into<PathBuf>,
        registry: ElementRegistry,
    ) -> Result<Self, TemplateError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| TemplateError::Io {
            path: dir.clone(),
            source,
        })?;
        let store = Self { dir, registry };
        store.seed_builtins()?;
        Ok(store)
    }

    /// The store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `template` to its file, replacing any previous version.
    pub fn save(&self, template: &LabelTemplate) -> Result<PathBuf, TemplateError> {
        let path = self.dir.join(file_name_for(&template.name));
        let json = template.to_json()?;
        fs::write(&path, json).map_err(|source| TemplateError::Io {
            path: path.clone(),
            source,
        })?;
        log::debug!("saved template {:?} to {}", template.name, path.display());
        Ok(path)
    }

    /// Load a template by file name, or by template name when `name` has no
    /// `.json` suffix.
    ///
    /// File names must name an entry directly inside the store directory;
    /// anything with a path component reports [`TemplateError::NotFound`].
    pub fn load(&self, name: &str) -> Result<LabelTemplate, TemplateError> {
        let file = if name.ends_with(".json") {
            if !is_plain_file_name(name) {
                return Err(TemplateError::NotFound(name.to_string()));
            }
            name.to_string()
        } else {
            file_name_for(name)
        };
        let path = self.dir.join(&file);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TemplateError::NotFound(file));
            }
            Err(source) => return Err(TemplateError::Io { path, source }),
        };
        LabelTemplate::from_json_with(&json, &self.registry)
    }

    /// Sorted file names of every stored template.
    pub fn names(&self) -> Result<Vec<String>, TemplateError> {
        let io_err = |source| TemplateError::Io {
            path: self.dir.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.file_type().map_err(io_err)?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && name.ends_with(".json")
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn seed_builtins(&self) -> Result<(), TemplateError> {
        for template in builtin_templates() {
            if !self.dir.join(file_name_for(&template.name)).exists() {
                self.save(&template)?;
            }
        }
        Ok(())
    }
}
