//! Record lookup: the collaborator that turns a serial number into a field
//! mapping for template compilation.
//!
//! The real backend is a database query owned by the host application; this
//! crate only defines the seam plus an in-memory implementation.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::LookupError;
use crate::fields::{FieldMap, keys};

/// Looks up label fields by serial number.
pub trait RecordLookup {
    /// Fields for the most recent record with `serial`, or `None` when no
    /// record exists.
    fn lookup(&self, serial: &str) -> Result<Option<FieldMap>, LookupError>;
}

/// One record as supplied by a backend. Absent and `null` fields are
/// dropped from the resulting [`FieldMap`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeviceRecord {
    /// Product SKU.
    pub sku: Option<String>,
    /// Product description.
    pub description: Option<String>,
    /// Serial number (the lookup key).
    pub serial: String,
    /// IMEI, for cellular devices.
    pub imei: Option<String>,
}

impl DeviceRecord {
    /// Flatten into a field map keyed by [`keys`].
    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert(keys::SERIAL.into(), self.serial.clone());
        let optional = [
            (keys::SKU, &self.sku),
            (keys::DESCRIPTION, &self.description),
            (keys::IMEI, &self.imei),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                fields.insert(key.into(), value.clone());
            }
        }
        fields
    }
}

/// In-memory records keyed by serial number. Later records with the same
/// serial replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct StaticRecords {
    records: BTreeMap<String, DeviceRecord>,
}

impl StaticRecords {
    /// Build from records.
    pub fn new(records: impl IntoIterator<Item = DeviceRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (r.serial.clone(), r))
                .collect(),
        }
    }

    /// Parse a JSON array of records.
    pub fn from_json(json: &str) -> Result<Self, LookupError> {
        let records: Vec<DeviceRecord> = serde_json::from_str(json).map_err(|e| LookupError {
            message: "malformed record list".into(),
            source: Some(Box::new(e)),
        })?;
        Ok(Self::new(records))
    }

    /// Number of distinct serials.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordLookup for StaticRecords {
    fn lookup(&self, serial: &str) -> Result<Option<FieldMap>, LookupError> {
        Ok(self.records.get(serial).map(DeviceRecord::to_fields))
    }
}
