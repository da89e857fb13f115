//! EasyEDA component payload handling.
//!
//! A component arrives as one JSON envelope fetched from the EasyEDA API
//! (the fetch itself happens outside this crate). The envelope carries a
//! `dataStr.shape` list of tagged, tilde-delimited shape records plus a
//! `head` with the document origin and free-form `c_para` attributes.
//!
//! This module models the envelope with serde and provides the shape-record
//! tokenizer that both the footprint and symbol dispatchers build on.

pub mod error;

pub use error::{ConvertError, ConvertResult};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::report::Reporter;

/// Attribute names whose values are promoted into symbol properties.
pub const SUPPORTED_VALUE_TYPES: [&str; 4] =
    ["Resistance", "Capacitance", "Inductance", "Frequency"];

/// The top-level JSON envelope returned by the component API.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentPayload {
    /// Whether the API reported success.
    #[serde(default)]
    pub success: bool,

    /// The component data.
    pub result: ComponentResult,
}

impl ComponentPayload {
    /// Parses a component payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Payload`] when the envelope is malformed.
    pub fn from_json(text: &str) -> ConvertResult<Self> {
        serde_json::from_str(text).map_err(|source| ConvertError::Payload { source })
    }
}

/// The `result` object of a component payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentResult {
    /// Component title as shown in the EasyEDA library.
    #[serde(default)]
    pub title: String,

    /// Document data: origin, attributes and the shape record list.
    #[serde(rename = "dataStr")]
    pub data_str: DataStr,

    /// Package detail carried by symbol payloads (reference prefix etc.).
    #[serde(rename = "packageDetail", default)]
    pub package_detail: Option<PackageDetail>,
}

impl ComponentResult {
    /// Returns the component title sanitised for use as a footprint name.
    ///
    /// Falls back to `"NoName"` with a warning when the title is empty.
    #[must_use]
    pub fn footprint_name(&self, report: &mut Reporter) -> String {
        let name: String = self
            .title
            .chars()
            .map(|c| match c {
                ' ' | '/' | '(' | ')' => '_',
                other => other,
            })
            .collect();
        if name.is_empty() {
            report.warn("component has no title, using default name 'NoName'");
            return "NoName".to_string();
        }
        name
    }

    /// Returns the component title sanitised for use as a symbol name.
    ///
    /// Symbol names live inside a shared library file, so characters that
    /// are meaningful to the s-expression format are spelled out.
    #[must_use]
    pub fn symbol_name(&self, report: &mut Reporter) -> String {
        let mut name = String::new();
        for c in self.title.chars() {
            match c {
                ' ' | '.' => name.push('_'),
                '/' => name.push_str("{slash}"),
                '\\' => name.push_str("{backslash}"),
                '<' => name.push_str("{lt}"),
                '>' => name.push_str("{gt}"),
                ':' => name.push_str("{colon}"),
                '"' => name.push_str("{dblquote}"),
                other => name.push(other),
            }
        }
        if name.is_empty() {
            report.warn("component has no title, using default name 'NoName'");
            return "NoName".to_string();
        }
        name
    }

    /// Returns the datasheet link, or an empty string with a warning.
    #[must_use]
    pub fn datasheet_link(&self, report: &mut Reporter) -> String {
        self.data_str.head.c_para.get("link").cloned().unwrap_or_else(|| {
            report.warn(ConvertError::external_data("link").to_string());
            String::new()
        })
    }

    /// Returns the symbol reference prefix (e.g. "R", "C", "U").
    ///
    /// The trailing placeholder `?` the editor appends is stripped.
    #[must_use]
    pub fn reference_prefix(&self, report: &mut Reporter) -> String {
        let prefix = self
            .package_detail
            .as_ref()
            .and_then(|detail| detail.data_str.head.c_para.get("pre"))
            .map(|pre| pre.replace('?', ""));
        prefix.unwrap_or_else(|| {
            report.warn(ConvertError::external_data("pre").to_string());
            "U".to_string()
        })
    }

    /// Returns the `(type, value)` attributes promoted into symbol properties.
    #[must_use]
    pub fn value_attributes(&self) -> Vec<(String, String)> {
        SUPPORTED_VALUE_TYPES
            .iter()
            .filter_map(|key| {
                self.data_str
                    .head
                    .c_para
                    .get(*key)
                    .map(|value| ((*key).to_string(), value.clone()))
            })
            .collect()
    }
}

/// The `dataStr` object: document head plus shape records.
#[derive(Debug, Clone, Deserialize)]
pub struct DataStr {
    /// Document head (origin and attributes).
    #[serde(default)]
    pub head: Head,

    /// Raw shape records, one tilde-delimited line each.
    #[serde(default)]
    pub shape: Vec<String>,
}

/// Document head: the declared origin and free-form attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Head {
    /// Origin X in raw EasyEDA units.
    #[serde(default)]
    pub x: f64,

    /// Origin Y in raw EasyEDA units.
    #[serde(default)]
    pub y: f64,

    /// Free-form component attributes, in file order.
    #[serde(default)]
    pub c_para: IndexMap<String, String>,
}

/// The `packageDetail` object carried by symbol payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDetail {
    /// Package document data.
    #[serde(rename = "dataStr")]
    pub data_str: PackageDataStr,
}

/// The package-level `dataStr`, of which only the head is needed.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDataStr {
    /// Package document head.
    #[serde(default)]
    pub head: Head,
}

/// One tokenized shape record: a tag plus its ordered fields.
///
/// Footprint decoders index fields positionally, so empty tokens are kept;
/// symbol decoders filter them via [`ShapeRecord::fields_nonempty`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeRecord<'a> {
    /// Record tag (e.g. "TRACK", "PAD").
    pub tag: &'a str,
    /// Ordered field list, empty tokens included.
    pub fields: Vec<&'a str>,
}

impl<'a> ShapeRecord<'a> {
    /// Tokenizes one raw record line on `~`.
    ///
    /// Returns `None` for an empty line.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut tokens = line.split('~');
        let tag = tokens.next()?;
        if tag.is_empty() {
            return None;
        }
        Some(Self {
            tag,
            fields: tokens.collect(),
        })
    }

    /// Returns the fields with empty tokens filtered out.
    #[must_use]
    pub fn fields_nonempty(&self) -> Vec<&'a str> {
        self.fields
            .iter()
            .copied()
            .filter(|f| !f.is_empty())
            .collect()
    }

    /// Returns field `index`, or a parse error naming the tag.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Parse`] when the field is absent.
    pub fn field(&self, index: usize) -> ConvertResult<&'a str> {
        self.fields.get(index).copied().ok_or_else(|| {
            ConvertError::parse(
                self.tag,
                format!("expected at least {} fields, got {}", index + 1, self.fields.len()),
            )
        })
    }

    /// Returns field `index` parsed as a float.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Parse`] when the field is absent or not a number.
    pub fn float(&self, index: usize) -> ConvertResult<f64> {
        let raw = self.field(index)?;
        raw.parse::<f64>()
            .map_err(|_| ConvertError::parse(self.tag, format!("field {index} is not a number: '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_tokenization_keeps_empty_fields() {
        let record = ShapeRecord::parse("PAD~OVAL~0~0~10~10~1~1~5~~0").unwrap();
        assert_eq!(record.tag, "PAD");
        assert_eq!(record.fields.len(), 10);
        assert_eq!(record.field(8).unwrap(), "");
        assert_eq!(record.fields_nonempty().len(), 9);
    }

    #[test]
    fn missing_field_is_parse_error() {
        let record = ShapeRecord::parse("HOLE~1~2").unwrap();
        let err = record.field(5).unwrap_err();
        assert!(matches!(err, ConvertError::Parse { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn payload_envelope_parses() {
        let json = r#"{
            "success": true,
            "result": {
                "title": "SOT-23 (DUAL)",
                "dataStr": {
                    "head": { "x": 400.0, "y": 300.0, "c_para": { "link": "https://example.com/ds.pdf" } },
                    "shape": ["TRACK~1~3~~390 295 410 295~id1"]
                }
            }
        }"#;
        let payload = ComponentPayload::from_json(json).unwrap();
        let mut report = Reporter::new();
        assert_eq!(payload.result.footprint_name(&mut report), "SOT-23__DUAL_");
        assert_eq!(
            payload.result.datasheet_link(&mut report),
            "https://example.com/ds.pdf"
        );
        assert!(report.is_clean());
    }

    #[test]
    fn missing_metadata_gets_defaults() {
        let json = r#"{ "result": { "title": "", "dataStr": { "head": {}, "shape": [] } } }"#;
        let payload = ComponentPayload::from_json(json).unwrap();
        let mut report = Reporter::new();
        assert_eq!(payload.result.footprint_name(&mut report), "NoName");
        assert_eq!(payload.result.datasheet_link(&mut report), "");
        assert_eq!(payload.result.reference_prefix(&mut report), "U");
        assert_eq!(report.warnings().len(), 3);
    }
}
