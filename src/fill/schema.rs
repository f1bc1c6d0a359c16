/// Template schema: the JSON document that drives a fill run.
///
/// ```json
/// {
///   "fields": {
///     "title_2": { "role": "Quarterly results", "text_count": 2, "slide_number": 1 },
///     "Revenue": { "content": ["12%", "YoY"], "table_info": { "row": 2, "col": 3 } }
///   }
/// }
/// ```
///
/// Field order is kept as written. Besides the keys the filler reads, the
/// extractor writes descriptive keys (`role_description`, `element_id`,
/// `position`, `type`, `in_group`) that round-trip but are otherwise
/// ignored.
use crate::common::error::{Error, Result};
use crate::common::style::RGBColor;
use crate::fill::element::Position;
use crate::fill::field::{FieldDescriptor, TableCoord, split_ordinal};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::warn;

/// A string or a list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextValue {
    Text(String),
    Lines(Vec<String>),
}

impl TextValue {
    /// The value as one string, lines joined with `\n`.
    pub fn joined(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Lines(lines) => lines.join("\n"),
        }
    }
}

impl From<&str> for TextValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Table coordinates of a field (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub row: usize,
    pub col: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cols: Option<usize>,
}

/// One entry of the `fields` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRecord {
    /// Role name; used as replacement text when `content` is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<TextValue>,
    /// Replacement text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<TextValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    /// Restricts the field to one slide
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Element type name (`TEXT_BOX`, `TABLE_CELL`, ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    /// Explicit ordinal; wins over the key's `_<n>` suffix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_group: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_info: Option<TableInfo>,
    /// Element text at extraction time; matched instead of the key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    /// Replacement text color, `RRGGBB` with optional `#`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_tag: Option<bool>,
}

impl FieldRecord {
    /// Replacement text: `content`, else `role`.
    pub fn replacement(&self) -> Option<String> {
        self.content
            .as_ref()
            .or(self.role.as_ref())
            .map(TextValue::joined)
    }

    /// Turn the record stored under `key` into a field descriptor.
    ///
    /// Fails with [`Error::Structural`] on an ordinal of 0 or table
    /// coordinates of 0. An unparsable `font_color` is dropped with a
    /// warning.
    pub fn to_descriptor(&self, key: &str) -> Result<FieldDescriptor> {
        let content = self.replacement().unwrap_or_else(|| {
            warn!(field = key, "field has neither content nor role, text will be cleared");
            String::new()
        });
        let mut field = FieldDescriptor::new(key, content);

        if let Some(text) = self.original_text.as_deref().filter(|t| !t.trim().is_empty()) {
            field = field.with_label(text);
        }
        match self.text_count {
            Some(n) => field = field.with_occurrence(n)?,
            None => {
                if let (_, Some(0)) = split_ordinal(key) {
                    return Err(Error::Structural(format!(
                        "field '{key}' has ordinal suffix 0; ordinals are 1-based"
                    )));
                }
            },
        }
        if let Some(info) = self.table_info {
            field = field.with_table_info(TableCoord::new(info.row, info.col)?);
        }
        if let Some(raw) = &self.font_color {
            match RGBColor::from_hex(raw) {
                Some(color) => field = field.with_color_override(color),
                None => warn!(field = key, font_color = %raw, "ignoring invalid font color"),
            }
        }
        if let Some(slide) = self.slide_number {
            field = field.with_slide_number(slide);
        }
        if let Some(fp) = &self.fingerprint {
            field = field.with_fingerprint(fp.clone());
        }
        if let Some(ctx) = &self.group_context {
            field = field.with_group_context(ctx.clone());
        }
        Ok(field.with_tag_hint(self.is_tag.unwrap_or(false)))
    }
}

/// The `{"fields": {...}}` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSchema {
    /// Records keyed by field name, in document order
    pub fields: IndexMap<String, FieldRecord>,
}

impl TemplateSchema {
    /// Parse a schema from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a schema from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load a schema file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Pretty-printed JSON; non-ASCII text is written as is.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the schema as pretty-printed JSON.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Save the schema to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field descriptors in schema order.
    pub fn descriptors(&self) -> Result<Vec<FieldDescriptor>> {
        self.fields
            .iter()
            .map(|(key, record)| record.to_descriptor(key))
            .collect()
    }
}
