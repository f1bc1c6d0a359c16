/// Field descriptors: what the resolver is asked to find.
use crate::common::error::{Error, Result};
use crate::common::style::RGBColor;
use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing `_<digits>` ordinal suffix of a field key.
static ORDINAL_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"_(\d+)$").expect("valid regex"));

/// Explicit 1-based table coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCoord {
    pub row: usize,
    pub col: usize,
}

impl TableCoord {
    /// Build a coordinate, rejecting row or column 0.
    pub fn new(row: usize, col: usize) -> Result<Self> {
        if row == 0 || col == 0 {
            return Err(Error::Structural(format!(
                "table coordinates are 1-based, got ({row}, {col})"
            )));
        }
        Ok(Self { row, col })
    }
}

/// A request to locate one element on a slide and replace its text.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Schema key, possibly carrying an ordinal suffix
    pub field_name: String,
    /// Text compared against element text (ordinal suffix stripped)
    pub label: String,
    /// Replacement text
    pub content: String,
    /// Explicit table coordinates
    pub table_info: Option<TableCoord>,
    /// 1-based ordinal among elements matching `label`
    pub expected_occurrence: usize,
    /// Classified as a tag during extraction
    pub is_tag_hint: bool,
    /// Position fingerprint; compared instead of `label` by the shape tiers
    pub fingerprint: Option<String>,
    /// Restricts the field to one slide (1-based)
    pub slide_number: Option<usize>,
    /// Color that wins over the captured one
    pub color_override: Option<RGBColor>,
    /// Group the element was extracted from, for diagnostics
    pub group_context: Option<String>,
}

impl FieldDescriptor {
    /// Descriptor for `field_name`, deriving label and ordinal from the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deckfill::fill::FieldDescriptor;
    ///
    /// let field = FieldDescriptor::new("title_2", "New heading");
    /// assert_eq!(field.label, "title");
    /// assert_eq!(field.expected_occurrence, 2);
    /// ```
    pub fn new(field_name: impl Into<String>, content: impl Into<String>) -> Self {
        let field_name = field_name.into();
        let (label, ordinal) = split_ordinal(&field_name);
        Self {
            label: label.to_string(),
            expected_occurrence: ordinal.unwrap_or(1).max(1),
            field_name,
            content: content.into(),
            table_info: None,
            is_tag_hint: false,
            fingerprint: None,
            slide_number: None,
            color_override: None,
            group_context: None,
        }
    }

    /// Use `label` as match text instead of the key.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the ordinal explicitly. Ordinals are 1-based.
    pub fn with_occurrence(mut self, ordinal: usize) -> Result<Self> {
        if ordinal == 0 {
            return Err(Error::Structural(format!(
                "field '{}' has ordinal 0; ordinals are 1-based",
                self.field_name
            )));
        }
        self.expected_occurrence = ordinal;
        Ok(self)
    }

    /// Address a table cell.
    pub fn with_table_info(mut self, coord: TableCoord) -> Self {
        self.table_info = Some(coord);
        self
    }

    /// Mark the field as a tag.
    pub fn with_tag_hint(mut self, is_tag: bool) -> Self {
        self.is_tag_hint = is_tag;
        self
    }

    /// Match shape elements by fingerprint.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Restrict the field to one slide.
    pub fn with_slide_number(mut self, slide: usize) -> Self {
        self.slide_number = Some(slide);
        self
    }

    /// Force the replacement text color.
    pub fn with_color_override(mut self, color: RGBColor) -> Self {
        self.color_override = Some(color);
        self
    }

    /// Record the extraction group context.
    pub fn with_group_context(mut self, context: impl Into<String>) -> Self {
        self.group_context = Some(context.into());
        self
    }

    /// Whether the field applies to slide `number`.
    #[inline]
    pub fn applies_to(&self, number: usize) -> bool {
        self.slide_number.is_none_or(|n| n == number)
    }
}

/// Split a trailing `_<digits>` ordinal off a key.
///
/// Returns `(key, None)` when there is no suffix. A suffix of `0` is
/// returned as `Some(0)`; callers decide whether that is an error.
pub fn split_ordinal(key: &str) -> (&str, Option<usize>) {
    match ORDINAL_SUFFIX.captures(key) {
        Some(caps) => {
            let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                return (key, None);
            };
            match digits.as_str().parse::<usize>() {
                Ok(n) => (&key[..whole.start()], Some(n)),
                Err(_) => (key, None),
            }
        },
        None => (key, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ordinal() {
        assert_eq!(split_ordinal("title_2"), ("title", Some(2)));
        assert_eq!(split_ordinal("title"), ("title", None));
        assert_eq!(split_ordinal("main_title"), ("main_title", None));
        assert_eq!(split_ordinal("tag_1_3"), ("tag_1", Some(3)));
        assert_eq!(split_ordinal("_7"), ("", Some(7)));
        assert_eq!(split_ordinal("x_99999999999999999999999"), ("x_99999999999999999999999", None));
    }

    #[test]
    fn test_descriptor_from_key() {
        let field = FieldDescriptor::new("Agenda_3", "Next steps");
        assert_eq!(field.label, "Agenda");
        assert_eq!(field.expected_occurrence, 3);
        assert_eq!(field.content, "Next steps");

        let field = FieldDescriptor::new("Agenda", "x");
        assert_eq!(field.expected_occurrence, 1);
        assert!(field.applies_to(4));

        // A zero suffix does not silently become ordinal 0
        assert_eq!(FieldDescriptor::new("x_0", "").expected_occurrence, 1);
    }

    #[test]
    fn test_builders() {
        let field = FieldDescriptor::new("Revenue_2", "12%")
            .with_label("Revenue")
            .with_occurrence(5)
            .unwrap()
            .with_slide_number(2)
            .with_table_info(TableCoord::new(2, 3).unwrap());
        assert_eq!(field.expected_occurrence, 5);
        assert!(field.applies_to(2));
        assert!(!field.applies_to(1));
        assert_eq!(field.table_info, Some(TableCoord { row: 2, col: 3 }));

        assert!(matches!(
            FieldDescriptor::new("a", "b").with_occurrence(0),
            Err(Error::Structural(_))
        ));
        assert!(matches!(TableCoord::new(0, 1), Err(Error::Structural(_))));
    }
}
