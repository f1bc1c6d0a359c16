//! Tag/label heuristics.
//!
//! Badges, ids and captions are small shapes with a few characters of
//! text. Their text is rarely what a labeling pass reports verbatim, so
//! they get a relaxed matching tier of their own.

use crate::fill::element::Position;
use crate::fill::normalize::normalize;
use crate::fill::options::FillOptions;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keywords that mark an element as a tag or label (matched on lower-cased text).
const TAG_KEYWORDS: &[&str] = &[
    "tag", "label", "cic", "법인", "id", "번호", "code", "타입", "type",
];

/// Field-name fragments that ask for the tag tier.
const TAG_IDENTIFIERS: &[&str] = &["tag", "label", "cic_label", "ui_element"];

/// `keyword[_-]?digits` at the start of an element's text.
static KEYWORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(tag|label|cic|id|code)[\s_\-]?\d*").expect("valid regex"));

/// Pattern shared by element text and field name in the tag tier.
pub(crate) static TAG_TEXT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(tag|label|cic|ui)[_\-\s]?\d*").expect("valid regex"));

/// Kind of tag an element was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagType {
    Tag,
    Label,
    CicLabel,
    UiElement,
}

impl TagType {
    /// Name used in role names and descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Label => "label",
            Self::CicLabel => "cic_label",
            Self::UiElement => "ui_element",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagClass {
    /// Whether the element is a tag/label candidate
    pub is_tag: bool,
    /// Detected tag type, if any
    pub tag_type: Option<TagType>,
}

/// Classify an element from its text and position.
///
/// Short text in a box that is narrow or flat is a tag when it carries a
/// tag keyword or starts with a `keyword[_-]?digits` pattern. Short text in
/// a box that is small on both axes is a generic `ui_element` regardless of
/// keywords. An element without a position is never small.
pub fn classify(text: &str, position: Option<&Position>, options: &FillOptions) -> TagClass {
    let lower = text.to_lowercase();
    let is_short = normalize(text).chars().count() <= options.short_text_len;
    let small_either = position.is_some_and(|p| p.is_small_either(options));
    let small_both = position.is_some_and(|p| p.is_small(options));

    let has_keyword = TAG_KEYWORDS.iter().any(|k| lower.contains(k));
    let pattern = KEYWORD_PATTERN
        .captures(&lower)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());

    let tag_type = if lower.contains("tag") || pattern == Some("tag") {
        Some(TagType::Tag)
    } else if lower.contains("label") || pattern == Some("label") {
        Some(TagType::Label)
    } else if lower.contains("cic") || lower.contains("법인") {
        Some(TagType::CicLabel)
    } else if is_short && small_either {
        Some(TagType::UiElement)
    } else {
        None
    };

    let is_tag = is_short && small_either && (has_keyword || pattern.is_some());
    if is_tag {
        return TagClass { is_tag, tag_type };
    }
    if is_short && small_both {
        return TagClass {
            is_tag: true,
            tag_type: Some(TagType::UiElement),
        };
    }
    TagClass {
        is_tag: false,
        tag_type,
    }
}

/// Whether a field name or content asks for the tag tier.
pub fn is_tag_identifier(name: &str) -> bool {
    let lower = name.to_lowercase();
    TAG_IDENTIFIERS.iter().any(|k| lower.contains(k))
}

/// Whether `text` starts with the shared tag pattern (`tag1`, `label-2`, `ui`).
pub fn matches_tag_pattern(text: &str) -> bool {
    TAG_TEXT_PATTERN.is_match(&text.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(width: f64, height: f64) -> Position {
        Position {
            left_percent: 5.0,
            top_percent: 5.0,
            width_percent: width,
            height_percent: height,
        }
    }

    #[test]
    fn test_keyword_tags() {
        let options = FillOptions::default();
        let class = classify("Tag", Some(&pos(8.0, 40.0)), &options);
        assert_eq!(
            class,
            TagClass {
                is_tag: true,
                tag_type: Some(TagType::Tag)
            }
        );

        let class = classify("label-3", Some(&pos(50.0, 4.0)), &options);
        assert_eq!(class.tag_type, Some(TagType::Label));
        assert!(class.is_tag);

        let class = classify("법인 A", Some(&pos(10.0, 30.0)), &options);
        assert_eq!(class.tag_type, Some(TagType::CicLabel));
        assert!(class.is_tag);

        let class = classify("ID 42", Some(&pos(15.0, 50.0)), &options);
        assert!(class.is_tag);
        assert_eq!(class.tag_type, Some(TagType::UiElement));
    }

    #[test]
    fn test_small_box_without_keyword_is_ui_element() {
        let options = FillOptions::default();
        let class = classify("Q3", Some(&pos(6.0, 4.0)), &options);
        assert_eq!(
            class,
            TagClass {
                is_tag: true,
                tag_type: Some(TagType::UiElement)
            }
        );

        // Narrow only: typed but not a tag
        let class = classify("Q3", Some(&pos(6.0, 40.0)), &options);
        assert!(!class.is_tag);
        assert_eq!(class.tag_type, Some(TagType::UiElement));
    }

    #[test]
    fn test_large_or_long_is_not_a_tag() {
        let options = FillOptions::default();
        assert!(!classify("Tag", Some(&pos(60.0, 30.0)), &options).is_tag);
        assert!(!classify("A long heading text", Some(&pos(5.0, 5.0)), &options).is_tag);
        assert!(!classify("Tag", None, &options).is_tag);
        assert_eq!(classify("Overview", None, &options), TagClass::default());
    }

    #[test]
    fn test_tag_identifiers() {
        assert!(is_tag_identifier("tag_1"));
        assert!(is_tag_identifier("Product Label"));
        assert!(is_tag_identifier("ui_element_4"));
        assert!(!is_tag_identifier("main_title"));

        assert!(matches_tag_pattern("Tag"));
        assert!(matches_tag_pattern("ui_2"));
        assert!(matches_tag_pattern("LABEL-10"));
        assert!(!matches_tag_pattern("Stage"));
    }
}
