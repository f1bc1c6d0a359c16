/// Style-preserving text replacement.
///
/// The visible style of an element lives on its runs. Before a body is
/// cleared, a [`StyleSnapshot`] is taken from the most representative run
/// and reapplied to the single run that replaces everything.
use crate::common::style::{ColorValue, RGBColor};
use crate::common::xml::is_xml_char;
use crate::fill::error::FieldError;
use crate::fill::options::FillOptions;
use crate::ooxml::pptx::shapes::{RunProperties, TextBody};
use serde::Serialize;
use tracing::warn;

/// Where a snapshot was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleSource {
    /// First run carrying visible text
    VisibleRun,
    /// First run of the first paragraph; its color is not trusted
    FirstRun,
    /// The body has no runs
    Empty,
}

/// Font properties captured from a run immediately before replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSnapshot {
    /// Latin typeface
    pub font_name: Option<String>,
    /// East Asian typeface
    pub east_asian_font: Option<String>,
    /// Size in hundredths of a point
    pub size: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Language tag, carried so spell-checking stays the same
    pub lang: Option<String>,
    /// Captured color, tagged with its representation
    pub color: ColorValue,
    /// Run the snapshot came from
    pub source: StyleSource,
}

impl StyleSnapshot {
    /// Capture the style of `body`.
    ///
    /// Prefers the first run with non-whitespace text. Falls back to the
    /// very first run with its color dropped, then to an empty snapshot.
    pub fn capture(body: &TextBody) -> Self {
        if let Some(run) = body.first_visible_run() {
            return Self::from_properties(&run.properties, StyleSource::VisibleRun);
        }
        if let Some(run) = body.first_run() {
            let mut snapshot = Self::from_properties(&run.properties, StyleSource::FirstRun);
            snapshot.color = ColorValue::Absent;
            return snapshot;
        }
        Self {
            font_name: None,
            east_asian_font: None,
            size: None,
            bold: None,
            italic: None,
            lang: None,
            color: ColorValue::Absent,
            source: StyleSource::Empty,
        }
    }

    fn from_properties(props: &RunProperties, source: StyleSource) -> Self {
        Self {
            font_name: props.latin.clone(),
            east_asian_font: props.east_asian.clone(),
            size: props.size,
            bold: props.bold,
            italic: props.italic,
            lang: props.lang.clone(),
            color: props.color.clone(),
            source,
        }
    }

    /// Run properties reproducing this snapshot.
    ///
    /// Color priority: `color_override`, then the captured color when it
    /// can be written back, then `default_color`. Returns the degradation
    /// when a captured color had to be replaced.
    pub fn to_properties(
        &self,
        color_override: Option<RGBColor>,
        default_color: RGBColor,
    ) -> (RunProperties, Option<StyleDegradation>) {
        let mut degradation = None;
        let color = match (color_override, &self.color) {
            (Some(rgb), _) => ColorValue::Rgb(rgb),
            (None, c) if c.is_reconstructible() => c.clone(),
            (None, ColorValue::Preset(name) | ColorValue::Unsupported(name)) => {
                degradation = Some(StyleDegradation {
                    kind: self.color.kind(),
                    original: name.clone(),
                    applied: default_color,
                });
                ColorValue::Rgb(default_color)
            },
            (None, _) => ColorValue::Rgb(default_color),
        };
        let props = RunProperties {
            lang: self.lang.clone(),
            size: self.size,
            bold: self.bold,
            italic: self.italic,
            underline: None,
            latin: self.font_name.clone(),
            east_asian: self.east_asian_font.clone(),
            color,
        };
        (props, degradation)
    }
}

/// A captured color that could not be written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleDegradation {
    /// Representation of the captured color (`preset_ref`, `unsupported`)
    pub kind: &'static str,
    /// Preset name or element name of the captured color
    pub original: String,
    /// Color written instead
    #[serde(serialize_with = "serialize_rgb")]
    pub applied: RGBColor,
}

fn serialize_rgb<S: serde::Serializer>(color: &RGBColor, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&color.to_hex())
}

/// Replace the whole text of `body` with `new_text`, keeping its style.
///
/// The body ends up with exactly one paragraph holding one run; newlines
/// stay literal inside that run. Paragraph and body properties of the first
/// paragraph survive.
///
/// # Examples
///
/// ```rust
/// use deckfill::fill::{FillOptions, replace_text};
/// use deckfill::ooxml::pptx::shapes::{RunProperties, TextBody};
///
/// let mut body = TextBody::new("p:txBody");
/// body.set_single_run("Old", RunProperties { bold: Some(true), ..Default::default() });
///
/// let degradations = replace_text(&mut body, "New", None, &FillOptions::default()).unwrap();
/// assert!(degradations.is_none());
/// assert_eq!(body.text(), "New");
/// assert_eq!(body.paragraphs[0].runs[0].properties.bold, Some(true));
/// ```
pub fn replace_text(
    body: &mut TextBody,
    new_text: &str,
    color_override: Option<RGBColor>,
    options: &FillOptions,
) -> Result<Option<StyleDegradation>, FieldError> {
    if let Some(bad) = new_text.chars().find(|c| !is_xml_char(*c)) {
        return Err(FieldError::InvalidText {
            codepoint: bad as u32,
        });
    }

    let snapshot = StyleSnapshot::capture(body);
    let (props, degradation) = snapshot.to_properties(color_override, options.default_color);
    if let Some(d) = &degradation {
        warn!(kind = d.kind, original = %d.original, "color not reconstructible, using default");
    }
    body.set_single_run(new_text, props);
    Ok(degradation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::style::SchemeColor;
    use crate::ooxml::pptx::parts::parse_shape_tree;
    use crate::ooxml::pptx::shapes::{Paragraph, ShapeNode, TextRun};
    use crate::ooxml::pptx::writer::write_text_body;

    fn styled(color: ColorValue) -> RunProperties {
        RunProperties {
            lang: Some("ko-KR".into()),
            size: Some(2400),
            bold: Some(true),
            italic: Some(false),
            underline: None,
            latin: Some("Arial".into()),
            east_asian: Some("맑은 고딕".into()),
            color,
        }
    }

    fn body_with(paragraphs: Vec<Vec<TextRun>>) -> TextBody {
        let mut body = TextBody::new("p:txBody");
        body.paragraphs = paragraphs
            .into_iter()
            .map(|runs| Paragraph {
                runs,
                ..Default::default()
            })
            .collect();
        body
    }

    #[test]
    fn test_capture_prefers_visible_run() {
        let body = body_with(vec![
            vec![TextRun::new("  ", styled(ColorValue::Rgb(RGBColor::new(1, 2, 3))))],
            vec![TextRun::new("Title", styled(ColorValue::Theme(SchemeColor::new("accent1"))))],
        ]);
        let snapshot = StyleSnapshot::capture(&body);
        assert_eq!(snapshot.source, StyleSource::VisibleRun);
        assert_eq!(snapshot.color.kind(), "theme_ref");
        assert_eq!(snapshot.font_name.as_deref(), Some("Arial"));
    }

    #[test]
    fn test_capture_falls_back_to_first_run_without_color() {
        let body = body_with(vec![vec![TextRun::new(" ", styled(ColorValue::Rgb(RGBColor::new(9, 9, 9))))]]);
        let snapshot = StyleSnapshot::capture(&body);
        assert_eq!(snapshot.source, StyleSource::FirstRun);
        assert_eq!(snapshot.size, Some(2400));
        assert!(snapshot.color.is_absent());

        let snapshot = StyleSnapshot::capture(&TextBody::new("p:txBody"));
        assert_eq!(snapshot.source, StyleSource::Empty);
    }

    #[test]
    fn test_replace_keeps_style_and_collapses_paragraphs() {
        let rgb = RGBColor::from_hex("1F4E79").unwrap();
        let mut body = body_with(vec![
            vec![TextRun::new("Old", styled(ColorValue::Rgb(rgb)))],
            vec![TextRun::new("second", RunProperties::default())],
        ]);
        let result = replace_text(&mut body, "Line one\nLine two", None, &FillOptions::default());
        assert_eq!(result, Ok(None));
        assert_eq!(body.paragraphs.len(), 1);
        assert_eq!(body.paragraphs[0].runs.len(), 1);

        let run = &body.paragraphs[0].runs[0];
        assert_eq!(run.text, "Line one\nLine two");
        assert_eq!(run.properties, styled(ColorValue::Rgb(rgb)));
        assert!(body.is_dirty());
    }

    #[test]
    fn test_color_priority() {
        let theme = ColorValue::Theme(SchemeColor::new("tx2"));
        let mut body = body_with(vec![vec![TextRun::new("x", styled(theme.clone()))]]);
        let options = FillOptions::default();

        replace_text(&mut body, "y", None, &options).unwrap();
        assert_eq!(body.paragraphs[0].runs[0].properties.color, theme);

        let red = RGBColor::new(0xFF, 0, 0);
        replace_text(&mut body, "z", Some(red), &options).unwrap();
        assert_eq!(body.paragraphs[0].runs[0].properties.color, ColorValue::Rgb(red));
    }

    #[test]
    fn test_preset_and_unsupported_degrade_to_default() {
        let options = FillOptions::default();
        for color in [ColorValue::Preset("red".into()), ColorValue::Unsupported("sysClr".into())] {
            let mut body = body_with(vec![vec![TextRun::new("x", styled(color.clone()))]]);
            let degradation = replace_text(&mut body, "y", None, &options).unwrap().unwrap();
            assert_eq!(degradation.kind, color.kind());
            assert_eq!(degradation.applied, RGBColor::BLACK);
            assert_eq!(body.paragraphs[0].runs[0].properties.color, ColorValue::Rgb(RGBColor::BLACK));
        }

        let mut body = body_with(vec![vec![TextRun::new("x", styled(ColorValue::Absent))]]);
        assert_eq!(replace_text(&mut body, "y", None, &options), Ok(None));
        assert_eq!(body.paragraphs[0].runs[0].properties.color, ColorValue::Rgb(RGBColor::BLACK));
    }

    #[test]
    fn test_rejects_text_xml_cannot_carry() {
        let mut body = body_with(vec![vec![TextRun::new("x", RunProperties::default())]]);
        let err = replace_text(&mut body, "bad\u{1}", None, &FillOptions::default()).unwrap_err();
        assert_eq!(err, FieldError::InvalidText { codepoint: 1 });
        assert!(!body.is_dirty());
        assert_eq!(body.text(), "x");
    }

    #[test]
    fn test_replace_is_idempotent_on_style() {
        let xml = r#"<p:spTree xmlns:a="a" xmlns:p="p"><p:sp><p:nvSpPr><p:cNvPr id="2" name="T"/><p:cNvSpPr txBox="1"/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr wrap="square"/><a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="1800" b="1"><a:solidFill><a:schemeClr val="accent1"><a:lumMod val="75000"/></a:schemeClr></a:solidFill><a:latin typeface="Arial"/></a:rPr><a:t>Old</a:t></a:r></a:p></p:txBody></p:sp></p:spTree>"#;
        let shapes = parse_shape_tree(xml).unwrap();
        let ShapeNode::Text(shape) = &shapes[0] else {
            panic!("expected a text shape");
        };
        let mut body = shape.body.clone().unwrap();
        let options = FillOptions::default();

        replace_text(&mut body, "Same", None, &options).unwrap();
        let mut once = String::new();
        write_text_body(&body, &mut once).unwrap();

        replace_text(&mut body, "Same", None, &options).unwrap();
        let mut twice = String::new();
        write_text_body(&body, &mut twice).unwrap();

        assert_eq!(once, twice);
        assert!(once.contains(r#"<a:pPr algn="ctr"/>"#));
        assert!(once.contains(r#"<a:lumMod val="75000"/>"#));
        assert!(once.contains(r#"<a:bodyPr wrap="square"/>"#));
    }
}
