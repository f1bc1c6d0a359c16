/// Text bodies of shapes and table cells.
///
/// A text body (`p:txBody` on shapes, `a:txBody` in table cells) is parsed
/// into paragraphs and runs. The body remembers where it came from in the
/// slide XML so that, once mutated, only its own byte range needs to be
/// rewritten.
use crate::common::style::ColorValue;
use std::ops::Range;

/// What a run represents in the paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Regular text run (`a:r`)
    Text,
    /// Field such as a slide number or date (`a:fld`)
    Field,
    /// Soft line break (`a:br`)
    Break,
}

/// Character properties of a run (`a:rPr`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProperties {
    /// Language tag (`lang`)
    pub lang: Option<String>,
    /// Font size in hundredths of a point (`sz`)
    pub size: Option<u32>,
    /// Bold (`b`)
    pub bold: Option<bool>,
    /// Italic (`i`)
    pub italic: Option<bool>,
    /// Underline style (`u`), e.g. `sng`
    pub underline: Option<String>,
    /// Latin typeface (`a:latin typeface`)
    pub latin: Option<String>,
    /// East Asian typeface (`a:ea typeface`)
    pub east_asian: Option<String>,
    /// Fill color of the glyphs (`a:solidFill`)
    pub color: ColorValue,
}

impl RunProperties {
    /// Whether no property is set at all.
    pub fn is_empty(&self) -> bool {
        self.lang.is_none()
            && self.size.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.latin.is_none()
            && self.east_asian.is_none()
            && self.color.is_absent()
    }
}

/// A run of text inside a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Run kind
    pub kind: RunKind,
    /// Decoded text (`"\n"` for breaks)
    pub text: String,
    /// Parsed character properties
    pub properties: RunProperties,
    /// Original XML of the run, reused verbatim when the body is rewritten
    pub(crate) raw: Option<String>,
}

impl TextRun {
    /// Create a new regular run that has never been part of a document.
    pub fn new(text: impl Into<String>, properties: RunProperties) -> Self {
        Self {
            kind: RunKind::Text,
            text: text.into(),
            properties,
            raw: None,
        }
    }

    /// Whether the run carries any non-whitespace text.
    #[inline]
    pub fn has_visible_text(&self) -> bool {
        self.kind != RunKind::Break && !self.text.trim().is_empty()
    }
}

/// A paragraph (`a:p`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Raw `a:pPr` element, kept verbatim
    pub(crate) properties_xml: Option<String>,
    /// Runs in document order
    pub runs: Vec<TextRun>,
    /// Raw `a:endParaRPr` element, kept verbatim
    pub(crate) end_properties_xml: Option<String>,
}

impl Paragraph {
    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Remove all runs, keeping paragraph-level properties.
    pub fn clear(&mut self) {
        self.runs.clear();
    }
}

/// A text body belonging to a shape or table cell.
///
/// # Examples
///
/// ```rust
/// use deckfill::ooxml::pptx::shapes::{RunProperties, TextBody};
///
/// let mut body = TextBody::new("p:txBody");
/// body.set_single_run("Quarterly\nResults", RunProperties::default());
/// assert_eq!(body.text(), "Quarterly\nResults");
/// assert!(body.is_dirty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TextBody {
    /// Qualified element name the body was read from (`p:txBody` / `a:txBody`)
    pub(crate) tag: String,
    /// Byte range of the whole element in the slide XML
    pub(crate) span: Option<Range<usize>>,
    /// Raw `a:bodyPr` element
    pub(crate) body_properties_xml: Option<String>,
    /// Raw `a:lstStyle` element
    pub(crate) list_style_xml: Option<String>,
    /// Paragraphs in document order
    pub paragraphs: Vec<Paragraph>,
    /// Set once the body has been modified and must be re-serialized
    dirty: bool,
}

impl TextBody {
    /// Create an empty, detached text body.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            span: None,
            body_properties_xml: None,
            list_style_xml: None,
            paragraphs: Vec::new(),
            dirty: false,
        }
    }

    pub(crate) fn from_parts(
        tag: String,
        span: Range<usize>,
        body_properties_xml: Option<String>,
        list_style_xml: Option<String>,
        paragraphs: Vec<Paragraph>,
    ) -> Self {
        Self {
            tag,
            span: Some(span),
            body_properties_xml,
            list_style_xml,
            paragraphs,
            dirty: false,
        }
    }

    /// Paragraph-preserving text.
    ///
    /// Each paragraph is trimmed, empty paragraphs are skipped and the rest
    /// are joined with `\n`. This is the text every matching tier compares.
    pub fn text(&self) -> String {
        let parts: Vec<String> = self
            .paragraphs
            .iter()
            .map(|p| p.text().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        parts.join("\n").trim().to_string()
    }

    /// Whether the body carries no visible text.
    pub fn is_empty(&self) -> bool {
        self.paragraphs
            .iter()
            .all(|p| p.runs.iter().all(|r| !r.has_visible_text()))
    }

    /// The first run carrying non-whitespace text, in paragraph order.
    pub fn first_visible_run(&self) -> Option<&TextRun> {
        self.paragraphs
            .iter()
            .flat_map(|p| p.runs.iter())
            .find(|r| r.has_visible_text())
    }

    /// The first run of the first paragraph, whatever it contains.
    pub fn first_run(&self) -> Option<&TextRun> {
        self.paragraphs.first().and_then(|p| p.runs.first())
    }

    /// Drop every paragraph except the first one and empty that one.
    ///
    /// Paragraph properties of the first paragraph survive; a body without
    /// paragraphs gets a fresh empty one.
    pub fn clear(&mut self) {
        self.paragraphs.truncate(1);
        match self.paragraphs.first_mut() {
            Some(first) => first.clear(),
            None => self.paragraphs.push(Paragraph::default()),
        }
        self.dirty = true;
    }

    /// Replace all content with exactly one paragraph holding one run.
    ///
    /// Newlines in `text` are kept literally inside the run.
    pub fn set_single_run(&mut self, text: &str, properties: RunProperties) {
        self.clear();
        if let Some(first) = self.paragraphs.first_mut() {
            first.runs.push(TextRun::new(text, properties));
        }
    }

    /// Whether the body was modified since it was parsed.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Byte range in the slide XML, if the body was parsed from one.
    #[inline]
    pub fn span(&self) -> Option<&Range<usize>> {
        self.span.as_ref()
    }

    /// Qualified element name.
    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::style::RGBColor;

    fn run(text: &str) -> TextRun {
        TextRun::new(text, RunProperties::default())
    }

    fn body(paragraphs: &[&[&str]]) -> TextBody {
        let mut body = TextBody::new("p:txBody");
        for runs in paragraphs {
            body.paragraphs.push(Paragraph {
                runs: runs.iter().map(|t| run(t)).collect(),
                ..Default::default()
            });
        }
        body
    }

    #[test]
    fn test_text_joins_trimmed_paragraphs() {
        let body = body(&[&["  Quarterly ", "Review "], &["   "], &["Q3"]]);
        assert_eq!(body.text(), "Quarterly Review\nQ3");
    }

    #[test]
    fn test_first_visible_run_skips_blank_runs() {
        let mut body = body(&[&[" ", ""], &["Title"]]);
        body.paragraphs[1].runs[0].properties.bold = Some(true);
        let first = body.first_visible_run().unwrap();
        assert_eq!(first.text, "Title");
        assert_eq!(first.properties.bold, Some(true));
        assert_eq!(body.first_run().unwrap().text, " ");
    }

    #[test]
    fn test_clear_keeps_first_paragraph_properties() {
        let mut body = body(&[&["a"], &["b"]]);
        body.paragraphs[0].properties_xml = Some(r#"<a:pPr algn="ctr"/>"#.to_string());
        body.clear();
        assert_eq!(body.paragraphs.len(), 1);
        assert!(body.paragraphs[0].runs.is_empty());
        assert!(body.paragraphs[0].properties_xml.is_some());
        assert!(body.is_dirty());
        assert!(body.is_empty());
    }

    #[test]
    fn test_set_single_run_on_empty_body() {
        let mut body = TextBody::new("a:txBody");
        let props = RunProperties {
            color: ColorValue::Rgb(RGBColor::new(1, 2, 3)),
            ..Default::default()
        };
        body.set_single_run("45%", props.clone());
        assert_eq!(body.paragraphs.len(), 1);
        assert_eq!(body.paragraphs[0].runs.len(), 1);
        assert_eq!(body.paragraphs[0].runs[0].properties, props);
        assert_eq!(body.text(), "45%");
    }

    #[test]
    fn test_break_runs_are_not_visible() {
        let mut brk = run("\n");
        brk.kind = RunKind::Break;
        assert!(!brk.has_visible_text());
        assert!(RunProperties::default().is_empty());
    }
}
