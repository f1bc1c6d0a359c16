/// A single slide: its XML and the typed shape tree parsed from it.
use crate::common::error::Result;
use crate::ooxml::opc::PackURI;
use crate::ooxml::pptx::parts::parse_shape_tree;
use crate::ooxml::pptx::shapes::base::for_each_body;
use crate::ooxml::pptx::shapes::{ShapeNode, ShapePath, TextBody, text_body, text_body_mut};
use crate::ooxml::pptx::writer::write_text_body;
use tracing::warn;

/// A slide of a presentation.
///
/// The original XML is kept untouched; [`Slide::to_xml`] splices the
/// modified text bodies back into it.
#[derive(Debug, Clone)]
pub struct Slide {
    partname: PackURI,
    number: usize,
    xml: String,
    shapes: Vec<ShapeNode>,
}

impl Slide {
    /// Parse a slide part. `number` is the 1-based position in the deck.
    pub fn parse(partname: PackURI, number: usize, xml: String) -> Result<Self> {
        let shapes = parse_shape_tree(&xml)?;
        Ok(Self {
            partname,
            number,
            xml,
            shapes,
        })
    }

    /// Part name of the slide (e.g. `/ppt/slides/slide1.xml`).
    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// 1-based slide number in presentation order.
    #[inline]
    pub fn number(&self) -> usize {
        self.number
    }

    /// Top-level shapes in document order.
    #[inline]
    pub fn shapes(&self) -> &[ShapeNode] {
        &self.shapes
    }

    /// Text body addressed by `path`.
    pub fn text_body(&self, path: &ShapePath) -> Option<&TextBody> {
        text_body(&self.shapes, path)
    }

    /// Mutable text body addressed by `path`.
    pub fn text_body_mut(&mut self, path: &ShapePath) -> Option<&mut TextBody> {
        text_body_mut(&mut self.shapes, path)
    }

    /// Whether any text body was modified.
    pub fn is_dirty(&self) -> bool {
        let mut dirty = false;
        for_each_body(&self.shapes, &mut |body| dirty |= body.is_dirty());
        dirty
    }

    /// The slide XML with every modified text body re-serialized.
    ///
    /// Bytes outside modified bodies are reproduced exactly.
    pub fn to_xml(&self) -> Result<String> {
        let mut dirty: Vec<&TextBody> = Vec::new();
        for_each_body(&self.shapes, &mut |body| {
            if body.is_dirty() {
                dirty.push(body);
            }
        });
        if dirty.is_empty() {
            return Ok(self.xml.clone());
        }

        // Splice from the end so earlier offsets stay valid
        dirty.sort_by_key(|b| std::cmp::Reverse(b.span().map_or(0, |s| s.start)));
        let mut xml = self.xml.clone();
        for body in dirty {
            let Some(span) = body.span() else {
                warn!(slide = self.number, "modified text body has no source location, skipped");
                continue;
            };
            let mut replacement = String::with_capacity(span.len());
            write_text_body(body, &mut replacement)?;
            xml.replace_range(span.clone(), &replacement);
        }
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::RunProperties;

    const SLIDE: &str = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr><p:sp><p:nvSpPr><p:cNvPr id="2" name="A"/><p:cNvSpPr txBox="1"/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" sz="1800"/><a:t>first</a:t></a:r></a:p></p:txBody></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="B"/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>second</a:t></a:r></a:p></p:txBody></p:sp><p:sp><p:nvSpPr><p:cNvPr id="4" name="C"/></p:nvSpPr><p:spPr/></p:sp></p:spTree></p:cSld></p:sld>"#;

    fn slide() -> Slide {
        Slide::parse(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            1,
            SLIDE.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_unmodified_slide_is_identical() {
        let slide = slide();
        assert!(!slide.is_dirty());
        assert_eq!(slide.to_xml().unwrap(), SLIDE);
        assert_eq!(slide.number(), 1);
        assert_eq!(slide.partname().as_str(), "/ppt/slides/slide1.xml");
    }

    #[test]
    fn test_splices_modified_bodies() {
        let mut slide = slide();
        for (idx, text) in [(0, "one & only"), (1, "two")] {
            slide
                .text_body_mut(&ShapePath::top(idx))
                .unwrap()
                .set_single_run(text, RunProperties::default());
        }
        assert!(slide.is_dirty());

        let xml = slide.to_xml().unwrap();
        assert!(xml.contains("<a:t>one &amp; only</a:t>"));
        assert!(xml.contains("<a:t>two</a:t>"));
        assert!(!xml.contains("first"));
        assert!(xml.ends_with("<p:sp><p:nvSpPr><p:cNvPr id=\"4\" name=\"C\"/></p:nvSpPr><p:spPr/></p:sp></p:spTree></p:cSld></p:sld>"));

        let reparsed = Slide::parse(slide.partname().clone(), 1, xml).unwrap();
        assert_eq!(reparsed.text_body(&ShapePath::top(0)).unwrap().text(), "one & only");
        assert_eq!(reparsed.text_body(&ShapePath::top(1)).unwrap().text(), "two");
    }

    #[test]
    fn test_bodiless_shape() {
        let slide = slide();
        assert!(slide.text_body(&ShapePath::top(0)).is_some());
        assert!(slide.text_body(&ShapePath::top(2)).is_none());
    }
}
