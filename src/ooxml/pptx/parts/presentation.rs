/// Presentation part - the main part in a .pptx package.
///
/// Corresponds to `/ppt/presentation.xml` in the package. Only the slide
/// size and the slide order are read from it.
use crate::common::error::Result;
use crate::common::unit::{DEFAULT_SLIDE_HEIGHT_EMU, DEFAULT_SLIDE_WIDTH_EMU};
use crate::ooxml::pptx::parts::slide::attr;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Parsed view of `presentation.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationPart {
    /// Slide width in EMUs (`p:sldSz cx`)
    pub slide_width: i64,
    /// Slide height in EMUs (`p:sldSz cy`)
    pub slide_height: i64,
    /// Relationship IDs of the slides, in presentation order
    pub slide_rids: Vec<String>,
}

impl PresentationPart {
    /// Parse the presentation part.
    ///
    /// A missing `p:sldSz` falls back to the 4:3 default of 10in x 7.5in.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut part = PresentationPart {
            slide_width: DEFAULT_SLIDE_WIDTH_EMU,
            slide_height: DEFAULT_SLIDE_HEIGHT_EMU,
            slide_rids: Vec::new(),
        };
        let mut in_slide_list = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"sldSz" => {
                        if let Some(cx) = attr(&e, b"cx").and_then(|v| v.parse().ok()) {
                            part.slide_width = cx;
                        }
                        if let Some(cy) = attr(&e, b"cy").and_then(|v| v.parse().ok()) {
                            part.slide_height = cy;
                        }
                    },
                    b"sldIdLst" => in_slide_list = true,
                    b"sldId" if in_slide_list => {
                        // The relationship ID is the namespaced `id`; the bare one is numeric
                        let rid = e.attributes().flatten().find_map(|a| {
                            (a.key.local_name().as_ref() == b"id" && a.key.prefix().is_some())
                                .then(|| String::from_utf8_lossy(&a.value).into_owned())
                        });
                        if let Some(rid) = rid {
                            part.slide_rids.push(rid);
                        }
                    },
                    _ => {},
                },
                Event::End(e) if e.local_name().as_ref() == b"sldIdLst" => in_slide_list = false,
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presentation() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
  <p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst>
  <p:sldSz cx="12192000" cy="6858000"/>
  <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#;
        let part = PresentationPart::parse(xml.as_bytes()).unwrap();
        assert_eq!(part.slide_width, 12_192_000);
        assert_eq!(part.slide_height, 6_858_000);
        assert_eq!(part.slide_rids, vec!["rId3", "rId2"]);
    }

    #[test]
    fn test_default_slide_size() {
        let xml = r#"<p:presentation xmlns:p="p"><p:sldIdLst/></p:presentation>"#;
        let part = PresentationPart::parse(xml.as_bytes()).unwrap();
        assert_eq!(part.slide_width, DEFAULT_SLIDE_WIDTH_EMU);
        assert!(part.slide_rids.is_empty());
    }
}
