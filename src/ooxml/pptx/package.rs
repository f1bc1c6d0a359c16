/// PowerPoint package reading and writing.
///
/// The package is held in memory as the list of its ZIP members. Slides are
/// parsed into [`Slide`]s; on save, every member is written back in its
/// original order and compression, with modified slides re-serialized.
use crate::common::error::{Error, Result};
use crate::ooxml::opc::packuri::PRESENTATION_URI;
use crate::ooxml::opc::rel::RT_SLIDE;
use crate::ooxml::opc::{PackURI, Relationships};
use crate::ooxml::pptx::parts::PresentationPart;
use crate::ooxml::pptx::slide::Slide;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A ZIP member as read from the package.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    method: CompressionMethod,
    is_dir: bool,
}

/// An opened `.pptx` presentation.
///
/// # Examples
///
/// ```rust,no_run
/// use deckfill::ooxml::pptx::Presentation;
///
/// let deck = Presentation::open("template.pptx")?;
/// for slide in deck.slides() {
///     println!("slide {} has {} shapes", slide.number(), slide.shapes().len());
/// }
/// deck.save("copy.pptx")?;
/// # Ok::<(), deckfill::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Presentation {
    entries: Vec<Entry>,
    slide_width: i64,
    slide_height: i64,
    slides: Vec<Slide>,
}

impl Presentation {
    /// Open a presentation from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Open a presentation from bytes in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Open a presentation from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(Entry {
                name: file.name().to_string(),
                method: file.compression(),
                is_dir: file.is_dir(),
                data,
            });
        }

        let (pres, slides) = {
            let index: HashMap<&str, usize> = entries
                .iter()
                .enumerate()
                .map(|(i, e)| (e.name.as_str(), i))
                .collect();
            let member = |uri: &PackURI| -> Result<&[u8]> {
                index
                    .get(uri.membername())
                    .map(|&i| entries[i].data.as_slice())
                    .ok_or_else(|| Error::PartNotFound(uri.to_string()))
            };

            let pres_uri = PackURI::new(PRESENTATION_URI).map_err(Error::Structural)?;
            let pres = PresentationPart::parse(member(&pres_uri)?)?;
            let rels = Relationships::parse(member(&pres_uri.rels_uri())?, pres_uri.base_uri())?;

            let mut slides = Vec::with_capacity(pres.slide_rids.len());
            for rid in &pres.slide_rids {
                if let Some(rel) = rels.get(rid)
                    && rel.reltype != RT_SLIDE
                {
                    warn!(rid = %rid, reltype = %rel.reltype, "slide id points to a non-slide part");
                }
                let partname = rels.target_partname(rid)?;
                let xml = String::from_utf8(member(&partname)?.to_vec())
                    .map_err(|e| Error::Xml(format!("{}: {}", partname, e)))?;
                let number = slides.len() + 1;
                debug!(slide = number, part = %partname, "parsing slide");
                slides.push(Slide::parse(partname, number, xml)?);
            }
            (pres, slides)
        };

        Ok(Self {
            slide_width: pres.slide_width,
            slide_height: pres.slide_height,
            slides,
            entries,
        })
    }

    /// Slide width in EMUs.
    #[inline]
    pub fn slide_width(&self) -> i64 {
        self.slide_width
    }

    /// Slide height in EMUs.
    #[inline]
    pub fn slide_height(&self) -> i64 {
        self.slide_height
    }

    /// Slides in presentation order.
    #[inline]
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Mutable slides in presentation order.
    #[inline]
    pub fn slides_mut(&mut self) -> &mut [Slide] {
        &mut self.slides
    }

    /// Number of slides.
    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Write the presentation to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_to(file)?;
        Ok(())
    }

    /// Serialize the presentation into bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = self.write_to(Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Write the package to a seekable writer, returning the writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut modified: HashMap<&str, String> = HashMap::new();
        for slide in self.slides.iter().filter(|s| s.is_dirty()) {
            modified.insert(slide.partname().membername(), slide.to_xml()?);
        }

        let mut zip = ZipWriter::new(writer);
        for entry in &self.entries {
            let method = match entry.method {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            zip.start_file(entry.name.as_str(), options)?;
            match modified.get(entry.name.as_str()) {
                Some(xml) => zip.write_all(xml.as_bytes())?,
                None => zip.write_all(&entry.data)?,
            }
        }
        Ok(zip.finish()?)
    }

    /// Raw bytes of a package member, if present.
    pub fn member(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::{RunProperties, ShapePath};

    pub(crate) const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/></Types>"#;

    /// Build an in-memory deck from slide XML documents, in order.
    pub(crate) fn build_deck(slides: &[&str]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();

        let mut ids = String::new();
        let mut rels = String::new();
        for i in 0..slides.len() {
            ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
                i + 2,
                RT_SLIDE,
                i + 1
            ));
        }
        zip.start_file("ppt/presentation.xml", options).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#,
            ids
        )
        .unwrap();

        zip.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rels
        )
        .unwrap();

        for (i, xml) in slides.iter().enumerate() {
            zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    pub(crate) fn text_slide(texts: &[&str]) -> String {
        let mut shapes = String::new();
        for (i, text) in texts.iter().enumerate() {
            shapes.push_str(&format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="914400"/><a:ext cx="2743200" cy="457200"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="2000" b="1"><a:solidFill><a:srgbClr val="1F4E79"/></a:solidFill><a:latin typeface="Arial"/></a:rPr><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#,
                id = i + 2,
                x = 457_200 * (i as i64 + 1),
                text = text
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
            shapes
        )
    }

    #[test]
    fn test_open_orders_slides() {
        let bytes = build_deck(&[&text_slide(&["Intro"]), &text_slide(&["Agenda", "Outlook"])]);
        let deck = Presentation::from_bytes(&bytes).unwrap();
        assert_eq!(deck.slide_count(), 2);
        assert_eq!(deck.slide_width(), 9_144_000);
        assert_eq!(deck.slides()[1].number(), 2);
        assert_eq!(deck.slides()[1].shapes().len(), 2);
        assert_eq!(
            deck.slides()[0].partname().as_str(),
            "/ppt/slides/slide1.xml"
        );
    }

    #[test]
    fn test_round_trip_without_edits_keeps_slide_xml() {
        let slide = text_slide(&["Intro", "Body"]);
        let bytes = build_deck(&[&slide]);
        let deck = Presentation::from_bytes(&bytes).unwrap();
        let saved = deck.to_bytes().unwrap();
        let reopened = Presentation::from_bytes(&saved).unwrap();
        assert_eq!(
            reopened.member("ppt/slides/slide1.xml").unwrap(),
            slide.as_bytes()
        );
        assert_eq!(
            reopened.member("[Content_Types].xml").unwrap(),
            CONTENT_TYPES.as_bytes()
        );
    }

    #[test]
    fn test_edited_deck_reopens_with_new_text() {
        let bytes = build_deck(&[&text_slide(&["Intro", "Body"])]);
        let mut deck = Presentation::from_bytes(&bytes).unwrap();
        deck.slides_mut()[0]
            .text_body_mut(&ShapePath::top(1))
            .unwrap()
            .set_single_run("Updated body", RunProperties::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edited.pptx");
        deck.save(&path).unwrap();

        let reopened = Presentation::open(&path).unwrap();
        let slide = &reopened.slides()[0];
        assert_eq!(slide.text_body(&ShapePath::top(0)).unwrap().text(), "Intro");
        assert_eq!(
            slide.text_body(&ShapePath::top(1)).unwrap().text(),
            "Updated body"
        );
    }

    #[test]
    fn test_missing_presentation_part() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        let bytes = zip.finish().unwrap().into_inner();
        assert!(matches!(
            Presentation::from_bytes(&bytes),
            Err(Error::PartNotFound(_))
        ));
    }

    #[test]
    fn test_missing_slide_part() {
        let bytes = build_deck(&[&text_slide(&["Intro"])]);
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            if file.name().starts_with("ppt/slides/") {
                continue;
            }
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            zip.start_file(file.name(), SimpleFileOptions::default())
                .unwrap();
            zip.write_all(&data).unwrap();
        }
        let bytes = zip.finish().unwrap().into_inner();
        assert!(matches!(
            Presentation::from_bytes(&bytes),
            Err(Error::PartNotFound(_))
        ));
    }
}
