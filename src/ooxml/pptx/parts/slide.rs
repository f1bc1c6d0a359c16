/// Slide part parsing.
///
/// Parses the `p:spTree` of a slide into the typed shape tree. Every text
/// body records its byte range in the slide XML; preserved property
/// elements and untouched runs keep their original markup.
use crate::common::error::{Error, Result};
use crate::common::style::{ColorTransform, ColorValue, RGBColor, SchemeColor};
use crate::common::xml::{resolve_entity, unescape_xml};
use crate::ooxml::pptx::shapes::{
    Geometry, GroupShape, GroupTransform, Paragraph, RunKind, RunProperties, ShapeNode,
    ShapeType, Table, TableCell, TableRow, TableShape, TextBody, TextRun, TextShape,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

/// Parse the shape tree of a slide.
///
/// Slides without a `p:spTree` yield an empty list.
pub fn parse_shape_tree(xml: &str) -> Result<Vec<ShapeNode>> {
    let mut parser = SlideParser::new(xml);
    loop {
        match parser.reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"spTree" => {
                return parser.parse_group_content(GroupTransform::IDENTITY, None);
            },
            Event::Eof => return Ok(Vec::new()),
            _ => {},
        }
    }
}

struct SlideParser<'a> {
    xml: &'a str,
    reader: Reader<&'a [u8]>,
}

/// Identity and frame collected from a group's own properties.
#[derive(Default)]
struct GroupHeader {
    id: u32,
    name: String,
    frame: Option<Geometry>,
}

impl<'a> SlideParser<'a> {
    fn new(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);
        Self { xml, reader }
    }

    #[inline]
    fn pos(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    /// Raw markup of an element whose start event began at `start`.
    ///
    /// For a start tag, the reader is advanced past the matching end tag.
    fn capture(&mut self, start: usize, e: &BytesStart<'a>, empty: bool) -> Result<String> {
        if !empty {
            self.reader.read_to_end(e.name())?;
        }
        Ok(self.xml[start..self.pos()].to_string())
    }

    fn skip(&mut self, e: &BytesStart<'a>) -> Result<()> {
        self.reader.read_to_end(e.name())?;
        Ok(())
    }

    /// Parse the content of `p:spTree` or `p:grpSp` up to its end tag.
    ///
    /// `header` receives the group's own id, name and frame; the returned
    /// nodes have geometry mapped through `parent` and the group's own
    /// child transform.
    fn parse_group_content(
        &mut self,
        parent: GroupTransform,
        mut header: Option<&mut GroupHeader>,
    ) -> Result<Vec<ShapeNode>> {
        let mut children = Vec::new();
        let mut transform = parent;
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"nvGrpSpPr" => {
                        let (id, name) = self.parse_non_visual(b"nvGrpSpPr")?;
                        if let Some(h) = header.as_deref_mut() {
                            h.id = id;
                            h.name = name;
                        }
                    },
                    b"grpSpPr" => {
                        let xfrm = self.parse_group_properties()?;
                        // The root tree's own frame is ignored
                        if let (Some(h), Some((frame, child))) = (header.as_deref_mut(), xfrm) {
                            h.frame = Some(parent.apply(frame));
                            transform = parent.then(&GroupTransform::new(frame, child));
                        }
                    },
                    b"sp" => children.push(ShapeNode::Text(self.parse_sp(&transform)?)),
                    b"grpSp" => children.push(ShapeNode::Group(self.parse_group(&transform)?)),
                    b"graphicFrame" => {
                        if let Some(table) = self.parse_graphic_frame(&transform)? {
                            children.push(ShapeNode::Table(table));
                        }
                    },
                    other => {
                        debug!(
                            element = %String::from_utf8_lossy(other),
                            "skipping non-text shape"
                        );
                        self.skip(&e)?;
                    },
                },
                Event::End(_) => return Ok(children),
                Event::Eof => {
                    return Err(Error::Xml("unexpected end of slide in shape tree".to_string()));
                },
                _ => {},
            }
        }
    }

    fn parse_group(&mut self, parent: &GroupTransform) -> Result<GroupShape> {
        let mut header = GroupHeader::default();
        let children = self.parse_group_content(*parent, Some(&mut header))?;
        Ok(GroupShape {
            id: header.id,
            name: header.name,
            geometry: header.frame,
            children,
        })
    }

    /// Read `cNvPr id/name` from a non-visual properties block.
    fn parse_non_visual(&mut self, end: &[u8]) -> Result<(u32, String)> {
        let mut id = 0;
        let mut name = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"cNvPr" => {
                    (id, name) = c_nv_pr(&e);
                },
                Event::End(e) if e.local_name().as_ref() == end => break,
                Event::Eof => return Err(Error::Xml("unterminated non-visual properties".into())),
                _ => {},
            }
        }
        Ok((id, name))
    }

    /// Read the `a:xfrm` of `p:grpSpPr`, returning frame and child frame.
    fn parse_group_properties(&mut self) -> Result<Option<(Geometry, Geometry)>> {
        let mut result = None;
        loop {
            match self.reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"xfrm" => {
                    let (frame, child) = self.parse_xfrm()?;
                    result = Some((frame, child.unwrap_or(frame)));
                },
                Event::End(e) if e.local_name().as_ref() == b"grpSpPr" => break,
                Event::Eof => return Err(Error::Xml("unterminated group properties".into())),
                _ => {},
            }
        }
        Ok(result)
    }

    /// Parse an `xfrm` element (either `a:xfrm` or `p:xfrm`) up to its end.
    fn parse_xfrm(&mut self) -> Result<(Geometry, Option<Geometry>)> {
        let mut frame = Geometry::default();
        let mut child: Option<Geometry> = None;
        loop {
            match self.reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"off" => (frame.x, frame.y) = point(&e, b"x", b"y"),
                    b"ext" => (frame.cx, frame.cy) = point(&e, b"cx", b"cy"),
                    b"chOff" => {
                        let c = child.get_or_insert_with(Geometry::default);
                        (c.x, c.y) = point(&e, b"x", b"y");
                    },
                    b"chExt" => {
                        let c = child.get_or_insert_with(Geometry::default);
                        (c.cx, c.cy) = point(&e, b"cx", b"cy");
                    },
                    _ => {},
                },
                Event::End(e) if e.local_name().as_ref() == b"xfrm" => break,
                Event::Eof => return Err(Error::Xml("unterminated xfrm".into())),
                _ => {},
            }
        }
        Ok((frame, child))
    }

    fn parse_sp(&mut self, transform: &GroupTransform) -> Result<TextShape> {
        let mut shape = TextShape {
            id: 0,
            name: String::new(),
            geometry: None,
            shape_type: ShapeType::AutoShape,
            body: None,
        };
        loop {
            let start = self.pos();
            match self.reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"cNvPr" => {
                    (shape.id, shape.name) = c_nv_pr(&e);
                },
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"cNvSpPr" => {
                    if attr_bool(&e, b"txBox") == Some(true)
                        && !matches!(shape.shape_type, ShapeType::Placeholder(_))
                    {
                        shape.shape_type = ShapeType::TextBox;
                    }
                },
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"ph" => {
                    let kind = attr(&e, b"type").unwrap_or_else(|| "body".to_string());
                    shape.shape_type = ShapeType::Placeholder(kind);
                },
                Event::Start(e) if e.local_name().as_ref() == b"xfrm" => {
                    let (frame, _) = self.parse_xfrm()?;
                    shape.geometry = Some(transform.apply(frame));
                },
                Event::Start(e) if e.local_name().as_ref() == b"txBody" => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    shape.body = Some(self.parse_text_body(tag, start)?);
                },
                Event::Empty(e) if e.local_name().as_ref() == b"txBody" => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let span = start..self.pos();
                    shape.body = Some(TextBody::from_parts(tag, span, None, None, Vec::new()));
                },
                Event::Start(e) if e.local_name().as_ref() == b"extLst" => self.skip(&e)?,
                Event::End(e) if e.local_name().as_ref() == b"sp" => break,
                Event::Eof => return Err(Error::Xml("unterminated p:sp".into())),
                _ => {},
            }
        }
        Ok(shape)
    }

    /// Parse a graphic frame, keeping it only if it holds a table.
    fn parse_graphic_frame(&mut self, transform: &GroupTransform) -> Result<Option<TableShape>> {
        let mut id = None;
        let mut name = String::new();
        let mut geometry = None;
        let mut table = None;
        loop {
            match self.reader.read_event()? {
                // Embedded objects may carry their own cNvPr and xfrm; the
                // frame's come first
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"cNvPr" => {
                    if id.is_none() {
                        let (i, n) = c_nv_pr(&e);
                        id = Some(i);
                        name = n;
                    }
                },
                Event::Start(e) if e.local_name().as_ref() == b"xfrm" => {
                    let (frame, _) = self.parse_xfrm()?;
                    if geometry.is_none() {
                        geometry = Some(transform.apply(frame));
                    }
                },
                Event::Start(e) if e.local_name().as_ref() == b"tbl" => {
                    if table.is_none() {
                        table = Some(self.parse_table()?);
                    } else {
                        self.skip(&e)?;
                    }
                },
                Event::End(e) if e.local_name().as_ref() == b"graphicFrame" => break,
                Event::Eof => return Err(Error::Xml("unterminated graphicFrame".into())),
                _ => {},
            }
        }
        Ok(table.map(|table| TableShape {
            id: id.unwrap_or_default(),
            name,
            geometry,
            table,
        }))
    }

    fn parse_table(&mut self) -> Result<Table> {
        let mut table = Table {
            columns: Vec::new(),
            rows: Vec::new(),
        };
        loop {
            match self.reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"gridCol" => {
                    table.columns.push(attr_i64(&e, b"w").unwrap_or(0));
                },
                Event::Start(e) if e.local_name().as_ref() == b"tblPr" => self.skip(&e)?,
                Event::Start(e) if e.local_name().as_ref() == b"tr" => {
                    let height = attr_i64(&e, b"h").unwrap_or(0);
                    let cells = self.parse_row()?;
                    table.rows.push(TableRow { height, cells });
                },
                Event::End(e) if e.local_name().as_ref() == b"tbl" => break,
                Event::Eof => return Err(Error::Xml("unterminated a:tbl".into())),
                _ => {},
            }
        }
        table.validate()?;
        Ok(table)
    }

    fn parse_row(&mut self) -> Result<Vec<TableCell>> {
        let mut cells = Vec::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"tc" => {
                    let mut cell = new_cell(&e);
                    self.parse_cell(&mut cell)?;
                    cells.push(cell);
                },
                Event::Empty(e) if e.local_name().as_ref() == b"tc" => cells.push(new_cell(&e)),
                Event::Start(e) if e.local_name().as_ref() == b"extLst" => self.skip(&e)?,
                Event::End(e) if e.local_name().as_ref() == b"tr" => break,
                Event::Eof => return Err(Error::Xml("unterminated a:tr".into())),
                _ => {},
            }
        }
        Ok(cells)
    }

    fn parse_cell(&mut self, cell: &mut TableCell) -> Result<()> {
        loop {
            let start = self.pos();
            match self.reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"txBody" => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    cell.body = self.parse_text_body(tag, start)?;
                },
                Event::Start(e) if e.local_name().as_ref() == b"tcPr" => self.skip(&e)?,
                Event::Start(e) if e.local_name().as_ref() == b"extLst" => self.skip(&e)?,
                Event::End(e) if e.local_name().as_ref() == b"tc" => break,
                Event::Eof => return Err(Error::Xml("unterminated a:tc".into())),
                _ => {},
            }
        }
        Ok(())
    }

    fn parse_text_body(&mut self, tag: String, start: usize) -> Result<TextBody> {
        let mut body_properties = None;
        let mut list_style = None;
        let mut paragraphs = Vec::new();
        loop {
            let pos = self.pos();
            match self.reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"bodyPr" => body_properties = Some(self.capture(pos, &e, false)?),
                    b"lstStyle" => list_style = Some(self.capture(pos, &e, false)?),
                    b"p" => paragraphs.push(self.parse_paragraph()?),
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"bodyPr" => body_properties = Some(self.capture(pos, &e, true)?),
                    b"lstStyle" => list_style = Some(self.capture(pos, &e, true)?),
                    b"p" => paragraphs.push(Paragraph::default()),
                    _ => {},
                },
                Event::End(_) => break,
                Event::Eof => return Err(Error::Xml("unterminated text body".into())),
                _ => {},
            }
        }
        Ok(TextBody::from_parts(
            tag,
            start..self.pos(),
            body_properties,
            list_style,
            paragraphs,
        ))
    }

    fn parse_paragraph(&mut self) -> Result<Paragraph> {
        let mut paragraph = Paragraph::default();
        loop {
            let pos = self.pos();
            match self.reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"pPr" => paragraph.properties_xml = Some(self.capture(pos, &e, false)?),
                    b"endParaRPr" => {
                        paragraph.end_properties_xml = Some(self.capture(pos, &e, false)?)
                    },
                    b"r" => paragraph.runs.push(self.parse_run(RunKind::Text, pos)?),
                    b"fld" => paragraph.runs.push(self.parse_run(RunKind::Field, pos)?),
                    b"br" => paragraph.runs.push(self.parse_run(RunKind::Break, pos)?),
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"pPr" => paragraph.properties_xml = Some(self.capture(pos, &e, true)?),
                    b"endParaRPr" => {
                        paragraph.end_properties_xml = Some(self.capture(pos, &e, true)?)
                    },
                    b"br" => paragraph.runs.push(TextRun {
                        kind: RunKind::Break,
                        text: "\n".to_string(),
                        properties: RunProperties::default(),
                        raw: Some(self.xml[pos..self.pos()].to_string()),
                    }),
                    _ => {},
                },
                Event::End(_) => break,
                Event::Eof => return Err(Error::Xml("unterminated a:p".into())),
                _ => {},
            }
        }
        Ok(paragraph)
    }

    /// Parse `a:r`, `a:fld` or `a:br` whose start tag began at `start`.
    fn parse_run(&mut self, kind: RunKind, start: usize) -> Result<TextRun> {
        let mut text = String::new();
        let mut properties = RunProperties::default();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"rPr" => {
                        properties = run_properties_attrs(&e);
                        self.parse_run_property_children(&mut properties)?;
                    },
                    b"t" => text.push_str(&self.read_text()?),
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) if e.local_name().as_ref() == b"rPr" => {
                    properties = run_properties_attrs(&e);
                },
                Event::End(_) => break,
                Event::Eof => return Err(Error::Xml("unterminated run".into())),
                _ => {},
            }
        }
        if kind == RunKind::Break {
            text = "\n".to_string();
        }
        Ok(TextRun {
            kind,
            text,
            properties,
            raw: Some(self.xml[start..self.pos()].to_string()),
        })
    }

    /// Read character content up to the end of the current `a:t`.
    fn read_text(&mut self) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(e) => text.push_str(&unescape_xml(std::str::from_utf8(e.as_ref())?)),
                Event::GeneralRef(e) => match resolve_entity(&e) {
                    Some(c) => text.push(c),
                    None => {
                        text.push('&');
                        text.push_str(&String::from_utf8_lossy(&e));
                        text.push(';');
                    },
                },
                Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
                Event::End(_) => break,
                Event::Eof => return Err(Error::Xml("unterminated a:t".into())),
                _ => {},
            }
        }
        Ok(text)
    }

    /// Read the children of `a:rPr`: the direct fill and the typefaces.
    fn parse_run_property_children(&mut self, props: &mut RunProperties) -> Result<()> {
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"solidFill" => props.color = self.parse_solid_fill()?,
                    b"latin" => {
                        props.latin = attr(&e, b"typeface");
                        self.skip(&e)?;
                    },
                    b"ea" => {
                        props.east_asian = attr(&e, b"typeface");
                        self.skip(&e)?;
                    },
                    // Outline, highlight and other fills do not define the glyph color
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"latin" => props.latin = attr(&e, b"typeface"),
                    b"ea" => props.east_asian = attr(&e, b"typeface"),
                    _ => {},
                },
                Event::End(_) => break,
                Event::Eof => return Err(Error::Xml("unterminated a:rPr".into())),
                _ => {},
            }
        }
        Ok(())
    }

    fn parse_solid_fill(&mut self) -> Result<ColorValue> {
        let mut color = ColorValue::Absent;
        loop {
            match self.reader.read_event()? {
                Event::Empty(e) => {
                    if color.is_absent() {
                        color = color_element(&e);
                    }
                },
                Event::Start(e) => {
                    let mut parsed = color_element(&e);
                    let transforms = self.parse_color_transforms()?;
                    if let ColorValue::Theme(ref mut scheme) = parsed {
                        scheme.transforms.extend(transforms);
                    }
                    if color.is_absent() {
                        color = parsed;
                    }
                },
                Event::End(_) => break,
                Event::Eof => return Err(Error::Xml("unterminated a:solidFill".into())),
                _ => {},
            }
        }
        Ok(color)
    }

    fn parse_color_transforms(&mut self) -> Result<Vec<ColorTransform>> {
        let mut transforms = Vec::new();
        loop {
            match self.reader.read_event()? {
                Event::Empty(e) => transforms.push(ColorTransform {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    val: attr(&e, b"val").unwrap_or_default(),
                }),
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => break,
                Event::Eof => return Err(Error::Xml("unterminated color element".into())),
                _ => {},
            }
        }
        Ok(transforms)
    }
}

/// Map a DrawingML color element to a [`ColorValue`], ignoring modifiers.
fn color_element(e: &BytesStart<'_>) -> ColorValue {
    match e.local_name().as_ref() {
        b"srgbClr" => match attr(e, b"val").as_deref().and_then(RGBColor::from_hex) {
            Some(rgb) => ColorValue::Rgb(rgb),
            None => ColorValue::Unsupported("srgbClr".to_string()),
        },
        b"schemeClr" => ColorValue::Theme(SchemeColor::new(attr(e, b"val").unwrap_or_default())),
        b"prstClr" => ColorValue::Preset(attr(e, b"val").unwrap_or_default()),
        other => ColorValue::Unsupported(String::from_utf8_lossy(other).into_owned()),
    }
}

fn new_cell(e: &BytesStart<'_>) -> TableCell {
    TableCell {
        body: TextBody::new("a:txBody"),
        grid_span: attr(e, b"gridSpan").and_then(|v| v.parse().ok()).unwrap_or(1),
        row_span: attr(e, b"rowSpan").and_then(|v| v.parse().ok()).unwrap_or(1),
        h_merge: attr_bool(e, b"hMerge").unwrap_or(false),
        v_merge: attr_bool(e, b"vMerge").unwrap_or(false),
    }
}

fn run_properties_attrs(e: &BytesStart<'_>) -> RunProperties {
    RunProperties {
        lang: attr(e, b"lang"),
        size: attr(e, b"sz").and_then(|v| v.parse().ok()),
        bold: attr_bool(e, b"b"),
        italic: attr_bool(e, b"i"),
        underline: attr(e, b"u"),
        ..Default::default()
    }
}

fn c_nv_pr(e: &BytesStart<'_>) -> (u32, String) {
    let id = attr(e, b"id").and_then(|v| v.parse().ok()).unwrap_or(0);
    (id, attr(e, b"name").unwrap_or_default())
}

fn point(e: &BytesStart<'_>, a: &[u8], b: &[u8]) -> (i64, i64) {
    (attr_i64(e, a).unwrap_or(0), attr_i64(e, b).unwrap_or(0))
}

/// Unprefixed attribute value, unescaped.
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| unescape_xml(&String::from_utf8_lossy(&a.value)))
}

fn attr_i64(e: &BytesStart<'_>, key: &[u8]) -> Option<i64> {
    attr(e, key).and_then(|v| v.trim().parse().ok())
}

fn attr_bool(e: &BytesStart<'_>, key: &[u8]) -> Option<bool> {
    match attr(e, key)?.as_str() {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}
