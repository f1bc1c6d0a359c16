//! Text body serialization.
//!
//! Bodies are written back as a whole: preserved property elements are
//! emitted verbatim, untouched runs reuse their original XML and new runs
//! are built from their [`RunProperties`].
use crate::common::error::{Error, Result};
use crate::common::style::ColorValue;
use crate::common::xml::escape_xml;
use crate::ooxml::pptx::shapes::textframe::{Paragraph, RunKind, RunProperties, TextBody, TextRun};
use std::fmt::Write as FmtWrite;

/// Serialize a text body, including its enclosing element.
pub(crate) fn write_text_body(body: &TextBody, xml: &mut String) -> Result<()> {
    let tag = body.tag();
    write!(xml, "<{}>", tag).map_err(|e| Error::Xml(e.to_string()))?;

    match body.body_properties_xml.as_deref() {
        Some(raw) => xml.push_str(raw),
        None => xml.push_str("<a:bodyPr/>"),
    }
    if let Some(raw) = body.list_style_xml.as_deref() {
        xml.push_str(raw);
    }

    if body.paragraphs.is_empty() {
        // A text body must hold at least one paragraph
        xml.push_str("<a:p/>");
    }
    for paragraph in &body.paragraphs {
        write_paragraph(paragraph, xml)?;
    }

    write!(xml, "</{}>", tag).map_err(|e| Error::Xml(e.to_string()))?;
    Ok(())
}

fn write_paragraph(paragraph: &Paragraph, xml: &mut String) -> Result<()> {
    xml.push_str("<a:p>");
    if let Some(raw) = paragraph.properties_xml.as_deref() {
        xml.push_str(raw);
    }
    for run in &paragraph.runs {
        write_run(run, xml)?;
    }
    if let Some(raw) = paragraph.end_properties_xml.as_deref() {
        xml.push_str(raw);
    }
    xml.push_str("</a:p>");
    Ok(())
}

fn write_run(run: &TextRun, xml: &mut String) -> Result<()> {
    if let Some(raw) = run.raw.as_deref() {
        xml.push_str(raw);
        return Ok(());
    }

    match run.kind {
        RunKind::Break => {
            xml.push_str("<a:br>");
            write_run_properties(&run.properties, xml)?;
            xml.push_str("</a:br>");
        },
        // Fields are never created from scratch; a detached field is written
        // as plain text
        RunKind::Text | RunKind::Field => {
            xml.push_str("<a:r>");
            write_run_properties(&run.properties, xml)?;
            write!(xml, "<a:t>{}</a:t>", escape_xml(&run.text))
                .map_err(|e| Error::Xml(e.to_string()))?;
            xml.push_str("</a:r>");
        },
    }
    Ok(())
}

/// Write an `a:rPr` element.
///
/// Child order follows the DrawingML schema: fill before typefaces.
pub(crate) fn write_run_properties(props: &RunProperties, xml: &mut String) -> Result<()> {
    xml.push_str("<a:rPr");

    if let Some(ref lang) = props.lang {
        write!(xml, " lang=\"{}\"", escape_xml(lang)).map_err(|e| Error::Xml(e.to_string()))?;
    }

    if let Some(size) = props.size {
        write!(xml, " sz=\"{}\"", size).map_err(|e| Error::Xml(e.to_string()))?;
    }

    if let Some(bold) = props.bold {
        xml.push_str(if bold { " b=\"1\"" } else { " b=\"0\"" });
    }

    if let Some(italic) = props.italic {
        xml.push_str(if italic { " i=\"1\"" } else { " i=\"0\"" });
    }

    if let Some(ref underline) = props.underline {
        write!(xml, " u=\"{}\"", escape_xml(underline)).map_err(|e| Error::Xml(e.to_string()))?;
    }

    xml.push_str(" dirty=\"0\">");

    write_color(&props.color, xml)?;

    if let Some(ref font) = props.latin {
        write!(xml, "<a:latin typeface=\"{}\"/>", escape_xml(font))
            .map_err(|e| Error::Xml(e.to_string()))?;
    }

    if let Some(ref font) = props.east_asian {
        write!(xml, "<a:ea typeface=\"{}\"/>", escape_xml(font))
            .map_err(|e| Error::Xml(e.to_string()))?;
    }

    xml.push_str("</a:rPr>");
    Ok(())
}

fn write_color(color: &ColorValue, xml: &mut String) -> Result<()> {
    match color {
        ColorValue::Rgb(rgb) => {
            write!(
                xml,
                "<a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>",
                rgb.to_hex()
            )
            .map_err(|e| Error::Xml(e.to_string()))?;
        },
        ColorValue::Theme(scheme) => {
            xml.push_str("<a:solidFill>");
            if scheme.transforms.is_empty() {
                write!(xml, "<a:schemeClr val=\"{}\"/>", escape_xml(&scheme.name))
                    .map_err(|e| Error::Xml(e.to_string()))?;
            } else {
                write!(xml, "<a:schemeClr val=\"{}\">", escape_xml(&scheme.name))
                    .map_err(|e| Error::Xml(e.to_string()))?;
                for t in &scheme.transforms {
                    write!(xml, "<a:{} val=\"{}\"/>", t.name, escape_xml(&t.val))
                        .map_err(|e| Error::Xml(e.to_string()))?;
                }
                xml.push_str("</a:schemeClr>");
            }
            xml.push_str("</a:solidFill>");
        },
        // Not reconstructible; callers resolve these to RGB before writing
        ColorValue::Preset(_) | ColorValue::Unsupported(_) | ColorValue::Absent => {},
    }
    Ok(())
}
