/// Shapes module for PowerPoint slides.
///
/// This module provides the typed shape tree of a slide:
/// - Text shapes (text boxes, auto shapes, placeholders) with text bodies
/// - Tables inside graphic frames
/// - Groups, with member geometry already mapped into slide space
pub mod base;
pub mod table;
pub mod textframe;

pub use base::{
    Geometry, GroupShape, GroupTransform, ShapeNode, ShapePath, ShapeType, TextShape, text_body,
    text_body_mut,
};
pub use table::{Table, TableCell, TableRow, TableShape};
pub use textframe::{Paragraph, RunKind, RunProperties, TextBody, TextRun};
