/// Uniform, read-only views over a slide's shape tree.
///
/// Text boxes, table cells and group members all flatten into
/// [`ElementView`]s carrying text, slide-relative position and nesting
/// depth. Views borrow nothing: the [`ShapePath`] they carry is the handle
/// used to reach the element again for mutation.
use crate::common::unit::emu_to_percent;
use crate::fill::options::FillOptions;
use crate::ooxml::pptx::shapes::{Geometry, ShapeNode, ShapePath, Table};
use serde::{Deserialize, Serialize};

/// Bounding box as percentages of the slide size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Distance from the left slide edge
    #[serde(rename = "left")]
    pub left_percent: f64,
    /// Distance from the top slide edge
    #[serde(rename = "top")]
    pub top_percent: f64,
    /// Width
    #[serde(rename = "width")]
    pub width_percent: f64,
    /// Height
    #[serde(rename = "height")]
    pub height_percent: f64,
}

impl Position {
    /// Convert an EMU geometry against the slide size.
    pub fn from_geometry(g: Geometry, slide_width: i64, slide_height: i64) -> Self {
        Self {
            left_percent: emu_to_percent(g.x, slide_width),
            top_percent: emu_to_percent(g.y, slide_height),
            width_percent: emu_to_percent(g.cx, slide_width),
            height_percent: emu_to_percent(g.cy, slide_height),
        }
    }

    /// Both dimensions within the small bounds.
    #[inline]
    pub fn is_small(&self, options: &FillOptions) -> bool {
        self.width_percent <= options.small_width_percent
            && self.height_percent <= options.small_height_percent
    }

    /// Either dimension within the small bounds.
    #[inline]
    pub fn is_small_either(&self, options: &FillOptions) -> bool {
        self.width_percent <= options.small_width_percent
            || self.height_percent <= options.small_height_percent
    }
}

/// What kind of document object an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Text box, auto shape or placeholder
    TextShape,
    /// A cell of a table; coordinates are 1-based
    TableCell {
        row: usize,
        col: usize,
        total_rows: usize,
        total_cols: usize,
    },
    /// A group container
    Group,
}

/// A flattened shape-tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementView {
    /// Element kind
    pub kind: ElementKind,
    /// Paragraph-preserving, trimmed text (empty for groups)
    pub text: String,
    /// Slide-relative bounding box; `None` for inherited placeholder frames
    pub position: Option<Position>,
    /// Nesting level, 0 at slide level
    pub depth: usize,
    /// `cNvPr id` of the enclosing group, if any
    pub parent_group_id: Option<u32>,
    /// Index of the enclosing top-level group in the slide's shape list
    pub top_level_group: Option<usize>,
    /// Address of the element in the shape tree
    pub path: ShapePath,
    /// `cNvPr id` of the shape (the table's id for cells)
    pub shape_id: u32,
    /// `cNvPr name` of the shape
    pub name: String,
    /// Metadata type name: `TEXT_BOX`, `AUTO_SHAPE`, `PLACEHOLDER`, `TABLE_CELL`, `GROUP`
    pub type_name: &'static str,
}

impl ElementView {
    /// Whether the element is a text box, auto shape or placeholder.
    #[inline]
    pub fn is_text_shape(&self) -> bool {
        self.kind == ElementKind::TextShape
    }

    /// Whether the element is a table cell.
    #[inline]
    pub fn is_table_cell(&self) -> bool {
        matches!(self.kind, ElementKind::TableCell { .. })
    }

    /// Small on both axes; elements without a position are never small.
    pub fn is_small(&self, options: &FillOptions) -> bool {
        self.position.is_some_and(|p| p.is_small(options))
    }

    /// Position or the origin when the frame is inherited.
    #[inline]
    pub fn position_or_origin(&self) -> Position {
        self.position.unwrap_or_default()
    }
}

/// Flatten a shape list into element views, depth first in document order.
///
/// Groups are emitted before their members; table cells follow their
/// table in row-major order.
pub fn element_views(shapes: &[ShapeNode], slide_width: i64, slide_height: i64) -> Vec<ElementView> {
    let mut out = Vec::new();
    let mut walker = Walker {
        slide_width,
        slide_height,
        out: &mut out,
    };
    for (idx, node) in shapes.iter().enumerate() {
        let top_level_group = matches!(node, ShapeNode::Group(_)).then_some(idx);
        walker.visit(node, ShapePath::top(idx), None, top_level_group);
    }
    out
}

struct Walker<'a> {
    slide_width: i64,
    slide_height: i64,
    out: &'a mut Vec<ElementView>,
}

impl Walker<'_> {
    fn position(&self, geometry: Option<Geometry>) -> Option<Position> {
        geometry.map(|g| Position::from_geometry(g, self.slide_width, self.slide_height))
    }

    fn visit(
        &mut self,
        node: &ShapeNode,
        path: ShapePath,
        parent_group_id: Option<u32>,
        top_level_group: Option<usize>,
    ) {
        let depth = path.depth();
        match node {
            ShapeNode::Text(shape) => {
                let view = ElementView {
                    kind: ElementKind::TextShape,
                    text: shape.text(),
                    position: self.position(shape.geometry),
                    depth,
                    parent_group_id,
                    top_level_group,
                    path,
                    shape_id: shape.id,
                    name: shape.name.clone(),
                    type_name: static_type_name(shape.shape_type.as_str()),
                };
                self.out.push(view);
            },
            ShapeNode::Table(frame) => {
                self.visit_table(
                    &frame.table,
                    frame.geometry,
                    frame.id,
                    &frame.name,
                    &path,
                    depth,
                    parent_group_id,
                    top_level_group,
                );
            },
            ShapeNode::Group(group) => {
                self.out.push(ElementView {
                    kind: ElementKind::Group,
                    text: String::new(),
                    position: self.position(group.geometry),
                    depth,
                    parent_group_id,
                    top_level_group,
                    path: path.clone(),
                    shape_id: group.id,
                    name: group.name.clone(),
                    type_name: "GROUP",
                });
                for (idx, child) in group.children.iter().enumerate() {
                    self.visit(child, path.child(idx), Some(group.id), top_level_group);
                }
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn visit_table(
        &mut self,
        table: &Table,
        frame: Option<Geometry>,
        id: u32,
        name: &str,
        path: &ShapePath,
        depth: usize,
        parent_group_id: Option<u32>,
        top_level_group: Option<usize>,
    ) {
        let total_rows = table.row_count();
        let total_cols = table.column_count();
        for (r, row) in table.rows.iter().enumerate() {
            for (c, cell) in row.cells.iter().enumerate() {
                let geometry = frame.and_then(|f| table.cell_geometry(f, r, c));
                self.out.push(ElementView {
                    kind: ElementKind::TableCell {
                        row: r + 1,
                        col: c + 1,
                        total_rows,
                        total_cols,
                    },
                    text: cell.text(),
                    position: self.position(geometry),
                    depth,
                    parent_group_id,
                    top_level_group,
                    path: path.with_cell(r, c),
                    shape_id: id,
                    name: name.to_string(),
                    type_name: "TABLE_CELL",
                });
            }
        }
    }
}

fn static_type_name(name: &str) -> &'static str {
    match name {
        "TEXT_BOX" => "TEXT_BOX",
        "PLACEHOLDER" => "PLACEHOLDER",
        _ => "AUTO_SHAPE",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::{
        GroupShape, ShapeType, TableCell, TableRow, TableShape, TextBody, TextShape,
    };

    pub(crate) const W: i64 = 10_000;
    pub(crate) const H: i64 = 10_000;

    /// Text shape at a geometry given in percent of a 10000x10000 slide.
    pub(crate) fn text_at(id: u32, text: &str, l: i64, t: i64, w: i64, h: i64) -> ShapeNode {
        let mut body = TextBody::new("p:txBody");
        if !text.is_empty() {
            body.set_single_run(text, Default::default());
        }
        ShapeNode::Text(TextShape {
            id,
            name: format!("TextBox {id}"),
            geometry: Some(Geometry::new(l * 100, t * 100, w * 100, h * 100)),
            shape_type: ShapeType::TextBox,
            body: Some(body),
        })
    }

    pub(crate) fn group(id: u32, children: Vec<ShapeNode>) -> ShapeNode {
        ShapeNode::Group(GroupShape {
            id,
            name: format!("Group {id}"),
            geometry: Some(Geometry::new(0, 0, W, H)),
            children,
        })
    }

    pub(crate) fn table(id: u32, cells: &[&[&str]]) -> ShapeNode {
        let cols = cells.first().map_or(0, |r| r.len());
        ShapeNode::Table(TableShape {
            id,
            name: format!("Table {id}"),
            geometry: Some(Geometry::new(1_000, 5_000, 8_000, 4_000)),
            table: Table {
                columns: vec![8_000 / cols.max(1) as i64; cols],
                rows: cells
                    .iter()
                    .map(|row| TableRow {
                        height: 4_000 / cells.len() as i64,
                        cells: row.iter().map(|t| TableCell::with_text(t)).collect(),
                    })
                    .collect(),
            },
        })
    }

    #[test]
    fn test_flatten_order_and_depth() {
        let shapes = vec![
            text_at(2, "Title", 10, 5, 80, 10),
            group(
                3,
                vec![
                    text_at(4, "Inner", 10, 40, 30, 10),
                    group(5, vec![text_at(6, "Deep", 0, 0, 5, 5)]),
                ],
            ),
            table(7, &[&["a", "b"], &["c", "d"]]),
        ];
        let views = element_views(&shapes, W, H);
        let texts: Vec<&str> = views.iter().map(|v| v.text.as_str()).collect();
        assert_eq!(texts, ["Title", "", "Inner", "", "Deep", "a", "b", "c", "d"]);

        let deep = &views[4];
        assert_eq!(deep.depth, 2);
        assert_eq!(deep.parent_group_id, Some(5));
        assert_eq!(deep.top_level_group, Some(1));
        assert_eq!(deep.path, ShapePath::top(1).child(1).child(0));

        let cell = &views[7];
        assert_eq!(
            cell.kind,
            ElementKind::TableCell {
                row: 2,
                col: 1,
                total_rows: 2,
                total_cols: 2
            }
        );
        assert_eq!(cell.path, ShapePath::top(2).with_cell(1, 0));
        assert_eq!(cell.type_name, "TABLE_CELL");
        assert_eq!(views[0].top_level_group, None);
    }

    #[test]
    fn test_positions_are_slide_relative() {
        let views = element_views(&[text_at(2, "x", 10, 20, 30, 5)], W, H);
        let p = views[0].position.unwrap();
        assert_eq!(p.left_percent, 10.0);
        assert_eq!(p.top_percent, 20.0);
        assert_eq!(p.width_percent, 30.0);
        assert_eq!(p.height_percent, 5.0);

        let views = element_views(&[text_at(2, "x", 10, 20, 30, 5)], W * 2, H * 2);
        assert_eq!(views[0].position.unwrap().left_percent, 5.0);
    }

    #[test]
    fn test_small_predicates() {
        let options = FillOptions::default();
        let wide_thin = Position {
            width_percent: 50.0,
            height_percent: 5.0,
            ..Default::default()
        };
        assert!(!wide_thin.is_small(&options));
        assert!(wide_thin.is_small_either(&options));

        let mut view = element_views(&[text_at(2, "Tag", 0, 0, 8, 4)], W, H).remove(0);
        assert!(view.is_small(&options));
        view.position = None;
        assert!(!view.is_small(&options));
        assert_eq!(view.position_or_origin(), Position::default());
    }
}
