/// Base shape types for PowerPoint slides.
use crate::ooxml::pptx::shapes::table::TableShape;
use crate::ooxml::pptx::shapes::textframe::TextBody;
use smallvec::SmallVec;

/// Kind of a text-bearing `p:sp` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeType {
    /// A text box (`p:cNvSpPr txBox="1"`)
    TextBox,
    /// Any other auto shape (rectangle, callout, ...)
    AutoShape,
    /// A placeholder; carries the `p:ph type` attribute (`body` when absent)
    Placeholder(String),
}

impl ShapeType {
    /// Type name as written into extracted metadata.
    pub fn as_str(&self) -> &str {
        match self {
            Self::TextBox => "TEXT_BOX",
            Self::AutoShape => "AUTO_SHAPE",
            Self::Placeholder(_) => "PLACEHOLDER",
        }
    }
}

/// Shape geometry in slide EMUs.
///
/// Members of groups are already mapped out of the group's child
/// coordinate space, so every geometry is directly comparable to the slide
/// size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    /// X position in EMUs
    pub x: i64,
    /// Y position in EMUs
    pub y: i64,
    /// Width in EMUs
    pub cx: i64,
    /// Height in EMUs
    pub cy: i64,
}

impl Geometry {
    /// Create a geometry from offset and extent.
    #[inline]
    pub const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }
}

/// Mapping from a group's child coordinate space into its parent's space.
///
/// Built from the group's `a:off`/`a:ext` and `a:chOff`/`a:chExt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupTransform {
    offset: (f64, f64),
    child_offset: (f64, f64),
    scale: (f64, f64),
}

impl GroupTransform {
    /// The identity mapping used at slide level.
    pub const IDENTITY: Self = Self {
        offset: (0.0, 0.0),
        child_offset: (0.0, 0.0),
        scale: (1.0, 1.0),
    };

    /// Build a mapping from a group's frame and child frame.
    ///
    /// A zero child extent keeps the scale at 1 on that axis.
    pub fn new(frame: Geometry, child: Geometry) -> Self {
        let scale_x = if child.cx != 0 {
            frame.cx as f64 / child.cx as f64
        } else {
            1.0
        };
        let scale_y = if child.cy != 0 {
            frame.cy as f64 / child.cy as f64
        } else {
            1.0
        };
        Self {
            offset: (frame.x as f64, frame.y as f64),
            child_offset: (child.x as f64, child.y as f64),
            scale: (scale_x, scale_y),
        }
    }

    /// Compose `self` (outer) with `inner`, yielding the mapping from the
    /// inner group's child space straight into the outer parent space.
    pub fn then(&self, inner: &GroupTransform) -> GroupTransform {
        // inner maps child -> outer-child space; self maps outer-child -> parent
        let (ox, oy) = self.map_point(inner.offset.0, inner.offset.1);
        GroupTransform {
            offset: (ox, oy),
            child_offset: inner.child_offset,
            scale: (self.scale.0 * inner.scale.0, self.scale.1 * inner.scale.1),
        }
    }

    fn map_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.offset.0 + (x - self.child_offset.0) * self.scale.0,
            self.offset.1 + (y - self.child_offset.1) * self.scale.1,
        )
    }

    /// Map a geometry expressed in child coordinates into parent coordinates.
    pub fn apply(&self, g: Geometry) -> Geometry {
        let (x, y) = self.map_point(g.x as f64, g.y as f64);
        Geometry {
            x: x.round() as i64,
            y: y.round() as i64,
            cx: (g.cx as f64 * self.scale.0).round() as i64,
            cy: (g.cy as f64 * self.scale.1).round() as i64,
        }
    }
}

/// A text-bearing shape (`p:sp`).
#[derive(Debug, Clone)]
pub struct TextShape {
    /// `cNvPr id`
    pub id: u32,
    /// `cNvPr name`
    pub name: String,
    /// Geometry in slide EMUs; `None` when the shape inherits its frame
    pub geometry: Option<Geometry>,
    /// Shape kind
    pub shape_type: ShapeType,
    /// Text body, if the shape has one
    pub body: Option<TextBody>,
}

impl TextShape {
    /// Text of the shape's body, empty when it has none.
    pub fn text(&self) -> String {
        self.body.as_ref().map(TextBody::text).unwrap_or_default()
    }
}

/// A group of shapes (`p:grpSp`).
#[derive(Debug, Clone)]
pub struct GroupShape {
    /// `cNvPr id`
    pub id: u32,
    /// `cNvPr name`
    pub name: String,
    /// Group frame in slide EMUs
    pub geometry: Option<Geometry>,
    /// Member shapes in document order
    pub children: Vec<ShapeNode>,
}

/// A node of a slide's shape tree.
///
/// Pictures, connectors and other shapes that never carry text are not
/// represented.
#[derive(Debug, Clone)]
pub enum ShapeNode {
    /// Text box, auto shape or placeholder
    Text(TextShape),
    /// Graphic frame holding a DrawingML table
    Table(TableShape),
    /// Group of shapes
    Group(GroupShape),
}

impl ShapeNode {
    /// `cNvPr id` of the node.
    pub fn id(&self) -> u32 {
        match self {
            Self::Text(s) => s.id,
            Self::Table(t) => t.id,
            Self::Group(g) => g.id,
        }
    }

    /// `cNvPr name` of the node.
    pub fn name(&self) -> &str {
        match self {
            Self::Text(s) => &s.name,
            Self::Table(t) => &t.name,
            Self::Group(g) => &g.name,
        }
    }

    /// Geometry of the node in slide EMUs.
    pub fn geometry(&self) -> Option<Geometry> {
        match self {
            Self::Text(s) => s.geometry,
            Self::Table(t) => t.geometry,
            Self::Group(g) => g.geometry,
        }
    }
}

/// Address of a text body inside a slide's shape tree.
///
/// `nodes` holds the child index at each level, starting at the slide's
/// top-level shape list; `cell` holds a zero-based `(row, col)` when the
/// addressed node is a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShapePath {
    /// Child indices from the slide's shape list downward
    pub nodes: SmallVec<[usize; 4]>,
    /// Zero-based cell coordinate for table nodes
    pub cell: Option<(usize, usize)>,
}

impl ShapePath {
    /// Path to a top-level shape.
    pub fn top(index: usize) -> Self {
        let mut nodes = SmallVec::new();
        nodes.push(index);
        Self { nodes, cell: None }
    }

    /// Path to a child of the node this path addresses.
    pub fn child(&self, index: usize) -> Self {
        let mut nodes = self.nodes.clone();
        nodes.push(index);
        Self { nodes, cell: None }
    }

    /// Path to a cell of the table this path addresses.
    pub fn with_cell(&self, row: usize, col: usize) -> Self {
        Self {
            nodes: self.nodes.clone(),
            cell: Some((row, col)),
        }
    }

    /// Nesting depth of the addressed node (0 = slide level).
    #[inline]
    pub fn depth(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Resolve `path` against `shapes` to the addressed text body.
pub fn text_body<'a>(shapes: &'a [ShapeNode], path: &ShapePath) -> Option<&'a TextBody> {
    let (last, parents) = path.nodes.split_last()?;
    let mut level = shapes;
    for &idx in parents {
        match level.get(idx)? {
            ShapeNode::Group(g) => level = g.children.as_slice(),
            _ => return None,
        }
    }
    match (level.get(*last)?, path.cell) {
        (ShapeNode::Text(s), None) => s.body.as_ref(),
        (ShapeNode::Table(t), Some((row, col))) => t.table.cell(row, col).map(|c| &c.body),
        _ => None,
    }
}

/// Mutable counterpart of [`text_body`].
pub fn text_body_mut<'a>(
    shapes: &'a mut [ShapeNode],
    path: &ShapePath,
) -> Option<&'a mut TextBody> {
    let (last, parents) = path.nodes.split_last()?;
    let mut level = shapes;
    for &idx in parents {
        match level.get_mut(idx)? {
            ShapeNode::Group(g) => level = g.children.as_mut_slice(),
            _ => return None,
        }
    }
    match (level.get_mut(*last)?, path.cell) {
        (ShapeNode::Text(s), None) => s.body.as_mut(),
        (ShapeNode::Table(t), Some((row, col))) => {
            t.table.cell_mut(row, col).map(|c| &mut c.body)
        },
        _ => None,
    }
}

/// Visit every text body of a shape list in document order.
pub(crate) fn for_each_body<'a>(shapes: &'a [ShapeNode], f: &mut dyn FnMut(&'a TextBody)) {
    for node in shapes {
        match node {
            ShapeNode::Text(s) => {
                if let Some(body) = &s.body {
                    f(body);
                }
            },
            ShapeNode::Table(t) => {
                for row in &t.table.rows {
                    for cell in &row.cells {
                        f(&cell.body);
                    }
                }
            },
            ShapeNode::Group(g) => for_each_body(&g.children, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::table::{Table, TableCell, TableRow};

    fn text_node(id: u32, text: &str) -> ShapeNode {
        let mut body = TextBody::new("p:txBody");
        body.set_single_run(text, Default::default());
        ShapeNode::Text(TextShape {
            id,
            name: format!("TextBox {id}"),
            geometry: None,
            shape_type: ShapeType::TextBox,
            body: Some(body),
        })
    }

    #[test]
    fn test_group_transform_maps_child_space() {
        let t = GroupTransform::new(
            Geometry::new(1_000, 2_000, 4_000, 2_000),
            Geometry::new(0, 0, 2_000, 1_000),
        );
        let g = t.apply(Geometry::new(500, 500, 1_000, 500));
        assert_eq!(g, Geometry::new(2_000, 3_000, 2_000, 1_000));
    }

    #[test]
    fn test_group_transform_composes() {
        let outer = GroupTransform::new(
            Geometry::new(100, 100, 200, 200),
            Geometry::new(0, 0, 100, 100),
        );
        let inner = GroupTransform::new(
            Geometry::new(10, 10, 50, 50),
            Geometry::new(0, 0, 50, 50),
        );
        let composed = outer.then(&inner);
        let direct = outer.apply(inner.apply(Geometry::new(5, 5, 10, 10)));
        assert_eq!(composed.apply(Geometry::new(5, 5, 10, 10)), direct);
        assert_eq!(GroupTransform::IDENTITY.apply(direct), direct);
    }

    #[test]
    fn test_path_resolution_through_groups_and_tables() {
        let table = TableShape {
            id: 9,
            name: "Table 1".to_string(),
            geometry: None,
            table: Table {
                columns: vec![100, 100],
                rows: vec![TableRow {
                    height: 50,
                    cells: vec![TableCell::with_text("a"), TableCell::with_text("b")],
                }],
            },
        };
        let mut shapes = vec![
            text_node(2, "Title"),
            ShapeNode::Group(GroupShape {
                id: 3,
                name: "Group 3".to_string(),
                geometry: None,
                children: vec![text_node(4, "Inner"), ShapeNode::Table(table)],
            }),
        ];

        let inner = ShapePath::top(1).child(0);
        assert_eq!(inner.depth(), 1);
        assert_eq!(text_body(&shapes, &inner).unwrap().text(), "Inner");

        let cell = ShapePath::top(1).child(1).with_cell(0, 1);
        text_body_mut(&mut shapes, &cell)
            .unwrap()
            .set_single_run("B", Default::default());
        assert_eq!(text_body(&shapes, &cell).unwrap().text(), "B");

        assert!(text_body(&shapes, &ShapePath::top(0).child(0)).is_none());
        assert!(text_body(&shapes, &ShapePath::top(5)).is_none());

        let mut count = 0;
        for_each_body(&shapes, &mut |_| count += 1);
        assert_eq!(count, 4);
    }
}
