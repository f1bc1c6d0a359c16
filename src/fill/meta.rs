/// Template schema extraction.
///
/// The labeling pass walks a deck and writes one [`FieldRecord`] per
/// text-bearing element. Role names come from a [`RoleNamer`]; the
/// default [`LayoutRoleNamer`] derives them from the element's place on the
/// slide, so extraction works without any external service.
///
/// The ordinal written into each record is the one the [`Resolver`] needs
/// to land on that very element, so filling a deck with its own extracted
/// schema touches every element exactly once.
use crate::common::error::Result;
use crate::fill::element::{ElementKind, ElementView, Position, element_views};
use crate::fill::fingerprint::fingerprint;
use crate::fill::normalize::equivalent;
use crate::fill::options::FillOptions;
use crate::fill::resolve::Resolver;
use crate::fill::schema::{FieldRecord, TableInfo, TemplateSchema, TextValue};
use crate::fill::tag::{TagClass, TagType, classify};
use crate::ooxml::pptx::{Presentation, Slide};
use std::collections::HashMap;
use tracing::{debug, info};

/// Longest role name produced by [`LayoutRoleNamer`].
const MAX_ROLE_LEN: usize = 50;

/// What a role namer gets to see of an element.
#[derive(Debug, Clone)]
pub struct RoleRequest<'a> {
    /// 1-based slide number
    pub slide_number: usize,
    /// Element text
    pub text: &'a str,
    /// Slide-relative position
    pub position: Position,
    /// Type name: `TEXT_BOX`, `AUTO_SHAPE`, `PLACEHOLDER` or `TABLE`
    pub element_type: &'a str,
    /// Tag classification of the element
    pub tag: TagClass,
}

/// A role name and its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleName {
    pub role: String,
    pub description: String,
}

/// Assigns semantic role names to elements.
///
/// Implementations may be stateful; tag numbering, for one, lives in the
/// namer instance.
pub trait RoleNamer {
    /// Name the element described by `request`.
    fn name_role(&mut self, request: &RoleRequest<'_>) -> RoleName;
}

/// Role names from layout alone.
///
/// Tags become `<tag_type>_<n>`, numbers and lone symbols keep their text,
/// everything else is `<vertical>_<horizontal>_<size>_<function>`.
#[derive(Debug, Default)]
pub struct LayoutRoleNamer {
    tag_counters: HashMap<TagType, usize>,
}

impl LayoutRoleNamer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoleNamer for LayoutRoleNamer {
    fn name_role(&mut self, request: &RoleRequest<'_>) -> RoleName {
        let text = request.text.trim();
        let n = request.slide_number;

        if let (true, Some(tag_type)) = (request.tag.is_tag, request.tag.tag_type) {
            let count = self.tag_counters.entry(tag_type).or_insert(0);
            *count += 1;
            return RoleName {
                role: format!("{}_{}", tag_type, count),
                description: format!("Slide {n} {tag_type} element (text: '{text}')"),
            };
        }

        let digits_only = !text.is_empty() && text.chars().all(|c| c.is_ascii_digit());
        let lone_symbol = text.chars().count() <= 2 && !text.chars().all(char::is_alphanumeric);
        if digits_only || lone_symbol {
            return RoleName {
                role: text.to_string(),
                description: format!(
                    "Slide {n} special element at ({:.1}%, {:.1}%)",
                    request.position.left_percent, request.position.top_percent
                ),
            };
        }

        let layout = Layout::of(&request.position);
        let role: String = layout_role(&request.position, request.element_type)
            .chars()
            .take(MAX_ROLE_LEN)
            .collect();
        RoleName {
            role,
            description: format!(
                "Slide {n} {} {} element in the {} {} area",
                layout.size.describe(),
                describe_type(request.element_type),
                layout.vertical,
                layout.horizontal
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Size {
    Main,
    Sub,
    Detail,
}

impl Size {
    fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Sub => "sub",
            Self::Detail => "detail",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Main => "primary",
            Self::Sub => "secondary",
            Self::Detail => "detail",
        }
    }
}

/// Coarse placement of an element on the slide.
struct Layout {
    vertical: &'static str,
    horizontal: &'static str,
    size: Size,
}

impl Layout {
    fn of(p: &Position) -> Self {
        let vertical = if p.top_percent < 20.0 {
            "top"
        } else if p.top_percent > 70.0 {
            "bottom"
        } else {
            "middle"
        };
        let horizontal = if p.left_percent < 30.0 {
            "left"
        } else if p.left_percent > 60.0 {
            "right"
        } else {
            "center"
        };
        let size = if p.width_percent > 70.0 || p.height_percent > 30.0 {
            Size::Main
        } else if p.width_percent > 40.0 || p.height_percent > 15.0 {
            Size::Sub
        } else {
            Size::Detail
        };
        Self {
            vertical,
            horizontal,
            size,
        }
    }
}

/// Layout role of an element: `<vertical>_<horizontal>_<size>_<function>`.
///
/// Text boxes and placeholders get a function from their band: `title`
/// or `header` at the top, `footer` at the bottom, `content` elsewhere.
///
/// # Examples
///
/// ```rust
/// use deckfill::fill::{Position, layout_role};
///
/// let footer = Position { left_percent: 5.0, top_percent: 90.0, width_percent: 30.0, height_percent: 5.0 };
/// assert_eq!(layout_role(&footer, "TEXT_BOX"), "bottom_left_detail_footer");
/// ```
pub fn layout_role(position: &Position, element_type: &str) -> String {
    let layout = Layout::of(position);
    let function = match element_type {
        "TEXT_BOX" | "PLACEHOLDER" => match (layout.vertical, layout.size) {
            ("top", Size::Main | Size::Sub) => "title",
            ("top", Size::Detail) => "header",
            ("bottom", _) => "footer",
            _ => "content",
        },
        "AUTO_SHAPE" => "shape",
        "PICTURE" => "image",
        "GROUP" => "group",
        "TABLE" => "table",
        "CHART" => "chart",
        _ => "element",
    };
    format!(
        "{}_{}_{}_{}",
        layout.vertical,
        layout.horizontal,
        layout.size.as_str(),
        function
    )
}

fn describe_type(element_type: &str) -> &'static str {
    match element_type {
        "TEXT_BOX" | "PLACEHOLDER" => "text",
        "AUTO_SHAPE" => "shape",
        "TABLE" => "table",
        _ => "element",
    }
}

/// Builds a [`TemplateSchema`] from a presentation.
///
/// # Examples
///
/// ```no_run
/// use deckfill::fill::{FillOptions, MetaExtractor};
/// use deckfill::ooxml::pptx::Presentation;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let deck = Presentation::open("template.pptx")?;
/// let schema = MetaExtractor::new(FillOptions::default()).extract(&deck)?;
/// schema.save("schema.json")?;
/// # Ok(())
/// # }
/// ```
pub struct MetaExtractor<N: RoleNamer = LayoutRoleNamer> {
    options: FillOptions,
    namer: N,
}

impl MetaExtractor<LayoutRoleNamer> {
    /// Extractor with layout-based role names.
    pub fn new(options: FillOptions) -> Self {
        Self::with_namer(options, LayoutRoleNamer::new())
    }
}

impl<N: RoleNamer> MetaExtractor<N> {
    /// Extractor with a custom role namer.
    pub fn with_namer(options: FillOptions, namer: N) -> Self {
        Self { options, namer }
    }

    /// Consume the extractor, returning its namer.
    pub fn into_namer(self) -> N {
        self.namer
    }

    /// Extract one record per text-bearing element of every slide.
    pub fn extract(&mut self, presentation: &Presentation) -> Result<TemplateSchema> {
        self.options.validate()?;
        let mut state = ExtractState::default();
        let (width, height) = (presentation.slide_width(), presentation.slide_height());
        for slide in presentation.slides() {
            self.extract_slide(slide, width, height, &mut state)?;
        }
        info!(
            fields = state.schema.len(),
            slides = presentation.slide_count(),
            "schema extracted"
        );
        Ok(state.schema)
    }

    fn extract_slide(
        &mut self,
        slide: &Slide,
        width: i64,
        height: i64,
        state: &mut ExtractState,
    ) -> Result<()> {
        let views = element_views(slide.shapes(), width, height);
        let group_numbers: HashMap<usize, usize> = views
            .iter()
            .filter(|v| v.depth == 0 && v.kind == ElementKind::Group)
            .filter_map(|v| v.path.nodes.first().copied())
            .enumerate()
            .map(|(i, idx)| (idx, i + 1))
            .collect();
        let resolver = Resolver::new(&views, &self.options);

        for view in views.iter().filter(|v| v.kind != ElementKind::Group && !v.text.is_empty()) {
            let position = view.position_or_origin();
            let group_context = group_context(view, &group_numbers);
            let mut record = match view.kind {
                ElementKind::TableCell {
                    row,
                    col,
                    total_rows,
                    total_cols,
                } => {
                    let name = self.namer.name_role(&RoleRequest {
                        slide_number: slide.number(),
                        text: &view.text,
                        position,
                        element_type: "TABLE",
                        tag: TagClass::default(),
                    });
                    let role = state.number_role(format!("{}_{}_{}", name.role, row, col));
                    FieldRecord {
                        role: Some(TextValue::Text(role)),
                        role_description: Some(name.description),
                        table_info: Some(TableInfo {
                            row,
                            col,
                            total_rows: Some(total_rows),
                            total_cols: Some(total_cols),
                        }),
                        ..Default::default()
                    }
                },
                _ => {
                    let tag = classify(&view.text, view.position.as_ref(), &self.options);
                    let name = self.namer.name_role(&RoleRequest {
                        slide_number: slide.number(),
                        text: &view.text,
                        position,
                        element_type: view.type_name,
                        tag,
                    });
                    let role = if tag.is_tag {
                        name.role
                    } else {
                        let base = match &group_context {
                            Some(ctx) => format!("{}_{}", name.role, ctx),
                            None => name.role,
                        };
                        state.number_role(base)
                    };
                    FieldRecord {
                        role: Some(TextValue::Text(role)),
                        role_description: Some(name.description),
                        fingerprint: Some(fingerprint(
                            &view.text,
                            view.position.as_ref(),
                            self.options.position_bucket,
                        )),
                        is_tag: Some(tag.is_tag),
                        ..Default::default()
                    }
                },
            };

            record.element_id = Some(element_id(slide.number(), &position, view.type_name));
            record.slide_number = Some(slide.number());
            record.position = Some(position);
            record.element_type = Some(view.type_name.to_string());
            record.in_group = Some(view.depth > 0);
            record.original_text = Some(view.text.clone());

            let key_base = match &group_context {
                Some(ctx) => format!("{}_{}", view.text, ctx),
                None => view.text.clone(),
            };
            record.group_context = group_context;
            let key = state.unique_key(&key_base);

            record.text_count = Some(1);
            let ordinal = replay_ordinal(&resolver, &record, &key, view)?
                .unwrap_or_else(|| {
                    let fallback = scope_ordinal(&views, view);
                    debug!(
                        slide = slide.number(),
                        key = %key,
                        ordinal = fallback,
                        "element not reachable by the resolver, keeping its scope ordinal"
                    );
                    fallback
                });
            record.text_count = Some(ordinal);
            state.schema.fields.insert(key, record);
        }
        Ok(())
    }
}

/// Key and role counters shared by all slides of one extraction.
#[derive(Default)]
struct ExtractState {
    schema: TemplateSchema,
    key_counts: HashMap<String, usize>,
    role_counts: HashMap<String, usize>,
}

impl ExtractState {
    /// `base`, or `base_<n>` for the n-th use of `base`, never colliding
    /// with a key already in the schema.
    fn unique_key(&mut self, base: &str) -> String {
        let count = self.key_counts.entry(base.to_string()).or_insert(0);
        loop {
            *count += 1;
            let key = if *count == 1 {
                base.to_string()
            } else {
                format!("{}_{}", base, count)
            };
            if !self.schema.fields.contains_key(&key) {
                return key;
            }
        }
    }

    /// `base_<n>` for the n-th use of `base`.
    fn number_role(&mut self, base: String) -> String {
        let count = self.role_counts.entry(base.clone()).or_insert(0);
        *count += 1;
        format!("{}_{}", base, count)
    }
}

/// `group<g>[_nested<i>...]_<member>` for elements inside groups.
fn group_context(view: &ElementView, group_numbers: &HashMap<usize, usize>) -> Option<String> {
    let nodes = view.path.nodes.as_slice();
    let (first, rest) = nodes.split_first()?;
    let (last, nested) = rest.split_last()?;
    let mut ctx = format!("group{}", group_numbers.get(first).copied().unwrap_or(first + 1));
    for idx in nested {
        ctx.push_str(&format!("_nested{}", idx + 1));
    }
    ctx.push_str(&format!("_{}", last + 1));
    Some(ctx)
}

/// Stable element id from slide, integer position and type.
pub fn element_id(slide_number: usize, position: &Position, type_name: &str) -> String {
    format!(
        "element_slide{}_l{}_t{}_w{}_h{}_type{}",
        slide_number,
        position.left_percent as i64,
        position.top_percent as i64,
        position.width_percent as i64,
        position.height_percent as i64,
        type_name
    )
}

/// The ordinal at which the resolver picks `view` for `record`.
fn replay_ordinal(
    resolver: &Resolver<'_>,
    record: &FieldRecord,
    key: &str,
    view: &ElementView,
) -> Result<Option<usize>> {
    let mut field = record.to_descriptor(key)?;
    for ordinal in 1.. {
        field.expected_occurrence = ordinal;
        match resolver.resolve(&field).element {
            Some(found) if found.path == view.path => return Ok(Some(ordinal)),
            Some(_) => continue,
            None => break,
        }
    }
    Ok(None)
}

/// Position of `view` among same-text elements of its own scope.
fn scope_ordinal(views: &[ElementView], view: &ElementView) -> usize {
    views
        .iter()
        .take_while(|v| v.path != view.path)
        .filter(|v| {
            v.kind != ElementKind::Group
                && v.top_level_group == view.top_level_group
                && v.is_table_cell() == view.is_table_cell()
                && equivalent(&v.text, &view.text)
        })
        .count()
        + 1
}
