/// Field-to-element resolution.
///
/// A [`Resolver`] answers "which single element does this field mean?" for
/// one slide. Tiers are tried in a fixed order and the first one that
/// reaches the requested ordinal wins:
///
/// 1. table cells at the field's explicit coordinates,
/// 2. tag/label elements (exact, pattern, then edit distance),
/// 3. slide-level text shapes,
/// 4. text shapes inside each top-level group, counting per group.
///
/// Every tier counts matching elements in document order and only accepts
/// the one at the requested ordinal, so a field never hits more than one
/// element even when many share its text.
use crate::fill::element::{ElementKind, ElementView};
use crate::fill::field::FieldDescriptor;
use crate::fill::fingerprint::fingerprint;
use crate::fill::normalize::{equivalent, is_special_content, normalize};
use crate::fill::options::FillOptions;
use crate::fill::tag::{is_tag_identifier, matches_tag_pattern};
use std::fmt;
use tracing::trace;

/// Tier that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionTier {
    /// Explicit table coordinates
    TableCell,
    /// Relaxed tag/label matching
    Tag,
    /// Slide-level shapes
    SlideShape,
    /// Members of a top-level group
    Group,
}

impl ResolutionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TableCell => "table_cell",
            Self::Tag => "tag",
            Self::SlideShape => "slide_shape",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving one field on one slide.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// The matched element
    pub element: Option<ElementView>,
    /// Matching elements seen; the largest count of any tier on failure
    pub occurrences_seen: usize,
    /// Tier that produced the match
    pub tier: Option<ResolutionTier>,
}

impl MatchResult {
    fn miss(occurrences_seen: usize) -> Self {
        Self {
            element: None,
            occurrences_seen,
            tier: None,
        }
    }

    /// Collapse into the three diagnostic outcomes.
    pub fn outcome(&self) -> MatchOutcome {
        match (&self.element, self.occurrences_seen) {
            (Some(_), _) => MatchOutcome::Matched,
            (None, 0) => MatchOutcome::NotFound,
            (None, found) => MatchOutcome::WrongOrdinal { found },
        }
    }

    #[inline]
    pub fn is_match(&self) -> bool {
        self.element.is_some()
    }
}

/// Diagnostic outcome of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Exactly one element at the requested ordinal
    Matched,
    /// `found` elements matched but none at the requested ordinal
    WrongOrdinal { found: usize },
    /// Nothing matched
    NotFound,
}

/// Ordinal counters of a single resolution.
///
/// One context lives for one field on one slide. The running counter is
/// reset per tier, per tag stage and per top-level group; the maximum
/// survives for failure diagnostics.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    expected: usize,
    count: usize,
    max_seen: usize,
}

impl ResolutionContext {
    /// Context looking for the `expected`-th match.
    pub fn new(expected: usize) -> Self {
        Self {
            expected: expected.max(1),
            count: 0,
            max_seen: 0,
        }
    }

    /// Start a new counting scope.
    #[inline]
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Record a match; returns true when it is the requested one.
    #[inline]
    pub fn observe(&mut self) -> bool {
        self.count += 1;
        self.max_seen = self.max_seen.max(self.count);
        self.count == self.expected
    }

    /// Largest count reached in any scope.
    #[inline]
    pub fn max_seen(&self) -> usize {
        self.max_seen
    }
}

/// Resolves fields against the flattened elements of one slide.
///
/// # Examples
///
/// ```rust
/// use deckfill::fill::{FieldDescriptor, FillOptions, MatchOutcome, Resolver};
///
/// let options = FillOptions::default();
/// let resolver = Resolver::new(&[], &options);
/// let result = resolver.resolve(&FieldDescriptor::new("title", "New"));
/// assert_eq!(result.outcome(), MatchOutcome::NotFound);
/// ```
pub struct Resolver<'a> {
    elements: &'a [ElementView],
    options: &'a FillOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(elements: &'a [ElementView], options: &'a FillOptions) -> Self {
        Self { elements, options }
    }

    /// Find the single element `field` designates.
    pub fn resolve(&self, field: &FieldDescriptor) -> MatchResult {
        let mut ctx = ResolutionContext::new(field.expected_occurrence);

        if field.table_info.is_some() {
            ctx.reset();
            if let Some(el) = self.resolve_table(field, &mut ctx) {
                return self.hit(el, &ctx, ResolutionTier::TableCell);
            }
        }

        if field.is_tag_hint
            || is_tag_identifier(&field.field_name)
            || is_tag_identifier(&field.content)
        {
            if let Some(el) = self.resolve_tag(field, &mut ctx) {
                return self.hit(el, &ctx, ResolutionTier::Tag);
            }
        }

        ctx.reset();
        let slide_level = self
            .elements
            .iter()
            .filter(|el| el.depth == 0 && el.is_text_shape());
        if let Some(el) = self.first_at_ordinal(slide_level, field, &mut ctx) {
            return self.hit(el, &ctx, ResolutionTier::SlideShape);
        }

        let groups = self
            .elements
            .iter()
            .filter(|el| el.depth == 0 && el.kind == ElementKind::Group);
        for group in groups {
            let Some(&idx) = group.path.nodes.first() else {
                continue;
            };
            ctx.reset();
            let members = self
                .elements
                .iter()
                .filter(|el| el.top_level_group == Some(idx) && el.depth > 0 && el.is_text_shape());
            if let Some(el) = self.first_at_ordinal(members, field, &mut ctx) {
                return self.hit(el, &ctx, ResolutionTier::Group);
            }
        }

        MatchResult::miss(ctx.max_seen())
    }

    fn hit(&self, el: &ElementView, ctx: &ResolutionContext, tier: ResolutionTier) -> MatchResult {
        trace!(tier = %tier, shape = el.shape_id, "element resolved");
        MatchResult {
            element: Some(el.clone()),
            occurrences_seen: ctx.max_seen(),
            tier: Some(tier),
        }
    }

    fn resolve_table(
        &self,
        field: &FieldDescriptor,
        ctx: &mut ResolutionContext,
    ) -> Option<&'a ElementView> {
        let coord = field.table_info?;
        let label = field.label.trim();
        self.elements.iter().find(|el| match el.kind {
            ElementKind::TableCell { row, col, .. } if row == coord.row && col == coord.col => {
                !el.text.is_empty() && equivalent(&el.text, label) && ctx.observe()
            },
            _ => false,
        })
    }

    fn resolve_tag(
        &self,
        field: &FieldDescriptor,
        ctx: &mut ResolutionContext,
    ) -> Option<&'a ElementView> {
        let options = self.options;
        let label = field.label.trim();
        let label_key = normalize(label);
        let candidates = || {
            self.elements.iter().filter(move |el| {
                el.is_text_shape()
                    && !el.text.is_empty()
                    && el.text.chars().count() <= options.max_tag_text_len
            })
        };

        ctx.reset();
        if is_special_content(label) {
            return candidates().find(|el| el.text.trim() == label && ctx.observe());
        }
        if let Some(el) = candidates().find(|el| normalize(&el.text) == label_key && ctx.observe()) {
            return Some(el);
        }

        // A small element qualifies when either side looks like a tag
        let label_is_tag = matches_tag_pattern(label);
        ctx.reset();
        if let Some(el) = candidates().find(|el| {
            el.is_small(options) && (label_is_tag || matches_tag_pattern(&el.text)) && ctx.observe()
        }) {
            return Some(el);
        }

        let label_len = label_key.chars().count();
        if label_len > options.fuzzy_max_len {
            return None;
        }
        ctx.reset();
        candidates().find(|el| {
            if !el.is_small(options) {
                return false;
            }
            let key = normalize(&el.text);
            key.chars().count() <= options.fuzzy_max_len
                && strsim::levenshtein(&key, &label_key) <= options.max_edit_distance
                && ctx.observe()
        })
    }

    fn first_at_ordinal<I>(
        &self,
        mut elements: I,
        field: &FieldDescriptor,
        ctx: &mut ResolutionContext,
    ) -> Option<&'a ElementView>
    where
        I: Iterator<Item = &'a ElementView>,
    {
        elements.find(|el| !el.text.is_empty() && self.matches_text(el, field) && ctx.observe())
    }

    /// Text or fingerprint comparison used by the shape tiers.
    fn matches_text(&self, el: &ElementView, field: &FieldDescriptor) -> bool {
        if let Some(expected) = &field.fingerprint {
            let key = fingerprint(&el.text, el.position.as_ref(), self.options.position_bucket);
            return key == *expected;
        }
        let label = field.label.trim();
        if is_special_content(label) {
            return el.text.trim() == label;
        }
        equivalent(&el.text, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::element::element_views;
    use crate::fill::element::tests::{H, W, group, table, text_at};
    use crate::fill::field::TableCoord;
    use crate::ooxml::pptx::shapes::{ShapeNode, ShapePath};

    fn resolve(shapes: &[ShapeNode], field: &FieldDescriptor) -> MatchResult {
        let options = FillOptions::default();
        let views = element_views(shapes, W, H);
        Resolver::new(&views, &options).resolve(field)
    }

    fn three_titles() -> Vec<ShapeNode> {
        vec![
            text_at(2, "title", 10, 5, 60, 10),
            text_at(3, "title", 10, 30, 60, 10),
            text_at(4, "title", 10, 55, 60, 10),
        ]
    }

    #[test]
    fn test_unique_text_resolves_at_ordinal_one() {
        let shapes = vec![text_at(2, "Overview", 10, 5, 60, 10), text_at(3, "Details", 10, 30, 60, 10)];
        let result = resolve(&shapes, &FieldDescriptor::new("overview", "x"));
        assert_eq!(result.outcome(), MatchOutcome::Matched);
        assert_eq!(result.element.unwrap().shape_id, 2);
        assert_eq!(result.tier, Some(ResolutionTier::SlideShape));
    }

    #[test]
    fn test_ordinal_picks_exactly_one_duplicate() {
        let result = resolve(&three_titles(), &FieldDescriptor::new("title_2", "B"));
        let el = result.element.unwrap();
        assert_eq!(el.shape_id, 3);
        assert_eq!(el.path, ShapePath::top(1));
    }

    #[test]
    fn test_ordinal_past_the_end_reports_count() {
        let result = resolve(&three_titles(), &FieldDescriptor::new("title_4", "D"));
        assert!(!result.is_match());
        assert_eq!(result.occurrences_seen, 3);
        assert_eq!(result.outcome(), MatchOutcome::WrongOrdinal { found: 3 });
    }

    #[test]
    fn test_two_way_comparison() {
        let shapes = vec![text_at(2, "Main Title", 10, 5, 60, 10)];
        assert!(resolve(&shapes, &FieldDescriptor::new("MAINTITLE", "x")).is_match());
        assert!(resolve(&shapes, &FieldDescriptor::new("main title", "x")).is_match());
        assert!(!resolve(&shapes, &FieldDescriptor::new("main", "x")).is_match());
    }

    #[test]
    fn test_table_cell_by_coordinates() {
        let shapes = vec![
            table(
                5,
                &[
                    &["h1", "h2", "h3", "h4"],
                    &["a", "b", "Revenue", "d"],
                    &["e", "f", "g", "h"],
                ],
            ),
        ];
        let field = FieldDescriptor::new("Revenue", "12%").with_table_info(TableCoord::new(2, 3).unwrap());
        let result = resolve(&shapes, &field);
        assert_eq!(result.tier, Some(ResolutionTier::TableCell));
        assert_eq!(result.element.unwrap().path, ShapePath::top(0).with_cell(1, 2));

        // Coordinates beyond the table fall through and find nothing
        let field = FieldDescriptor::new("Revenue", "12%").with_table_info(TableCoord::new(4, 3).unwrap());
        assert_eq!(resolve(&shapes, &field).outcome(), MatchOutcome::NotFound);
    }

    #[test]
    fn test_table_cell_ordinal_across_tables() {
        let shapes = vec![table(5, &[&["x", "Q"]]), group(6, vec![table(7, &[&["y", "Q"]])])];
        let field = FieldDescriptor::new("Q_2", "z").with_table_info(TableCoord::new(1, 2).unwrap());
        let result = resolve(&shapes, &field);
        assert_eq!(result.element.unwrap().path, ShapePath::top(1).child(0).with_cell(0, 1));
    }

    #[test]
    fn test_tag_tier_exact_match() {
        let shapes = vec![text_at(2, "Heading", 10, 5, 60, 10), text_at(3, "Tag", 85, 5, 8, 4)];
        let result = resolve(&shapes, &FieldDescriptor::new("tag", "NEW"));
        assert_eq!(result.tier, Some(ResolutionTier::Tag));
        assert_eq!(result.element.unwrap().shape_id, 3);
    }

    #[test]
    fn test_tag_tier_pattern_and_fuzzy_stages() {
        let shapes = vec![text_at(3, "TAG-7", 85, 5, 8, 4), text_at(4, "Big TAG 9", 0, 50, 90, 40)];
        // "tag1" matches no text exactly; the pattern stage takes the small element
        let result = resolve(&shapes, &FieldDescriptor::new("tag1", "x"));
        assert_eq!(result.tier, Some(ResolutionTier::Tag));
        assert_eq!(result.element.unwrap().shape_id, 3);

        let shapes = vec![text_at(3, "Labl", 85, 5, 8, 4)];
        let field = FieldDescriptor::new("Label", "x");
        let result = resolve(&shapes, &field);
        assert_eq!(result.element.unwrap().shape_id, 3);
    }

    #[test]
    fn test_tag_tier_pattern_accepts_either_side() {
        let shapes = vec![text_at(2, "Overview", 10, 5, 60, 10), text_at(3, "TAG-3", 85, 5, 8, 4)];
        // Neither label looks like a tag; the badge text does
        for key in ["product_label", "badge"] {
            let result = resolve(&shapes, &FieldDescriptor::new(key, "x").with_tag_hint(true));
            assert_eq!(result.tier, Some(ResolutionTier::Tag), "{key}");
            assert_eq!(result.element.unwrap().shape_id, 3, "{key}");
        }

        // A tag-like label takes a small element whatever its text
        let shapes = vec![text_at(4, "NEW", 85, 5, 8, 4)];
        let result = resolve(&shapes, &FieldDescriptor::new("label2", "x"));
        assert_eq!(result.element.unwrap().shape_id, 4);

        // Large elements never qualify
        let shapes = vec![text_at(5, "TAG-3", 0, 50, 90, 40)];
        let result = resolve(&shapes, &FieldDescriptor::new("badge", "x").with_tag_hint(true));
        assert_eq!(result.outcome(), MatchOutcome::NotFound);
    }

    #[test]
    fn test_special_content_is_matched_verbatim() {
        let shapes = vec![text_at(2, "01", 80, 80, 8, 4), text_at(3, "02", 90, 80, 8, 4)];
        let result = resolve(&shapes, &FieldDescriptor::new("02", "x").with_tag_hint(true));
        assert_eq!(result.element.unwrap().shape_id, 3);

        let result = resolve(&shapes, &FieldDescriptor::new("03", "x").with_tag_hint(true));
        assert_eq!(result.outcome(), MatchOutcome::NotFound);

        // Case differences are not folded away for special content
        let shapes = vec![text_at(4, "id", 80, 80, 8, 4), text_at(5, "ID", 90, 80, 8, 4)];
        let result = resolve(&shapes, &FieldDescriptor::new("ID", "x").with_tag_hint(true));
        assert_eq!(result.tier, Some(ResolutionTier::Tag));
        assert_eq!(result.element.unwrap().shape_id, 5);
    }

    #[test]
    fn test_group_counters_reset_per_top_level_group() {
        let shapes = vec![
            text_at(2, "Step", 0, 0, 30, 10),
            group(3, vec![text_at(4, "Step", 0, 20, 30, 10), text_at(5, "Step", 0, 40, 30, 10)]),
            group(6, vec![text_at(7, "Step", 50, 20, 30, 10)]),
        ];
        // Ordinal 2: slide level has one, first group has two
        let result = resolve(&shapes, &FieldDescriptor::new("Step_2", "x"));
        assert_eq!(result.tier, Some(ResolutionTier::Group));
        assert_eq!(result.element.unwrap().shape_id, 5);

        let result = resolve(&shapes, &FieldDescriptor::new("Step_3", "x"));
        assert_eq!(result.outcome(), MatchOutcome::WrongOrdinal { found: 2 });
    }

    #[test]
    fn test_nested_group_members_share_the_top_level_counter() {
        let shapes = vec![group(
            3,
            vec![text_at(4, "Note", 0, 0, 30, 10), group(5, vec![text_at(6, "Note", 0, 50, 30, 10)])],
        )];
        let result = resolve(&shapes, &FieldDescriptor::new("Note_2", "x"));
        assert_eq!(result.element.unwrap().shape_id, 6);
    }

    #[test]
    fn test_fingerprint_disambiguates_duplicates() {
        let shapes = vec![text_at(2, "Item", 10, 20, 30, 10), text_at(3, "Item", 60, 20, 30, 10)];
        let field = FieldDescriptor::new("Item", "x").with_fingerprint("Item__pos_60_20");
        assert_eq!(resolve(&shapes, &field).element.unwrap().shape_id, 3);

        let field = FieldDescriptor::new("Item", "x").with_fingerprint("Item__pos_95_95");
        assert_eq!(resolve(&shapes, &field).outcome(), MatchOutcome::NotFound);
    }

    #[test]
    fn test_empty_elements_never_match() {
        let shapes = vec![text_at(2, "", 0, 0, 10, 10)];
        assert!(!resolve(&shapes, &FieldDescriptor::new("", "x")).is_match());
    }

    #[test]
    fn test_context_counts_per_scope() {
        let mut ctx = ResolutionContext::new(2);
        assert!(!ctx.observe());
        assert!(ctx.observe());
        ctx.reset();
        assert!(!ctx.observe());
        assert_eq!(ctx.max_seen(), 2);
    }
}
