/// The fill pass: every field, every slide, one attempt each.
use crate::common::error::{Error, Result};
use crate::fill::element::{ElementView, element_views};
use crate::fill::error::FieldError;
use crate::fill::field::FieldDescriptor;
use crate::fill::mutate::replace_text;
use crate::fill::options::FillOptions;
use crate::fill::report::{FieldOutcome, FieldState, FillReport};
use crate::fill::resolve::{MatchOutcome, MatchResult, Resolver};
use crate::fill::schema::TemplateSchema;
use crate::ooxml::pptx::{Presentation, Slide};
use tracing::{error, info};

/// Drives resolution and mutation over a whole presentation.
///
/// Every field is resolved against the slide as it was before the pass
/// started, so replacing one element never shifts the ordinals other
/// fields count.
///
/// # Examples
///
/// ```no_run
/// use deckfill::fill::{FillOptions, TemplateFiller, TemplateSchema};
/// use deckfill::ooxml::pptx::Presentation;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut deck = Presentation::open("template.pptx")?;
/// let schema = TemplateSchema::open("schema.json")?;
///
/// let report = TemplateFiller::new(FillOptions::default()).fill(&mut deck, &schema)?;
/// println!("{}", report.summary());
/// deck.save("filled.pptx")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateFiller {
    options: FillOptions,
}

impl TemplateFiller {
    pub fn new(options: FillOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    /// Fill `presentation` from a template schema.
    pub fn fill(&self, presentation: &mut Presentation, schema: &TemplateSchema) -> Result<FillReport> {
        let fields = schema.descriptors()?;
        self.fill_fields(presentation, &fields)
    }

    /// Fill `presentation` from prepared field descriptors.
    ///
    /// Fails only on structural problems; per-field failures end up in the
    /// report.
    pub fn fill_fields(
        &self,
        presentation: &mut Presentation,
        fields: &[FieldDescriptor],
    ) -> Result<FillReport> {
        self.options.validate()?;
        if presentation.slide_count() == 0 {
            return Err(Error::Structural("presentation has no slides".into()));
        }
        if let Some(field) = fields.iter().find(|f| f.expected_occurrence == 0) {
            return Err(Error::Structural(format!(
                "field '{}' has ordinal 0; ordinals are 1-based",
                field.field_name
            )));
        }

        let (width, height) = (presentation.slide_width(), presentation.slide_height());
        let mut report = FillReport {
            slides: presentation.slide_count(),
            outcomes: Vec::new(),
        };
        for slide in presentation.slides_mut() {
            let number = slide.number();
            let views = element_views(slide.shapes(), width, height);
            for field in fields.iter().filter(|f| f.applies_to(number)) {
                report.outcomes.push(self.fill_field(slide, &views, field));
            }
        }

        let summary = report.summary();
        info!(target: "deckfill::fill", slides = report.slides, %summary, "fill finished");
        Ok(report)
    }

    /// Run the state machine for one field on one slide.
    fn fill_field(&self, slide: &mut Slide, views: &[ElementView], field: &FieldDescriptor) -> FieldOutcome {
        let mut state = FieldState::Pending;
        let mut outcome = FieldOutcome {
            field: field.field_name.clone(),
            slide: slide.number(),
            state,
            tier: None,
            occurrences_seen: 0,
            error: None,
            degradation: None,
        };

        advance(&mut state, FieldState::Resolving);
        let result = Resolver::new(views, &self.options).resolve(field);
        outcome.occurrences_seen = result.occurrences_seen;
        emit_resolution(slide.number(), field, &result);

        let Some(element) = result.element else {
            advance(&mut state, FieldState::Unresolved);
            outcome.state = state;
            outcome.error = Some(match result.occurrences_seen {
                0 => FieldError::ResolutionMiss {
                    label: field.label.clone(),
                },
                found => FieldError::OrdinalMismatch {
                    label: field.label.clone(),
                    expected: field.expected_occurrence,
                    found,
                },
            });
            return outcome;
        };
        advance(&mut state, FieldState::Resolved);
        outcome.tier = result.tier.map(|t| t.as_str());

        advance(&mut state, FieldState::Mutating);
        let mutation = match slide.text_body_mut(&element.path) {
            Some(body) => replace_text(body, &field.content, field.color_override, &self.options),
            None => Err(FieldError::no_text_body(&element.path)),
        };
        match mutation {
            Ok(degradation) => {
                advance(&mut state, FieldState::Mutated);
                outcome.degradation = degradation;
            },
            Err(err) => {
                error!(
                    target: "deckfill::fill",
                    slide = slide.number(),
                    field = %field.field_name,
                    error = %err,
                    "text replacement failed"
                );
                advance(&mut state, FieldState::MutationFailed);
                outcome.error = Some(err);
            },
        }
        outcome.state = state;
        outcome
    }
}

fn advance(state: &mut FieldState, next: FieldState) {
    debug_assert!(state.can_advance_to(next), "{state:?} -> {next:?}");
    *state = next;
}

/// The one diagnostic event per field and slide.
fn emit_resolution(slide: usize, field: &FieldDescriptor, result: &MatchResult) {
    match result.outcome() {
        MatchOutcome::Matched => info!(
            target: "deckfill::fill",
            slide,
            field = %field.field_name,
            occurrences = result.occurrences_seen,
            tier = result.tier.map(|t| t.as_str()).unwrap_or_default(),
            group = field.group_context.as_deref().unwrap_or_default(),
            "matched"
        ),
        MatchOutcome::WrongOrdinal { found } => info!(
            target: "deckfill::fill",
            slide,
            field = %field.field_name,
            occurrences = found,
            expected = field.expected_occurrence,
            "found-wrong-ordinal"
        ),
        MatchOutcome::NotFound => info!(
            target: "deckfill::fill",
            slide,
            field = %field.field_name,
            "not-found"
        ),
    }
}
