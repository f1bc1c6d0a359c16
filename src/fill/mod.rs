//! Field resolution and style-preserving text replacement.
//!
//! The pieces, leaves first:
//!
//! - [`normalize`]: text canonicalization and special-content detection
//! - [`element`]: flattening a slide's shape tree into [`ElementView`]s
//! - [`fingerprint`]: text plus quantized position keys
//! - [`tag`]: tag/label classification
//! - [`resolve`]: the [`Resolver`] and its fallback tiers
//! - [`mutate`]: [`replace_text`] and style snapshots
//! - [`schema`], [`filler`], [`report`]: the fill pass over a whole deck
//! - [`meta`]: extracting a schema from a deck
//!
//! # Example
//!
//! ```no_run
//! use deckfill::fill::{FillOptions, MetaExtractor, TemplateFiller};
//! use deckfill::ooxml::pptx::Presentation;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut deck = Presentation::open("template.pptx")?;
//! let options = FillOptions::default();
//!
//! let schema = MetaExtractor::new(options.clone()).extract(&deck)?;
//! let report = TemplateFiller::new(options).fill(&mut deck, &schema)?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod element;
pub mod error;
pub mod field;
pub mod filler;
pub mod fingerprint;
pub mod meta;
pub mod mutate;
pub mod normalize;
pub mod options;
pub mod report;
pub mod resolve;
pub mod schema;
pub mod tag;

pub use element::{ElementKind, ElementView, Position, element_views};
pub use error::FieldError;
pub use field::{FieldDescriptor, TableCoord, split_ordinal};
pub use filler::TemplateFiller;
pub use fingerprint::fingerprint;
pub use meta::{LayoutRoleNamer, MetaExtractor, RoleName, RoleNamer, RoleRequest, element_id, layout_role};
pub use mutate::{StyleDegradation, StyleSnapshot, StyleSource, replace_text};
pub use normalize::{equivalent, is_special_content, normalize};
pub use options::FillOptions;
pub use report::{FieldOutcome, FieldState, FieldStatus, FillReport, FillSummary};
pub use resolve::{MatchOutcome, MatchResult, ResolutionContext, ResolutionTier, Resolver};
pub use schema::{FieldRecord, TableInfo, TemplateSchema, TextValue};
pub use tag::{TagClass, TagType, classify, is_tag_identifier, matches_tag_pattern};
