//! Deckfill - fill PowerPoint templates field by field
//!
//! A template schema names *fields*: a text label, an occurrence ordinal,
//! optional table coordinates or a position fingerprint, and the text that
//! should replace it. Deckfill maps every field back onto exactly one shape
//! of a slide, even when many shapes share the same text, and rewrites that
//! shape's text while keeping its font and color.
//!
//! # Features
//!
//! - **PPTX adapter**: opens the package, orders slides, parses shape trees
//!   (text shapes, tables, nested groups) and writes back only the text
//!   bodies that changed
//! - **Resolution engine**: table coordinates, relaxed tag/label matching,
//!   slide-level and per-group ordinal counting, position fingerprints
//! - **Style-preserving replacement**: font name, size, weight, slant and
//!   RGB or theme colors survive a replacement; preset colors degrade to a
//!   configurable default
//! - **Schema extraction**: builds a template schema from a deck with
//!   layout-derived role names
//!
//! # Example - Filling a template
//!
//! ```no_run
//! use deckfill::fill::{FillOptions, TemplateFiller, TemplateSchema};
//! use deckfill::ooxml::pptx::Presentation;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut deck = Presentation::open("template.pptx")?;
//! let schema = TemplateSchema::open("schema.json")?;
//!
//! let report = TemplateFiller::new(FillOptions::default()).fill(&mut deck, &schema)?;
//! for outcome in &report.outcomes {
//!     println!("slide {}: {} -> {:?}", outcome.slide, outcome.field, outcome.state);
//! }
//! deck.save("filled.pptx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Resolving a single field
//!
//! ```no_run
//! use deckfill::fill::{FieldDescriptor, FillOptions, Resolver, element_views};
//! use deckfill::ooxml::pptx::Presentation;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let deck = Presentation::open("template.pptx")?;
//! let slide = &deck.slides()[0];
//! let views = element_views(slide.shapes(), deck.slide_width(), deck.slide_height());
//!
//! let options = FillOptions::default();
//! let result = Resolver::new(&views, &options).resolve(&FieldDescriptor::new("title_2", "New"));
//! println!("{:?} after {} matches", result.outcome(), result.occurrences_seen);
//! # Ok(())
//! # }
//! ```

/// Common types shared across modules
pub mod common;

/// Field resolution, text replacement and schema extraction
pub mod fill;

/// Office Open XML package access (PPTX)
pub mod ooxml;

pub use common::{Error, Result};
