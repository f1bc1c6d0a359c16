//! PowerPoint (.pptx) presentation support.
//!
//! Only what template filling needs is modelled: the package, slide order
//! and size, and the text-bearing part of each slide's shape tree.
//!
//! - [`Presentation`]: the opened package
//! - [`Slide`]: a slide with its shape tree
//! - [`shapes`]: text shapes, tables and groups

pub mod package;
pub mod parts;
pub mod shapes;
pub mod slide;
pub(crate) mod writer;

pub use package::Presentation;
pub use slide::Slide;
