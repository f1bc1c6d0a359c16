/// Parts of a PowerPoint package.
///
/// The presentation part supplies slide size and order; slide parts supply
/// the shape trees.
pub mod presentation;
pub mod slide;

pub use presentation::PresentationPart;
pub use slide::parse_shape_tree;
