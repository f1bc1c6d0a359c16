//! Open Packaging Conventions helpers: part names and relationships.

pub mod packuri;
pub mod rel;

pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
