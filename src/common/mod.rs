//! Common types and utilities shared by the package adapter and the fill engine.

// Submodule declarations
pub mod error;
pub mod style;
pub mod unit;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use style::{ColorTransform, ColorValue, RGBColor, SchemeColor};
