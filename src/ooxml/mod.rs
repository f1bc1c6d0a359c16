//! Office Open XML support.
//!
//! - [`opc`]: part names and relationships of the package
//! - [`pptx`]: PowerPoint presentations

pub mod opc;
pub mod pptx;
