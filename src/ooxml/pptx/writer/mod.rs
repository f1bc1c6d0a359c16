//! Writer components for PPTX text bodies.

pub(crate) mod shape;

pub(crate) use shape::write_text_body;
