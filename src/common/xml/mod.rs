//! XML helpers shared by the slide parser and the text-body writer.

mod escape;

pub use escape::{escape_xml, is_xml_char, resolve_entity, unescape_xml};
