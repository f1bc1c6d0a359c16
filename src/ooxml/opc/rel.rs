/// Relationships of OPC parts (`*.rels`).
use crate::common::error::{Error, Result};
use crate::common::xml::unescape_xml;
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;

/// Relationship type of slides referenced from the presentation part.
pub const RT_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

/// A single relationship from a source part to a target.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId2")
    pub r_id: String,
    /// Relationship type URI
    pub reltype: String,
    /// Target reference as written in the rels part
    pub target_ref: String,
    /// `TargetMode="External"`
    pub is_external: bool,
}

/// Relationships of one source part, keyed by ID.
#[derive(Debug, Default)]
pub struct Relationships {
    /// Directory of the source part, for resolving relative targets
    base_uri: String,
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    /// Parse a `.rels` part belonging to a source part in `base_uri`.
    pub fn parse(xml: &[u8], base_uri: &str) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = HashMap::new();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                    let mut rel = Relationship {
                        r_id: String::new(),
                        reltype: String::new(),
                        target_ref: String::new(),
                        is_external: false,
                    };
                    for attr in e.attributes().flatten() {
                        let value = unescape_xml(&String::from_utf8_lossy(&attr.value));
                        match attr.key.as_ref() {
                            b"Id" => rel.r_id = value,
                            b"Type" => rel.reltype = value,
                            b"Target" => rel.target_ref = value,
                            b"TargetMode" => rel.is_external = value == "External",
                            _ => {},
                        }
                    }
                    if !rel.r_id.is_empty() {
                        rels.insert(rel.r_id.clone(), rel);
                    }
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(Self {
            base_uri: base_uri.to_string(),
            rels,
        })
    }

    /// Get a relationship by its ID.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    /// Absolute part name targeted by an internal relationship.
    pub fn target_partname(&self, r_id: &str) -> Result<PackURI> {
        let rel = self
            .get(r_id)
            .ok_or_else(|| Error::PartNotFound(format!("relationship {}", r_id)))?;
        if rel.is_external {
            return Err(Error::Structural(format!(
                "relationship {} points outside the package",
                r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &rel.target_ref).map_err(Error::Structural)
    }

    /// Number of relationships.
    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Whether there are no relationships.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }
}
