//! Relationship parts (`*.rels`).
//!
//! A streaming package knows every relationship up front, so this is a plain
//! ordered list that serializes to XML rather than a graph of parts.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::namespace;
use std::fmt::Write as FmtWrite;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    r_id: String,
    reltype: &'static str,
    target_ref: String,
}

impl Relationship {
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    pub fn reltype(&self) -> &str {
        self.reltype
    }

    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }
}

/// Ordered collection of relationships for one source part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a relationship with an explicit id.
    pub fn add(&mut self, r_id: impl Into<String>, reltype: &'static str, target: impl Into<String>) {
        self.rels.push(Relationship {
            r_id: r_id.into(),
            reltype,
            target_ref: target.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.rels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    /// Generate the XML for this relationships part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        // Writing into a String cannot fail.
        let _ = write!(xml, r#"<Relationships xmlns="{}">"#, namespace::OPC_RELATIONSHIPS);

        for rel in &self.rels {
            let _ = write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                escape_xml(rel.r_id()),
                escape_xml(rel.reltype()),
                escape_xml(rel.target_ref())
            );
        }

        xml.push_str("</Relationships>");
        xml
    }
}
