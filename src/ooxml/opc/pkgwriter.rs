//! `[Content_Types].xml` generation.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use std::fmt::Write as FmtWrite;

/// Helper for building [Content_Types].xml content.
///
/// Manages Default and Override elements for content type mapping. Both lists
/// keep insertion order so the generated part is deterministic.
#[derive(Debug, Clone)]
pub struct ContentTypes {
    /// Default content types by extension
    defaults: Vec<(String, String)>,

    /// Override content types by partname
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Create a new ContentTypes with the standard `rels` and `xml` defaults.
    pub fn new() -> Self {
        Self {
            defaults: vec![
                ("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string()),
                ("xml".to_string(), ct::XML.to_string()),
            ],
            overrides: Vec::new(),
        }
    }

    /// Add an override for a specific part name (leading slash included).
    pub fn add_override(&mut self, partname: impl Into<String>, content_type: &str) {
        let partname = partname.into();
        if let Some(existing) = self.overrides.iter_mut().find(|(p, _)| *p == partname) {
            existing.1 = content_type.to_string();
        } else {
            self.overrides.push((partname, content_type.to_string()));
        }
    }

    /// Generate the XML for [Content_Types].xml.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512 + self.overrides.len() * 128);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        let _ = write!(xml, r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES);

        for (ext, content_type) in &self.defaults {
            let _ = write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            );
        }

        for (partname, content_type) in &self.overrides {
            let _ = write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(content_type)
            );
        }

        xml.push_str("</Types>");
        xml
    }
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::new()
    }
}
