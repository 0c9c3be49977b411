//! Document properties parts (`docProps/core.xml` and `docProps/app.xml`).

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::namespace;
use chrono::{DateTime, Utc};
use std::fmt::Write as FmtWrite;

/// Document core and extended properties (metadata).
///
/// Core properties are stored in `docProps/core.xml`, the company name in
/// `docProps/app.xml`. Empty text fields are still written as empty
/// elements so consumers always see the same set of properties.
#[derive(Debug, Clone, Default)]
pub struct DocumentProperties {
    /// Document title
    pub title: String,
    /// Document subject
    pub subject: String,
    /// Document creator/author
    pub creator: String,
    /// Owning organisation, written to the extended properties
    pub company: String,
    /// Document keywords, joined with ", " on output
    pub keywords: Vec<String>,
    /// Document description
    pub description: String,
    /// Creation date; the packaging time is used when unset
    pub created: Option<DateTime<Utc>>,
}

impl DocumentProperties {
    /// Create a new empty document properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Set the document subject.
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    /// Set the document creator/author.
    pub fn creator(mut self, creator: &str) -> Self {
        self.creator = creator.to_string();
        self
    }

    /// Set the company name.
    pub fn company(mut self, company: &str) -> Self {
        self.company = company.to_string();
        self
    }

    /// Set the document keywords.
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the document description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Generate core.xml content for this properties set.
    pub fn to_core_xml(&self) -> String {
        let created = self.created.unwrap_or_else(Utc::now);

        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);

        let _ = write!(
            xml,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            created.format("%Y-%m-%dT%H:%M:%S.00Z")
        );

        push_element(&mut xml, "dc:title", &self.title);
        push_element(&mut xml, "dc:subject", &self.subject);
        push_element(&mut xml, "dc:creator", &self.creator);
        if !self.keywords.is_empty() {
            push_element(&mut xml, "cp:keywords", &self.keywords.join(", "));
        }
        push_element(&mut xml, "dc:description", &self.description);
        xml.push_str("<cp:revision>0</cp:revision>");

        xml.push_str("</cp:coreProperties>");
        xml
    }

    /// Generate app.xml content for this properties set.
    pub fn to_app_xml(&self) -> String {
        let mut xml = String::with_capacity(384);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        let _ = write!(
            xml,
            r#"<Properties xmlns="{}" xmlns:vt="{}">"#,
            namespace::EXTENDED_PROPERTIES,
            namespace::DOC_PROPS_VTYPES
        );
        xml.push_str("<TotalTime>0</TotalTime>");
        push_element(&mut xml, "Company", &self.company);
        xml.push_str("</Properties>");
        xml
    }
}

fn push_element(xml: &mut String, tag: &str, text: &str) {
    let _ = write!(xml, "<{tag}>{}</{tag}>", escape_xml(text));
}
