/// Package metadata parts: core and extended properties, settings and the
/// font table.
use crate::common::unit::Twips;
use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::namespace as ns;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

use super::doc::Document;

/// Format a timestamp as W3CDTF, the form `dcterms` and revision marks use.
pub(crate) fn w3c_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Core document metadata written to `docProps/core.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub category: Option<String>,
    pub revision: u32,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for DocumentProperties {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            title: None,
            subject: None,
            creator: None,
            keywords: None,
            description: None,
            last_modified_by: None,
            category: None,
            revision: 1,
            created: now,
            modified: now,
        }
    }
}

impl DocumentProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<cp:coreProperties xmlns:cp="{}" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            ns::OPC_CORE_PROPERTIES
        )?;

        let elements = [
            ("dc:title", &self.title),
            ("dc:subject", &self.subject),
            ("dc:creator", &self.creator),
            ("cp:keywords", &self.keywords),
            ("dc:description", &self.description),
            ("cp:lastModifiedBy", &self.last_modified_by),
            ("cp:category", &self.category),
        ];
        for (tag, value) in elements {
            if let Some(value) = value {
                write!(xml, "<{tag}>{}</{tag}>", escape_xml(value))?;
            }
        }

        write!(xml, "<cp:revision>{}</cp:revision>", self.revision)?;
        write!(
            xml,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            w3c_date(&self.created)
        )?;
        write!(
            xml,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
            w3c_date(&self.modified)
        )?;
        xml.push_str("</cp:coreProperties>");
        Ok(xml)
    }
}

/// Document-wide settings written to `word/settings.xml`.
///
/// Whether revisions are tracked is not stored here; it follows the
/// document's track-changes state at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub zoom_percent: u32,
    pub default_tab_stop: Twips,
    pub compatibility_mode: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zoom_percent: 100,
            default_tab_stop: Twips(720),
            compatibility_mode: 15,
        }
    }
}

impl Settings {
    pub(crate) fn to_xml(&self, track_revisions: bool) -> Result<String> {
        let mut xml = String::with_capacity(512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(xml, r#"<w:settings xmlns:w="{}">"#, ns::WML_MAIN)?;
        write!(xml, r#"<w:zoom w:percent="{}"/>"#, self.zoom_percent)?;
        if track_revisions {
            xml.push_str("<w:trackRevisions/>");
        }
        write!(xml, r#"<w:defaultTabStop w:val="{}"/>"#, self.default_tab_stop)?;
        xml.push_str(r#"<w:characterSpacingControl w:val="doNotCompress"/>"#);
        write!(
            xml,
            r#"<w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="{}"/></w:compat>"#,
            self.compatibility_mode
        )?;
        xml.push_str("</w:settings>");
        Ok(xml)
    }
}

/// Counts written to `docProps/app.xml`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AppStatistics {
    pub pages: usize,
    pub words: usize,
    pub characters: usize,
    pub characters_with_spaces: usize,
    pub paragraphs: usize,
}

impl AppStatistics {
    pub(crate) fn collect(doc: &Document) -> Self {
        let mut stats = Self {
            pages: 1,
            ..Self::default()
        };
        for paragraph in doc.all_paragraphs() {
            let text = paragraph.text();
            stats.paragraphs += 1;
            stats.words += text.split_whitespace().count();
            stats.characters += text.chars().filter(|c| !c.is_whitespace()).count();
            stats.characters_with_spaces += text.chars().count();
            // Rough: every explicit page or section break starts a new page.
            stats.pages += paragraph
                .runs()
                .iter()
                .filter(|r| r.is_page_break())
                .count();
            if paragraph.section_break().is_some() {
                stats.pages += 1;
            }
        }
        stats
    }

    pub(crate) fn to_xml(&self, application: &str) -> Result<String> {
        let mut xml = String::with_capacity(512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<Properties xmlns="{}" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            ns::OFC_EXTENDED_PROPERTIES
        )?;
        write!(xml, "<Application>{}</Application>", escape_xml(application))?;
        xml.push_str("<DocSecurity>0</DocSecurity>");
        write!(xml, "<Pages>{}</Pages>", self.pages)?;
        write!(xml, "<Words>{}</Words>", self.words)?;
        write!(xml, "<Characters>{}</Characters>", self.characters)?;
        write!(xml, "<Paragraphs>{}</Paragraphs>", self.paragraphs)?;
        write!(
            xml,
            "<CharactersWithSpaces>{}</CharactersWithSpaces>",
            self.characters_with_spaces
        )?;
        xml.push_str("<ScaleCrop>false</ScaleCrop><LinksUpToDate>false</LinksUpToDate>");
        xml.push_str("<SharedDoc>false</SharedDoc><HyperlinksChanged>false</HyperlinksChanged>");
        xml.push_str("<AppVersion>16.0000</AppVersion></Properties>");
        Ok(xml)
    }
}

/// `word/fontTable.xml` listing the fonts the built-in styles use.
pub(crate) fn font_table_xml() -> Result<String> {
    const FONTS: [(&str, &str, &str); 3] = [
        ("Calibri", "020F0502020204030204", "swiss"),
        ("Calibri Light", "020F0302020204030204", "swiss"),
        ("Times New Roman", "02020603050405020304", "roman"),
    ];
    let mut xml = String::with_capacity(1024);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(xml, r#"<w:fonts xmlns:w="{}">"#, ns::WML_MAIN)?;
    for (name, panose, family) in FONTS {
        write!(
            xml,
            r#"<w:font w:name="{name}"><w:panose1 w:val="{panose}"/><w:charset w:val="00"/><w:family w:val="{family}"/><w:pitch w:val="variable"/></w:font>"#
        )?;
    }
    xml.push_str("</w:fonts>");
    Ok(xml)
}

impl Document {
    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    pub fn set_properties(&mut self, properties: DocumentProperties) {
        self.properties = properties;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_w3c_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(w3c_date(&date), "2024-03-09T07:05:01Z");
    }

    #[test]
    fn test_core_xml_escapes_and_skips_empty() {
        let props = DocumentProperties::new()
            .with_title("Q&A")
            .with_creator("Ada");
        let xml = props.to_xml().unwrap();
        assert!(xml.contains("<dc:title>Q&amp;A</dc:title>"));
        assert!(xml.contains("<dc:creator>Ada</dc:creator>"));
        assert!(!xml.contains("dc:subject"));
        assert!(xml.contains(r#"<dcterms:created xsi:type="dcterms:W3CDTF">"#));
    }

    #[test]
    fn test_settings_track_revisions() {
        let settings = Settings::default();
        let xml = settings.to_xml(true).unwrap();
        assert!(xml.contains(r#"<w:zoom w:percent="100"/>"#));
        assert!(xml.contains("<w:trackRevisions/>"));
        assert!(xml.contains(r#"<w:defaultTabStop w:val="720"/>"#));
        assert!(xml.contains(r#"w:name="compatibilityMode""#));
        assert!(!settings.to_xml(false).unwrap().contains("trackRevisions"));
    }

    #[test]
    fn test_app_statistics() {
        let mut doc = Document::new();
        doc.add_paragraph("one two three");
        doc.add_paragraph("four");
        doc.insert_page_break(1).unwrap();
        let stats = AppStatistics::collect(&doc);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.words, 4);
        assert_eq!(stats.pages, 2);
        let xml = stats.to_xml("quince").unwrap();
        assert!(xml.contains("<Application>quince</Application>"));
        assert!(xml.contains("<Words>4</Words>"));
    }
}
