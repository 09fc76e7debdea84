/// Relationship-related objects for OPC packages.
///
/// A relationships part lists the links from one source (the package or a
/// part) to other parts or to external resources, each under an rId.
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{namespace, target_mode};

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rIdImage2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a part path relative to the source or an external URL
    target_ref: String,

    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: impl Into<String>,
        reltype: impl Into<String>,
        target_ref: impl Into<String>,
        is_external: bool,
    ) -> Self {
        Self {
            r_id: r_id.into(),
            reltype: reltype.into(),
            target_ref: target_ref.into(),
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }
}

/// Ordered collection of relationships from one source.
///
/// Entries serialize in insertion order so the same document always
/// produces the same bytes.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relationship under an explicit rId.
    ///
    /// Fails with `DuplicateIdentifier` when the rId is already taken.
    pub fn add(
        &mut self,
        r_id: impl Into<String>,
        reltype: &str,
        target_ref: &str,
        is_external: bool,
    ) -> Result<&Relationship> {
        let r_id = r_id.into();
        if self.get(&r_id).is_some() {
            return Err(OoxmlError::duplicate("relationship", r_id));
        }
        self.rels
            .push(Relationship::new(r_id, reltype, target_ref, is_external));
        Ok(&self.rels[self.rels.len() - 1])
    }

    /// Add an internal relationship under the next free `rId{n}`.
    pub fn add_next(&mut self, reltype: &str, target_ref: &str) -> String {
        let r_id = self.next_r_id();
        self.rels
            .push(Relationship::new(r_id.clone(), reltype, target_ref, false));
        r_id
    }

    /// Get a relationship by its ID.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.r_id == r_id)
    }

    /// First relationship of the given type, if any.
    pub fn by_reltype(&self, reltype: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.reltype == reltype)
    }

    /// Lowest `rId{n}` not yet in use.
    fn next_r_id(&self) -> String {
        let mut used: Vec<u32> = self
            .rels
            .iter()
            .filter_map(|rel| rel.r_id.strip_prefix("rId")?.parse::<u32>().ok())
            .collect();
        used.sort_unstable();

        let mut next_num = 1u32;
        for num in used {
            match num.cmp(&next_num) {
                std::cmp::Ordering::Equal => next_num += 1,
                std::cmp::Ordering::Greater => break,
                std::cmp::Ordering::Less => {},
            }
        }

        format!("rId{}", next_num)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Serialize relationships to the XML of a `.rels` part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Relationships xmlns=""#);
        xml.push_str(namespace::OPC_RELATIONSHIPS);
        xml.push_str(r#"">"#);

        for rel in &self.rels {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_xml(rel.r_id()),
                escape_xml(rel.reltype()),
                escape_xml(rel.target_ref()),
            ));
            if rel.is_external() {
                xml.push_str(&format!(r#" TargetMode="{}""#, target_mode::EXTERNAL));
            }
            xml.push_str("/>");
        }

        xml.push_str("</Relationships>");
        xml
    }
}
