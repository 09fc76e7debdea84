/// Relationship ids and per-paragraph lookups used while generating XML.
///
/// Relationships are created before any markup is written, so elements can
/// reference their final rIds directly instead of patching placeholders.
use crate::ooxml::error::Result;
use crate::ooxml::opc::Relationships;
use crate::ooxml::opc::constants::relationship_type as rt;
use std::collections::HashMap;

use super::bookmark::Bookmark;
use super::doc::{Document, ParagraphId};
use super::hyperlink::HyperlinkTarget;
use super::revision::{Revision, RevisionManager};

/// Lookups the body serializer needs beyond the paragraph itself.
#[derive(Debug, Default)]
pub(crate) struct RenderContext<'a> {
    revisions: Option<&'a RevisionManager>,
    comments: HashMap<ParagraphId, Vec<u32>>,
    bookmarks: HashMap<ParagraphId, Vec<&'a Bookmark>>,
}

impl<'a> RenderContext<'a> {
    /// Context with no revisions, comments or bookmarks.
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(doc: &'a Document) -> Self {
        let mut comments: HashMap<ParagraphId, Vec<u32>> = HashMap::new();
        for comment in doc.comments() {
            comments
                .entry(comment.paragraph())
                .or_default()
                .push(comment.id());
        }
        let mut bookmarks: HashMap<ParagraphId, Vec<&'a Bookmark>> = HashMap::new();
        for bookmark in doc.bookmarks() {
            bookmarks
                .entry(bookmark.paragraph())
                .or_default()
                .push(bookmark);
        }
        Self {
            revisions: Some(doc.revision_manager()),
            comments,
            bookmarks,
        }
    }

    #[inline]
    pub(crate) fn revision(&self, id: u32) -> Option<&'a Revision> {
        self.revisions?.get(id)
    }

    pub(crate) fn comments_for(&self, paragraph: ParagraphId) -> &[u32] {
        self.comments
            .get(&paragraph)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn bookmarks_for(&self, paragraph: ParagraphId) -> &[&'a Bookmark] {
        self.bookmarks
            .get(&paragraph)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Builds `word/_rels/document.xml.rels` for a document.
///
/// The fixed parts take rId1..rId3 (styles, settings, font table), optional
/// parts follow in a fixed order, then images and external hyperlinks under
/// their own `rIdImage{n}` / `rIdLink{n}` ids.
#[derive(Debug, Default)]
pub struct RelationshipMapper {
    rels: Relationships,
}

impl RelationshipMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn build(doc: &Document) -> Result<Self> {
        let mut mapper = Self::new();
        let rels = &mut mapper.rels;
        rels.add("rId1", rt::STYLES, "styles.xml", false)?;
        rels.add("rId2", rt::SETTINGS, "settings.xml", false)?;
        rels.add("rId3", rt::FONT_TABLE, "fontTable.xml", false)?;

        if !doc.comments().is_empty() {
            rels.add_next(rt::COMMENTS, "comments.xml");
            rels.add_next(rt::COMMENTS_EXTENDED, "commentsExtended.xml");
        }
        if !doc.footnotes().is_empty() {
            rels.add_next(rt::FOOTNOTES, "footnotes.xml");
        }
        if !doc.endnotes().is_empty() {
            rels.add_next(rt::ENDNOTES, "endnotes.xml");
        }

        for image in doc.images() {
            let target = format!("media/{}", image.file_name());
            rels.add(image.id(), rt::IMAGE, &target, false)?;
        }
        for (_, link) in doc.hyperlinks() {
            if let (Some(r_id), HyperlinkTarget::External(url)) =
                (link.relationship_id(), link.target())
            {
                rels.add(r_id, rt::HYPERLINK, url, true)?;
            }
        }
        log::trace!("document relationships: {}", mapper.rels.len());
        Ok(mapper)
    }

    pub fn relationships(&self) -> &Relationships {
        &self.rels
    }

    /// rId of the first relationship of the given type.
    pub fn id_for(&self, reltype: &str) -> Option<&str> {
        self.rels.by_reltype(reltype).map(|rel| rel.r_id())
    }

    pub fn to_xml(&self) -> String {
        self.rels.to_xml()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ids_then_optional_parts() {
        let mut doc = Document::new();
        doc.add_paragraph("Body");
        doc.insert_footnote(0, "note").unwrap();
        doc.add_comment(0, "Ann", "check", None).unwrap();

        let mapper = RelationshipMapper::build(&doc).unwrap();
        assert_eq!(mapper.id_for(rt::STYLES), Some("rId1"));
        assert_eq!(mapper.id_for(rt::SETTINGS), Some("rId2"));
        assert_eq!(mapper.id_for(rt::FONT_TABLE), Some("rId3"));
        assert_eq!(mapper.id_for(rt::COMMENTS), Some("rId4"));
        assert_eq!(mapper.id_for(rt::COMMENTS_EXTENDED), Some("rId5"));
        assert_eq!(mapper.id_for(rt::FOOTNOTES), Some("rId6"));
        assert_eq!(mapper.id_for(rt::ENDNOTES), None);
    }

    #[test]
    fn test_images_and_external_links() {
        let mut doc = Document::new();
        doc.add_paragraph("See");
        let image = doc.add_image("logo.png", vec![0x89, b'P', b'N', b'G']);
        doc.insert_hyperlink(0, "site", "https://example.com/?a=1&b=2", None)
            .unwrap();
        doc.insert_bookmark(0, "top").unwrap();
        doc.insert_internal_link(0, "up", "top").unwrap();

        let mapper = RelationshipMapper::build(&doc).unwrap();
        let xml = mapper.to_xml();
        assert!(xml.contains(&format!(r#"Id="{image}""#)));
        assert!(xml.contains(r#"Target="media/image1.png""#));
        assert!(xml.contains(r#"Id="rIdLink1""#));
        assert!(xml.contains("a=1&amp;b=2"));
        assert!(xml.contains(r#"TargetMode="External""#));
        // Internal links have no relationship.
        assert!(!xml.contains("rIdLink2"));
    }

    #[test]
    fn test_render_context_lookups() {
        let mut doc = Document::new();
        let first = doc.add_paragraph("one");
        doc.add_paragraph("two");
        doc.insert_bookmark(0, "here").unwrap();
        let comment = doc.add_comment(0, "Ann", "hm", None).unwrap();

        let ctx = RenderContext::new(&doc);
        assert_eq!(ctx.comments_for(first), &[comment]);
        assert_eq!(ctx.bookmarks_for(first).len(), 1);
        assert!(ctx.revision(1).is_none());
        let second = doc.paragraph(1).unwrap().id();
        assert!(RenderContext::new(&doc).comments_for(second).is_empty());
    }
}
