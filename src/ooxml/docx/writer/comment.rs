/// Comment writer support for DOCX documents.
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace as ns;
use chrono::{DateTime, Utc};
use std::fmt::Write as FmtWrite;

use super::doc::{Document, ParagraphId};
use super::properties::w3c_date;

/// A comment anchored to a paragraph.
///
/// Replies point at their parent through `parent`; Word shows them as a
/// thread. The thread and resolved state live in `commentsExtended.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub(crate) id: u32,
    pub(crate) author: String,
    pub(crate) initials: String,
    pub(crate) date: DateTime<Utc>,
    pub(crate) text: String,
    pub(crate) paragraph: ParagraphId,
    pub(crate) parent: Option<u32>,
    pub(crate) resolved: bool,
}

impl Comment {
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[inline]
    pub fn initials(&self) -> &str {
        &self.initials
    }

    #[inline]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn paragraph(&self) -> ParagraphId {
        self.paragraph
    }

    #[inline]
    pub fn parent(&self) -> Option<u32> {
        self.parent
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// `w14:paraId` of the comment body, shared with `commentsExtended.xml`.
    fn para_id(&self) -> String {
        format!("{:08X}", self.id)
    }

    fn write_xml(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<w:comment w:id="{}" w:author="{}" w:date="{}" w:initials="{}">"#,
            self.id,
            escape_xml(&self.author),
            w3c_date(&self.date),
            escape_xml(&self.initials)
        )?;
        write!(
            xml,
            r#"<w:p w14:paraId="{}"><w:pPr><w:pStyle w:val="CommentText"/></w:pPr><w:r><w:rPr><w:rStyle w:val="CommentReference"/></w:rPr><w:annotationRef/></w:r><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            self.para_id(),
            escape_xml(&self.text)
        )?;
        xml.push_str("</w:comment>");
        Ok(())
    }
}

/// First two characters of the author, upper-cased.
fn default_initials(author: &str) -> String {
    author.chars().take(2).collect::<String>().to_uppercase()
}

pub(crate) fn comments_xml(comments: &[Comment]) -> Result<String> {
    let mut xml = String::with_capacity(256 * comments.len() + 256);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<w:comments xmlns:w="{}" xmlns:w14="{}">"#,
        ns::WML_MAIN,
        ns::W14
    )?;
    for comment in comments {
        comment.write_xml(&mut xml)?;
    }
    xml.push_str("</w:comments>");
    Ok(xml)
}

pub(crate) fn comments_extended_xml(comments: &[Comment]) -> Result<String> {
    let mut xml = String::with_capacity(96 * comments.len() + 256);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<w15:commentsEx xmlns:mc="{}" xmlns:w15="{}" mc:Ignorable="w15">"#,
        ns::MC,
        ns::W15
    )?;
    for comment in comments {
        write!(xml, r#"<w15:commentEx w15:paraId="{}""#, comment.para_id())?;
        if let Some(parent) = comment.parent {
            write!(xml, r#" w15:paraIdParent="{parent:08X}""#)?;
        }
        write!(xml, r#" w15:done="{}"/>"#, u8::from(comment.resolved))?;
    }
    xml.push_str("</w15:commentsEx>");
    Ok(xml)
}

impl Document {
    /// Attach a comment to the paragraph at `paragraph_index`.
    ///
    /// Initials default to the first two characters of `author`.
    pub fn add_comment(
        &mut self,
        paragraph_index: usize,
        author: &str,
        text: &str,
        initials: Option<&str>,
    ) -> Result<u32> {
        let paragraph = self.paragraph(paragraph_index)?.id();
        Ok(self.push_comment(paragraph, author, text, initials, None))
    }

    /// Reply to an existing comment; the reply shares its parent's anchor.
    pub fn reply_to_comment(&mut self, parent: u32, author: &str, text: &str) -> Result<u32> {
        let paragraph = self
            .comment(parent)
            .ok_or_else(|| OoxmlError::not_found("comment", parent))?
            .paragraph;
        Ok(self.push_comment(paragraph, author, text, None, Some(parent)))
    }

    fn push_comment(
        &mut self,
        paragraph: ParagraphId,
        author: &str,
        text: &str,
        initials: Option<&str>,
        parent: Option<u32>,
    ) -> u32 {
        let id = self.ids.comment.next_id() as u32;
        self.comments.push(Comment {
            id,
            author: author.to_string(),
            initials: initials.map_or_else(|| default_initials(author), str::to_string),
            date: Utc::now(),
            text: text.to_string(),
            paragraph,
            parent,
            resolved: false,
        });
        id
    }

    pub fn resolve_comment(&mut self, id: u32) -> Result<()> {
        let comment = self
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| OoxmlError::not_found("comment", id))?;
        comment.resolved = true;
        Ok(())
    }

    /// Delete a comment and, transitively, every reply to it.
    pub fn delete_comment(&mut self, id: u32) -> Result<()> {
        if self.comment(id).is_none() {
            return Err(OoxmlError::not_found("comment", id));
        }

        let mut doomed = vec![id];
        let mut i = 0;
        while i < doomed.len() {
            let current = doomed[i];
            doomed.extend(
                self.comments
                    .iter()
                    .filter(|c| c.parent == Some(current))
                    .map(|c| c.id),
            );
            i += 1;
        }
        if doomed.len() > 1 {
            log::debug!("deleting comment {id} with {} replies", doomed.len() - 1);
        }
        self.comments.retain(|c| !doomed.contains(&c.id));
        Ok(())
    }

    pub fn comment(&self, id: u32) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials_default() {
        assert_eq!(default_initials("jane smith"), "JA");
        assert_eq!(default_initials("Q"), "Q");
        assert_eq!(default_initials(""), "");
    }

    #[test]
    fn test_comment_thread() {
        let mut doc = Document::new();
        doc.add_paragraph("Review me");
        let root = doc.add_comment(0, "Ana", "Check this", None).unwrap();
        let reply = doc.reply_to_comment(root, "Bo", "Done").unwrap();
        let nested = doc.reply_to_comment(reply, "Ana", "Thanks").unwrap();
        assert_eq!((root, reply, nested), (1, 2, 3));
        assert_eq!(doc.comment(reply).unwrap().paragraph(), doc.comment(root).unwrap().paragraph());
        assert_eq!(doc.comment(root).unwrap().initials(), "AN");

        assert!(matches!(
            doc.reply_to_comment(99, "X", "orphan"),
            Err(OoxmlError::NotFound { .. })
        ));

        doc.delete_comment(root).unwrap();
        assert!(doc.comments().is_empty());
        assert_eq!(doc.add_comment(0, "Ana", "again", Some("AB")).unwrap(), 4);
    }

    #[test]
    fn test_comments_xml() {
        let mut doc = Document::new();
        doc.add_paragraph("Text");
        let id = doc.add_comment(0, "R&D", "a < b", Some("RD")).unwrap();
        doc.reply_to_comment(id, "QA", "ok").unwrap();
        doc.resolve_comment(id).unwrap();

        let xml = comments_xml(doc.comments()).unwrap();
        assert!(xml.contains(r#"w:author="R&amp;D""#));
        assert!(xml.contains("a &lt; b"));
        assert!(xml.contains(r#"w14:paraId="00000001""#));

        let ext = comments_extended_xml(doc.comments()).unwrap();
        assert!(ext.contains(r#"<w15:commentEx w15:paraId="00000001" w15:done="1"/>"#));
        assert!(ext.contains(r#"w15:paraIdParent="00000001""#));
    }
}
