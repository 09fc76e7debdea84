/// Track changes: revision records, tracked edits and accept/reject.
///
/// Content carries revision ids (`Run::revision`, `Paragraph::revision` and
/// their `format_revision` counterparts); the records here hold the author,
/// date and, for formatting changes, the properties to restore on reject.
/// Accept and reject resolve content through those ids, so a record stays
/// valid when paragraphs or runs around it move.
use crate::common::IdAllocator;
use crate::common::xml::escape_xml;
use crate::ooxml::docx::format::{ParagraphProperties, RunProperties};
use crate::ooxml::error::{OoxmlError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as FmtWrite;

use super::doc::{Document, ParagraphId};
use super::paragraph::Paragraph;
use super::properties::w3c_date;
use super::run::Run;

/// Type of tracked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevisionKind {
    Insertion,
    Deletion,
    MoveFrom,
    MoveTo,
    /// Run formatting change
    FormatChange,
    /// Paragraph formatting change
    ParagraphChange,
}

impl RevisionKind {
    /// Content marked with this kind disappears once the change is accepted.
    #[inline]
    pub fn removes_content(self) -> bool {
        matches!(self, Self::Deletion | Self::MoveFrom)
    }

    /// Insertions, deletions and moves mark content; the others snapshot
    /// formatting.
    #[inline]
    pub fn marks_content(self) -> bool {
        !matches!(self, Self::FormatChange | Self::ParagraphChange)
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Insertion => "w:ins",
            Self::Deletion => "w:del",
            Self::MoveFrom => "w:moveFrom",
            Self::MoveTo => "w:moveTo",
            Self::FormatChange => "w:rPrChange",
            Self::ParagraphChange => "w:pPrChange",
        }
    }
}

impl fmt::Display for RevisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insertion => write!(f, "Insertion"),
            Self::Deletion => write!(f, "Deletion"),
            Self::MoveFrom => write!(f, "Move From"),
            Self::MoveTo => write!(f, "Move To"),
            Self::FormatChange => write!(f, "Format Change"),
            Self::ParagraphChange => write!(f, "Paragraph Change"),
        }
    }
}

/// A single tracked change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub(crate) id: u32,
    pub kind: RevisionKind,
    pub(crate) author: String,
    pub(crate) date: DateTime<Utc>,
    pub(crate) paragraph: ParagraphId,
    /// Run position at the time of the change
    pub(crate) run: Option<usize>,
    /// Inserted or deleted text
    pub(crate) content: Option<String>,
    pub(crate) previous_run: Option<RunProperties>,
    pub(crate) previous_paragraph: Option<ParagraphProperties>,
    /// For a moved-from paragraph, the paragraph holding the moved copy
    pub(crate) moved_to: Option<ParagraphId>,
}

impl Revision {
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[inline]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[inline]
    pub fn paragraph(&self) -> ParagraphId {
        self.paragraph
    }

    #[inline]
    pub fn run(&self) -> Option<usize> {
        self.run
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn previous_run(&self) -> Option<&RunProperties> {
        self.previous_run.as_ref()
    }

    pub fn previous_paragraph(&self) -> Option<&ParagraphProperties> {
        self.previous_paragraph.as_ref()
    }

    fn write_attributes(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#" w:id="{}" w:author="{}" w:date="{}""#,
            self.id,
            escape_xml(&self.author),
            w3c_date(&self.date)
        )?;
        Ok(())
    }

    /// Opening wrapper (`<w:ins ...>` etc.) around marked runs.
    pub(crate) fn write_open(&self, xml: &mut String) -> Result<()> {
        write!(xml, "<{}", self.kind.tag())?;
        self.write_attributes(xml)?;
        xml.push('>');
        Ok(())
    }

    pub(crate) fn write_close(&self, xml: &mut String) {
        xml.push_str("</");
        xml.push_str(self.kind.tag());
        xml.push('>');
    }

    /// Self-closing marker for a paragraph mark.
    pub(crate) fn write_mark(&self, xml: &mut String) -> Result<()> {
        write!(xml, "<{}", self.kind.tag())?;
        self.write_attributes(xml)?;
        xml.push_str("/>");
        Ok(())
    }

    /// `w:rPrChange` or `w:pPrChange` holding the formatting before the change.
    pub(crate) fn write_property_change(&self, xml: &mut String) -> Result<()> {
        match self.kind {
            RevisionKind::FormatChange => {
                self.write_open(xml)?;
                xml.push_str("<w:rPr>");
                if let Some(ref previous) = self.previous_run {
                    previous.write_children(xml)?;
                }
                xml.push_str("</w:rPr>");
            },
            RevisionKind::ParagraphChange => {
                self.write_open(xml)?;
                xml.push_str("<w:pPr>");
                if let Some(ref previous) = self.previous_paragraph {
                    previous.write_children(xml)?;
                }
                xml.push_str("</w:pPr>");
            },
            _ => return Ok(()),
        }
        self.write_close(xml);
        Ok(())
    }
}

/// Tracking state and revision records of one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevisionManager {
    enabled: bool,
    author: String,
    /// Ascending by id
    revisions: Vec<Revision>,
    ids: IdAllocator,
}

impl RevisionManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn enable(&mut self, author: &str) {
        self.enabled = true;
        self.author = author.to_string();
    }

    /// Stop tracking; existing records are kept.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn get(&self, id: u32) -> Option<&Revision> {
        self.revisions
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|pos| &self.revisions[pos])
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.enabled {
            Ok(())
        } else {
            Err(OoxmlError::TrackChangesDisabled)
        }
    }

    /// Append a record by the current author; callers fill in the payload.
    pub(crate) fn record(
        &mut self,
        kind: RevisionKind,
        paragraph: ParagraphId,
        run: Option<usize>,
    ) -> &mut Revision {
        let id = self.ids.next_id() as u32;
        self.revisions.push(Revision {
            id,
            kind,
            author: self.author.clone(),
            date: Utc::now(),
            paragraph,
            run,
            content: None,
            previous_run: None,
            previous_paragraph: None,
            moved_to: None,
        });
        let last = self.revisions.len() - 1;
        &mut self.revisions[last]
    }

    pub(crate) fn take(&mut self, id: u32) -> Option<Revision> {
        let pos = self.revisions.binary_search_by_key(&id, |r| r.id).ok()?;
        Some(self.revisions.remove(pos))
    }

    /// Drop records anchored to a removed paragraph; returns how many went.
    pub(crate) fn drop_anchored(&mut self, paragraph: ParagraphId) -> usize {
        let before = self.revisions.len();
        self.revisions.retain(|r| r.paragraph != paragraph);
        before - self.revisions.len()
    }
}

impl Document {
    /// Start recording revisions attributed to `author`.
    pub fn enable_track_changes(&mut self, author: &str) {
        self.revisions.enable(author);
    }

    pub fn disable_track_changes(&mut self) {
        self.revisions.disable();
    }

    pub fn is_tracking(&self) -> bool {
        self.revisions.is_enabled()
    }

    pub fn revisions(&self) -> &[Revision] {
        self.revisions.revisions()
    }

    pub fn revision(&self, id: u32) -> Option<&Revision> {
        self.revisions.get(id)
    }

    pub(crate) fn revision_manager(&self) -> &RevisionManager {
        &self.revisions
    }

    /// Record a change against existing content and mark it.
    ///
    /// Insertions, deletions and moves mark the run at `run_index`, or the
    /// whole paragraph when no run is given. A formatting change needs a run
    /// and snapshots its current properties; a paragraph change snapshots
    /// the paragraph properties. The caller applies the new formatting.
    pub fn create_revision(
        &mut self,
        kind: RevisionKind,
        paragraph_index: usize,
        run_index: Option<usize>,
        content: Option<&str>,
    ) -> Result<u32> {
        self.revisions.ensure_enabled()?;
        let paragraph = self.paragraph(paragraph_index)?;
        if let Some(index) = run_index {
            check_run(paragraph, index)?;
        }
        match kind {
            RevisionKind::FormatChange if run_index.is_none() => {
                return Err(OoxmlError::InvalidValue(
                    "a format change needs a run".to_string(),
                ));
            },
            _ if kind.marks_content() => check_unmarked(paragraph, run_index)?,
            _ => {},
        }

        let id = self.mark(kind, paragraph_index, run_index)?;
        if let Some(text) = content
            && let Some(rev) = self.revisions.revisions.last_mut()
        {
            rev.content = Some(text.to_string());
        }
        Ok(id)
    }

    /// Insert a run as a tracked insertion; `None` appends it.
    pub fn tracked_insert_text(
        &mut self,
        paragraph_index: usize,
        run_index: Option<usize>,
        text: &str,
        properties: RunProperties,
    ) -> Result<u32> {
        self.revisions.ensure_enabled()?;
        let len = self.paragraph(paragraph_index)?.runs().len();
        let position = run_index.unwrap_or(len);
        if position > len {
            return Err(OoxmlError::invalid_index("run", position, len + 1));
        }

        let paragraph = self.paragraph_mut(paragraph_index)?;
        let pid = paragraph.id();
        paragraph.insert_run(position, Run::text(text).with_properties(properties));
        let rev = self
            .revisions
            .record(RevisionKind::Insertion, pid, Some(position));
        rev.content = Some(text.to_string());
        let id = rev.id;
        self.paragraph_mut(paragraph_index)?.runs[position].revision = Some(id);
        Ok(id)
    }

    /// Mark a run as deleted; it stays in place until accepted.
    pub fn tracked_delete_run(&mut self, paragraph_index: usize, run_index: usize) -> Result<u32> {
        self.revisions.ensure_enabled()?;
        let paragraph = self.paragraph(paragraph_index)?;
        check_run(paragraph, run_index)?;
        check_unmarked(paragraph, Some(run_index))?;
        let text = paragraph.runs()[run_index].plain_text().to_string();

        let id = self.mark(RevisionKind::Deletion, paragraph_index, Some(run_index))?;
        if let Some(rev) = self.revisions.revisions.last_mut() {
            rev.content = Some(text);
        }
        Ok(id)
    }

    /// Merge `properties` into a run, recording the previous formatting.
    ///
    /// Repeated changes to the same run collapse into one record that keeps
    /// the formatting from before the first change.
    pub fn tracked_format_run(
        &mut self,
        paragraph_index: usize,
        run_index: usize,
        properties: &RunProperties,
    ) -> Result<u32> {
        self.revisions.ensure_enabled()?;
        check_run(self.paragraph(paragraph_index)?, run_index)?;

        let id = self.mark(RevisionKind::FormatChange, paragraph_index, Some(run_index))?;
        self.paragraph_mut(paragraph_index)?.runs[run_index]
            .properties
            .merge(properties);
        Ok(id)
    }

    /// Insert a new paragraph as a tracked insertion.
    pub fn tracked_insert_paragraph(&mut self, index: Option<usize>, text: &str) -> Result<u32> {
        self.revisions.ensure_enabled()?;
        let pid = self.insert_paragraph(Paragraph::with_text(text), index);
        let rev = self.revisions.record(RevisionKind::Insertion, pid, None);
        rev.content = Some(text.to_string());
        let id = rev.id;
        if let Some(paragraph) = self.paragraph_by_id_mut(pid) {
            mark_paragraph(paragraph, id);
        }
        Ok(id)
    }

    /// Merge paragraph properties, recording the previous ones.
    pub fn tracked_set_paragraph_format(
        &mut self,
        paragraph_index: usize,
        properties: &ParagraphProperties,
    ) -> Result<u32> {
        self.revisions.ensure_enabled()?;
        let id = self.mark(RevisionKind::ParagraphChange, paragraph_index, None)?;
        self.paragraph_mut(paragraph_index)?
            .properties
            .merge(properties);
        Ok(id)
    }

    /// Move a paragraph: the original is marked moved-from and a copy marked
    /// moved-to is inserted at `to` (a position in the current paragraph
    /// sequence, clamped). Returns the `(from, to)` revision ids.
    ///
    /// Comments, notes and bookmarks stay on the original until the
    /// moved-from side is accepted, at which point they follow the copy.
    pub fn tracked_move_paragraph(&mut self, from: usize, to: usize) -> Result<(u32, u32)> {
        self.revisions.ensure_enabled()?;
        let source = self.paragraph(from)?;
        check_unmarked(source, None)?;
        if source.runs().iter().any(|r| r.revision.is_some()) {
            return Err(OoxmlError::InvalidValue(format!(
                "paragraph {from} already has tracked changes"
            )));
        }
        let mut copy = source.clone();
        copy.section_break = None;
        let text = source.text();

        let from_pid = source.id();
        let to_pid = self.insert_paragraph(copy, Some(to));

        let rev = self.revisions.record(RevisionKind::MoveFrom, from_pid, None);
        rev.content = Some(text.clone());
        rev.moved_to = Some(to_pid);
        let from_id = rev.id;
        let rev = self.revisions.record(RevisionKind::MoveTo, to_pid, None);
        rev.content = Some(text);
        let to_id = rev.id;

        if let Some(paragraph) = self.paragraph_by_id_mut(from_pid) {
            mark_paragraph(paragraph, from_id);
        }
        if let Some(paragraph) = self.paragraph_by_id_mut(to_pid) {
            mark_paragraph(paragraph, to_id);
        }
        Ok((from_id, to_id))
    }

    pub fn accept_revision(&mut self, id: u32) -> Result<()> {
        self.resolve_revision(id, true)
    }

    pub fn reject_revision(&mut self, id: u32) -> Result<()> {
        self.resolve_revision(id, false)
    }

    /// Accept every revision in id order; returns how many were resolved.
    pub fn accept_all(&mut self) -> usize {
        self.resolve_all(true)
    }

    pub fn reject_all(&mut self) -> usize {
        self.resolve_all(false)
    }

    fn resolve_all(&mut self, accept: bool) -> usize {
        let ids: Vec<u32> = self.revisions.revisions.iter().map(|r| r.id).collect();
        // Resolving one revision can remove a paragraph and the records anchored to it.
        ids.into_iter()
            .filter(|&id| self.resolve_revision(id, accept).is_ok())
            .count()
    }

    fn resolve_revision(&mut self, id: u32, accept: bool) -> Result<()> {
        let revision = self
            .revisions
            .take(id)
            .ok_or_else(|| OoxmlError::not_found("revision", id))?;

        match revision.kind {
            kind if kind.marks_content() => {
                let drop_content = accept == kind.removes_content();
                let mut doomed = Vec::new();
                for paragraph in self.all_paragraphs_mut() {
                    if paragraph.revision == Some(id) {
                        paragraph.revision = None;
                        if drop_content {
                            doomed.push(paragraph.id);
                        }
                    }
                    let mut i = 0;
                    while i < paragraph.runs.len() {
                        if paragraph.runs[i].revision == Some(id) {
                            if drop_content {
                                paragraph.remove_run(i);
                                continue;
                            }
                            paragraph.runs[i].revision = None;
                        }
                        i += 1;
                    }
                }
                // Annotations travel with accepted moved text to the copy.
                if drop_content
                    && let Some(target) = revision.moved_to
                    && self.paragraph_index(target).is_some()
                {
                    for &pid in &doomed {
                        self.reanchor(pid, target);
                    }
                }
                for pid in doomed {
                    self.remove_paragraph_by_id(pid);
                }
            },
            RevisionKind::FormatChange => {
                for paragraph in self.all_paragraphs_mut() {
                    for run in paragraph.runs.iter_mut() {
                        if run.format_revision == Some(id) {
                            run.format_revision = None;
                            if !accept && let Some(ref previous) = revision.previous_run {
                                run.properties = previous.clone();
                            }
                        }
                    }
                }
            },
            _ => {
                for paragraph in self.all_paragraphs_mut() {
                    if paragraph.format_revision == Some(id) {
                        paragraph.format_revision = None;
                        if !accept && let Some(ref previous) = revision.previous_paragraph {
                            paragraph.properties = previous.clone();
                        }
                    }
                }
            },
        }
        Ok(())
    }

    /// Record `kind` against validated content and attach the marker.
    fn mark(
        &mut self,
        kind: RevisionKind,
        paragraph_index: usize,
        run_index: Option<usize>,
    ) -> Result<u32> {
        let paragraph = self.paragraph(paragraph_index)?;
        let pid = paragraph.id();

        // A second formatting change keeps the snapshot from the first one.
        let (earlier, snapshot_run, snapshot_paragraph) = match (kind, run_index) {
            (RevisionKind::FormatChange, Some(r)) => {
                let run = &paragraph.runs()[r];
                (run.format_revision, Some(run.properties.clone()), None)
            },
            (RevisionKind::ParagraphChange, _) => (
                paragraph.format_revision,
                None,
                Some(paragraph.properties.clone()),
            ),
            _ => (None, None, None),
        };
        let earlier = earlier.and_then(|old| self.revisions.take(old));

        let rev = self.revisions.record(kind, pid, run_index);
        rev.previous_run = earlier
            .as_ref()
            .and_then(|e| e.previous_run.clone())
            .or(snapshot_run);
        rev.previous_paragraph = earlier
            .and_then(|e| e.previous_paragraph)
            .or(snapshot_paragraph);
        let id = rev.id;

        let paragraph = self.paragraph_mut(paragraph_index)?;
        match (kind, run_index) {
            (RevisionKind::FormatChange, Some(r)) => paragraph.runs[r].format_revision = Some(id),
            (RevisionKind::ParagraphChange, _) => paragraph.format_revision = Some(id),
            (_, Some(r)) => paragraph.runs[r].revision = Some(id),
            (_, None) => mark_paragraph(paragraph, id),
        }
        Ok(id)
    }
}

/// Mark a whole paragraph, its mark and every run, with one revision.
fn mark_paragraph(paragraph: &mut Paragraph, id: u32) {
    paragraph.revision = Some(id);
    for run in paragraph.runs.iter_mut() {
        run.revision = Some(id);
    }
}

fn check_run(paragraph: &Paragraph, index: usize) -> Result<()> {
    let len = paragraph.runs().len();
    if index >= len {
        return Err(OoxmlError::invalid_index("run", index, len));
    }
    Ok(())
}

/// Insertions, deletions and moves do not stack on already marked content.
fn check_unmarked(paragraph: &Paragraph, run_index: Option<usize>) -> Result<()> {
    let existing = match run_index {
        Some(r) => paragraph.runs()[r].revision,
        None => paragraph.revision,
    };
    match existing {
        Some(id) => Err(OoxmlError::InvalidValue(format!(
            "content already carries revision {id}"
        ))),
        None => Ok(()),
    }
}
