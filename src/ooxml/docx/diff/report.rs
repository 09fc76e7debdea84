//! Diff results and their text rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DiffMode;

/// Differences listed before the rest is summarised.
pub const MAX_REPORTED_DIFFERENCES: usize = 50;

/// Texts longer than this many characters are excerpted when rendered.
const EXCERPT_LIMIT: usize = 100;
const EXCERPT_HEAD: usize = 60;
const EXCERPT_TAIL: usize = 30;

/// Classification of one aligned entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Unchanged,
    /// Same text, different formatting or style
    FormatOnly,
    /// Similar paragraphs on both sides
    Modified,
    /// Only in the compared document
    Added,
    /// Only in the base document
    Deleted,
}

impl ChangeKind {
    fn label(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::FormatOnly => "format",
            Self::Modified => "modified",
            Self::Added => "added",
            Self::Deleted => "deleted",
        }
    }
}

/// One entry of the alignment, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub kind: ChangeKind,
    /// Paragraph index in the base document
    pub a_index: Option<usize>,
    /// Paragraph index in the compared document
    pub b_index: Option<usize>,
    pub a_text: Option<String>,
    pub b_text: Option<String>,
    /// Word-set similarity, for modified entries
    pub similarity: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub unchanged: usize,
    pub modified: usize,
    pub added: usize,
    pub deleted: usize,
    pub format_only: usize,
}

impl DiffSummary {
    /// Everything except unchanged entries.
    pub fn differences(&self) -> usize {
        self.modified + self.added + self.deleted + self.format_only
    }

    pub(crate) fn count(&mut self, kind: ChangeKind) {
        match kind {
            ChangeKind::Unchanged => self.unchanged += 1,
            ChangeKind::FormatOnly => self.format_only += 1,
            ChangeKind::Modified => self.modified += 1,
            ChangeKind::Added => self.added += 1,
            ChangeKind::Deleted => self.deleted += 1,
        }
    }
}

/// Paragraph and word counts plus headings of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutline {
    pub paragraphs: usize,
    pub words: usize,
    pub headings: Vec<String>,
}

/// Result of comparing two documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    pub mode: DiffMode,
    /// Context lines actually used, after clamping
    pub context_lines: usize,
    /// `false` when either document had no paragraphs
    pub comparable: bool,
    pub summary: DiffSummary,
    /// Every aligned entry, unchanged ones included; empty in structure mode
    pub entries: Vec<DiffEntry>,
    /// Both outlines, in structure mode
    pub structure: Option<(DocumentOutline, DocumentOutline)>,
}

impl DiffReport {
    pub(crate) fn empty(mode: DiffMode, context_lines: usize) -> Self {
        Self {
            mode,
            context_lines,
            comparable: false,
            summary: DiffSummary::default(),
            entries: Vec::new(),
            structure: None,
        }
    }

    /// True when no entry is added, deleted, modified or format-only.
    pub fn is_identical(&self) -> bool {
        self.summary.differences() == 0
    }

    /// Non-unchanged entries with their positions in `entries`.
    pub fn differences(&self) -> impl Iterator<Item = (usize, &DiffEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind != ChangeKind::Unchanged)
    }

    /// Unchanged entries shown before the entry at `index`: at most
    /// `context_lines` of them, stopping at the previous difference.
    pub fn context(&self, index: usize) -> &[DiffEntry] {
        let end = index.min(self.entries.len());
        let mut start = end;
        while start > 0
            && end - start < self.context_lines
            && self.entries[start - 1].kind == ChangeKind::Unchanged
        {
            start -= 1;
        }
        &self.entries[start..end]
    }

    /// Differences beyond the reporting cap.
    pub fn truncated(&self) -> usize {
        self.summary
            .differences()
            .saturating_sub(MAX_REPORTED_DIFFERENCES)
    }
}

fn excerpt(text: &str) -> String {
    let count = text.chars().count();
    if count <= EXCERPT_LIMIT {
        return text.to_string();
    }
    let head: String = text.chars().take(EXCERPT_HEAD).collect();
    let tail: String = text.chars().skip(count - EXCERPT_TAIL).collect();
    format!("{head} ... {tail}")
}

fn position(index: Option<usize>) -> String {
    index.map_or_else(|| "-".to_string(), |i| i.to_string())
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.comparable {
            return writeln!(f, "No comparable content: at least one document is empty.");
        }

        if let Some((a, b)) = &self.structure {
            writeln!(f, "Structure comparison")?;
            writeln!(f, "Paragraphs: {} -> {}", a.paragraphs, b.paragraphs)?;
            writeln!(f, "Words: {} -> {}", a.words, b.words)?;
            writeln!(f, "Headings:")?;
            for i in 0..a.headings.len().max(b.headings.len()) {
                let left = a.headings.get(i).map_or("", String::as_str);
                let right = b.headings.get(i).map_or("", String::as_str);
                writeln!(f, "  {:>3}. {left} | {right}", i + 1)?;
            }
            return Ok(());
        }

        let s = &self.summary;
        writeln!(
            f,
            "{} unchanged, {} modified, {} added, {} deleted, {} format-only",
            s.unchanged, s.modified, s.added, s.deleted, s.format_only
        )?;

        for (index, entry) in self.differences().take(MAX_REPORTED_DIFFERENCES) {
            for ctx in self.context(index) {
                writeln!(
                    f,
                    "    [{}] {}",
                    position(ctx.a_index),
                    excerpt(ctx.a_text.as_deref().unwrap_or_default())
                )?;
            }
            let label = entry.kind.label();
            match (entry.a_text.as_deref(), entry.b_text.as_deref()) {
                (Some(a), Some(b)) if a != b => {
                    writeln!(
                        f,
                        "{label} A[{}] -> B[{}]",
                        position(entry.a_index),
                        position(entry.b_index)
                    )?;
                    writeln!(f, "  - {}", excerpt(a))?;
                    writeln!(f, "  + {}", excerpt(b))?;
                },
                (a, b) => {
                    writeln!(
                        f,
                        "{label} A[{}] B[{}]: {}",
                        position(entry.a_index),
                        position(entry.b_index),
                        excerpt(a.or(b).unwrap_or_default())
                    )?;
                },
            }
        }

        let rest = self.truncated();
        if rest > 0 {
            writeln!(f, "... {rest} more differences")?;
        }
        Ok(())
    }
}
