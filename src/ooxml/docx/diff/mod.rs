//! Paragraph-level comparison of two documents.
//!
//! [`compare`] snapshots the body paragraphs of both documents, aligns them
//! with a longest-common-subsequence table and classifies every aligned
//! entry.
//!
//! ```
//! use quince::ooxml::docx::Document;
//! use quince::ooxml::docx::diff::{ChangeKind, DiffOptions, compare};
//!
//! let mut a = Document::new();
//! for text in ["Intro", "The quick brown fox", "Conclusion"] {
//!     a.add_paragraph(text);
//! }
//! let mut b = a.clone();
//! b.update_paragraph(1, "The quick brown fox jumps")?;
//!
//! let report = compare(&a, &b, &DiffOptions::default());
//! assert_eq!(report.summary.modified, 1);
//! let (_, entry) = report.differences().next().unwrap();
//! assert_eq!(entry.kind, ChangeKind::Modified);
//! # Ok::<(), quince::ooxml::error::OoxmlError>(())
//! ```

mod lcs;
mod report;
mod snapshot;

pub use report::{
    ChangeKind, DiffEntry, DiffReport, DiffSummary, DocumentOutline, MAX_REPORTED_DIFFERENCES,
};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ooxml::docx::writer::Document;
use lcs::Step;
use snapshot::ParagraphSnapshot;

/// Largest accepted number of context lines.
pub const MAX_CONTEXT_LINES: usize = 3;

/// Adjacent deletion and insertion merge into one modification above this
/// word-set similarity.
const MODIFIED_THRESHOLD: f64 = 0.5;

/// What the comparison looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiffMode {
    /// Text only
    #[default]
    Text,
    /// Text plus inline formatting of matched paragraphs
    Formatting,
    /// Paragraph and word counts plus headings, no alignment
    Structure,
    /// Formatting plus paragraph style changes
    Full,
}

/// Options for [`compare`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    pub mode: DiffMode,
    /// Unchanged paragraphs shown before each difference, at most 3
    pub context_lines: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            mode: DiffMode::Text,
            context_lines: 1,
        }
    }
}

impl DiffOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_mode(mut self, mode: DiffMode) -> Self {
        self.mode = mode;
        self
    }

    /// Values above [`MAX_CONTEXT_LINES`] are clamped.
    #[inline]
    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines.min(MAX_CONTEXT_LINES);
        self
    }
}

/// Compare base document `a` with `b`.
///
/// Never fails: when either document has no body paragraphs the report is
/// marked as not comparable.
///
/// # Complexity
///
/// The alignment table has `(n + 1) * (m + 1)` cells for `n` and `m`
/// paragraphs, so time and memory grow as O(n * m).
pub fn compare(a: &Document, b: &Document, options: &DiffOptions) -> DiffReport {
    let context_lines = options.context_lines.min(MAX_CONTEXT_LINES);
    let left = snapshot::snapshot(a);
    let right = snapshot::snapshot(b);
    if left.is_empty() || right.is_empty() {
        return DiffReport::empty(options.mode, context_lines);
    }

    let mut report = DiffReport::empty(options.mode, context_lines);
    report.comparable = true;

    if options.mode == DiffMode::Structure {
        report.structure = Some((outline(&left), outline(&right)));
        return report;
    }

    let steps = lcs::align(&left, &right);
    report.entries = classify(&steps, &left, &right, options.mode);
    for entry in &report.entries {
        report.summary.count(entry.kind);
    }
    log::debug!(
        "compared {} and {} paragraphs: {} differences",
        left.len(),
        right.len(),
        report.summary.differences()
    );
    report
}

fn outline(snaps: &[ParagraphSnapshot]) -> DocumentOutline {
    DocumentOutline {
        paragraphs: snaps.len(),
        words: snaps.iter().map(ParagraphSnapshot::word_count).sum(),
        headings: snaps
            .iter()
            .filter(|s| s.is_heading())
            .map(|s| s.text.clone())
            .collect(),
    }
}

/// Only a lone A/B pair between matched steps (or the sequence ends) may
/// merge into a modification.
fn is_match(step: &Step) -> bool {
    matches!(step, Step::Both(..))
}

fn classify(
    steps: &[Step],
    a: &[ParagraphSnapshot],
    b: &[ParagraphSnapshot],
    mode: DiffMode,
) -> Vec<DiffEntry> {
    let mut entries = Vec::with_capacity(steps.len());
    let mut i = 0;
    while i < steps.len() {
        let isolated = (i == 0 || is_match(&steps[i - 1])) && steps.get(i + 2).is_none_or(is_match);
        let pair = match (steps[i], steps.get(i + 1)) {
            (Step::OnlyA(x), Some(&Step::OnlyB(y))) | (Step::OnlyB(y), Some(&Step::OnlyA(x)))
                if isolated =>
            {
                Some((x, y))
            },
            _ => None,
        };
        if let Some((x, y)) = pair {
            let similarity = jaccard(&a[x].text, &b[y].text);
            if similarity > MODIFIED_THRESHOLD {
                entries.push(DiffEntry {
                    kind: ChangeKind::Modified,
                    a_index: Some(x),
                    b_index: Some(y),
                    a_text: Some(a[x].text.clone()),
                    b_text: Some(b[y].text.clone()),
                    similarity: Some(similarity),
                });
                i += 2;
                continue;
            }
        }

        entries.push(match steps[i] {
            Step::Both(x, y) => {
                let format_changed = match mode {
                    DiffMode::Formatting => a[x].markup != b[y].markup,
                    DiffMode::Full => a[x].markup != b[y].markup || a[x].style != b[y].style,
                    DiffMode::Text | DiffMode::Structure => false,
                };
                DiffEntry {
                    kind: if format_changed {
                        ChangeKind::FormatOnly
                    } else {
                        ChangeKind::Unchanged
                    },
                    a_index: Some(x),
                    b_index: Some(y),
                    a_text: Some(a[x].text.clone()),
                    b_text: Some(b[y].text.clone()),
                    similarity: None,
                }
            },
            Step::OnlyA(x) => DiffEntry {
                kind: ChangeKind::Deleted,
                a_index: Some(x),
                b_index: None,
                a_text: Some(a[x].text.clone()),
                b_text: None,
                similarity: None,
            },
            Step::OnlyB(y) => DiffEntry {
                kind: ChangeKind::Added,
                a_index: None,
                b_index: Some(y),
                a_text: None,
                b_text: Some(b[y].text.clone()),
                similarity: None,
            },
        });
        i += 1;
    }
    entries
}

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard similarity of the lowercase word sets; two empty sets are equal.
fn jaccard(a: &str, b: &str) -> f64 {
    let (a, b) = (words(a), words(b));
    let union = a.union(&b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}
