//! Longest-common-subsequence alignment of two paragraph lists.

use super::snapshot::ParagraphSnapshot;

/// One step of an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// `A[a]` and `B[b]` match
    Both(usize, usize),
    /// Only in A
    OnlyA(usize),
    /// Only in B
    OnlyB(usize),
}

/// Align `a` with `b`, in document order.
///
/// Builds the full `(n + 1) x (m + 1)` table, so time and memory are
/// O(n * m). When both directions keep the subsequence optimal the B element
/// is emitted as an insertion first, which makes the output deterministic.
pub(crate) fn align(a: &[ParagraphSnapshot], b: &[ParagraphSnapshot]) -> Vec<Step> {
    let (n, m) = (a.len(), b.len());
    let width = m + 1;
    let mut dp = vec![0u32; (n + 1) * width];

    for i in 1..=n {
        for j in 1..=m {
            dp[i * width + j] = if a[i - 1].matches(&b[j - 1]) {
                dp[(i - 1) * width + j - 1] + 1
            } else {
                dp[(i - 1) * width + j].max(dp[i * width + j - 1])
            };
        }
    }

    let mut steps = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1].matches(&b[j - 1]) {
            steps.push(Step::Both(i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i * width + j - 1] >= dp[(i - 1) * width + j]) {
            steps.push(Step::OnlyB(j - 1));
            j -= 1;
        } else {
            steps.push(Step::OnlyA(i - 1));
            i -= 1;
        }
    }
    steps.reverse();
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::writer::Paragraph;

    fn snaps(texts: &[&str]) -> Vec<ParagraphSnapshot> {
        texts
            .iter()
            .map(|t| ParagraphSnapshot::new(&Paragraph::with_text(t)))
            .collect()
    }

    #[test]
    fn test_identical_lists() {
        let a = snaps(&["x", "y", "z"]);
        assert_eq!(
            align(&a, &a),
            [Step::Both(0, 0), Step::Both(1, 1), Step::Both(2, 2)]
        );
    }

    #[test]
    fn test_deletion_in_the_middle() {
        let a = snaps(&["p0", "p1", "p2", "p3"]);
        let b = snaps(&["p0", "p1", "p3"]);
        assert_eq!(
            align(&a, &b),
            [
                Step::Both(0, 0),
                Step::Both(1, 1),
                Step::OnlyA(2),
                Step::Both(3, 2)
            ]
        );
    }

    #[test]
    fn test_replacement_puts_deletion_before_insertion() {
        // Backtracking emits B first, so in document order A comes first.
        let a = snaps(&["same", "old", "end"]);
        let b = snaps(&["same", "new", "end"]);
        assert_eq!(
            align(&a, &b),
            [
                Step::Both(0, 0),
                Step::OnlyA(1),
                Step::OnlyB(1),
                Step::Both(2, 2)
            ]
        );
    }

    #[test]
    fn test_empty_sides() {
        let a = snaps(&["a", "b"]);
        assert_eq!(align(&a, &[]), [Step::OnlyA(0), Step::OnlyA(1)]);
        assert_eq!(align(&[], &a), [Step::OnlyB(0), Step::OnlyB(1)]);
        assert!(align(&[], &[]).is_empty());
    }
}
