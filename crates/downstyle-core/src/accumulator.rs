//! Attribute-run accumulator
//!
//! Collects text and attributes into a single growing buffer. Appending
//! extends the last run when it is mergeable with the new one; that only
//! affects how many runs there are, never the text or its offsets.

use crate::attributes::Attributes;
use crate::styled::{
    Decoration, OBJECT_REPLACEMENT, Placement, PlacementKind, Run, RunRole, SizeHint, StyledText,
};

#[derive(Debug)]
pub struct Accumulator {
    text: String,
    runs: Vec<Run>,
    placements: Vec<Placement>,
    decorations: Vec<Decoration>,
    merge: bool,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            runs: Vec::new(),
            placements: Vec::new(),
            decorations: Vec::new(),
            merge: true,
        }
    }

    /// An accumulator that opens a new run for every append
    pub fn without_merging() -> Self {
        Self {
            merge: false,
            ..Self::new()
        }
    }

    /// Current buffer length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn append(&mut self, text: &str, attributes: Attributes, role: RunRole) {
        if text.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(text);
        let run = Run {
            range: start..self.text.len(),
            role,
            attributes,
        };
        match self.runs.last_mut() {
            Some(last) if self.merge && last.can_merge(&run) => last.range.end = run.range.end,
            _ => self.runs.push(run),
        }
    }

    /// Reserve one placeholder cell for an embedded object; returns its offset
    pub fn append_placeholder(
        &mut self,
        attributes: Attributes,
        kind: PlacementKind,
        size: SizeHint,
    ) -> usize {
        let offset = self.text.len();
        let mut buf = [0; 4];
        self.append(
            OBJECT_REPLACEMENT.encode_utf8(&mut buf),
            attributes,
            RunRole::Object,
        );
        self.placements.push(Placement { offset, kind, size });
        offset
    }

    pub fn decorate(&mut self, decoration: Decoration) {
        if !decoration.range().is_empty() {
            self.decorations.push(decoration);
        }
    }

    pub fn finish(self) -> StyledText {
        let runs = coalesce(&self.runs);
        debug_assert!(
            covers(&runs, self.text.len()),
            "runs must partition the buffer"
        );
        debug_assert!(
            self.placements.iter().all(|p| self
                .text
                .get(p.offset..)
                .is_some_and(|rest| rest.starts_with(OBJECT_REPLACEMENT))),
            "placements must point at a placeholder"
        );
        debug_assert!(
            self.placements.windows(2).all(|w| w[0].offset < w[1].offset),
            "placements must be ordered by offset"
        );

        let mut decorations = self.decorations;
        // Outer decorations first: earlier start, then longer range, then
        // shallower quote depth for stripes sharing a range
        decorations.sort_by(|a, b| {
            a.range()
                .start
                .cmp(&b.range().start)
                .then(b.range().end.cmp(&a.range().end))
                .then(a.depth().cmp(&b.depth()))
        });

        StyledText {
            text: self.text,
            runs,
            placements: self.placements,
            decorations,
        }
    }
}

/// Merge adjacent mergeable runs.
///
/// Idempotent: `coalesce(&coalesce(runs)) == coalesce(runs)`.
pub fn coalesce(runs: &[Run]) -> Vec<Run> {
    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(last) if last.can_merge(run) => last.range.end = run.range.end,
            _ => merged.push(run.clone()),
        }
    }
    merged
}

/// Whether `runs` are contiguous, non-empty, and cover `0..len`
fn covers(runs: &[Run], len: usize) -> bool {
    let mut expected = 0;
    for run in runs {
        if run.range.start != expected || run.range.is_empty() {
            return false;
        }
        expected = run.range.end;
    }
    expected == len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::InlineDelta;
    use crate::style::{BlockStyle, Color, RuleStyle};
    use pretty_assertions::assert_eq;

    fn plain() -> Attributes {
        Attributes::from_block(&BlockStyle::default())
    }

    fn italic() -> Attributes {
        let mut attributes = plain();
        InlineDelta::emphasis().apply(&mut attributes);
        attributes
    }

    /// The same stream of appends, fed to a given accumulator
    fn feed(mut acc: Accumulator) -> StyledText {
        acc.append("Some ", plain(), RunRole::Content);
        acc.append("text", italic(), RunRole::Content);
        acc.append(" and ", plain(), RunRole::Content);
        acc.append("more", plain(), RunRole::Content);
        acc.append("\u{2029}", plain(), RunRole::Separator);
        acc.append_placeholder(
            plain(),
            PlacementKind::ThematicBreak(RuleStyle::default()),
            SizeHint::default(),
        );
        acc.append_placeholder(
            plain(),
            PlacementKind::ThematicBreak(RuleStyle::default()),
            SizeHint::default(),
        );
        acc.finish()
    }

    #[test]
    fn test_adjacent_equal_runs_merge() {
        let styled = feed(Accumulator::new());
        let ranges: Vec<_> = styled.runs.iter().map(|r| r.range.clone()).collect();
        assert_eq!(ranges, vec![0..5, 5..9, 9..18, 18..21, 21..24, 24..27]);
        assert_eq!(styled.text, "Some text and more\u{2029}\u{FFFC}\u{FFFC}");
    }

    #[test]
    fn test_merging_does_not_change_content() {
        let merged = feed(Accumulator::new());
        let unmerged = {
            let mut acc = Accumulator::without_merging();
            acc.append("Some ", plain(), RunRole::Content);
            acc.append("text", italic(), RunRole::Content);
            acc.append(" and ", plain(), RunRole::Content);
            acc.append("more", plain(), RunRole::Content);
            acc
        };
        assert_eq!(unmerged.runs.len(), 4);
        assert!(merged.text.starts_with(&unmerged.text));
        // finish coalesces, so both paths agree
        let unmerged = unmerged.finish();
        assert_eq!(unmerged.runs[..], merged.runs[..3]);
    }

    #[test]
    fn test_coalesce_is_idempotent() {
        let mut acc = Accumulator::without_merging();
        acc.append("a", plain(), RunRole::Content);
        acc.append("b", plain(), RunRole::Content);
        acc.append("c", italic(), RunRole::Content);
        acc.append("d", italic(), RunRole::Content);
        acc.append("\u{2029}", italic(), RunRole::Separator);
        acc.append("e", italic(), RunRole::Content);
        let raw = acc.runs.clone();

        let once = coalesce(&raw);
        let twice = coalesce(&once);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 4);
    }

    #[test]
    fn test_placeholder_offsets() {
        let styled = feed(Accumulator::new());
        let offsets: Vec<_> = styled.placements.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![21, 24]);
        assert_eq!(styled.run_at(21).map(|r| r.role), Some(RunRole::Object));
    }

    #[test]
    fn test_empty_append_is_ignored() {
        let mut acc = Accumulator::new();
        acc.append("", plain(), RunRole::Content);
        assert!(acc.is_empty());
        let styled = acc.finish();
        assert!(styled.runs.is_empty());
    }

    #[test]
    fn test_decorations_sorted_outer_first() {
        let mut acc = Accumulator::new();
        acc.append("quoted", plain(), RunRole::Content);
        let color = Color::BLACK;
        acc.decorate(Decoration::QuoteStripe {
            range: 0..6,
            depth: 2,
            color,
            thickness: 1.0,
        });
        acc.decorate(Decoration::BlockBackground { range: 0..0, color });
        acc.decorate(Decoration::QuoteStripe {
            range: 0..6,
            depth: 1,
            color,
            thickness: 1.0,
        });
        acc.decorate(Decoration::BlockBackground { range: 2..4, color });
        let styled = acc.finish();
        let order: Vec<_> = styled
            .decorations
            .iter()
            .map(|d| (d.range().clone(), d.depth()))
            .collect();
        assert_eq!(order, vec![(0..6, 1), (0..6, 2), (2..4, 0)]);
    }

    #[test]
    fn test_covers() {
        let run = |range| Run {
            range,
            role: RunRole::Content,
            attributes: plain(),
        };
        assert!(covers(&[], 0));
        assert!(covers(&[run(0..2), run(2..3)], 3));
        assert!(!covers(&[run(0..2), run(3..4)], 4));
        assert!(!covers(&[run(0..2)], 3));
    }
}
