use std::collections::VecDeque;
use std::mem;
use std::time::Duration;

use similar::{Algorithm, ChangeTag, TextDiff};

/// Upper bound on the time spent computing one character-level diff.
/// Past the deadline the diff degrades to a coarser (still correct) script.
const DIFF_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Equal,
    Delete,
    Insert,
}

/// One contiguous span of an edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.kind != SegmentKind::Equal
    }
}

/// Character-level edit script from `old` to `new`, merged and passed through
/// the semantic cleanup: an unchanged span that is no longer than the edits on
/// both of its sides is folded into those edits.
///
/// Between two equal spans there is at most one delete followed by at most one
/// insert.
pub fn semantic_diff(old: &str, new: &str) -> Vec<Segment> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .timeout(DIFF_TIMEOUT)
        .diff_chars(old, new);

    let raw = diff
        .iter_all_changes()
        .map(|change| {
            let kind = match change.tag() {
                ChangeTag::Equal => SegmentKind::Equal,
                ChangeTag::Delete => SegmentKind::Delete,
                ChangeTag::Insert => SegmentKind::Insert,
            };
            Segment::new(kind, change.value())
        })
        .collect();

    cleanup_semantic(merge(raw))
}

/// Coalesces adjacent spans: consecutive equal spans are joined, and every run
/// of edits between two equal spans becomes one delete plus one insert.
fn merge(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    let mut deleted = String::new();
    let mut inserted = String::new();

    for segment in segments {
        match segment.kind {
            SegmentKind::Delete => deleted.push_str(&segment.text),
            SegmentKind::Insert => inserted.push_str(&segment.text),
            SegmentKind::Equal => {
                flush_edits(&mut merged, &mut deleted, &mut inserted);
                if segment.text.is_empty() {
                    continue;
                }
                match merged.last_mut() {
                    Some(last) if last.kind == SegmentKind::Equal => {
                        last.text.push_str(&segment.text)
                    }
                    _ => merged.push(segment),
                }
            }
        }
    }
    flush_edits(&mut merged, &mut deleted, &mut inserted);
    merged
}

fn flush_edits(merged: &mut Vec<Segment>, deleted: &mut String, inserted: &mut String) {
    if !deleted.is_empty() {
        merged.push(Segment::new(SegmentKind::Delete, mem::take(deleted)));
    }
    if !inserted.is_empty() {
        merged.push(Segment::new(SegmentKind::Insert, mem::take(inserted)));
    }
}

/// Span of the working script, with its length in characters cached.
struct Span {
    kind: SegmentKind,
    text: String,
    chars: usize,
}

impl Span {
    fn new(kind: SegmentKind, text: String) -> Self {
        let chars = text.chars().count();
        Self { kind, text, chars }
    }

    fn is_edit(&self) -> bool {
        self.kind != SegmentKind::Equal
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct EditLengths {
    deleted: usize,
    inserted: usize,
}

impl EditLengths {
    /// Lengths of the edit run at the head of `run`.
    fn of<'a>(run: impl Iterator<Item = &'a Span>) -> Self {
        let mut lengths = Self::default();
        for span in run.take_while(|s| s.is_edit()) {
            match span.kind {
                SegmentKind::Delete => lengths.deleted += span.chars,
                SegmentKind::Insert => lengths.inserted += span.chars,
                SegmentKind::Equal => {}
            }
        }
        lengths
    }

    fn largest(self) -> usize {
        self.deleted.max(self.inserted)
    }
}

fn absorbable(len: usize, before: EditLengths, after: EditLengths) -> bool {
    let (before, after) = (before.largest(), after.largest());
    before > 0 && after > 0 && len <= before && len <= after
}

/// Absorbing an equality only ever grows the edit runs next to the remaining
/// equalities, so a single forward pass reaches the fixed point as long as
/// every absorption rechecks the equalities to its left.
///
/// Expects merged input.
fn cleanup_semantic(segments: Vec<Segment>) -> Vec<Segment> {
    let mut rest: VecDeque<Span> = segments
        .into_iter()
        .map(|segment| Span::new(segment.kind, segment.text))
        .collect();
    let mut out: Vec<Span> = Vec::with_capacity(rest.len());

    while let Some(span) = rest.pop_front() {
        if span.is_edit() {
            push_edit(&mut out, span);
            continue;
        }
        let before = EditLengths::of(out.iter().rev());
        let after = EditLengths::of(rest.iter());
        if !absorbable(span.chars, before, after) {
            out.push(span);
            continue;
        }

        absorb(&mut out, span);
        while rest.front().is_some_and(Span::is_edit) {
            if let Some(edit) = rest.pop_front() {
                push_edit(&mut out, edit);
            }
        }
        absorb_backwards(&mut out);
    }

    out.into_iter()
        .map(|span| Segment::new(span.kind, span.text))
        .collect()
}

/// Folds the equalities left of the trailing edit run into it for as long as
/// they qualify.
fn absorb_backwards(out: &mut Vec<Span>) {
    loop {
        let Some(index) = out.iter().rposition(|s| !s.is_edit()) else {
            return;
        };
        let before = EditLengths::of(out[..index].iter().rev());
        let after = EditLengths::of(out[index + 1..].iter());
        if !absorbable(out[index].chars, before, after) {
            return;
        }
        let trailing = out.split_off(index + 1);
        if let Some(equality) = out.pop() {
            absorb(out, equality);
        }
        for edit in trailing {
            push_edit(out, edit);
        }
    }
}

fn absorb(out: &mut Vec<Span>, equality: Span) {
    push_edit(
        out,
        Span {
            kind: SegmentKind::Delete,
            text: equality.text.clone(),
            chars: equality.chars,
        },
    );
    push_edit(
        out,
        Span {
            kind: SegmentKind::Insert,
            ..equality
        },
    );
}

/// Appends an edit to the trailing run, keeping the delete ahead of the insert.
fn push_edit(out: &mut Vec<Span>, edit: Span) {
    let run_start = out.iter().rposition(|s| !s.is_edit()).map_or(0, |i| i + 1);
    if let Some(span) = out[run_start..].iter_mut().find(|s| s.kind == edit.kind) {
        span.text.push_str(&edit.text);
        span.chars += edit.chars;
    } else if edit.kind == SegmentKind::Delete {
        out.insert(run_start, edit);
    } else {
        out.push(edit);
    }
}

#[cfg(test)]
mod tests {
    use super::{cleanup_semantic, merge, Segment, SegmentKind};

    fn eq(text: &str) -> Segment {
        Segment::new(SegmentKind::Equal, text)
    }
    fn del(text: &str) -> Segment {
        Segment::new(SegmentKind::Delete, text)
    }
    fn ins(text: &str) -> Segment {
        Segment::new(SegmentKind::Insert, text)
    }

    #[test]
    fn merge_groups_edit_runs_as_delete_then_insert() {
        let merged = merge(vec![ins("x"), del("a"), ins("y"), del("b"), eq("c"), eq("d")]);
        assert_eq!(merged, vec![del("ab"), ins("xy"), eq("cd")]);
    }

    #[test]
    fn merge_drops_empty_equalities() {
        let merged = merge(vec![del("a"), eq(""), del("b")]);
        assert_eq!(merged, vec![del("ab")]);
    }

    #[test]
    fn short_equality_between_edits_is_absorbed() {
        let cleaned = cleanup_semantic(vec![del("a"), ins("x"), eq("b"), del("c"), ins("z")]);
        assert_eq!(cleaned, vec![del("abc"), ins("xbz")]);
    }

    #[test]
    fn long_equality_is_kept() {
        let input = vec![del("a"), eq("long context"), ins("b")];
        assert_eq!(cleanup_semantic(input.clone()), input);
    }

    #[test]
    fn absorption_cascades_to_earlier_equalities() {
        // "d" qualifies first; the grown run after "bb" then lets it go too.
        let cleaned = cleanup_semantic(vec![
            del("aaa"),
            eq("bb"),
            del("c"),
            eq("d"),
            del("eee"),
        ]);
        assert_eq!(cleaned, vec![del("aaabbcdeee"), ins("bbd")]);
    }

    #[test]
    fn alternating_edits_collapse_into_one_run() {
        let mut input = Vec::new();
        for _ in 0..2_000 {
            input.push(del("x"));
            input.push(eq("y"));
        }
        input.push(del("x"));
        let cleaned = cleanup_semantic(input);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].text.len(), 4_001);
        assert_eq!(cleaned[1].text, "y".repeat(2_000));
    }

    #[test]
    fn leading_and_trailing_equalities_are_kept() {
        let input = vec![eq("x"), del("abc"), eq("y")];
        assert_eq!(cleanup_semantic(input.clone()), input);
    }
}
