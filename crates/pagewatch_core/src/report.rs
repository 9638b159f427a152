use std::fmt::Write;

use crate::diff::{semantic_diff, SegmentKind};

/// Report text emitted the first time a page is observed.
pub const INITIAL_FETCH_REPORT: &str = "(initial fetch)";

/// How inserted and deleted spans are marked in a report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DiffStyle {
    /// Green for insertions, red for deletions.
    #[default]
    Ansi,
    /// `{+inserted+}` and `[-deleted-]` tags, for non-terminal output.
    Plain,
}

impl DiffStyle {
    fn markers(self, kind: SegmentKind) -> (&'static str, &'static str) {
        match (self, kind) {
            (DiffStyle::Ansi, SegmentKind::Insert) => ("\x1b[32m", "\x1b[0m"),
            (DiffStyle::Ansi, _) => ("\x1b[31m", "\x1b[0m"),
            (DiffStyle::Plain, SegmentKind::Insert) => ("{+", "+}"),
            (DiffStyle::Plain, _) => ("[-", "-]"),
        }
    }
}

/// Annotated change report for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditReport {
    pub text: String,
    /// Number of inserted and deleted spans.
    pub edits: usize,
}

impl EditReport {
    pub fn initial() -> Self {
        Self {
            text: INITIAL_FETCH_REPORT.to_string(),
            edits: 0,
        }
    }
}

/// Render the changes from `old` to `new`.
///
/// Unchanged spans with two or more line breaks are shortened to the text
/// before the first break, a `(skipped N bytes)` marker and the text from the
/// last break onward.
pub fn render_diff(old: &str, new: &str, style: DiffStyle) -> EditReport {
    let mut text = String::with_capacity(old.len().max(new.len()));
    let mut edits = 0;

    for segment in semantic_diff(old, new) {
        match segment.kind {
            SegmentKind::Equal => push_context(&mut text, &segment.text),
            kind => {
                edits += 1;
                let (open, close) = style.markers(kind);
                text.push_str(open);
                text.push_str(&segment.text);
                text.push_str(close);
            }
        }
    }

    EditReport { text, edits }
}

fn push_context(out: &mut String, span: &str) {
    match (span.find('\n'), span.rfind('\n')) {
        (Some(first), Some(last)) if first != last => {
            out.push_str(&span[..first]);
            let _ = write!(out, "\n(skipped {} bytes)\n", last - first);
            out.push_str(&span[last..]);
        }
        _ => out.push_str(span),
    }
}
