use crate::report::{render_diff, DiffStyle, EditReport};

/// Outcome of comparing a freshly fetched text against the stored snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison<'a> {
    /// No snapshot existed yet.
    Initial,
    /// The text matches the snapshot byte for byte.
    Unchanged,
    Changed { previous: &'a str },
}

impl<'a> Comparison<'a> {
    pub fn between(previous: Option<&'a str>, current: &str) -> Self {
        match previous {
            None => Comparison::Initial,
            Some(previous) if previous == current => Comparison::Unchanged,
            Some(previous) => Comparison::Changed { previous },
        }
    }

    /// Whether the current text has to be written as the new snapshot.
    pub fn needs_persist(&self) -> bool {
        !matches!(self, Comparison::Unchanged)
    }

    /// Report for this comparison. The diff is only computed for `Changed`.
    pub fn report(&self, current: &str, style: DiffStyle) -> Option<EditReport> {
        match self {
            Comparison::Initial => Some(EditReport::initial()),
            Comparison::Unchanged => None,
            Comparison::Changed { previous } => Some(render_diff(previous, current, style)),
        }
    }
}
