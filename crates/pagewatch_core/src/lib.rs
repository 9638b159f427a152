//! Pagewatch core: pure change detection, diff reporting and scheduling.
mod compare;
mod diff;
mod report;
mod schedule;

pub use compare::Comparison;
pub use diff::{semantic_diff, Segment, SegmentKind};
pub use report::{render_diff, DiffStyle, EditReport, INITIAL_FETCH_REPORT};
pub use schedule::ScheduleParams;
