use pagewatch_core::{Comparison, DiffStyle};

#[test]
fn missing_snapshot_is_initial() {
    let comparison = Comparison::between(None, "Hello");
    assert_eq!(comparison, Comparison::Initial);
    assert!(comparison.needs_persist());

    let report = comparison.report("Hello", DiffStyle::Plain).expect("report");
    assert_eq!(report.text, "(initial fetch)");
    assert_eq!(report.edits, 0);
}

#[test]
fn identical_text_is_unchanged_without_report() {
    let comparison = Comparison::between(Some("Hello world"), "Hello world");
    assert_eq!(comparison, Comparison::Unchanged);
    assert!(!comparison.needs_persist());
    assert!(comparison.report("Hello world", DiffStyle::Plain).is_none());
}

#[test]
fn empty_snapshot_is_not_initial() {
    let comparison = Comparison::between(Some(""), "now there is text");
    assert_eq!(comparison, Comparison::Changed { previous: "" });
    let report = comparison
        .report("now there is text", DiffStyle::Plain)
        .expect("report");
    assert_eq!(report.edits, 1);
}

#[test]
fn changed_text_renders_diff() {
    let comparison = Comparison::between(Some("A\nB\nC"), "A\nX\nC");
    assert!(comparison.needs_persist());
    let report = comparison.report("A\nX\nC", DiffStyle::Plain).expect("report");
    assert!(report.text.contains("[-B-]"));
    assert!(report.text.contains("{+X+}"));
    assert_eq!(report.edits, 2);
}
