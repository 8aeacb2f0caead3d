// Tests for extracting markers from task text.
use chrono::{NaiveDate, NaiveTime};
use taskcal::model::{
    AnnotateOptions, DateFormat, Priority, RawTask, TaskLink, annotate, annotate_task,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn raw(text: &str) -> RawTask {
    RawTask::new(text, "Inbox.md", 0)
}

fn plain(text: &str) -> taskcal::model::AnnotatedTask {
    annotate_task(&raw(text), &AnnotateOptions::default())
}

#[test]
fn test_due_and_priority() {
    let task = plain("- [ ] Buy milk 📅 2024-06-10 ⏫");

    assert_eq!(task.due, Some(date(2024, 6, 10)));
    assert_eq!(task.priority, Priority::A);
    assert_eq!(task.text, "Buy milk");
}

#[test]
fn test_recurrence_without_rule() {
    let task = plain("- [ ] Weekly review 🔁 📅 2024-06-14");

    assert!(task.recurrence);
    assert_eq!(task.recurrence_rule, None);
    assert_eq!(task.due, Some(date(2024, 6, 14)));
    assert_eq!(task.text, "Weekly review");
}

#[test]
fn test_recurrence_rule_is_kept() {
    let task = plain("Water plants 🔁 every week 📅 2024-06-14");

    assert!(task.recurrence);
    assert_eq!(task.recurrence_rule.as_deref(), Some("every week"));
    assert_eq!(task.text, "Water plants");
}

#[test]
fn test_start_scheduled_and_completion() {
    let task = plain("Plan trip 🛫 2024-06-01 ⏳ 2024-06-05 📅 2024-06-20 ✅ 2024-06-19");

    assert_eq!(task.start, Some(date(2024, 6, 1)));
    assert_eq!(task.scheduled, Some(date(2024, 6, 5)));
    assert_eq!(task.due, Some(date(2024, 6, 20)));
    assert_eq!(task.completion, Some(date(2024, 6, 19)));
    assert_eq!(task.text, "Plan trip");
}

#[test]
fn test_glyph_without_space_before_date() {
    let task = plain("Pay rent 📅2024-07-01");
    assert_eq!(task.due, Some(date(2024, 7, 1)));
    assert_eq!(task.text, "Pay rent");
}

#[test]
fn test_invalid_date_leaves_field_and_text() {
    let task = plain("Fix bug 📅 2024-02-30");

    assert_eq!(task.due, None);
    assert_eq!(task.text, "Fix bug 📅 2024-02-30");
}

#[test]
fn test_later_valid_marker_is_used() {
    let task = plain("Fix bug 📅 2024-02-30 📅 2024-03-01");

    assert_eq!(task.due, Some(date(2024, 3, 1)));
    assert_eq!(task.text, "Fix bug 📅 2024-02-30");
}

#[test]
fn test_time_is_moved_to_front() {
    let task = plain("Standup ⏰ 9:30 📅 2024-06-10");

    assert_eq!(task.time, NaiveTime::from_hms_opt(9, 30, 0));
    assert_eq!(task.text, "⏰ 9:30 Standup");
}

#[test]
fn test_priority_levels() {
    assert_eq!(plain("Low 🔽").priority, Priority::D);
    assert_eq!(plain("Medium 🔼").priority, Priority::B);
    assert_eq!(plain("High ⏫").priority, Priority::A);
    assert_eq!(plain("Highest 🔺").priority, Priority::A);
    assert_eq!(plain("Nothing").priority, Priority::C);
}

#[test]
fn test_priority_last_tested_glyph_wins() {
    // Low is tested before high, so high wins whatever the text order.
    let task = plain("Both ⏫ 🔽");
    assert_eq!(task.priority, Priority::A);
    assert_eq!(task.text, "Both");
}

#[test]
fn test_global_filter_is_removed() {
    let options = AnnotateOptions::new(None, Some("#task".to_string()));
    let task = annotate_task(&raw("#task Write report #task"), &options);
    assert_eq!(task.text, "Write report");
}

#[test]
fn test_empty_global_filter_falls_back_to_nested_tags() {
    let options = AnnotateOptions::new(None, Some("  ".to_string()));
    assert_eq!(options.global_filter, None);

    let task = annotate_task(&raw("Refactor #work/backend now #todo"), &options);
    assert_eq!(task.text, "Refactor now #todo");
}

#[test]
fn test_links_are_rewritten_and_recorded() {
    let task = plain(
        "Read [[Books/Dune.md]] and [[Plan|the plan]] see [docs](https://example.com) [note]",
    );

    assert_eq!(
        task.text,
        "Read 🔗 Books/Dune and 🔗 the plan see 🌐 docs note"
    );
    assert_eq!(
        task.links,
        vec![
            TaskLink::Note {
                target: "Plan".to_string(),
                alias: Some("the plan".to_string()),
            },
            TaskLink::Note {
                target: "Books/Dune.md".to_string(),
                alias: None,
            },
            TaskLink::External {
                label: "docs".to_string(),
                url: "https://example.com".to_string(),
            },
        ]
    );
}

#[test]
fn test_regular_tag_adds_prefix() {
    let task = plain("Take vitamins #regular");
    assert!(task.text.starts_with("🔁 "));
    assert!(!task.recurrence);
}

#[test]
fn test_daily_note_from_file_name() {
    let format = DateFormat::new("YYYY-MM-DD").unwrap();
    let options = AnnotateOptions::new(Some(format), None);

    let task = annotate_task(
        &RawTask::new("- [ ] Call Bob", "Daily/2024-06-10.md", 3),
        &options,
    );
    assert_eq!(task.daily_note, Some(date(2024, 6, 10)));
    assert_eq!(task.text, "Call Bob");

    let dated = annotate_task(
        &RawTask::new("Call Bob 📅 2024-06-12", "Daily/2024-06-10.md", 4),
        &options,
    );
    assert_eq!(dated.daily_note, None);
}

#[test]
fn test_daily_note_needs_matching_name() {
    let format = DateFormat::new("YYYY-MM-DD").unwrap();
    let options = AnnotateOptions::new(Some(format), None);

    let task = annotate_task(&RawTask::new("Call Bob", "Projects/Garden.md", 0), &options);
    assert_eq!(task.daily_note, None);
}

#[test]
fn test_annotation_is_pure() {
    let tasks = vec![
        raw("- [ ] Buy milk 📅 2024-06-10 ⏫ #home/kitchen"),
        raw("Read [[Dune]] ⏰ 08:00"),
    ];
    let before = tasks.clone();
    let options = AnnotateOptions::default();

    let first = annotate(&tasks, &options);
    let second = annotate(&tasks, &options);

    assert_eq!(tasks, before, "raw tasks must not be modified");
    assert_eq!(first, second);
}

#[test]
fn test_identity_is_copied() {
    let source = RawTask::new("Ship it", "Work/Release.md", 12).done();
    let task = annotate_task(&source, &AnnotateOptions::default());

    assert_eq!(task.path, source.path);
    assert_eq!(task.line, 12);
    assert!(task.completed);
    assert!(task.checked);
    assert_eq!(task.file_stem(), "Release");
}

#[test]
fn test_raw_task_from_line() {
    let path = std::path::Path::new("Inbox.md");

    let open = RawTask::from_line(path, 0, "- [ ] open").unwrap();
    assert!(!open.checked && !open.completed);
    assert_eq!(open.text, "open");

    let done = RawTask::from_line(path, 1, "  * [X] done").unwrap();
    assert!(done.checked && done.completed);

    let cancelled = RawTask::from_line(path, 2, "- [-] dropped").unwrap();
    assert!(cancelled.checked && !cancelled.completed);

    assert!(RawTask::from_line(path, 3, "1. [ ] numbered").is_some());
    assert!(RawTask::from_line(path, 4, "just text").is_none());
    assert!(RawTask::from_line(path, 5, "- plain bullet").is_none());
}
