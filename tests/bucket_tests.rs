// Tests for sorting tasks into the buckets of one calendar day.
use chrono::NaiveDate;
use taskcal::model::{
    AnnotateOptions, AnnotatedTask, BucketKind, DateFormat, RawTask, annotate_task, bucket,
    sort_tasks,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task(text: &str) -> AnnotatedTask {
    annotate_task(&RawTask::new(text, "Inbox.md", 0), &AnnotateOptions::default())
}

fn done(text: &str) -> AnnotatedTask {
    annotate_task(
        &RawTask::new(text, "Inbox.md", 0).done(),
        &AnnotateOptions::default(),
    )
}

fn texts(tasks: &[&AnnotatedTask]) -> Vec<String> {
    tasks.iter().map(|t| t.text.clone()).collect()
}

#[test]
fn test_due_and_recurrence_split() {
    let tasks = vec![task("Once 📅 2024-06-10"), task("Again 🔁 📅 2024-06-10")];
    let day = date(2024, 6, 10);
    let b = bucket(&tasks, day, day);

    assert_eq!(texts(&b.due), vec!["Once"]);
    assert_eq!(texts(&b.recurrence), vec!["Again"]);
}

#[test]
fn test_overdue_only_filled_for_today() {
    let tasks = vec![task("Late 📅 2024-06-05")];
    let today = date(2024, 6, 10);

    let now = bucket(&tasks, today, today);
    assert_eq!(now.overdue.len(), 1);
    assert!(now.due.is_empty());
    assert!(now.is_empty(false));
    assert!(!now.is_empty(true));

    let elsewhere = bucket(&tasks, date(2024, 6, 20), today);
    assert!(elsewhere.overdue.is_empty());
    assert!(elsewhere.is_empty(true));

    let not_yet = bucket(&tasks, date(2024, 6, 5), date(2024, 6, 5));
    assert!(not_yet.overdue.is_empty());
}

#[test]
fn test_due_like_buckets_are_exclusive_on_past_dates() {
    let cancelled = RawTask::new("Dropped 📅 2024-06-05", "Inbox.md", 1).cancelled();
    let tasks = vec![
        task("Late 📅 2024-06-05"),
        task("Late again 🔁 📅 2024-06-05"),
        annotate_task(&cancelled, &AnnotateOptions::default()),
    ];
    let b = bucket(&tasks, date(2024, 6, 5), date(2024, 6, 10));

    assert_eq!(texts(&b.due), vec!["Late"]);
    assert_eq!(texts(&b.recurrence), vec!["Late again"]);
    assert_eq!(texts(&b.cancelled), vec!["Dropped"]);
    assert!(b.overdue.is_empty());

    let groups = [&b.due, &b.recurrence, &b.overdue, &b.cancelled];
    for t in &tasks {
        let hits = groups
            .iter()
            .filter(|g| g.iter().any(|x| std::ptr::eq(*x, t)))
            .count();
        assert!(hits <= 1, "'{}' is in {} of due/recurrence/overdue/cancelled", t.text, hits);
    }
}

#[test]
fn test_process_is_strict_on_both_ends() {
    let tasks = vec![task("Build shed 🛫 2024-06-01 📅 2024-06-10")];
    let today = date(2024, 6, 1);

    let first = bucket(&tasks, date(2024, 6, 1), today);
    assert!(first.process.is_empty());
    assert_eq!(first.start.len(), 1);

    let middle = bucket(&tasks, date(2024, 6, 5), today);
    assert_eq!(middle.process.len(), 1);

    let last = bucket(&tasks, date(2024, 6, 10), today);
    assert!(last.process.is_empty());
    assert_eq!(last.due.len(), 1);
}

#[test]
fn test_start_after_due_is_never_in_process() {
    let tasks = vec![task("Odd 🛫 2024-06-10 📅 2024-06-01")];
    let today = date(2024, 6, 1);
    for d in 1..=12 {
        assert!(bucket(&tasks, date(2024, 6, d), today).process.is_empty());
    }
}

#[test]
fn test_task_can_be_in_several_buckets() {
    let tasks = vec![task("Both 🛫 2024-06-10 ⏳ 2024-06-10")];
    let day = date(2024, 6, 10);
    let b = bucket(&tasks, day, day);

    assert_eq!(b.start.len(), 1);
    assert_eq!(b.scheduled.len(), 1);
}

#[test]
fn test_completed_with_due_shows_on_due_date_only() {
    let tasks = vec![done("Filed taxes 📅 2024-06-01 ✅ 2024-06-03")];
    let today = date(2024, 6, 10);

    assert_eq!(bucket(&tasks, date(2024, 6, 1), today).all_done.len(), 1);
    assert!(bucket(&tasks, date(2024, 6, 3), today).all_done.is_empty());
}

#[test]
fn test_completed_without_due_shows_on_completion_date() {
    let tasks = vec![done("Called mom ✅ 2024-06-03")];
    let today = date(2024, 6, 10);

    assert_eq!(bucket(&tasks, date(2024, 6, 3), today).all_done.len(), 1);
    assert!(bucket(&tasks, date(2024, 6, 4), today).all_done.is_empty());
}

#[test]
fn test_all_done_keeps_due_group_first() {
    let tasks = vec![
        done("by completion ✅ 2024-06-10"),
        done("by due 📅 2024-06-10 ✅ 2024-06-12"),
    ];
    let day = date(2024, 6, 10);
    let b = bucket(&tasks, day, day);

    assert_eq!(texts(&b.all_done), vec!["by due", "by completion"]);
}

#[test]
fn test_done_tasks_are_not_open() {
    let tasks = vec![done("Finished 📅 2024-06-05")];
    let today = date(2024, 6, 10);
    let b = bucket(&tasks, date(2024, 6, 5), today);

    assert!(b.due.is_empty());
    assert!(b.overdue.is_empty());
}

#[test]
fn test_cancelled_on_due_date() {
    let raw = RawTask::new("Dropped 📅 2024-06-10", "Inbox.md", 0).cancelled();
    let tasks = vec![annotate_task(&raw, &AnnotateOptions::default())];
    let day = date(2024, 6, 10);
    let b = bucket(&tasks, day, day);

    assert_eq!(b.cancelled.len(), 1);
    assert!(b.due.is_empty());
    assert!(b.all_done.is_empty());
}

#[test]
fn test_daily_note_bucket() {
    let options = AnnotateOptions::new(Some(DateFormat::new("YYYY-MM-DD").unwrap()), None);
    let tasks = vec![annotate_task(
        &RawTask::new("Call Bob", "Daily/2024-06-10.md", 2),
        &options,
    )];
    let day = date(2024, 6, 10);

    assert_eq!(bucket(&tasks, day, day).daily_note.len(), 1);
    assert!(bucket(&tasks, date(2024, 6, 11), day).daily_note.is_empty());
}

#[test]
fn test_sort_by_priority_then_text() {
    let tasks = vec![
        task("Zebra"),
        task("Banana ⏫"),
        task("Apple 🔼"),
        task("Avocado 🔺"),
    ];
    let mut refs: Vec<&AnnotatedTask> = tasks.iter().collect();
    sort_tasks(&mut refs);

    assert_eq!(texts(&refs), vec!["Avocado", "Banana", "Apple", "Zebra"]);
}

#[test]
fn test_sort_ignores_case() {
    let tasks = vec![task("beta"), task("Alpha"), task("alpha two")];
    let mut refs: Vec<&AnnotatedTask> = tasks.iter().collect();
    sort_tasks(&mut refs);

    assert_eq!(texts(&refs), vec!["Alpha", "alpha two", "beta"]);
}

#[test]
fn test_sections_in_display_order() {
    let tasks = vec![
        done("Closed 📅 2024-06-10"),
        task("Late 📅 2024-06-01"),
        task("Begin 🛫 2024-06-10"),
        task("Today 📅 2024-06-10"),
    ];
    let day = date(2024, 6, 10);
    let kinds: Vec<BucketKind> = bucket(&tasks, day, day)
        .sections(true)
        .into_iter()
        .map(|(kind, _)| kind)
        .collect();

    assert_eq!(
        kinds,
        vec![
            BucketKind::Overdue,
            BucketKind::Due,
            BucketKind::Start,
            BucketKind::AllDone
        ]
    );
}
