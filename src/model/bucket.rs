// File: ./src/model/bucket.rs
// Classification of annotated tasks into the categories shown in one calendar cell.
use crate::model::item::AnnotatedTask;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Bucket categories, declared in display order.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum BucketKind {
    Overdue,
    Due,
    Recurrence,
    Start,
    Scheduled,
    Process,
    DailyNote,
    AllDone,
    Cancelled,
}

impl BucketKind {
    pub fn label(&self) -> &'static str {
        match self {
            BucketKind::Overdue => "Overdue",
            BucketKind::Due => "Due",
            BucketKind::Recurrence => "Repeating",
            BucketKind::Start => "Starting",
            BucketKind::Scheduled => "Scheduled",
            BucketKind::Process => "In progress",
            BucketKind::DailyNote => "Daily note",
            BucketKind::AllDone => "Done",
            BucketKind::Cancelled => "Cancelled",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            BucketKind::Overdue => "⚠️",
            BucketKind::Due => "📅",
            BucketKind::Recurrence => "🔁",
            BucketKind::Start => "🛫",
            BucketKind::Scheduled => "⏳",
            BucketKind::Process => "⏩",
            BucketKind::DailyNote => "📄",
            BucketKind::AllDone => "✅",
            BucketKind::Cancelled => "🚫",
        }
    }
}

/// The tasks relevant to one reference date. Entries borrow from the task list.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBucket<'a> {
    pub due: Vec<&'a AnnotatedTask>,
    pub recurrence: Vec<&'a AnnotatedTask>,
    pub overdue: Vec<&'a AnnotatedTask>,
    pub start: Vec<&'a AnnotatedTask>,
    pub scheduled: Vec<&'a AnnotatedTask>,
    pub process: Vec<&'a AnnotatedTask>,
    pub cancelled: Vec<&'a AnnotatedTask>,
    pub daily_note: Vec<&'a AnnotatedTask>,
    pub all_done: Vec<&'a AnnotatedTask>,
}

impl<'a> DateBucket<'a> {
    pub fn get(&self, kind: BucketKind) -> &[&'a AnnotatedTask] {
        match kind {
            BucketKind::Overdue => &self.overdue,
            BucketKind::Due => &self.due,
            BucketKind::Recurrence => &self.recurrence,
            BucketKind::Start => &self.start,
            BucketKind::Scheduled => &self.scheduled,
            BucketKind::Process => &self.process,
            BucketKind::DailyNote => &self.daily_note,
            BucketKind::AllDone => &self.all_done,
            BucketKind::Cancelled => &self.cancelled,
        }
    }

    /// Non-empty buckets in display order, each ready to render.
    ///
    /// `all_done` keeps the order `bucket` gave it; every other bucket is
    /// sorted with `sort_tasks`. Overdue is only included when asked for,
    /// which the views do for the cell of today.
    pub fn sections(&self, show_overdue: bool) -> Vec<(BucketKind, Vec<&'a AnnotatedTask>)> {
        BucketKind::iter()
            .filter(|kind| show_overdue || *kind != BucketKind::Overdue)
            .filter_map(|kind| {
                let mut tasks = self.get(kind).to_vec();
                if tasks.is_empty() {
                    return None;
                }
                if kind != BucketKind::AllDone {
                    sort_tasks(&mut tasks);
                }
                Some((kind, tasks))
            })
            .collect()
    }

    /// True when nothing but (possibly) overdue tasks is present.
    pub fn is_empty(&self, show_overdue: bool) -> bool {
        BucketKind::iter()
            .filter(|kind| show_overdue || *kind != BucketKind::Overdue)
            .all(|kind| self.get(kind).is_empty())
    }
}

/// Priority first (A before D), then display text ignoring case.
pub fn compare_tasks(a: &AnnotatedTask, b: &AnnotatedTask) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.text.to_lowercase().cmp(&b.text.to_lowercase()))
}

pub fn sort_tasks(tasks: &mut [&AnnotatedTask]) {
    tasks.sort_by(|a, b| compare_tasks(a, b));
}

/// Classifies `tasks` for `reference`.
///
/// Overdue is only filled when `reference` is `today`, so `due`, `recurrence`,
/// `overdue` and `cancelled` never share a task within one bucket.
pub fn bucket(tasks: &[AnnotatedTask], reference: NaiveDate, today: NaiveDate) -> DateBucket<'_> {
    let mut out = DateBucket::default();
    let mut done_by_due = Vec::new();
    let mut done_by_completion = Vec::new();

    for task in tasks {
        let due_today = task.due == Some(reference);

        if task.is_done() {
            if due_today {
                done_by_due.push(task);
            } else if task.due.is_none() && task.completion == Some(reference) {
                done_by_completion.push(task);
            }
        }

        if task.is_cancelled() && due_today {
            out.cancelled.push(task);
        }

        if !task.is_open() {
            continue;
        }

        if due_today {
            if task.recurrence {
                out.recurrence.push(task);
            } else {
                out.due.push(task);
            }
        }
        if reference == today && task.due.is_some_and(|d| d < today) {
            out.overdue.push(task);
        }
        if task.start == Some(reference) {
            out.start.push(task);
        }
        if task.scheduled == Some(reference) {
            out.scheduled.push(task);
        }
        if let (Some(start), Some(due)) = (task.start, task.due)
            && start < reference
            && reference < due
        {
            out.process.push(task);
        }
        if task.daily_note == Some(reference) {
            out.daily_note.push(task);
        }
    }

    done_by_due.sort_by_key(|t| t.due);
    done_by_completion.sort_by_key(|t| t.completion);
    out.all_done = done_by_due;
    out.all_done.extend(done_by_completion);
    out
}
