// File: ./src/render.rs
//! Cell content as an explicit tree.
//!
//! A `Cell` is built from a `DateBucket` once, then serialized. Nothing here
//! classifies tasks; it only orders what the bucketer produced.
use crate::model::{AnnotatedTask, BucketKind, DateBucket, DateFormat, Priority};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

/// Styling hints attached to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CellClass {
    PreviousMonth,
    CurrentMonth,
    NextMonth,
    Today,
    Weekend,
}

impl CellClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellClass::PreviousMonth => "prevMonth",
            CellClass::CurrentMonth => "currentMonth",
            CellClass::NextMonth => "nextMonth",
            CellClass::Today => "today",
            CellClass::Weekend => "weekend",
        }
    }
}

/// Where cells look up "today" and how they name their daily note.
#[derive(Debug, Clone)]
pub struct CellContext {
    pub today: NaiveDate,
    pub daily_note_folder: Option<String>,
    pub daily_note_format: Option<DateFormat>,
}

impl CellContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            daily_note_folder: None,
            daily_note_format: None,
        }
    }

    /// Vault path of the daily note for `date`, when a format is configured.
    pub fn daily_note_path(&self, date: NaiveDate) -> Option<String> {
        let name = self.daily_note_format.as_ref()?.format(date);
        Some(match self.daily_note_folder.as_deref().map(|f| f.trim_matches('/')) {
            Some(folder) if !folder.is_empty() => format!("{}/{}.md", folder, name),
            _ => format!("{}.md", name),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub kind: BucketKind,
    pub text: String,
    pub file: String,
    pub path: PathBuf,
    pub line: usize,
    pub priority: Priority,
    pub time: Option<NaiveTime>,
}

impl Entry {
    fn new(kind: BucketKind, task: &AnnotatedTask) -> Self {
        Self {
            kind,
            text: task.text.clone(),
            file: task.file_stem(),
            path: task.path.clone(),
            line: task.line,
            priority: task.priority,
            time: task.time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: BucketKind,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub date: NaiveDate,
    pub classes: Vec<CellClass>,
    pub daily_note: Option<String>,
    pub sections: Vec<Section>,
}

impl Cell {
    /// Builds the cell for `date`. Overdue tasks only show up on today's cell.
    pub fn build(date: NaiveDate, bucket: &DateBucket<'_>, ctx: &CellContext) -> Self {
        let is_today = date == ctx.today;
        let sections = bucket
            .sections(is_today)
            .into_iter()
            .map(|(kind, tasks)| Section {
                kind,
                entries: tasks.into_iter().map(|t| Entry::new(kind, t)).collect(),
            })
            .collect();

        let mut classes = Vec::new();
        if is_today {
            classes.push(CellClass::Today);
        }
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            classes.push(CellClass::Weekend);
        }

        Self {
            date,
            classes,
            daily_note: ctx.daily_note_path(date),
            sections,
        }
    }

    pub fn with_class(mut self, class: CellClass) -> Self {
        if !self.classes.contains(&class) {
            self.classes.insert(0, class);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn count(&self, kind: BucketKind) -> usize {
        self.sections
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.entries.len())
            .sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }

    pub fn class_attr(&self) -> String {
        let mut classes = vec!["cell"];
        classes.extend(self.classes.iter().map(CellClass::as_str));
        classes.join(" ")
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let date = self.date.format("%Y-%m-%d");
        let _ = write!(
            out,
            "<div class=\"{}\" data-date=\"{}\">",
            self.class_attr(),
            date
        );
        match &self.daily_note {
            Some(note) => {
                let _ = write!(
                    out,
                    "<a class=\"cellName\" href=\"{}\">{}</a>",
                    escape_html(note),
                    self.date.day()
                );
            }
            None => {
                let _ = write!(out, "<span class=\"cellName\">{}</span>", self.date.day());
            }
        }
        out.push_str("<div class=\"cellContent\">");
        for entry in self.entries() {
            out.push_str(&entry_html(entry));
        }
        out.push_str("</div></div>");
        out
    }
}

fn entry_html(entry: &Entry) -> String {
    format!(
        "<div class=\"task {} {}\" data-path=\"{}\" data-line=\"{}\" title=\"{}\">\
         <span class=\"icon\">{}</span><span class=\"text\">{}</span>\
         <span class=\"file\">{}</span></div>",
        entry.kind,
        entry.priority.class_name(),
        escape_html(&entry.path.to_string_lossy()),
        entry.line,
        escape_html(&entry.file),
        entry.kind.icon(),
        escape_html(&entry.text),
        escape_html(&entry.file),
    )
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
