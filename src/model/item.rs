// File: ./src/model/item.rs
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum::{Display, EnumIter, EnumString};

static TASK_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+\[(.)\]\s?(.*)$").expect("valid task regex"));

/// Task priority. `A` is the highest, `C` is what a task without a marker gets.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
)]
pub enum Priority {
    A,
    B,
    #[default]
    C,
    D,
}

impl Priority {
    /// CSS-ish class name used by the renderers.
    pub fn class_name(&self) -> &'static str {
        match self {
            Priority::A => "prio-a",
            Priority::B => "prio-b",
            Priority::C => "prio-c",
            Priority::D => "prio-d",
        }
    }
}

/// A task as handed over by the host vault. Never modified by annotation.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawTask {
    pub text: String,
    pub path: PathBuf,
    /// 0-based line number inside `path`.
    pub line: usize,
    pub completed: bool,
    pub checked: bool,
}

impl RawTask {
    pub fn new(text: impl Into<String>, path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            text: text.into(),
            path: path.into(),
            line,
            completed: false,
            checked: false,
        }
    }

    /// Marks the task done (`[x]`).
    pub fn done(mut self) -> Self {
        self.completed = true;
        self.checked = true;
        self
    }

    /// Marks the task checked without completing it (`[-]`).
    pub fn cancelled(mut self) -> Self {
        self.completed = false;
        self.checked = true;
        self
    }

    /// Parses a markdown list item with a checkbox.
    /// Returns None for lines that are not tasks.
    pub fn from_line(path: &Path, line: usize, source: &str) -> Option<Self> {
        let caps = TASK_LINE_RE.captures(source)?;
        let status = caps.get(1)?.as_str();
        let text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        Some(Self {
            text: text.trim_end().to_string(),
            path: path.to_path_buf(),
            line,
            completed: status.eq_ignore_ascii_case("x"),
            checked: status != " ",
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaskLink {
    Note {
        target: String,
        alias: Option<String>,
    },
    External {
        label: String,
        url: String,
    },
}

/// The typed view of a task, rebuilt from its `RawTask` on every render.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedTask {
    pub text: String,
    pub due: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
    pub scheduled: Option<NaiveDate>,
    pub completion: Option<NaiveDate>,
    pub daily_note: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub recurrence: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<TaskLink>,
    pub completed: bool,
    pub checked: bool,
    pub path: PathBuf,
    pub line: usize,
}

impl AnnotatedTask {
    /// An annotated task with no fields extracted yet.
    pub fn blank(raw: &RawTask) -> Self {
        Self {
            text: raw.text.clone(),
            due: None,
            start: None,
            scheduled: None,
            completion: None,
            daily_note: None,
            time: None,
            recurrence: false,
            recurrence_rule: None,
            priority: Priority::default(),
            links: Vec::new(),
            completed: raw.completed,
            checked: raw.checked,
            path: raw.path.clone(),
            line: raw.line,
        }
    }

    /// Neither completed nor checked.
    pub fn is_open(&self) -> bool {
        !self.completed && !self.checked
    }

    pub fn is_done(&self) -> bool {
        self.completed && self.checked
    }

    pub fn is_cancelled(&self) -> bool {
        self.checked && !self.completed
    }

    /// File name without extension, used as the source label.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}
