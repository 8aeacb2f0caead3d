// File: ./src/view.rs
//! Month, week and list windows over the calendar.
//!
//! `RenderSession` is a plain value: navigation returns a new session with a
//! new anchor date and nothing else is remembered between renders.
use crate::config::{Settings, ViewMode};
use crate::model::{AnnotatedTask, BucketKind, bucket};
use crate::render::{Cell, CellClass, CellContext, escape_html};
use chrono::{Datelike, Duration, IsoWeek, Months, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use strum::IntoEnumIterator;
use unicode_width::UnicodeWidthStr;

const MONTH_ROWS: usize = 6;
const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Parses a configured start position.
///
/// `YYYY-MM` gives the first of that month (month and list views),
/// `YYYY-ww` gives the Monday of that ISO week (week view).
pub fn parse_anchor(view: ViewMode, value: &str) -> Option<NaiveDate> {
    let (year, rest) = value.trim().split_once('-')?;
    if year.len() != 4 || rest.is_empty() || rest.len() > 2 {
        return None;
    }
    let year = year.parse::<i32>().ok()?;
    let n = rest.parse::<u32>().ok()?;
    match view {
        ViewMode::Week => NaiveDate::from_isoywd_opt(year, n, Weekday::Mon),
        ViewMode::Month | ViewMode::List => NaiveDate::from_ymd_opt(year, n, 1),
    }
}

/// First day of the week containing `date`; `first_day_of_week` is 0 for Sunday.
pub fn week_start(date: NaiveDate, first_day_of_week: u8) -> NaiveDate {
    let weekday = date.weekday().num_days_from_sunday();
    let offset = (weekday + 7 - u32::from(first_day_of_week % 7)) % 7;
    date - Duration::days(i64::from(offset))
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// ISO week of a 7-day row, taken from its Thursday.
pub fn row_iso_week(row_start: NaiveDate) -> IsoWeek {
    (0..7)
        .map(|i| row_start + Duration::days(i))
        .find(|d| d.weekday() == Weekday::Thu)
        .unwrap_or(row_start)
        .iso_week()
}

pub fn row_week_number(row_start: NaiveDate) -> u32 {
    row_iso_week(row_start).week()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSession {
    pub view: ViewMode,
    pub anchor: NaiveDate,
    pub today: NaiveDate,
    pub first_day_of_week: u8,
}

impl RenderSession {
    pub fn new(view: ViewMode, today: NaiveDate, first_day_of_week: u8) -> Self {
        Self {
            view,
            anchor: today,
            today,
            first_day_of_week,
        }
    }

    pub fn from_settings(settings: &Settings, today: NaiveDate) -> Self {
        Self {
            anchor: settings.start_position.unwrap_or(today),
            ..Self::new(settings.view, today, settings.first_day_of_week)
        }
    }

    pub fn with_view(self, view: ViewMode) -> Self {
        Self { view, ..self }
    }

    pub fn with_anchor(self, anchor: NaiveDate) -> Self {
        Self { anchor, ..self }
    }

    pub fn next(self) -> Self {
        let anchor = match self.view {
            ViewMode::Week => self.anchor + Duration::weeks(1),
            ViewMode::Month | ViewMode::List => first_of_month(self.anchor)
                .checked_add_months(Months::new(1))
                .unwrap_or(self.anchor),
        };
        self.with_anchor(anchor)
    }

    pub fn previous(self) -> Self {
        let anchor = match self.view {
            ViewMode::Week => self.anchor - Duration::weeks(1),
            ViewMode::Month | ViewMode::List => first_of_month(self.anchor)
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.anchor),
        };
        self.with_anchor(anchor)
    }

    /// Back to the window containing today.
    pub fn current(self) -> Self {
        self.with_anchor(self.today)
    }

    pub fn title(&self) -> String {
        match self.view {
            ViewMode::Week => {
                let week = row_iso_week(week_start(self.anchor, self.first_day_of_week));
                format!("{} W{:02}", week.year(), week.week())
            }
            ViewMode::Month | ViewMode::List => self.anchor.format("%B %Y").to_string(),
        }
    }

    pub fn weekday_names(&self) -> Vec<&'static str> {
        (0..7)
            .map(|i| WEEKDAY_NAMES[(usize::from(self.first_day_of_week) + i) % 7])
            .collect()
    }

    /// Every date of the window, in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let (start, len) = match self.view {
            ViewMode::Month => (
                week_start(first_of_month(self.anchor), self.first_day_of_week),
                MONTH_ROWS * 7,
            ),
            ViewMode::Week => (week_start(self.anchor, self.first_day_of_week), 7),
            ViewMode::List => {
                let first = first_of_month(self.anchor);
                let days = first
                    .checked_add_months(Months::new(1))
                    .map(|next| (next - first).num_days() as usize)
                    .unwrap_or(31);
                (first, days)
            }
        };
        (0..len)
            .map(|i| start + Duration::days(i as i64))
            .collect()
    }

    fn month_class(&self, date: NaiveDate) -> CellClass {
        let anchor = first_of_month(self.anchor);
        match first_of_month(date).cmp(&anchor) {
            std::cmp::Ordering::Less => CellClass::PreviousMonth,
            std::cmp::Ordering::Equal => CellClass::CurrentMonth,
            std::cmp::Ordering::Greater => CellClass::NextMonth,
        }
    }

    /// Buckets every date of the window once and lays the cells out.
    pub fn render(&self, tasks: &[AnnotatedTask], ctx: &CellContext) -> ViewModel {
        let mut counts: BTreeMap<BucketKind, usize> = BTreeMap::new();
        let mut cells = Vec::new();

        for date in self.dates() {
            let day = bucket(tasks, date, ctx.today);
            let mut cell = Cell::build(date, &day, ctx);
            if self.view == ViewMode::Month {
                cell = cell.with_class(self.month_class(date));
            }
            for kind in BucketKind::iter() {
                let n = cell.count(kind);
                if n > 0 {
                    *counts.entry(kind).or_default() += n;
                }
            }
            cells.push(cell);
        }

        let rows = match self.view {
            ViewMode::Month | ViewMode::Week => cells
                .chunks(7)
                .map(|chunk| Row {
                    week_number: row_week_number(chunk[0].date),
                    cells: chunk.to_vec(),
                })
                .collect(),
            ViewMode::List => {
                let mut rows: Vec<Row> = Vec::new();
                for cell in cells.into_iter().filter(|c| !c.is_empty()) {
                    let week_number =
                        row_week_number(week_start(cell.date, self.first_day_of_week));
                    match rows.last_mut() {
                        Some(row) if row.week_number == week_number => row.cells.push(cell),
                        _ => rows.push(Row {
                            week_number,
                            cells: vec![cell],
                        }),
                    }
                }
                rows
            }
        };

        log::debug!(
            "Rendered {} view '{}' with {} rows",
            self.view,
            self.title(),
            rows.len()
        );

        ViewModel {
            view: self.view,
            title: self.title(),
            anchor: self.anchor,
            today: ctx.today,
            weekdays: self.weekday_names(),
            rows,
            counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub week_number: u32,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub view: ViewMode,
    pub title: String,
    pub anchor: NaiveDate,
    pub today: NaiveDate,
    pub weekdays: Vec<&'static str>,
    pub rows: Vec<Row>,
    pub counts: BTreeMap<BucketKind, usize>,
}

impl ViewModel {
    pub fn count(&self, kind: BucketKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flat_map(|r| r.cells.iter())
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&Cell> {
        self.cells().find(|c| c.date == date)
    }

    pub fn to_html(&self, style: &str, css: Option<&str>) -> String {
        let mut out = String::new();
        let mut root_class = format!("tasksCalendar {} {}", style, self.view);
        if let Some(extra) = css {
            root_class.push(' ');
            root_class.push_str(extra);
        }
        let _ = write!(out, "<div class=\"{}\">", escape_html(&root_class));
        let _ = write!(
            out,
            "<div class=\"header\"><span class=\"title\">{}</span></div>",
            escape_html(&self.title)
        );

        if self.view != ViewMode::List {
            out.push_str("<div class=\"weekdays\"><span class=\"weekNumber\"></span>");
            for name in &self.weekdays {
                let _ = write!(out, "<span class=\"weekday\">{}</span>", name);
            }
            out.push_str("</div>");
        }

        for row in &self.rows {
            let _ = write!(
                out,
                "<div class=\"week\"><span class=\"weekNumber\">{}</span>",
                row.week_number
            );
            for cell in &row.cells {
                out.push_str(&cell.to_html());
            }
            out.push_str("</div>");
        }

        out.push_str("<div class=\"statistic\">");
        for (kind, n) in &self.counts {
            let _ = write!(
                out,
                "<span class=\"{}\" title=\"{}\">{} {}</span>",
                kind,
                kind.label(),
                kind.icon(),
                n
            );
        }
        out.push_str("</div></div>");
        out
    }

    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", self.title, self.view);

        if self.view != ViewMode::List {
            let mut header = pad("Wk", 4);
            for name in &self.weekdays {
                header.push_str(&pad(name, 6));
            }
            let _ = writeln!(out, "{}", header.trim_end());
            for row in &self.rows {
                let mut line = pad(&row.week_number.to_string(), 4);
                for cell in &row.cells {
                    line.push_str(&pad(&day_label(cell, self.today), 6));
                }
                let _ = writeln!(out, "{}", line.trim_end());
            }
        }

        for cell in self.cells().filter(|c| !c.is_empty()) {
            let _ = writeln!(out);
            let marker = if cell.date == self.today { " (today)" } else { "" };
            let _ = writeln!(out, "{}{}", cell.date.format("%a %Y-%m-%d"), marker);
            for entry in cell.entries() {
                let _ = writeln!(
                    out,
                    "  {}{}  [{}:{}]",
                    pad(entry.kind.icon(), 3),
                    entry.text,
                    entry.file,
                    entry.line + 1
                );
            }
        }

        if !self.counts.is_empty() {
            let _ = writeln!(out);
            let summary: Vec<String> = self
                .counts
                .iter()
                .map(|(kind, n)| format!("{}: {}", kind.label(), n))
                .collect();
            let _ = writeln!(out, "{}", summary.join(", "));
        }
        out
    }
}

fn day_label(cell: &Cell, today: NaiveDate) -> String {
    let mut label = cell.date.day().to_string();
    if cell.date == today {
        label = format!("[{}]", label);
    } else if cell.classes.contains(&CellClass::PreviousMonth)
        || cell.classes.contains(&CellClass::NextMonth)
    {
        label = format!("({})", label);
    }
    if !cell.is_empty() {
        label.push('•');
    }
    label
}

/// Left-aligns `s` in `width` terminal columns.
fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        format!("{} ", s)
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}
