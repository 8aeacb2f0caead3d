// File: src/model/parser.rs
// Extraction of the emoji-coded fields (dates, time, recurrence, priority, links)
// from the free text of a task.
use crate::model::format::DateFormat;
use crate::model::item::{AnnotatedTask, Priority, RawTask, TaskLink};
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

pub const DUE_ICON: &str = "📅";
pub const START_ICON: &str = "🛫";
pub const SCHEDULED_ICON: &str = "⏳";
pub const DONE_ICON: &str = "✅";
pub const TIME_ICON: &str = "⏰";
pub const RECURRENCE_ICON: &str = "🔁";
pub const NOTE_LINK_ICON: &str = "🔗";
pub const EXTERNAL_LINK_ICON: &str = "🌐";

/// Tag that marks a task as a regular chore; only changes presentation.
pub const REGULAR_TAG: &str = "#regular";

/// Priority glyphs in test order. The last one present wins.
pub const PRIORITY_MARKERS: [(&str, Priority); 4] = [
    ("🔽", Priority::D),
    ("🔼", Priority::B),
    ("⏫", Priority::A),
    ("🔺", Priority::A),
];

static CHECKBOX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+\[.\]\s*").expect("valid checkbox regex"));
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid date regex"));
static DUE_RE: Lazy<Regex> = Lazy::new(|| date_marker(DUE_ICON));
static START_RE: Lazy<Regex> = Lazy::new(|| date_marker(START_ICON));
static SCHEDULED_RE: Lazy<Regex> = Lazy::new(|| date_marker(SCHEDULED_ICON));
static DONE_RE: Lazy<Regex> = Lazy::new(|| date_marker(DONE_ICON));
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"⏰\x{FE0F}?\s*(\d{1,2}:\d{2})\b").expect("valid time regex"));
static RECURRENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"🔁\x{FE0F}?(?:\s*(every\b[^📅🛫⏳✅⏰🔁🔽🔼⏫🔺#\[\]]*))?")
        .expect("valid recurrence regex")
});
static NESTED_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[^\s#/]+(?:/[^\s#/]+)+").expect("valid tag regex"));
static REGULAR_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?:^|\s){}(?:\s|$)", regex::escape(REGULAR_TAG)))
        .expect("valid regular tag regex")
});
static ALIAS_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]|]+)\|([^\]]+)\]\]").expect("valid alias link regex"));
static NOTE_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]|]+)\]\]").expect("valid note link regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("valid markdown link regex"));
static BRACKETS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]*)\]").expect("valid bracket regex"));
static EXTENSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.[A-Za-z][A-Za-z0-9]*$").expect("valid extension regex"));

fn date_marker(icon: &str) -> Regex {
    Regex::new(&format!(r"{}\x{{FE0F}}?\s*(\d{{4}}-\d{{2}}-\d{{2}})", regex::escape(icon)))
        .expect("valid date marker regex")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Due,
    Start,
    Scheduled,
    Completion,
}

impl DateField {
    fn regex(&self) -> &'static Regex {
        match self {
            DateField::Due => &DUE_RE,
            DateField::Start => &START_RE,
            DateField::Scheduled => &SCHEDULED_RE,
            DateField::Completion => &DONE_RE,
        }
    }

    fn slot<'a>(&self, task: &'a mut AnnotatedTask) -> &'a mut Option<NaiveDate> {
        match self {
            DateField::Due => &mut task.due,
            DateField::Start => &mut task.start,
            DateField::Scheduled => &mut task.scheduled,
            DateField::Completion => &mut task.completion,
        }
    }
}

/// One extraction pass over the working text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    DailyNote,
    Date(DateField),
    Time,
    Recurrence,
    Priority,
    GlobalFilter,
    Links,
    RegularTag,
}

/// The fixed extraction order. Each step only sees what earlier steps left.
pub const STEPS: [Step; 11] = [
    Step::DailyNote,
    Step::Date(DateField::Due),
    Step::Date(DateField::Start),
    Step::Date(DateField::Scheduled),
    Step::Date(DateField::Completion),
    Step::Time,
    Step::Recurrence,
    Step::Priority,
    Step::GlobalFilter,
    Step::Links,
    Step::RegularTag,
];

#[derive(Debug, Clone, Default)]
pub struct AnnotateOptions {
    pub daily_note_format: Option<DateFormat>,
    /// Token removed from every task; when unset, nested tags are removed instead.
    pub global_filter: Option<String>,
}

impl AnnotateOptions {
    pub fn new(daily_note_format: Option<DateFormat>, global_filter: Option<String>) -> Self {
        Self {
            daily_note_format,
            global_filter: global_filter.filter(|f| !f.trim().is_empty()),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte range of the whole match and the text of its first group.
fn find_marker(re: &Regex, text: &str) -> Option<(Range<usize>, String)> {
    let caps = re.captures(text)?;
    Some((caps.get(0)?.range(), caps.get(1)?.as_str().to_string()))
}

fn strip_extension(target: &str) -> String {
    EXTENSION_RE.replace(target, "").to_string()
}

/// Annotates every task. The input is left untouched.
pub fn annotate(tasks: &[RawTask], options: &AnnotateOptions) -> Vec<AnnotatedTask> {
    tasks.iter().map(|t| annotate_task(t, options)).collect()
}

pub fn annotate_task(raw: &RawTask, options: &AnnotateOptions) -> AnnotatedTask {
    let mut task = AnnotatedTask::blank(raw);
    let mut text = collapse_whitespace(&CHECKBOX_RE.replace(&raw.text, ""));

    for step in STEPS {
        apply_step(step, raw, &mut task, &mut text, options);
        text = collapse_whitespace(&text);
    }

    task.text = text;
    task
}

fn apply_step(
    step: Step,
    raw: &RawTask,
    task: &mut AnnotatedTask,
    text: &mut String,
    options: &AnnotateOptions,
) {
    match step {
        Step::DailyNote => {
            if let Some(format) = &options.daily_note_format
                && !ISO_DATE_RE.is_match(&raw.text)
                && let Some(stem) = raw.path.file_stem()
            {
                task.daily_note = format.parse(&stem.to_string_lossy());
            }
        }
        Step::Date(field) => {
            // First marker of this kind holding a real date; invalid ones stay in the text.
            let mut found = None;
            for caps in field.regex().captures_iter(text.as_str()) {
                let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                match NaiveDate::parse_from_str(value.as_str(), "%Y-%m-%d") {
                    Ok(date) => {
                        found = Some((whole.range(), date));
                        break;
                    }
                    Err(e) => log::debug!(
                        "Ignoring {:?} marker '{}' in {}:{}: {}",
                        field,
                        value.as_str(),
                        raw.path.display(),
                        raw.line,
                        e
                    ),
                }
            }
            if let Some((range, date)) = found {
                *field.slot(task) = Some(date);
                text.replace_range(range, " ");
            }
        }
        Step::Time => {
            let Some((range, value)) = find_marker(&TIME_RE, text) else {
                return;
            };
            if let Ok(time) = NaiveTime::parse_from_str(&value, "%H:%M") {
                task.time = Some(time);
                text.replace_range(range, " ");
                *text = format!("{} {} {}", TIME_ICON, value, text);
            }
        }
        Step::Recurrence => {
            let found = RECURRENCE_RE.captures(text).and_then(|caps| {
                let rule = caps.get(1).map(|m| m.as_str().trim().to_string());
                Some((caps.get(0)?.range(), rule))
            });
            let Some((range, rule)) = found else {
                return;
            };
            task.recurrence = true;
            task.recurrence_rule = rule.filter(|r| !r.is_empty());
            text.replace_range(range, " ");
        }
        Step::Priority => {
            let mut priority = Priority::default();
            for (glyph, level) in PRIORITY_MARKERS {
                if text.contains(glyph) {
                    priority = level;
                    *text = text.replace(&format!("{}\u{FE0F}", glyph), " ");
                    *text = text.replace(glyph, " ");
                }
            }
            task.priority = priority;
        }
        Step::GlobalFilter => match &options.global_filter {
            Some(filter) => *text = text.replace(filter.as_str(), " "),
            None => *text = NESTED_TAG_RE.replace_all(text, " ").to_string(),
        },
        Step::Links => {
            let links = &mut task.links;
            *text = ALIAS_LINK_RE
                .replace_all(text, |caps: &Captures| {
                    links.push(TaskLink::Note {
                        target: caps[1].to_string(),
                        alias: Some(caps[2].to_string()),
                    });
                    format!("{} {}", NOTE_LINK_ICON, &caps[2])
                })
                .to_string();
            *text = NOTE_LINK_RE
                .replace_all(text, |caps: &Captures| {
                    links.push(TaskLink::Note {
                        target: caps[1].to_string(),
                        alias: None,
                    });
                    format!("{} {}", NOTE_LINK_ICON, strip_extension(&caps[1]))
                })
                .to_string();
            *text = MARKDOWN_LINK_RE
                .replace_all(text, |caps: &Captures| {
                    links.push(TaskLink::External {
                        label: caps[1].to_string(),
                        url: caps[2].to_string(),
                    });
                    format!("{} {}", EXTERNAL_LINK_ICON, &caps[1])
                })
                .to_string();
            *text = BRACKETS_RE.replace_all(text, "$1").to_string();
        }
        Step::RegularTag => {
            if REGULAR_TAG_RE.is_match(&raw.text) {
                *text = format!("{} {}", RECURRENCE_ICON, text);
            }
        }
    }
}
