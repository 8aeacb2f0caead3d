// File: ./src/cli.rs
//! Shared command-line interface logic: argument parsing and help.
use crate::config::ViewMode;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Render a view; `None` uses the configured one.
    Show(Option<ViewMode>),
    /// Toggle the task at `line` (1-based, as printed) of a note.
    Toggle { path: PathBuf, line: usize },
    /// Write a default config file.
    Init,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub vault: Option<PathBuf>,
    pub today: Option<NaiveDate>,
    /// Windows to move from the start position; negative goes back.
    pub offset: i32,
    pub format: OutputFormat,
    pub verbose: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            command: Command::Show(None),
            root: None,
            config: None,
            vault: None,
            today: None,
            offset: 0,
            format: OutputFormat::default(),
            verbose: false,
        }
    }
}

fn value<'a>(args: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a String> {
    args.next()
        .ok_or_else(|| anyhow::anyhow!("Missing value for {}", flag))
}

impl CliArgs {
    /// Parses arguments without the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut out = Self::default();
        let mut positional = Vec::new();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-h" | "--help" | "help" => out.command = Command::Help,
                "-r" | "--root" => out.root = Some(PathBuf::from(value(&mut iter, arg)?)),
                "-c" | "--config" => out.config = Some(PathBuf::from(value(&mut iter, arg)?)),
                "--vault" => out.vault = Some(PathBuf::from(value(&mut iter, arg)?)),
                "--today" => {
                    let raw = value(&mut iter, arg)?;
                    out.today = Some(
                        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                            .with_context(|| format!("Invalid date for --today: '{}'", raw))?,
                    );
                }
                "--next" | "--prev" => {
                    let raw = value(&mut iter, arg)?;
                    let n: i32 = raw
                        .parse()
                        .with_context(|| format!("Invalid number for {}: '{}'", arg, raw))?;
                    let step = if arg == "--next" {
                        Some(n)
                    } else {
                        n.checked_neg()
                    };
                    out.offset = step
                        .and_then(|step| out.offset.checked_add(step))
                        .ok_or_else(|| anyhow::anyhow!("{} {} is out of range", arg, raw))?;
                }
                "-f" | "--format" => {
                    let raw = value(&mut iter, arg)?;
                    out.format = raw
                        .parse()
                        .map_err(|_| anyhow::anyhow!("Unknown output format '{}'", raw))?;
                }
                "-v" | "--verbose" => out.verbose = true,
                other if other.starts_with('-') => {
                    return Err(anyhow::anyhow!("Unknown option '{}'", other));
                }
                _ => positional.push(arg.clone()),
            }
        }

        if out.command == Command::Help {
            return Ok(out);
        }

        match positional.first().map(String::as_str) {
            None => {}
            Some("init") => out.command = Command::Init,
            Some("toggle") => {
                let (Some(path), Some(line)) = (positional.get(1), positional.get(2)) else {
                    return Err(anyhow::anyhow!("Usage: taskcal toggle <note> <line>"));
                };
                let line: usize = line
                    .parse()
                    .with_context(|| format!("Invalid line number '{}'", line))?;
                if line == 0 {
                    return Err(anyhow::anyhow!("Line numbers start at 1"));
                }
                out.command = Command::Toggle {
                    path: PathBuf::from(path),
                    line,
                };
            }
            Some(view) => {
                let mode = view
                    .parse::<ViewMode>()
                    .map_err(|_| anyhow::anyhow!("Unknown command or view '{}'", view))?;
                out.command = Command::Show(Some(mode));
            }
        }
        Ok(out)
    }
}

pub fn print_help(binary_name: &str) {
    println!(
        "Taskcal v{} - Calendar views of the tasks in a markdown vault",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [OPTIONS] [month|week|list]", binary_name);
    println!("    {} [OPTIONS] toggle <note> <line>", binary_name);
    println!("    {} [--root <path>] init", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>      Use a different directory for the config.");
    println!("    -c, --config <file>    Read this config file instead.");
    println!("        --vault <path>     Vault folder (overrides `vault` in the config).");
    println!("        --today <date>     Render as if today were YYYY-MM-DD.");
    println!("        --next <n>         Move n months (or weeks) forward.");
    println!("        --prev <n>         Move n months (or weeks) back.");
    println!("    -f, --format <fmt>     Output: text (default), html, json.");
    println!("    -v, --verbose          Debug logging on stderr.");
    println!("    -h, --help             Show this help message.");
    println!();
    println!("TASK MARKERS:");
    println!("    📅 YYYY-MM-DD      Due date");
    println!("    🛫 YYYY-MM-DD      Start date");
    println!("    ⏳ YYYY-MM-DD      Scheduled date");
    println!("    ✅ YYYY-MM-DD      Completion date");
    println!("    ⏰ HH:MM           Time of day (shown first)");
    println!("    🔁 every week      Repeating task");
    println!("    🔺 ⏫ 🔼 🔽         Priority (highest, high, medium, low)");
    println!();
    println!("CONFIG (config.toml):");
    println!("    vault = \"~/Notes\"            pages = \"\"");
    println!("    view = \"month\"               first_day_of_week = \"1\"");
    println!("    style = \"style1\"             daily_note_format = \"YYYY-MM-DD\"");
    println!("    daily_note_folder = \"Daily\"  start_position = \"2024-06\"");
    println!("    global_task_filter = \"#task\"");
}
