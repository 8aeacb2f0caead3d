// File: src/vault.rs
// Reading tasks out of a folder of markdown notes, and toggling them in place.
use crate::model::RawTask;
use crate::model::parser::DONE_ICON;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

static CHECKBOX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*(?:[-*+]|\d+[.)])\s+)\[(.)\]").expect("valid checkbox regex"));
static COMPLETION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\s*{}\x{{FE0F}}?\s*\d{{4}}-\d{{2}}-\d{{2}}\s*$",
        regex::escape(DONE_ICON)
    ))
    .expect("valid completion regex")
});

pub const NOTE_EXTENSION: &str = "md";

/// Rewrites one task line to its toggled state.
///
/// An open box becomes `[x]` with ` ✅ <today>` appended; any other box
/// becomes `[ ]` and loses its trailing completion marker. Lines without a
/// checkbox are returned unchanged.
pub fn toggle_line(line: &str, today: NaiveDate) -> String {
    let Some(caps) = CHECKBOX_RE.captures(line) else {
        return line.to_string();
    };
    let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let is_open = caps.get(2).is_some_and(|m| m.as_str() == " ");
    let rest = &line[caps.get(0).map_or(0, |m| m.end())..];

    if is_open {
        format!(
            "{}[x]{} {} {}",
            prefix,
            rest.trim_end(),
            DONE_ICON,
            today.format("%Y-%m-%d")
        )
    } else {
        format!("{}[ ]{}", prefix, COMPLETION_RE.replace(rest, ""))
    }
}

#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every checkbox item in the notes under `pages` (relative to the root).
    /// Task paths are relative to the vault root.
    pub fn tasks(&self, pages: &str) -> Result<Vec<RawTask>> {
        let dir = self.root.join(pages.trim_matches('/'));
        if !dir.is_dir() {
            return Err(anyhow::anyhow!(
                "Pages folder '{}' does not exist",
                dir.display()
            ));
        }

        let mut notes = Vec::new();
        Self::collect_notes(&dir, &mut notes)?;
        notes.sort();

        let mut tasks = Vec::new();
        for note in &notes {
            let contents = fs::read_to_string(note)
                .with_context(|| format!("Failed to read note '{}'", note.display()))?;
            let relative = note.strip_prefix(&self.root).unwrap_or(note);
            tasks.extend(
                contents
                    .lines()
                    .enumerate()
                    .filter_map(|(idx, line)| RawTask::from_line(relative, idx, line)),
            );
        }
        log::debug!(
            "Read {} tasks from {} notes under {}",
            tasks.len(),
            notes.len(),
            dir.display()
        );
        Ok(tasks)
    }

    fn collect_notes(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
        for entry in fs::read_dir(dir)
            .with_context(|| format!("Failed to list folder '{}'", dir.display()))?
        {
            let path = entry?.path();
            let hidden = path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'));
            if hidden {
                continue;
            }
            if path.is_dir() {
                Self::collect_notes(&path, out)?;
            } else if path.extension().is_some_and(|e| e == NOTE_EXTENSION) {
                out.push(path);
            }
        }
        Ok(())
    }

    /// Toggles the task on `line` (0-based) of `path` and returns the new line.
    /// Every line ending in the note, including the toggled one, is kept as is.
    pub fn toggle(&self, path: &Path, line: usize, today: NaiveDate) -> Result<String> {
        let full = self.root.join(path);
        Self::with_lock(&full, || {
            let contents = fs::read_to_string(&full)
                .with_context(|| format!("Failed to read note '{}'", full.display()))?;
            let lines: Vec<&str> = contents.split_inclusive('\n').collect();
            let source = lines.get(line).ok_or_else(|| {
                anyhow::anyhow!("Line {} is out of range in '{}'", line, full.display())
            })?;
            let body = source.trim_end_matches(['\r', '\n']);
            let ending = &source[body.len()..];

            let toggled = toggle_line(body, today);
            if toggled == body {
                return Err(anyhow::anyhow!(
                    "Line {} of '{}' is not a task",
                    line,
                    full.display()
                ));
            }

            let mut output = String::with_capacity(contents.len() + toggled.len());
            for (idx, current) in lines.iter().enumerate() {
                if idx == line {
                    output.push_str(&toggled);
                    output.push_str(ending);
                } else {
                    output.push_str(current);
                }
            }
            Self::atomic_write(&full, output)?;
            log::info!("Toggled {}:{}", path.display(), line);
            Ok(toggled)
        })
    }

    /// `note.md` -> `note.md.<suffix>`, `note` -> `note.<suffix>`.
    fn sidecar_path(file_path: &Path, suffix: &str) -> PathBuf {
        let mut sidecar = file_path.to_path_buf();
        if let Some(ext) = sidecar.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".");
            new_ext.push(suffix);
            sidecar.set_extension(new_ext);
        } else {
            sidecar.set_extension(suffix);
        }
        sidecar
    }

    /// Helper to get a sidecar lock file path
    fn get_lock_path(file_path: &Path) -> PathBuf {
        Self::sidecar_path(file_path, "lock")
    }

    /// Runs `f` while holding an exclusive lock on a sidecar file next to `file_path`.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = Self::sidecar_path(path, "tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }
}
