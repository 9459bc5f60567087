//! # Rename Audit Log
//!
//! Every successful rename is appended to an audit sink as one line:
//!
//! ```text
//! 2024/06/01 14:03:22 - Old Name vacation.jpg - New Name: vacation @beach.jpg
//! ```
//!
//! Names are written escaped so that one rename is always one line: a
//! backslash becomes `\\`, line breaks become `\n` and `\r`, and a `-` that
//! starts the name or follows a space, and is followed by a space, becomes
//! `\-`. That keeps the markers unambiguous.
//! Names without those characters are written as they are.
//!
//! The sink is injected: the composition root (the CLI, or a test) builds a
//! [`RenameLog`] and hands it to the [`Library`](crate::library::Library),
//! which passes it down to each [`TaggableFile`](crate::file::TaggableFile)
//! rename. The core only ever appends; [`RenameLog::entries`] exists so that
//! viewers can show the history without knowing the line format.

use crate::error::{NametagError, Result};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
const OLD_MARKER: &str = " - Old Name ";
const NEW_MARKER: &str = " - New Name: ";

/// One audited rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEntry {
    pub timestamp: NaiveDateTime,
    pub old_name: String,
    pub new_name: String,
}

impl RenameEntry {
    pub fn now(old_name: &str, new_name: &str) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        }
    }

    pub fn to_line(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            OLD_MARKER,
            escape(&self.old_name),
            NEW_MARKER,
            escape(&self.new_name)
        )
    }

    /// Parses a line written by [`RenameEntry::to_line`]. Returns `None` for
    /// lines that do not follow the format.
    pub fn parse_line(line: &str) -> Option<Self> {
        let (stamp, rest) = line.split_once(OLD_MARKER)?;
        let (old_name, new_name) = rest.split_once(NEW_MARKER)?;
        let timestamp = NaiveDateTime::parse_from_str(stamp.trim(), TIMESTAMP_FORMAT).ok()?;
        Some(Self {
            timestamp,
            old_name: unescape(old_name),
            new_name: unescape(new_name),
        })
    }
}

fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    // Both markers end in a space, so a leading `- ` counts too.
    let mut after_space = true;
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '-' if after_space && chars.peek() == Some(&' ') => out.push_str("\\-"),
            c => out.push(c),
        }
        after_space = c == ' ';
    }
    out
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Append-only sink for rename audit entries.
pub trait RenameLog {
    /// Append one `(old, new)` file name pair.
    fn record(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Read back every entry, oldest first. Malformed lines are skipped.
    fn entries(&self) -> Result<Vec<RenameEntry>>;
}

/// Text-file audit log (`nameLog.txt` by default).
pub struct FileRenameLog {
    path: PathBuf,
}

impl FileRenameLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RenameLog for FileRenameLog {
    fn record(&self, old_name: &str, new_name: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", RenameEntry::now(old_name, new_name).to_line())?;
        Ok(())
    }

    fn entries(&self) -> Result<Vec<RenameEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(content.lines().filter_map(RenameEntry::parse_line).collect())
    }
}

/// In-memory audit log for tests.
///
/// Uses `RefCell` since the library is single-threaded and the trait takes
/// `&self`.
#[derive(Default)]
pub struct MemRenameLog {
    entries: RefCell<Vec<RenameEntry>>,
    simulate_write_error: RefCell<bool>,
}

impl MemRenameLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl RenameLog for MemRenameLog {
    fn record(&self, old_name: &str, new_name: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(NametagError::Io(std::io::Error::other(
                "Simulated log write error",
            )));
        }
        self.entries
            .borrow_mut()
            .push(RenameEntry::now(old_name, new_name));
        Ok(())
    }

    fn entries(&self) -> Result<Vec<RenameEntry>> {
        Ok(self.entries.borrow().clone())
    }
}
