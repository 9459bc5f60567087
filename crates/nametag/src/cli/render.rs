//! Terminal rendering.
//!
//! Every `render_*` function returns a `String` so output can be checked in
//! tests; the command handlers print them.

use chrono::{DateTime, Utc};
use colored::*;
use nametagapp::commands::{CmdMessage, FileView, MessageLevel, TagView};
use nametagapp::rename_log::RenameEntry;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const NAME_WIDTH: usize = 48;
const TIME_WIDTH: usize = 14;
const TRACKED_MARKER: &str = "●";

pub fn render_messages(messages: &[CmdMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let line = match message.level {
            MessageLevel::Info => message.content.dimmed(),
            MessageLevel::Success => message.content.green(),
            MessageLevel::Warning => message.content.yellow(),
            MessageLevel::Error => message.content.red(),
        };
        out.push_str(&format!("{}\n", line));
    }
    out
}

/// One line per file: marker, untagged name, then the tags.
pub fn render_files(files: &[FileView]) -> String {
    let mut out = String::new();
    for file in files {
        let marker = if file.ever_tagged {
            TRACKED_MARKER.blue().to_string()
        } else {
            " ".to_string()
        };
        let name = pad_to_width(&truncate_to_width(&file.original_name, NAME_WIDTH), NAME_WIDTH);
        let tags: Vec<String> = file
            .tags
            .iter()
            .map(|t| format!("@{}", t).cyan().to_string())
            .collect();
        let line = format!("{} {} {}", marker, name, tags.join(" "));
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn render_tags(tags: &[TagView]) -> String {
    let width = tags.iter().map(|t| t.name.width()).max().unwrap_or(0) + 1;
    let mut out = String::new();
    for tag in tags {
        let name = pad_to_width(&format!("@{}", tag.name), width);
        let usage = format!(
            "{:>4} file{}",
            tag.usage,
            if tag.usage == 1 { " " } else { "s" }
        );
        out.push_str(&format!(
            "{}  {}  {}\n",
            name.cyan(),
            usage,
            format_time_ago(tag.created_at).dimmed()
        ));
    }
    out
}

/// Previous names, oldest first, numbered for `nametag revert`.
pub fn render_history(history: &[String]) -> String {
    let mut out = String::new();
    for (i, name) in history.iter().enumerate() {
        out.push_str(&format!("{:>3}. {}\n", i + 1, name));
    }
    out
}

pub fn render_log(entries: &[RenameEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{}  {} {} {}\n",
            entry.timestamp.format("%Y/%m/%d %H:%M:%S").to_string().dimmed(),
            entry.old_name,
            "->".dimmed(),
            entry.new_name
        ));
    }
    out
}

pub fn render_config(entries: &[(String, String)]) -> String {
    let width = entries.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(&format!("{} = {}\n", pad_to_width(key, width).bold(), value));
    }
    out
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use std::path::PathBuf;

    fn plain() {
        colored::control::set_override(false);
    }

    fn file(name: &str, tags: &[&str], ever_tagged: bool) -> FileView {
        FileView {
            file_name: name.to_string(),
            original_name: name.to_string(),
            path: PathBuf::from("/pics").join(name),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ever_tagged,
        }
    }

    #[test]
    fn files_show_tags_with_sigil() {
        plain();
        let out = render_files(&[file("vacation.jpg", &["beach", "sunset"], true)]);
        assert!(out.starts_with(TRACKED_MARKER));
        assert!(out.contains("vacation.jpg"));
        assert!(out.trim_end().ends_with("@beach @sunset"));
    }

    #[test]
    fn untagged_files_have_no_trailing_space() {
        plain();
        let out = render_files(&[file("a.jpg", &[], false)]);
        assert_eq!(out, "  a.jpg\n");
    }

    #[test]
    fn messages_one_per_line() {
        plain();
        let out = render_messages(&[CmdMessage::info("one"), CmdMessage::error("two")]);
        assert_eq!(out, "one\ntwo\n");
    }

    #[test]
    fn history_is_numbered() {
        let out = render_history(&["vacation".to_string(), "vacation @beach".to_string()]);
        assert_eq!(out, "  1. vacation\n  2. vacation @beach\n");
    }

    #[test]
    fn log_lines() {
        plain();
        let entry = RenameEntry {
            timestamp: NaiveDateTime::parse_from_str("2024/06/01 14:03:22", "%Y/%m/%d %H:%M:%S")
                .unwrap(),
            old_name: "a.jpg".to_string(),
            new_name: "a @x.jpg".to_string(),
        };
        assert_eq!(render_log(&[entry]), "2024/06/01 14:03:22  a.jpg -> a @x.jpg\n");
    }

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("写真写真", 5), "写真…");
        assert_eq!(truncate_to_width("short", 10), "short");
    }

    #[test]
    fn tags_show_usage() {
        plain();
        let out = render_tags(&[TagView {
            name: "beach".to_string(),
            created_at: Utc::now(),
            usage: 2,
        }]);
        assert!(out.starts_with("@beach"));
        assert!(out.contains("2 files"));
    }
}
