use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;

use crate::{runtime_paths, DESKTOP_LOG_FILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogCategory {
    Startup,
    Desktop,
    Ipc,
}

impl LogCategory {
    fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Desktop => "desktop",
            Self::Ipc => "ipc",
        }
    }
}

pub(crate) fn resolve_desktop_log_path(root_dir: Option<PathBuf>, log_file_name: &str) -> PathBuf {
    match root_dir {
        Some(root) => root.join("logs").join(log_file_name),
        None => std::env::temp_dir().join("webshell").join(log_file_name),
    }
}

pub(crate) fn format_log_line(category: LogCategory, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        category.as_str(),
        message
    )
}

fn write_log_line(log_path: &Path, line: &str) -> Result<(), String> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!("Failed to create log directory {}: {}", parent.display(), error)
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|error| format!("Failed to open log {}: {}", log_path.display(), error))?;
    writeln!(file, "{line}")
        .map_err(|error| format!("Failed to write log {}: {}", log_path.display(), error))
}

fn append_log(category: LogCategory, message: &str) {
    let line = format_log_line(category, message);
    if cfg!(debug_assertions) {
        eprintln!("{line}");
    }

    let log_path =
        resolve_desktop_log_path(runtime_paths::default_root_dir(), DESKTOP_LOG_FILE);
    if let Err(error) = write_log_line(&log_path, &line) {
        eprintln!("{error}");
    }
}

pub(crate) fn append_startup_log(message: &str) {
    append_log(LogCategory::Startup, message);
}

pub(crate) fn append_desktop_log(message: &str) {
    append_log(LogCategory::Desktop, message);
}

pub(crate) fn append_ipc_log(message: &str) {
    append_log(LogCategory::Ipc, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_desktop_log_path_places_log_under_root_logs_dir() {
        let path = resolve_desktop_log_path(Some(PathBuf::from("/tmp/shell-root")), "desktop.log");
        assert_eq!(path, PathBuf::from("/tmp/shell-root/logs/desktop.log"));
    }

    #[test]
    fn format_log_line_includes_category_and_message() {
        let line = format_log_line(LogCategory::Ipc, "hello");
        assert!(line.ends_with("[ipc] hello"));
        assert!(line.starts_with('['));
    }

    #[test]
    fn write_log_line_appends_lines_and_creates_parent_dir() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let log_path = temp.path().join("logs").join("desktop.log");

        write_log_line(&log_path, "first").expect("write first line");
        write_log_line(&log_path, "second").expect("write second line");

        let content = fs::read_to_string(&log_path).expect("read log");
        assert_eq!(content, "first\nsecond\n");
    }
}
