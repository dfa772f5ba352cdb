//! Recent Claude Code projects
//!
//! Claude Code keeps one directory per project under `~/.claude/projects`,
//! holding `*.jsonl` session logs. The first record of a session (or the
//! second, when the first is a `summary`) carries the working directory and
//! a timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use tracing::debug;

/// A project Claude Code was recently used in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentProject {
    /// Final path component
    pub name: String,
    pub path: PathBuf,
    pub last_access: DateTime<Utc>,
}

#[derive(Deserialize)]
struct SessionRecord {
    #[serde(rename = "type")]
    kind: Option<String>,
    cwd: Option<String>,
    timestamp: Option<String>,
}

/// Scan the projects directory, newest first
///
/// Unreadable directories or sessions are skipped, as are projects whose
/// working directory no longer exists. A missing directory yields nothing.
#[must_use]
pub fn recent_projects(projects_dir: &Path) -> Vec<RecentProject> {
    let Ok(entries) = fs::read_dir(projects_dir) else {
        return Vec::new();
    };

    let mut projects: Vec<RecentProject> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && !is_hidden(path))
        .filter_map(|dir| latest_session(&dir))
        .filter(|(cwd, _)| cwd.exists())
        .map(|(cwd, last_access)| RecentProject {
            name: cwd
                .file_name()
                .map_or_else(|| cwd.display().to_string(), |n| n.to_string_lossy().into_owned()),
            path: cwd,
            last_access,
        })
        .collect();

    projects.sort_by(|a, b| b.last_access.cmp(&a.last_access));
    projects
}

/// Start `claude` in the project directory
///
/// With `resume`, passes `-c` to continue the most recent conversation.
///
/// # Errors
/// Returns an error if the process cannot be spawned
pub fn launch_claude(project: &Path, resume: bool) -> io::Result<Child> {
    let mut command = Command::new("claude");
    command.current_dir(project);
    if resume {
        command.arg("-c");
    }
    debug!(path = %project.display(), resume, "launching claude");
    command.spawn()
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

/// Newest (cwd, timestamp) among the project's session files
fn latest_session(dir: &Path) -> Option<(PathBuf, DateTime<Utc>)> {
    let entries = fs::read_dir(dir).ok()?;
    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "jsonl"))
        .filter_map(|path| read_session_origin(&path))
        .max_by_key(|(_, time)| *time)
}

fn read_session_origin(path: &Path) -> Option<(PathBuf, DateTime<Utc>)> {
    let file = fs::File::open(path).ok()?;
    let mut lines = BufReader::new(file).lines();

    let mut record: SessionRecord = serde_json::from_str(lines.next()?.ok()?.trim()).ok()?;
    if record.kind.as_deref() == Some("summary") {
        record = serde_json::from_str(lines.next()?.ok()?.trim()).ok()?;
    }

    let cwd = record.cwd?;
    let time = DateTime::parse_from_rfc3339(&record.timestamp?).ok()?;
    Some((PathBuf::from(cwd), time.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_session(projects: &Path, dir: &str, file: &str, lines: &[serde_json::Value]) {
        let project_dir = projects.join(dir);
        fs::create_dir_all(&project_dir).unwrap();
        let content: Vec<String> = lines.iter().map(ToString::to_string).collect();
        fs::write(project_dir.join(file), content.join("\n")).unwrap();
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(recent_projects(&dir.path().join("projects")).is_empty());
    }

    #[test]
    fn test_sorted_newest_first_and_skips_summary() {
        let home = TempDir::new().unwrap();
        let projects = home.path().join("projects");
        let alpha = home.path().join("alpha");
        let beta = home.path().join("beta");
        fs::create_dir_all(&alpha).unwrap();
        fs::create_dir_all(&beta).unwrap();

        write_session(
            &projects,
            "-alpha",
            "s1.jsonl",
            &[json!({"cwd": alpha, "timestamp": "2025-01-01T10:00:00Z"})],
        );
        write_session(
            &projects,
            "-beta",
            "s1.jsonl",
            &[
                json!({"type": "summary", "summary": "work"}),
                json!({"cwd": beta, "timestamp": "2025-02-01T10:00:00.000Z"}),
            ],
        );

        let found = recent_projects(&projects);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "beta");
        assert_eq!(found[1].name, "alpha");
    }

    #[test]
    fn test_latest_session_wins_and_missing_paths_dropped() {
        let home = TempDir::new().unwrap();
        let projects = home.path().join("projects");
        let alpha = home.path().join("alpha");
        fs::create_dir_all(&alpha).unwrap();

        write_session(
            &projects,
            "-alpha",
            "old.jsonl",
            &[json!({"cwd": alpha, "timestamp": "2024-01-01T00:00:00Z"})],
        );
        write_session(
            &projects,
            "-alpha",
            "new.jsonl",
            &[json!({"cwd": alpha, "timestamp": "2025-06-01T00:00:00Z"})],
        );
        write_session(
            &projects,
            "-gone",
            "s.jsonl",
            &[json!({"cwd": home.path().join("gone"), "timestamp": "2025-07-01T00:00:00Z"})],
        );
        write_session(&projects, "-broken", "s.jsonl", &[json!("not an object")]);

        let found = recent_projects(&projects);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, alpha);
        assert_eq!(found[0].last_access.to_rfc3339(), "2025-06-01T00:00:00+00:00");
    }
}
