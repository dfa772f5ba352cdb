//! Environment variable projection
//!
//! Three scopes: the running process (and children it spawns), the user's
//! persistent environment, and the machine-wide persistent environment.
//! On Windows the persistent scopes are the registry; elsewhere they are
//! `KEY=VALUE` files read at login (`environment.d` and `/etc/environment`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;

use crate::profile::Profile;
use crate::util::mask_secret;

pub const ENV_BASE_URL: &str = "ANTHROPIC_BASE_URL";
pub const ENV_AUTH_TOKEN: &str = "ANTHROPIC_AUTH_TOKEN";
pub const ENV_MODEL: &str = "ANTHROPIC_MODEL";

/// Where environment variables are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvScope {
    /// This process and its children only
    Process,
    /// Persisted for the current user
    User,
    /// Persisted machine-wide; needs elevation
    System,
}

impl EnvScope {
    #[must_use]
    pub fn is_persistent(self) -> bool {
        !matches!(self, Self::Process)
    }
}

impl fmt::Display for EnvScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvScope::Process => write!(f, "process"),
            EnvScope::User => write!(f, "user"),
            EnvScope::System => write!(f, "system"),
        }
    }
}

/// The variables a profile projects, in write order
#[must_use]
pub fn profile_vars(profile: &Profile) -> [(&'static str, String); 3] {
    [
        (ENV_BASE_URL, profile.base_url.clone()),
        (ENV_AUTH_TOKEN, profile.auth_token.clone()),
        (ENV_MODEL, profile.default_model.clone()),
    ]
}

/// The three variables as this process currently sees them
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    pub base_url: Option<String>,
    pub auth_token: Option<String>,
    pub model: Option<String>,
}

impl EnvSnapshot {
    #[must_use]
    pub fn capture() -> Self {
        Self {
            base_url: std::env::var(ENV_BASE_URL).ok(),
            auth_token: std::env::var(ENV_AUTH_TOKEN).ok(),
            model: std::env::var(ENV_MODEL).ok(),
        }
    }

    #[must_use]
    pub fn masked_token(&self) -> Option<String> {
        self.auth_token.as_deref().map(mask_secret)
    }
}

impl fmt::Debug for EnvSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSnapshot")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.masked_token())
            .field("model", &self.model)
            .finish()
    }
}

pub(crate) fn set_process(vars: &[(&'static str, String)]) {
    for (key, value) in vars {
        std::env::set_var(key, value);
    }
}

/// Rewrite `KEY=VALUE` content, replacing existing keys in place and
/// appending the rest
pub(crate) fn merge_env_lines(existing: &str, vars: &[(&'static str, String)]) -> String {
    let mut written = vec![false; vars.len()];
    let mut lines: Vec<String> = Vec::new();

    for line in existing.lines() {
        let key = line_key(line);
        match vars.iter().position(|(k, _)| Some(*k) == key) {
            Some(i) if !written[i] => {
                lines.push(format_env_line(vars[i].0, &vars[i].1));
                written[i] = true;
            }
            // Drop repeated assignments of a key we own
            Some(_) => {}
            None => lines.push(line.to_string()),
        }
    }
    for (i, (key, value)) in vars.iter().enumerate() {
        if !written[i] {
            lines.push(format_env_line(key, value));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Parse one `KEY=VALUE` line; comments and blanks yield `None`
#[must_use]
pub fn parse_env_line(line: &str) -> Option<(String, String)> {
    let key = line_key(line)?;
    let (_, raw) = line.split_once('=')?;
    let raw = raw.trim();
    let value = match raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => raw.to_string(),
    };
    Some((key.to_string(), value))
}

fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, _) = trimmed.split_once('=')?;
    let key = key.trim();
    (!key.is_empty()).then_some(key)
}

fn format_env_line(key: &str, value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '#' | '$' | '\\'));
    if needs_quotes {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{key}=\"{escaped}\"")
    } else {
        format!("{key}={value}")
    }
}

/// Merge the variables into an env file, creating it if needed
#[cfg_attr(windows, allow(dead_code))]
pub(crate) fn write_env_file(path: &Path, vars: &[(&'static str, String)]) -> io::Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, merge_env_lines(&existing, vars))
}

#[cfg(windows)]
pub(crate) mod registry {
    //! Registry-backed persistent environment

    use std::io;
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_SET_VALUE};
    use winreg::RegKey;

    use super::EnvScope;

    const USER_ENV_KEY: &str = "Environment";
    const SYSTEM_ENV_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

    pub(crate) fn write(scope: EnvScope, vars: &[(&'static str, String)]) -> io::Result<()> {
        let key = match scope {
            EnvScope::User => {
                RegKey::predef(HKEY_CURRENT_USER).open_subkey_with_flags(USER_ENV_KEY, KEY_SET_VALUE)?
            }
            EnvScope::System => RegKey::predef(HKEY_LOCAL_MACHINE)
                .open_subkey_with_flags(SYSTEM_ENV_KEY, KEY_SET_VALUE)?,
            EnvScope::Process => return Ok(()),
        };
        for (name, value) in vars {
            key.set_value(name, value)?;
        }
        Ok(())
    }

    /// Tell running programs the environment changed (`WM_SETTINGCHANGE`)
    #[allow(unsafe_code)]
    pub(crate) fn broadcast_change() -> bool {
        use windows::core::w;
        use windows::Win32::Foundation::{LPARAM, WPARAM};
        use windows::Win32::UI::WindowsAndMessaging::{
            SendMessageTimeoutW, HWND_BROADCAST, SMTO_ABORTIFHUNG, WM_SETTINGCHANGE,
        };

        let mut result = 0usize;
        // SAFETY: the lParam string is a static wide literal that outlives the call
        let sent = unsafe {
            SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_SETTINGCHANGE,
                WPARAM(0),
                LPARAM(w!("Environment").as_ptr() as isize),
                SMTO_ABORTIFHUNG,
                5000,
                Some(&mut result),
            )
        };
        sent.0 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars() -> Vec<(&'static str, String)> {
        vec![
            (ENV_BASE_URL, "https://api.example.com".to_string()),
            (ENV_AUTH_TOKEN, "sk-test".to_string()),
            (ENV_MODEL, "claude-sonnet".to_string()),
        ]
    }

    #[test]
    fn test_merge_appends_to_empty() {
        let out = merge_env_lines("", &vars());
        assert_eq!(
            out,
            "ANTHROPIC_BASE_URL=https://api.example.com\nANTHROPIC_AUTH_TOKEN=sk-test\nANTHROPIC_MODEL=claude-sonnet\n"
        );
    }

    #[test]
    fn test_merge_replaces_in_place_and_keeps_others() {
        let existing = "PATH=\"/usr/bin\"\n# comment\nANTHROPIC_BASE_URL=https://old\nLANG=C\n";
        let out = merge_env_lines(existing, &vars());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "PATH=\"/usr/bin\"");
        assert_eq!(lines[1], "# comment");
        assert_eq!(lines[2], "ANTHROPIC_BASE_URL=https://api.example.com");
        assert_eq!(lines[3], "LANG=C");
        assert_eq!(lines[4], "ANTHROPIC_AUTH_TOKEN=sk-test");
        assert_eq!(lines[5], "ANTHROPIC_MODEL=claude-sonnet");
    }

    #[test]
    fn test_merge_drops_duplicate_assignments() {
        let existing = "ANTHROPIC_MODEL=a\nexport ANTHROPIC_MODEL=b\n";
        let out = merge_env_lines(existing, &vars());
        assert_eq!(out.matches("ANTHROPIC_MODEL=").count(), 1);
    }

    #[test]
    fn test_quoted_values_round_trip() {
        let line = format_env_line("KEY", "has space \"and quote\"");
        assert_eq!(
            parse_env_line(&line),
            Some(("KEY".to_string(), "has space \"and quote\"".to_string()))
        );
    }

    #[test]
    fn test_parse_skips_comments() {
        assert_eq!(parse_env_line("# KEY=value"), None);
        assert_eq!(parse_env_line(""), None);
    }

    #[test]
    fn test_write_env_file_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("environment.d").join("60-ccswitch.conf");
        write_env_file(&path, &vars()).unwrap();
        let parsed: Vec<(String, String)> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .filter_map(parse_env_line)
            .collect();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1], (ENV_AUTH_TOKEN.to_string(), "sk-test".to_string()));
    }
}
