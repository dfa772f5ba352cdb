//! Profile types

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::mask_secret;

/// Format of `test_time` (local wall clock)
pub const TEST_TIME_FORMAT: &str = "%H:%M:%S";

/// Outcome of the most recent probe against a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Never probed
    #[default]
    #[serde(alias = "未测试")]
    Untested,
    /// HTTP 200 with answer text
    #[serde(alias = "通过")]
    Passed,
    /// Non-200 response
    #[serde(alias = "失败")]
    Failed,
    /// No response within the timeout
    #[serde(alias = "超时")]
    Timeout,
    /// Transport or parse failure
    #[serde(alias = "错误")]
    Error,
}

impl TestStatus {
    /// Whether this status came from an unsuccessful probe
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Timeout | Self::Error)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Untested => write!(f, "untested"),
            TestStatus::Passed => write!(f, "passed"),
            TestStatus::Failed => write!(f, "failed"),
            TestStatus::Timeout => write!(f, "timeout"),
            TestStatus::Error => write!(f, "error"),
        }
    }
}

/// A named API-credential profile
///
/// Field names on disk match the variables the Claude CLI reads.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique (case-sensitive) name within the store
    pub name: String,
    /// Base endpoint of the messages API
    #[serde(rename = "ANTHROPIC_BASE_URL", default)]
    pub base_url: String,
    /// Secret credential
    #[serde(rename = "ANTHROPIC_AUTH_TOKEN", default)]
    pub auth_token: String,
    /// Free-form model identifier
    #[serde(default)]
    pub default_model: String,
    /// Free-text annotation, empty when unset
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub test_status: TestStatus,
    /// Time of the last probe, empty when never probed
    #[serde(default)]
    pub test_time: String,
    /// Result excerpt or error from the last probe
    #[serde(default)]
    pub test_message: String,
}

impl Profile {
    /// Build an untested profile from a draft
    #[must_use]
    pub fn from_draft(draft: ProfileDraft) -> Self {
        Self {
            name: draft.name,
            base_url: draft.base_url,
            auth_token: draft.auth_token,
            default_model: draft.default_model,
            note: draft.note.unwrap_or_default(),
            test_status: TestStatus::Untested,
            test_time: String::new(),
            test_message: String::new(),
        }
    }

    /// The note, if one was set
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        Some(self.note.as_str()).filter(|n| !n.is_empty())
    }

    /// Token with everything but a short prefix/suffix hidden
    #[must_use]
    pub fn masked_token(&self) -> String {
        mask_secret(&self.auth_token)
    }

    /// Overwrite the test fields with a probe result
    pub fn apply_probe(&mut self, result: &ProbeResult) {
        self.test_status = result.status;
        self.test_time.clone_from(&result.tested_at);
        self.test_message.clone_from(&result.message);
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("auth_token", &self.masked_token())
            .field("default_model", &self.default_model)
            .field("note", &self.note)
            .field("test_status", &self.test_status)
            .field("test_time", &self.test_time)
            .field("test_message", &self.test_message)
            .finish()
    }
}

/// Input for creating a profile
#[derive(Debug, Clone, Default)]
pub struct ProfileDraft {
    pub name: String,
    pub base_url: String,
    pub auth_token: String,
    pub default_model: String,
    pub note: Option<String>,
}

impl ProfileDraft {
    /// Convenience constructor without a note
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        auth_token: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            default_model: default_model.into(),
            note: None,
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Partial update; `None` fields are left as they are
///
/// Test fields are deliberately absent: only probes change them.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub base_url: Option<String>,
    pub auth_token: Option<String>,
    pub default_model: Option<String>,
    pub note: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.base_url.is_none()
            && self.auth_token.is_none()
            && self.default_model.is_none()
            && self.note.is_none()
    }

    pub(crate) fn merge_into(self, profile: &mut Profile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(base_url) = self.base_url {
            profile.base_url = base_url;
        }
        if let Some(auth_token) = self.auth_token {
            profile.auth_token = auth_token;
        }
        if let Some(default_model) = self.default_model {
            profile.default_model = default_model;
        }
        if let Some(note) = self.note {
            profile.note = note;
        }
    }
}

/// Classified outcome of one probe, ready to be recorded on a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Never `Untested`
    pub status: TestStatus,
    pub message: String,
    /// Full answer text for passed probes
    pub answer: Option<String>,
    pub tested_at: String,
}

impl ProbeResult {
    /// Build a result stamped with the current local time
    #[must_use]
    pub fn now(status: TestStatus, message: impl Into<String>, answer: Option<String>) -> Self {
        Self {
            status,
            message: message.into(),
            answer,
            tested_at: Local::now().format(TEST_TIME_FORMAT).to_string(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == TestStatus::Passed
    }
}
