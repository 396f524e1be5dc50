use serde::{Deserialize, Serialize};

use crate::error::{QsError, Result};

/// How remote quotes are folded into the local list on a clean sync.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Concatenate every remote quote onto the local list.
    Append,
    /// Append only remote quotes not already present locally (by value).
    #[default]
    SkipExisting,
}

impl MergePolicy {
    pub fn from_str(value: &str) -> Result<Self> {
        match value {
            "append" => Ok(Self::Append),
            "skip-existing" | "dedup" => Ok(Self::SkipExisting),
            _ => Err(QsError::Config(format!(
                "unknown merge policy: {value} (use append|skip-existing)"
            ))),
        }
    }
}

/// Shape of the remote's fetch response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadFormat {
    /// `{"quotes": [...], "lastModified": "<rfc3339>"}`
    #[default]
    Snapshot,
    /// `[{"title": "...", "body": "..."}, ...]` from a placeholder posts API
    Posts,
}

impl PayloadFormat {
    pub fn from_str(value: &str) -> Result<Self> {
        match value {
            "snapshot" => Ok(Self::Snapshot),
            "posts" => Ok(Self::Posts),
            _ => Err(QsError::Config(format!(
                "unknown remote format: {value} (use snapshot|posts)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub format: PayloadFormat,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            push_url: None,
            timeout_secs: default_timeout_secs(),
            format: PayloadFormat::default(),
        }
    }
}

impl RemoteConfig {
    pub fn require_url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| QsError::MissingConfig("remote.url".to_string()))
    }

    /// Push target; falls back to the fetch URL.
    pub fn push_target(&self) -> Result<&str> {
        match self.push_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => self.require_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub merge_policy: MergePolicy,
    #[serde(default = "default_auto_push")]
    pub auto_push: bool,
}

fn default_interval_secs() -> u64 {
    30
}

fn default_auto_push() -> bool {
    true
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            merge_policy: MergePolicy::default(),
            auto_push: default_auto_push(),
        }
    }
}
