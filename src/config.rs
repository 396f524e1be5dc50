use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QsError, Result};
use crate::sync::config::{MergePolicy, PayloadFormat, RemoteConfig, SyncSettings};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Defaults, then the global and project files (or only the explicit
    /// file), then `QS_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>, qs_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("QS_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(QsError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(qs_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(&|key| std::env::var(key).ok())?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match dirs::config_dir() {
            Some(dir) => Self::load_patch(&dir.join("qs/config.toml")),
            None => Ok(None),
        }
    }

    fn load_project(qs_root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&qs_root.join("config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| QsError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| QsError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.remote {
            merge_remote(&mut self.remote, patch);
        }
        if let Some(patch) = patch.sync {
            merge_sync(&mut self.sync, patch);
        }
        if let Some(patch) = patch.store {
            self.store.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self, env: &EnvLookup<'_>) -> Result<()> {
        if let Some(value) = env_string(env, "QS_REMOTE_URL") {
            self.remote.url = Some(value);
        }
        if let Some(value) = env_string(env, "QS_REMOTE_PUSH_URL") {
            self.remote.push_url = Some(value);
        }
        if let Some(value) = env_u64(env, "QS_REMOTE_TIMEOUT_SECS")? {
            self.remote.timeout_secs = value;
        }
        if let Some(value) = env_string(env, "QS_REMOTE_FORMAT") {
            self.remote.format = PayloadFormat::from_str(&value)?;
        }

        if let Some(value) = env_u64(env, "QS_SYNC_INTERVAL_SECS")? {
            self.sync.interval_secs = value;
        }
        if let Some(value) = env_string(env, "QS_SYNC_MERGE_POLICY") {
            self.sync.merge_policy = MergePolicy::from_str(&value)?;
        }
        if let Some(value) = env_bool(env, "QS_SYNC_AUTO_PUSH") {
            self.sync.auto_push = value;
        }

        if let Some(value) = env_string(env, "QS_STORE_PATH") {
            self.store.path = Some(value);
        }
        if let Some(value) = env_bool(env, "QS_STORE_SEED_DEFAULTS") {
            self.store.seed_defaults = value;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file; relative paths resolve against the data root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default = "default_seed_defaults")]
    pub seed_defaults: bool,
}

const fn default_seed_defaults() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            seed_defaults: default_seed_defaults(),
        }
    }
}

impl StoreConfig {
    pub fn db_path(&self, qs_root: &Path) -> PathBuf {
        match self.path.as_deref() {
            Some(path) if Path::new(path).is_absolute() => PathBuf::from(path),
            Some(path) => qs_root.join(path),
            None => qs_root.join("quotes.db"),
        }
    }

    fn merge(&mut self, patch: StorePatch) {
        if let Some(value) = patch.path {
            self.path = Some(value);
        }
        if let Some(value) = patch.seed_defaults {
            self.seed_defaults = value;
        }
    }
}

fn merge_remote(config: &mut RemoteConfig, patch: RemotePatch) {
    if let Some(value) = patch.url {
        config.url = Some(value);
    }
    if let Some(value) = patch.push_url {
        config.push_url = Some(value);
    }
    if let Some(value) = patch.timeout_secs {
        config.timeout_secs = value;
    }
    if let Some(value) = patch.format {
        config.format = value;
    }
}

fn merge_sync(config: &mut SyncSettings, patch: SyncPatch) {
    if let Some(value) = patch.interval_secs {
        config.interval_secs = value;
    }
    if let Some(value) = patch.merge_policy {
        config.merge_policy = value;
    }
    if let Some(value) = patch.auto_push {
        config.auto_push = value;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub remote: Option<RemotePatch>,
    pub sync: Option<SyncPatch>,
    pub store: Option<StorePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RemotePatch {
    pub url: Option<String>,
    pub push_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub format: Option<PayloadFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SyncPatch {
    pub interval_secs: Option<u64>,
    pub merge_policy: Option<MergePolicy>,
    pub auto_push: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StorePatch {
    pub path: Option<String>,
    pub seed_defaults: Option<bool>,
}

type EnvLookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

fn env_string(env: &EnvLookup<'_>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.trim().is_empty())
}

fn env_bool(env: &EnvLookup<'_>, key: &str) -> Option<bool> {
    env(key).map(|value| {
        matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(env: &EnvLookup<'_>, key: &str) -> Result<Option<u64>> {
    match env(key) {
        Some(value) => value.parse::<u64>().map(Some).map_err(|err| {
            QsError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        None => Ok(None),
    }
}
