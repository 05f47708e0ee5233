//! Configuration management with YAML support

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::descriptor::{EntryOrder, SchemaDescriptor};
use crate::error::{Error, Result};
use crate::probe::GitProbe;
use crate::resolver::PathResolver;

pub const HOOKS_DB_ENV: &str = "HOOKS_DB_PATH";
pub const CHATS_DB_ENV: &str = "CHATS_DB_PATH";
pub const WORKTREES_ENV: &str = "WORKTREES_PATH";

/// The two record logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Dataset {
    /// Tool-invocation hook events
    Hooks,
    /// Chat transcript lines
    Chats,
}

impl Dataset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Hooks => "hooks",
            Dataset::Chats => "chats",
        }
    }

    pub fn preset(&self) -> SchemaDescriptor {
        match self {
            Dataset::Hooks => SchemaDescriptor::hooks(),
            Dataset::Chats => SchemaDescriptor::chats(),
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            Dataset::Hooks => HOOKS_DB_ENV,
            Dataset::Chats => CHATS_DB_ENV,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory under which git worktrees are created
    #[serde(default)]
    pub worktrees_path: Option<String>,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub datasets: DatasetsConfig,
}

/// Ancestry probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_git_binary")]
    pub git_binary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetsConfig {
    #[serde(default)]
    pub hooks: DatasetConfig,

    #[serde(default)]
    pub chats: DatasetConfig,
}

/// Per-dataset settings; unset descriptor fields fall back to the dataset preset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub session_id_field: Option<String>,

    #[serde(default)]
    pub include_file_path: Option<bool>,

    #[serde(default)]
    pub order: Option<EntryOrder>,
}

// Default value functions
fn default_probe_timeout_ms() -> u64 {
    3000
}

fn default_git_binary() -> String {
    "git".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: default_probe_timeout_ms(),
            git_binary: default_git_binary(),
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides.
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./hooklens.yaml (current directory)
    /// 3. ~/.config/hooklens/hooklens.yaml
    pub fn load(path: &str) -> Result<Self> {
        let mut search_paths = vec![expand(path), PathBuf::from("hooklens.yaml")];
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("hooklens/hooklens.yaml"));
        }

        let mut config = match search_paths.iter().find(|p| p.exists()) {
            Some(found) => Self::from_file(found)?,
            // No config file found, use defaults
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Environment variables win over the file
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(value) = non_empty(HOOKS_DB_ENV) {
            self.datasets.hooks.database = Some(value);
        }
        if let Some(value) = non_empty(CHATS_DB_ENV) {
            self.datasets.chats.database = Some(value);
        }
        if let Some(value) = non_empty(WORKTREES_ENV) {
            self.worktrees_path = Some(value);
        }
    }

    fn dataset(&self, dataset: Dataset) -> &DatasetConfig {
        match dataset {
            Dataset::Hooks => &self.datasets.hooks,
            Dataset::Chats => &self.datasets.chats,
        }
    }

    /// Get the worktrees root, expanding ~ to home directory
    pub fn worktrees_root(&self) -> Option<PathBuf> {
        self.worktrees_path.as_deref().map(expand)
    }

    /// Get the database path for a dataset, expanding ~ to home directory
    pub fn database_path(&self, dataset: Dataset) -> Option<PathBuf> {
        self.dataset(dataset).database.as_deref().map(expand)
    }

    pub fn descriptor(&self, dataset: Dataset) -> SchemaDescriptor {
        let configured = self.dataset(dataset);
        let preset = dataset.preset();
        SchemaDescriptor {
            session_id_field: configured
                .session_id_field
                .clone()
                .unwrap_or(preset.session_id_field),
            include_file_path: configured
                .include_file_path
                .unwrap_or(preset.include_file_path),
            order: configured.order.unwrap_or(preset.order),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.resolver.probe_timeout_ms)
    }

    /// Resolver backed by the configured git binary. One resolver, and so one
    /// cache, can serve both datasets.
    pub fn path_resolver(&self) -> Result<PathResolver> {
        let root = self.worktrees_root().ok_or_else(|| {
            Error::Config(format!(
                "no worktrees directory configured: set worktrees_path or {}",
                WORKTREES_ENV
            ))
        })?;
        let probe = GitProbe::new(&self.resolver.git_binary, self.probe_timeout());
        Ok(PathResolver::new(root, Arc::new(probe)))
    }

    /// Everything needed to browse `dataset` must be present and well formed.
    pub fn validate_dataset(&self, dataset: Dataset) -> Result<()> {
        if self.database_path(dataset).is_none() {
            return Err(Error::Config(format!(
                "no database configured for {}: set datasets.{}.database or {}",
                dataset.as_str(),
                dataset.as_str(),
                dataset.env_var()
            )));
        }
        if self.worktrees_root().is_none() {
            return Err(Error::Config(format!(
                "no worktrees directory configured: set worktrees_path or {}",
                WORKTREES_ENV
            )));
        }
        if self.resolver.probe_timeout_ms == 0 {
            return Err(Error::Config(
                "resolver.probe_timeout_ms must be positive".to_string(),
            ));
        }
        self.descriptor(dataset).validate()
    }
}
