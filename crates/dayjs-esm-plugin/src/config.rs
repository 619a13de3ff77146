// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Redirect configuration.
//!
//! Values are layered, later sources winning:
//!
//! 1. built-in defaults (`dayjs`, `esm`, `plugin`, index spelling on)
//! 2. the user config file (`<config dir>/dayjs-esm/config.toml`)
//! 3. the project file (`<root>/dayjs-esm.toml`)
//! 4. `DAYJS_ESM_*` environment variables

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{ResolveError, Result};

/// Name of the per-project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "dayjs-esm.toml";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "DAYJS_ESM_";

/// Describes the package layout the redirect rules are built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RedirectConfig {
    /// Bare package name
    pub package: String,

    /// Directory holding the ES module mirror tree
    pub esm_dir: String,

    /// Directory holding per-feature plugin submodules
    pub plugin_dir: String,

    /// Accept `<pkg>/plugin/<name>/index.js` as a plugin spelling
    pub index_spelling: bool,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            package: "dayjs".to_string(),
            esm_dir: "esm".to_string(),
            plugin_dir: "plugin".to_string(),
            index_spelling: true,
        }
    }
}

/// Partial config as found in a TOML file; absent keys leave the lower layer untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigLayer {
    package: Option<String>,
    esm_dir: Option<String>,
    plugin_dir: Option<String>,
    index_spelling: Option<bool>,
}

impl RedirectConfig {
    /// Load configuration for a project rooted at `root`.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_layers(root, user_config_path().as_deref(), std::env::vars_os())
    }

    /// Load configuration from explicit sources.
    ///
    /// `user_config` is skipped when absent or missing on disk. `env` is
    /// scanned for `DAYJS_ESM_*` entries; unknown keys are ignored with a
    /// warning and non UTF-8 entries are skipped.
    pub fn load_layers<I>(root: &Path, user_config: Option<&Path>, env: I) -> Result<Self>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut config = RedirectConfig::default();

        if let Some(user_config) = user_config {
            if user_config.is_file() {
                config.merge_from_file(user_config)?;
            }
        }

        let project_config = root.join(PROJECT_CONFIG_FILE);
        if project_config.is_file() {
            config.merge_from_file(&project_config)?;
        }

        config.merge_env(env)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a complete configuration from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let mut config = RedirectConfig::default();
        config.merge_toml(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge configuration from a file.
    pub fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        tracing::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        self.merge_toml(&content)
    }

    fn merge_toml(&mut self, source: &str) -> Result<()> {
        let layer: ConfigLayer = toml::from_str(source)?;

        if let Some(package) = layer.package {
            self.package = package;
        }
        if let Some(esm_dir) = layer.esm_dir {
            self.esm_dir = esm_dir;
        }
        if let Some(plugin_dir) = layer.plugin_dir {
            self.plugin_dir = plugin_dir;
        }
        if let Some(index_spelling) = layer.index_spelling {
            self.index_spelling = index_spelling;
        }

        Ok(())
    }

    /// Apply `DAYJS_ESM_*` environment variables.
    fn merge_env<I>(&mut self, env: I) -> Result<()>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        for (key, value) in env {
            let (Ok(key), Ok(value)) = (key.into_string(), value.into_string()) else {
                continue;
            };
            let Some(config_key) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            let config_key = config_key.to_lowercase().replace('_', "-");
            if self.get(&config_key).is_none() {
                warn!("Ignoring {}: unknown config key '{}'", key, config_key);
                continue;
            }
            self.set(&config_key, &value)?;
        }
        Ok(())
    }

    /// Set a configuration value by its kebab-case key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "package" => self.package = value.to_string(),
            "esm-dir" => self.esm_dir = value.to_string(),
            "plugin-dir" => self.plugin_dir = value.to_string(),
            "index-spelling" => {
                self.index_spelling = value.parse().map_err(|_| {
                    ResolveError::Config(format!("index-spelling expects true or false, got '{value}'"))
                })?
            }
            _ => return Err(ResolveError::Config(format!("unknown key '{key}'"))),
        }
        Ok(())
    }

    /// Get a configuration value by its kebab-case key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "package" => Some(self.package.clone()),
            "esm-dir" => Some(self.esm_dir.clone()),
            "plugin-dir" => Some(self.plugin_dir.clone()),
            "index-spelling" => Some(self.index_spelling.to_string()),
            _ => None,
        }
    }

    /// Reject layouts the rules cannot express.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("package", &self.package),
            ("esm-dir", &self.esm_dir),
            ("plugin-dir", &self.plugin_dir),
        ] {
            if value.is_empty() {
                return Err(ResolveError::Config(format!("{key} must not be empty")));
            }
            if value.starts_with('/') || value.ends_with('/') {
                return Err(ResolveError::Config(format!(
                    "{key} must not start or end with '/': '{value}'"
                )));
            }
        }
        if self.esm_dir.contains('/') || self.plugin_dir.contains('/') {
            return Err(ResolveError::Config(
                "esm-dir and plugin-dir must be single path segments".into(),
            ));
        }
        Ok(())
    }

    /// Specifier of the ES module mirror root, e.g. `dayjs/esm`.
    pub fn esm_root(&self) -> String {
        format!("{}/{}", self.package, self.esm_dir)
    }
}

/// Get the user config path.
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dayjs-esm").join("config.toml"))
}
