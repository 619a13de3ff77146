// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for module resolution

use thiserror::Error;

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors that can occur while resolving a specifier
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Module not found
    #[error("Cannot find module '{0}'")]
    ModuleNotFound(String),

    /// Module resolution error
    #[error("Error resolving module '{module}': {reason}")]
    Resolution {
        /// Module specifier
        module: String,
        /// Reason for failure
        reason: String,
    },

    /// A plugin hook failed
    #[error("[plugin {plugin}] {message}")]
    Plugin {
        /// Name of the failing plugin
        plugin: String,
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A specifier pattern failed to compile
    #[error("Invalid specifier pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// File system error
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ResolveError {
    /// Create a module not found error
    pub fn module_not_found(module: impl Into<String>) -> Self {
        Self::ModuleNotFound(module.into())
    }

    /// Create a plugin error
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Whether this error only means the module does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ModuleNotFound(_))
    }
}
