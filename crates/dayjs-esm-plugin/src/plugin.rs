// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Resolve hook API shared by plugins and the host pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

/// When a plugin's hooks run relative to the others
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Enforce {
    /// Before normal plugins and default resolution
    Pre,
    /// Registration order
    #[default]
    Normal,
    /// After normal plugins
    Post,
}

impl fmt::Display for Enforce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Enforce::Pre => write!(f, "pre"),
            Enforce::Normal => write!(f, "normal"),
            Enforce::Post => write!(f, "post"),
        }
    }
}

/// Options passed along with a resolution request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Skip the calling plugin's own `resolve_id` on this request
    #[serde(default)]
    pub skip_self: bool,

    /// The specifier is a build entry point
    #[serde(default)]
    pub is_entry: bool,

    /// Plugin-specific data, passed through untouched
    #[serde(default)]
    pub custom: BTreeMap<String, serde_json::Value>,
}

impl ResolveOptions {
    /// Copy of these options with `skip_self` forced on
    pub fn skipping_self(&self) -> Self {
        Self {
            skip_self: true,
            ..self.clone()
        }
    }
}

/// A successfully resolved module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedId {
    /// Resolved module id, usually an absolute path
    pub id: String,
    /// Left out of the bundle
    pub external: bool,
}

impl ResolvedId {
    /// A module that is part of the bundle
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: false,
        }
    }

    /// A module left to the runtime
    pub fn external(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: true,
        }
    }
}

/// `Ok(None)` means "no opinion": let the next hook or the default resolver decide.
pub type ResolveIdResult = Result<Option<ResolvedId>>;

/// The host's resolve capability, as seen from inside a hook
#[async_trait]
pub trait PluginContext: Send + Sync {
    /// Run the host's full resolution pipeline on `specifier`
    async fn resolve(
        &self,
        specifier: &str,
        importer: Option<&str>,
        options: ResolveOptions,
    ) -> ResolveIdResult;
}

/// A build plugin
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Identifying name
    fn name(&self) -> &str;

    /// Ordering phase
    fn enforce(&self) -> Enforce {
        Enforce::Normal
    }

    /// Intercept a resolution request
    async fn resolve_id(
        &self,
        _ctx: &dyn PluginContext,
        _specifier: &str,
        _importer: Option<&str>,
        _options: &ResolveOptions,
    ) -> ResolveIdResult {
        Ok(None)
    }
}
