// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The dayjs import redirector.
//!
//! Runs in the `pre` phase. When a specifier names the CommonJS root or a
//! plugin submodule, the ES module equivalent is handed back to the host
//! resolver (with `skip_self` set) and whatever the host answers is returned
//! as-is. Everything else gets "no opinion".

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::config::RedirectConfig;
use crate::error::Result;
use crate::plugin::{Enforce, Plugin, PluginContext, ResolveIdResult, ResolveOptions};
use crate::rules::{RedirectRules, Rewrite};

/// Name the redirector registers under
pub const PLUGIN_NAME: &str = "dayjs-esm";

/// Redirects dayjs imports to the `dayjs/esm` tree
#[derive(Debug, Clone)]
pub struct DayjsEsm {
    rules: RedirectRules,
}

impl DayjsEsm {
    /// Redirector for the stock dayjs layout
    pub fn new() -> Result<Self> {
        Self::with_config(&RedirectConfig::default())
    }

    /// Redirector for a custom layout
    pub fn with_config(config: &RedirectConfig) -> Result<Self> {
        Ok(Self::from_rules(RedirectRules::new(config)?))
    }

    /// Redirector over already compiled rules
    pub fn from_rules(rules: RedirectRules) -> Self {
        Self { rules }
    }

    /// The rules in use
    pub fn rules(&self) -> &RedirectRules {
        &self.rules
    }

    /// Decide on `specifier` and delegate the rewrite, if any, to `ctx`.
    ///
    /// At most one delegated call is made. Its outcome, including `Ok(None)`
    /// and errors, is returned unchanged.
    pub async fn try_redirect(
        &self,
        ctx: &dyn PluginContext,
        specifier: &str,
        importer: Option<&str>,
        options: &ResolveOptions,
    ) -> ResolveIdResult {
        let rewrite = self.rules.classify(specifier);

        let target = match &rewrite {
            Rewrite::AlreadyEsm | Rewrite::NoMatch => {
                trace!(specifier, outcome = ?rewrite, "left alone");
                return Ok(None);
            }
            Rewrite::Root { target } => target,
            Rewrite::Plugin { target, spelling, .. } => {
                trace!(specifier, %spelling, "plugin submodule");
                target
            }
        };

        debug!("Redirecting '{}' to '{}'", specifier, target);
        ctx.resolve(target, importer, options.skipping_self()).await
    }
}

#[async_trait]
impl Plugin for DayjsEsm {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn enforce(&self) -> Enforce {
        Enforce::Pre
    }

    async fn resolve_id(
        &self,
        ctx: &dyn PluginContext,
        specifier: &str,
        importer: Option<&str>,
        options: &ResolveOptions,
    ) -> ResolveIdResult {
        self.try_redirect(ctx, specifier, importer, options).await
    }
}

/// Build the redirector with configuration loaded for `root`.
pub fn dayjs_esm(root: &std::path::Path) -> Result<DayjsEsm> {
    DayjsEsm::with_config(&RedirectConfig::load(root)?)
}
