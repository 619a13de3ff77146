// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host-side resolution pipeline.
//!
//! Plugins run in phase order (`pre`, normal, `post`), registration order
//! within a phase. The first hook answering `Some` wins. When every hook
//! declines, the file system resolver (if configured) gets the specifier.
//!
//! A hook that re-enters the pipeline through its context with `skip_self`
//! set is excluded from that nested request and from anything the nested
//! request resolves in turn.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::ResolveError;
use crate::plugin::{Plugin, PluginContext, ResolveIdResult, ResolveOptions};
use crate::resolver::ModuleResolver;

/// Ordered plugin list plus default resolution
pub struct PluginContainer {
    plugins: Vec<Arc<dyn Plugin>>,
    resolver: Option<ModuleResolver>,
    root: PathBuf,
}

impl PluginContainer {
    /// Empty container without default resolution
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            resolver: None,
            root: PathBuf::from("."),
        }
    }

    /// Register a plugin
    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.add_plugin(plugin);
        self
    }

    /// Fall back to `resolver` for specifiers no hook claims.
    ///
    /// Importer-less requests and relative importers resolve against `root`.
    pub fn with_resolver(mut self, resolver: ModuleResolver, root: impl Into<PathBuf>) -> Self {
        self.resolver = Some(resolver);
        self.root = root.into();
        self
    }

    /// Register a plugin, keeping phase order
    pub fn add_plugin(&mut self, plugin: Arc<dyn Plugin>) {
        debug!("Registering plugin '{}' ({})", plugin.name(), plugin.enforce());
        self.plugins.push(plugin);
        // stable: registration order is kept within a phase
        self.plugins.sort_by_key(|p| p.enforce());
    }

    /// Plugin names in execution order
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Project root used for default resolution
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `specifier` through every hook, then the default resolver
    pub async fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
        options: ResolveOptions,
    ) -> ResolveIdResult {
        self.resolve_skipping(specifier, importer, options, &[]).await
    }

    fn resolve_skipping<'a>(
        &'a self,
        specifier: &'a str,
        importer: Option<&'a str>,
        options: ResolveOptions,
        skip: &'a [usize],
    ) -> BoxFuture<'a, ResolveIdResult> {
        async move {
            for (index, plugin) in self.plugins.iter().enumerate() {
                if skip.contains(&index) {
                    trace!(plugin = plugin.name(), specifier, "skipped");
                    continue;
                }

                let ctx = HookContext {
                    container: self,
                    plugin: index,
                    skip,
                };
                if let Some(resolved) = plugin
                    .resolve_id(&ctx, specifier, importer, &options)
                    .await?
                {
                    if resolved.id.is_empty() {
                        return Err(ResolveError::plugin(
                            plugin.name(),
                            format!("resolved '{specifier}' to an empty id"),
                        ));
                    }
                    debug!("'{}' resolved by {} to {}", specifier, plugin.name(), resolved.id);
                    return Ok(Some(resolved));
                }
            }

            self.resolve_default(specifier, importer)
        }
        .boxed()
    }

    fn resolve_default(&self, specifier: &str, importer: Option<&str>) -> ResolveIdResult {
        let Some(resolver) = &self.resolver else {
            return Ok(None);
        };

        let resolved = match importer {
            Some(importer) => resolver.resolve_from(specifier, &self.root.join(importer)),
            None => resolver.resolve(specifier, &self.root),
        };

        match resolved {
            Ok(resolved) => Ok(Some(resolved)),
            Err(e) if e.is_not_found() => {
                debug!("{}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for PluginContainer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginContext for PluginContainer {
    async fn resolve(
        &self,
        specifier: &str,
        importer: Option<&str>,
        options: ResolveOptions,
    ) -> ResolveIdResult {
        self.resolve_id(specifier, importer, options).await
    }
}

/// Context handed to one plugin's hook during one request
struct HookContext<'a> {
    container: &'a PluginContainer,
    plugin: usize,
    skip: &'a [usize],
}

#[async_trait]
impl<'a> PluginContext for HookContext<'a> {
    async fn resolve(
        &self,
        specifier: &str,
        importer: Option<&str>,
        options: ResolveOptions,
    ) -> ResolveIdResult {
        let mut skip = self.skip.to_vec();
        if options.skip_self {
            skip.push(self.plugin);
        }
        self.container
            .resolve_skipping(specifier, importer, options, &skip)
            .await
    }
}
