// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Default module resolution against the file system (Node.js algorithm)

use crate::error::{ResolveError, Result};
use crate::plugin::ResolvedId;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Node.js built-in modules, resolved as externals
pub const BUILTIN_MODULES: &[&str] = &[
    "assert",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "https",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Resolves bare, relative and absolute specifiers on disk
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    /// File extensions to try, in order
    extensions: Vec<String>,
}

impl ModuleResolver {
    /// Create a new module resolver
    pub fn new() -> Self {
        Self {
            extensions: vec![
                ".js".to_string(),
                ".mjs".to_string(),
                ".cjs".to_string(),
                ".json".to_string(),
            ],
        }
    }

    /// Check if a module is a built-in
    pub fn is_builtin(&self, name: &str) -> bool {
        let name = name.strip_prefix("node:").unwrap_or(name);
        let name = name.split('/').next().unwrap_or(name);
        BUILTIN_MODULES.contains(&name)
    }

    /// Resolve `specifier` as imported from a module in `base_dir`
    pub fn resolve(&self, specifier: &str, base_dir: &Path) -> Result<ResolvedId> {
        if specifier.is_empty() {
            return Err(ResolveError::Resolution {
                module: specifier.to_string(),
                reason: "specifier is empty".to_string(),
            });
        }

        if self.is_builtin(specifier) {
            return Ok(ResolvedId::external(specifier));
        }

        if specifier.starts_with("./")
            || specifier.starts_with("../")
            || specifier.starts_with('/')
            || (cfg!(windows) && specifier.chars().nth(1) == Some(':'))
        {
            return self
                .resolve_file(&base_dir.join(specifier))
                .ok_or_else(|| ResolveError::module_not_found(specifier));
        }

        self.resolve_node_modules(specifier, base_dir)
    }

    /// Resolve `specifier` relative to the directory of `importer`
    pub fn resolve_from(&self, specifier: &str, importer: &Path) -> Result<ResolvedId> {
        let base_dir = importer.parent().unwrap_or(Path::new("."));
        self.resolve(specifier, base_dir)
    }

    /// Resolve a file path, probing extensions and directories
    fn resolve_file(&self, path: &Path) -> Option<ResolvedId> {
        if path.is_file() {
            return Some(self.categorize_file(path));
        }

        for ext in &self.extensions {
            let mut filename = path.file_name()?.to_string_lossy().to_string();
            filename.push_str(ext);
            let with_ext = path.with_file_name(&filename);
            if with_ext.is_file() {
                return Some(self.categorize_file(&with_ext));
            }
        }

        if path.is_dir() {
            return self.resolve_directory(path);
        }

        None
    }

    /// Resolve a directory (package.json entry point or index file)
    fn resolve_directory(&self, dir: &Path) -> Option<ResolvedId> {
        if let Some(pkg) = read_package_json(dir) {
            for entry in [pkg.module, pkg.main].into_iter().flatten() {
                let entry_path = dir.join(&entry);
                if entry_path.is_file() {
                    return Some(self.categorize_file(&entry_path));
                }
                for ext in &self.extensions {
                    let mut with_ext = entry_path.clone().into_os_string();
                    with_ext.push(ext);
                    let with_ext = PathBuf::from(with_ext);
                    if with_ext.is_file() {
                        return Some(self.categorize_file(&with_ext));
                    }
                }
            }
        }

        for ext in &self.extensions {
            let index = dir.join(format!("index{}", ext));
            if index.is_file() {
                return Some(self.categorize_file(&index));
            }
        }

        None
    }

    /// Resolve a module from node_modules
    fn resolve_node_modules(&self, specifier: &str, base_dir: &Path) -> Result<ResolvedId> {
        let (package_name, subpath) = self.parse_package_specifier(specifier);

        // Walk up directory tree looking for node_modules
        let mut current = Some(base_dir);
        while let Some(dir) = current {
            let package_dir = dir.join("node_modules").join(package_name);

            if package_dir.is_dir() {
                let resolved = match subpath {
                    Some(sub) => self.resolve_file(&package_dir.join(sub)),
                    None => self.resolve_directory(&package_dir),
                };
                if let Some(resolved) = resolved {
                    return Ok(resolved);
                }
            }

            current = dir.parent();
        }

        Err(ResolveError::module_not_found(specifier))
    }

    /// Parse a package specifier into name and optional subpath
    fn parse_package_specifier<'a>(&self, specifier: &'a str) -> (&'a str, Option<&'a str>) {
        if specifier.starts_with('@') {
            // Scoped package: @scope/name or @scope/name/subpath
            if let Some(slash_pos) = specifier[1..].find('/') {
                let after_scope = &specifier[slash_pos + 2..];
                if let Some(subpath_pos) = after_scope.find('/') {
                    let name_end = slash_pos + 2 + subpath_pos;
                    return (&specifier[..name_end], Some(&specifier[name_end + 1..]));
                }
            }
            (specifier, None)
        } else if let Some(slash_pos) = specifier.find('/') {
            (&specifier[..slash_pos], Some(&specifier[slash_pos + 1..]))
        } else {
            (specifier, None)
        }
    }

    fn categorize_file(&self, path: &Path) -> ResolvedId {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let external = path.extension().and_then(|e| e.to_str()) == Some("node");
        ResolvedId {
            id: path.to_string_lossy().into_owned(),
            external,
        }
    }
}

impl Default for ModuleResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry point fields of package.json
#[derive(Debug, Deserialize)]
struct PackageJson {
    main: Option<String>,
    module: Option<String>,
}

fn read_package_json(dir: &Path) -> Option<PackageJson> {
    let content = std::fs::read_to_string(dir.join("package.json")).ok()?;
    match serde_json::from_str(&content) {
        Ok(pkg) => Some(pkg),
        Err(e) => {
            tracing::warn!("Ignoring malformed package.json in {}: {}", dir.display(), e);
            None
        }
    }
}
