// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # dayjs-esm-plugin
//!
//! A bundler resolve hook that sends `dayjs` imports to the package's ES
//! module mirror tree instead of its CommonJS entry points.
//!
//! - `dayjs` resolves as `dayjs/esm`
//! - `dayjs/plugin/utc`, `dayjs/plugin/utc.js` and `dayjs/plugin/utc/index.js`
//!   resolve as their `dayjs/esm/plugin/utc` counterparts
//! - anything already under `dayjs/esm`, and anything else, is left to the host
//!
//! The crate also carries a small host pipeline ([`PluginContainer`]) and a
//! Node-style file system resolver ([`ModuleResolver`]) so the hook can be
//! driven outside a bundler.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dayjs_esm_plugin::{DayjsEsm, ModuleResolver, PluginContainer, ResolveOptions};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let container = PluginContainer::new()
//!         .with_plugin(Arc::new(DayjsEsm::new()?))
//!         .with_resolver(ModuleResolver::new(), ".");
//!
//!     let resolved = container
//!         .resolve_id("dayjs/plugin/utc", Some("src/main.ts"), ResolveOptions::default())
//!         .await?;
//!     println!("{:?}", resolved);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod container;
pub mod error;
pub mod plugin;
pub mod redirect;
pub mod resolver;
pub mod rules;

// Re-exports
pub use config::RedirectConfig;
pub use container::PluginContainer;
pub use error::{ResolveError, Result};
pub use plugin::{Enforce, Plugin, PluginContext, ResolveIdResult, ResolveOptions, ResolvedId};
pub use redirect::{dayjs_esm, DayjsEsm, PLUGIN_NAME};
pub use resolver::ModuleResolver;
pub use rules::{PluginSpelling, RedirectRules, Rewrite};

/// Version of the plugin
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
