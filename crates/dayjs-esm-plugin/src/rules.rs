// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Specifier classification.
//!
//! Rules are tried in order and the first match wins:
//!
//! | Specifier                        | Rewritten to                          |
//! |----------------------------------|---------------------------------------|
//! | `dayjs/esm...`                   | left alone                            |
//! | `dayjs`                          | `dayjs/esm`                           |
//! | `dayjs/plugin/<name>/index.js`   | `dayjs/esm/plugin/<name>/index.js`    |
//! | `dayjs/plugin/<name>.js`         | `dayjs/esm/plugin/<name>/index.js`    |
//! | `dayjs/plugin/<name>`            | `dayjs/esm/plugin/<name>`             |
//!
//! `<name>` is a single path segment.

use regex::Regex;
use std::fmt;

use crate::config::RedirectConfig;
use crate::error::Result;

/// The way a caller spelled a plugin submodule import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginSpelling {
    /// `<pkg>/plugin/<name>/index.js`
    IndexJs,
    /// `<pkg>/plugin/<name>.js`
    DotJs,
    /// `<pkg>/plugin/<name>`
    Bare,
}

impl fmt::Display for PluginSpelling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginSpelling::IndexJs => write!(f, "index.js"),
            PluginSpelling::DotJs => write!(f, ".js"),
            PluginSpelling::Bare => write!(f, "bare"),
        }
    }
}

/// Outcome of classifying a specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Already points into the ES module tree
    AlreadyEsm,
    /// The bare package root
    Root {
        /// Rewritten specifier
        target: String,
    },
    /// A plugin submodule
    Plugin {
        /// Plugin name captured from the specifier
        name: String,
        /// Spelling that matched
        spelling: PluginSpelling,
        /// Rewritten specifier
        target: String,
    },
    /// Not ours to handle
    NoMatch,
}

impl Rewrite {
    /// The rewritten specifier, if this outcome calls for delegation
    pub fn target(&self) -> Option<&str> {
        match self {
            Rewrite::Root { target } | Rewrite::Plugin { target, .. } => Some(target),
            Rewrite::AlreadyEsm | Rewrite::NoMatch => None,
        }
    }
}

/// Compiled redirect rules for one package layout
#[derive(Debug, Clone)]
pub struct RedirectRules {
    package: String,
    esm_root: String,
    plugin_dir: String,
    plugin_index: Option<Regex>,
    plugin_js: Regex,
    plugin_bare: Regex,
}

impl RedirectRules {
    /// Compile the rules described by `config`
    pub fn new(config: &RedirectConfig) -> Result<Self> {
        config.validate()?;

        let prefix = format!(
            "^{}/{}/",
            regex::escape(&config.package),
            regex::escape(&config.plugin_dir)
        );

        let plugin_index = if config.index_spelling {
            Some(Regex::new(&format!(r"{prefix}([^/]+)/index\.js$"))?)
        } else {
            None
        };

        Ok(Self {
            package: config.package.clone(),
            esm_root: config.esm_root(),
            plugin_dir: config.plugin_dir.clone(),
            plugin_index,
            plugin_js: Regex::new(&format!(r"{prefix}([^/]+)\.js$"))?,
            plugin_bare: Regex::new(&format!(r"{prefix}([^/]+)$"))?,
        })
    }

    /// Package name these rules apply to
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Whether the `.../<name>/index.js` spelling is recognized
    pub fn accepts_index_spelling(&self) -> bool {
        self.plugin_index.is_some()
    }

    /// Classify a specifier
    pub fn classify(&self, specifier: &str) -> Rewrite {
        if specifier.starts_with(&self.esm_root) {
            return Rewrite::AlreadyEsm;
        }

        if specifier == self.package {
            return Rewrite::Root {
                target: self.esm_root.clone(),
            };
        }

        if let Some(name) = self.plugin_index.as_ref().and_then(|re| capture(re, specifier)) {
            return self.plugin(name, PluginSpelling::IndexJs);
        }

        if let Some(name) = capture(&self.plugin_js, specifier) {
            return self.plugin(name, PluginSpelling::DotJs);
        }

        if let Some(name) = capture(&self.plugin_bare, specifier) {
            return self.plugin(name, PluginSpelling::Bare);
        }

        Rewrite::NoMatch
    }

    /// Rewritten specifier, or `None` when the specifier is left alone
    pub fn rewrite(&self, specifier: &str) -> Option<String> {
        self.classify(specifier).target().map(str::to_string)
    }

    fn plugin(&self, name: &str, spelling: PluginSpelling) -> Rewrite {
        let target = match spelling {
            PluginSpelling::IndexJs | PluginSpelling::DotJs => {
                format!("{}/{}/{}/index.js", self.esm_root, self.plugin_dir, name)
            }
            PluginSpelling::Bare => format!("{}/{}/{}", self.esm_root, self.plugin_dir, name),
        };
        Rewrite::Plugin {
            name: name.to_string(),
            spelling,
            target,
        }
    }
}

fn capture<'s>(re: &Regex, specifier: &'s str) -> Option<&'s str> {
    re.captures(specifier)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dayjs_rules() -> RedirectRules {
        RedirectRules::new(&RedirectConfig::default()).unwrap()
    }

    #[test]
    fn test_esm_guard() {
        let rules = dayjs_rules();
        assert_eq!(rules.classify("dayjs/esm"), Rewrite::AlreadyEsm);
        assert_eq!(rules.classify("dayjs/esm/plugin/utc"), Rewrite::AlreadyEsm);
        assert_eq!(
            rules.classify("dayjs/esm/plugin/utc/index.js"),
            Rewrite::AlreadyEsm
        );
        // literal prefix match
        assert_eq!(rules.classify("dayjs/esmodule"), Rewrite::AlreadyEsm);
    }

    #[test]
    fn test_root() {
        let rules = dayjs_rules();
        assert_eq!(rules.rewrite("dayjs").as_deref(), Some("dayjs/esm"));
        assert_eq!(rules.rewrite("dayjs/"), None);
        assert_eq!(rules.rewrite("dayjs2"), None);
    }

    #[test]
    fn test_plugin_spellings() {
        let rules = dayjs_rules();

        assert_eq!(
            rules.classify("dayjs/plugin/advancedFormat/index.js"),
            Rewrite::Plugin {
                name: "advancedFormat".into(),
                spelling: PluginSpelling::IndexJs,
                target: "dayjs/esm/plugin/advancedFormat/index.js".into(),
            }
        );
        assert_eq!(
            rules.classify("dayjs/plugin/isSameOrAfter.js"),
            Rewrite::Plugin {
                name: "isSameOrAfter".into(),
                spelling: PluginSpelling::DotJs,
                target: "dayjs/esm/plugin/isSameOrAfter/index.js".into(),
            }
        );
        assert_eq!(
            rules.classify("dayjs/plugin/relativeTime"),
            Rewrite::Plugin {
                name: "relativeTime".into(),
                spelling: PluginSpelling::Bare,
                target: "dayjs/esm/plugin/relativeTime".into(),
            }
        );
    }

    #[test]
    fn test_multi_segment_falls_through() {
        let rules = dayjs_rules();
        assert_eq!(rules.classify("dayjs/plugin/foo/bar"), Rewrite::NoMatch);
        assert_eq!(rules.classify("dayjs/plugin/foo/bar.js"), Rewrite::NoMatch);
        assert_eq!(rules.classify("dayjs/plugin/"), Rewrite::NoMatch);
        assert_eq!(rules.classify("dayjs/plugin"), Rewrite::NoMatch);
    }

    #[test]
    fn test_unrelated() {
        let rules = dayjs_rules();
        assert_eq!(rules.classify("some-unrelated-package"), Rewrite::NoMatch);
        assert_eq!(rules.classify("dayjs/locale/zh-cn"), Rewrite::NoMatch);
        assert_eq!(rules.classify("./dayjs/plugin/utc"), Rewrite::NoMatch);
        assert_eq!(rules.classify("Dayjs/plugin/utc"), Rewrite::NoMatch);
    }

    #[test]
    fn test_index_spelling_disabled() {
        let config = RedirectConfig {
            index_spelling: false,
            ..RedirectConfig::default()
        };
        let rules = RedirectRules::new(&config).unwrap();
        assert!(!rules.accepts_index_spelling());
        assert_eq!(
            rules.classify("dayjs/plugin/advancedFormat/index.js"),
            Rewrite::NoMatch
        );
        assert_eq!(
            rules.rewrite("dayjs/plugin/utc.js").as_deref(),
            Some("dayjs/esm/plugin/utc/index.js")
        );
    }

    #[test]
    fn test_package_name_is_escaped() {
        let config = RedirectConfig {
            package: "@scope/date.fns".into(),
            ..RedirectConfig::default()
        };
        let rules = RedirectRules::new(&config).unwrap();
        assert_eq!(
            rules.rewrite("@scope/date.fns/plugin/utc").as_deref(),
            Some("@scope/date.fns/esm/plugin/utc")
        );
        assert_eq!(rules.rewrite("@scope/dateXfns/plugin/utc"), None);
    }
}
