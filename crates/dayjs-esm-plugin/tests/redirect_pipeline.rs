//! End-to-end resolution against an on-disk dayjs package
//!
//! Lays out a trimmed copy of the published dayjs tree and resolves the
//! import spellings seen in real projects through the full pipeline.

use dayjs_esm_plugin::{
    DayjsEsm, ModuleResolver, PluginContainer, RedirectConfig, ResolveOptions, ResolvedId,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const PLUGINS: &[&str] = &[
    "advancedFormat",
    "customParseFormat",
    "duration",
    "isBetween",
    "isSameOrAfter",
    "relativeTime",
    "timezone",
    "utc",
];

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

/// Create `node_modules/dayjs` with CommonJS files and the esm mirror
fn dayjs_project() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let pkg = dir.path().join("node_modules/dayjs");

    fs::create_dir_all(&pkg).unwrap();
    fs::write(
        pkg.join("package.json"),
        r#"{"name": "dayjs", "version": "1.11.13", "main": "dayjs.min.js"}"#,
    )
    .unwrap();
    touch(&pkg.join("dayjs.min.js"));
    touch(&pkg.join("esm/index.js"));
    touch(&pkg.join("locale/zh-cn.js"));
    for name in PLUGINS {
        touch(&pkg.join(format!("plugin/{name}.js")));
        touch(&pkg.join(format!("esm/plugin/{name}/index.js")));
    }
    touch(&dir.path().join("src/main.ts"));

    (dir, pkg)
}

fn container(root: &Path, config: &RedirectConfig) -> PluginContainer {
    PluginContainer::new()
        .with_plugin(Arc::new(DayjsEsm::with_config(config).unwrap()))
        .with_resolver(ModuleResolver::new(), root)
}

async fn resolve(container: &PluginContainer, specifier: &str) -> Option<ResolvedId> {
    container
        .resolve_id(specifier, Some("src/main.ts"), ResolveOptions::default())
        .await
        .unwrap()
}

fn id_of(path: &Path) -> Option<ResolvedId> {
    Some(ResolvedId::new(
        path.canonicalize().unwrap().to_string_lossy().into_owned(),
    ))
}

#[tokio::test]
async fn test_root_resolves_to_esm_index() {
    let (dir, pkg) = dayjs_project();
    let container = container(dir.path(), &RedirectConfig::default());

    assert_eq!(resolve(&container, "dayjs").await, id_of(&pkg.join("esm/index.js")));
}

#[tokio::test]
async fn test_every_plugin_spelling_lands_in_esm() {
    let (dir, pkg) = dayjs_project();
    let container = container(dir.path(), &RedirectConfig::default());

    for name in PLUGINS {
        let expected = id_of(&pkg.join(format!("esm/plugin/{name}/index.js")));
        for specifier in [
            format!("dayjs/plugin/{name}"),
            format!("dayjs/plugin/{name}.js"),
            format!("dayjs/plugin/{name}/index.js"),
            format!("dayjs/esm/plugin/{name}"),
        ] {
            assert_eq!(resolve(&container, &specifier).await, expected, "{specifier}");
        }
    }
}

#[tokio::test]
async fn test_untouched_specifiers_use_default_resolution() {
    let (dir, pkg) = dayjs_project();
    let container = container(dir.path(), &RedirectConfig::default());

    assert_eq!(
        resolve(&container, "dayjs/locale/zh-cn").await,
        id_of(&pkg.join("locale/zh-cn.js"))
    );
    assert_eq!(
        resolve(&container, "node:fs").await,
        Some(ResolvedId::external("node:fs"))
    );
    assert_eq!(resolve(&container, "some-unrelated-package").await, None);
}

#[tokio::test]
async fn test_missing_esm_twin_falls_back_to_default_resolution() {
    let (dir, pkg) = dayjs_project();
    touch(&pkg.join("plugin/weekday.js"));
    let container = container(dir.path(), &RedirectConfig::default());

    // The redirect finds nothing, so the original specifier resolves as usual
    assert_eq!(
        resolve(&container, "dayjs/plugin/weekday").await,
        id_of(&pkg.join("plugin/weekday.js"))
    );
}

#[tokio::test]
async fn test_two_spelling_layout_leaves_index_path_alone() {
    let (dir, pkg) = dayjs_project();
    touch(&pkg.join("plugin/utc/index.js"));
    let config = RedirectConfig {
        index_spelling: false,
        ..RedirectConfig::default()
    };
    let container = container(dir.path(), &config);

    assert_eq!(
        resolve(&container, "dayjs/plugin/utc/index.js").await,
        id_of(&pkg.join("plugin/utc/index.js"))
    );
    assert_eq!(
        resolve(&container, "dayjs/plugin/utc.js").await,
        id_of(&pkg.join("esm/plugin/utc/index.js"))
    );
}

#[tokio::test]
async fn test_concurrent_requests() {
    let (dir, pkg) = dayjs_project();
    let container = Arc::new(container(dir.path(), &RedirectConfig::default()));

    let handles: Vec<_> = PLUGINS
        .iter()
        .map(|name| {
            let container = container.clone();
            let specifier = format!("dayjs/plugin/{name}.js");
            tokio::spawn(async move {
                container
                    .resolve_id(&specifier, Some("src/main.ts"), ResolveOptions::default())
                    .await
            })
        })
        .collect();

    for (name, handle) in PLUGINS.iter().zip(handles) {
        let resolved = handle.await.unwrap().unwrap();
        assert_eq!(resolved, id_of(&pkg.join(format!("esm/plugin/{name}/index.js"))));
    }
}
