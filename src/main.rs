// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! dayjs-esm CLI - show how dayjs imports resolve with the ESM redirect in place

use clap::Parser;
use dayjs_esm_plugin::{
    DayjsEsm, ModuleResolver, PluginContainer, RedirectConfig, ResolveOptions, Rewrite, VERSION,
};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "dayjs-esm",
    about = "Resolve dayjs imports through their ES module equivalents",
    version = VERSION,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Import specifiers to resolve
    #[arg(required = true)]
    specifiers: Vec<String>,

    /// Project root containing node_modules
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Module performing the import, relative to the root
    #[arg(long)]
    importer: Option<String>,

    /// Configuration file (defaults to <root>/dayjs-esm.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only accept the `.js` and bare plugin spellings
    #[arg(long)]
    no_index_spelling: bool,

    /// Print the rewrites without touching the file system
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "dayjs_esm_plugin=debug,dayjs_esm=debug"
    } else {
        "dayjs_esm_plugin=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    tracing::debug!(?config, "Loaded configuration");

    let plugin = DayjsEsm::with_config(&config)?;

    if cli.dry_run {
        for specifier in &cli.specifiers {
            print_rewrite(specifier, &plugin.rules().classify(specifier));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let container = PluginContainer::new()
        .with_plugin(Arc::new(plugin.clone()))
        .with_resolver(ModuleResolver::new(), &cli.root);

    let mut failed = false;
    for specifier in &cli.specifiers {
        let rewrite = plugin.rules().classify(specifier);
        let resolved = container
            .resolve_id(specifier, cli.importer.as_deref(), ResolveOptions::default())
            .await;

        let via = rewrite
            .target()
            .map(|t| format!(" {} {}", "via".dimmed(), t.cyan()))
            .unwrap_or_default();

        match resolved {
            Ok(Some(resolved)) => {
                let external = if resolved.external {
                    format!(" {}", "(external)".dimmed())
                } else {
                    String::new()
                };
                println!(
                    "{}{} {} {}{}",
                    specifier.white().bold(),
                    via,
                    "->".dimmed(),
                    resolved.id.green(),
                    external
                );
            }
            Ok(None) => {
                failed = true;
                println!(
                    "{}{} {} {}",
                    specifier.white().bold(),
                    via,
                    "->".dimmed(),
                    "not found".red()
                );
            }
            Err(e) => {
                failed = true;
                eprintln!("{}: {}", "Error".red().bold(), e);
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn load_config(cli: &Cli) -> anyhow::Result<RedirectConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = RedirectConfig::default();
            config.merge_from_file(path)?;
            config
        }
        None => RedirectConfig::load(&cli.root)?,
    };

    if cli.no_index_spelling {
        config.index_spelling = false;
    }
    config.validate()?;

    Ok(config)
}

fn print_rewrite(specifier: &str, rewrite: &Rewrite) {
    let outcome = match rewrite {
        Rewrite::AlreadyEsm => "already esm".dimmed().to_string(),
        Rewrite::NoMatch => "unchanged".dimmed().to_string(),
        Rewrite::Root { target } => target.green().to_string(),
        Rewrite::Plugin {
            target, spelling, ..
        } => format!("{} {}", target.green(), format!("({spelling})").dimmed()),
    };
    println!("{} {} {}", specifier.white().bold(), "->".dimmed(), outcome);
}
