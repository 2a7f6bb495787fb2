// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

mod cli;

use anyhow::Context as _;
use std::path::Path;
use std::process;
use std::sync::Arc;
use clap::Parser;
use clap::CommandFactory;
use rustls::crypto::aws_lc_rs;

use mcsync_common::config::{AppConfig, AppConfigBuilder};
use mcsync_common::state::State;
use mcsync_common::telemetry::{error, info, setup_logging};
use mcsync_controller::controller::{context::Context, utils::{create_k8s_client, start_subscription_cache, wait_for_subscription_cache}};
use mcsync_controller::crd::utils as crd_utils;
use mcsync_controller::document::Document;
use mcsync_controller::drift::{diff, needs_resync, ResyncPolicy};

use crate::cli::{CheckDeletionArgs, CliArgs, Commands, DiffArgs};

const EXIT_FAILURE: i32 = 1;
const EXIT_RESYNC: i32 = 2;
const EXIT_BLOCKED: i32 = 3;

#[tokio::main]
async fn main() {
    // Install the default aws_lc_rs crypto provider
    let _ = aws_lc_rs::default_provider().install_default();

    let args = CliArgs::parse();

    setup_logging();

    let code = match &args.cmd {
        Some(Commands::Crds) => crd_utils::generate_crds()
            .map(|yaml| {
                print!("{}", yaml);
                0
            })
            .map_err(anyhow::Error::from),
        Some(Commands::Diff(diff_args)) => {
            load_config(args.config.as_deref(), diff_args.ignore_additions)
                .and_then(|config| run_diff(diff_args, &config))
        },
        Some(Commands::CheckDeletion(check_args)) => {
            info!(
                event = "Starting",
                version = env!("CARGO_PKG_VERSION"),
            );

            match load_config(args.config.as_deref(), None) {
                Ok(config) => run_check_deletion(check_args, config).await,
                Err(e) => Err(e),
            }
        },
        None => {
            let mut cmd = CliArgs::command();
            let _ = cmd.print_help();
            Ok(EXIT_FAILURE)
        },
    }
    .unwrap_or_else(|e| {
        error!(
            event = "Error",
            error = %e,
        );
        EXIT_FAILURE
    });

    process::exit(code);
}

fn load_config(path: Option<&str>, ignore_additions: Option<bool>) -> anyhow::Result<AppConfig> {
    let mut builder = AppConfigBuilder::default();
    if let Some(path) = path {
        builder.with_file(path);
    }

    builder
        .with_env()
        .with_override_option("controller.ignore_additions", ignore_additions)
        .build()
        .context("failed to load configuration")
}

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let document = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?,
        _ => serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse {} as YAML", path.display()))?,
    };
    Ok(document)
}

fn run_diff(args: &DiffArgs, config: &AppConfig) -> anyhow::Result<i32> {
    let old = read_document(&args.old)?;
    let new = read_document(&args.new)?;
    let policy = ResyncPolicy::from(&config.controller);

    for field in diff(&old, &new, &policy) {
        if field.is_significant(&policy) {
            println!("{}", field);
        } else {
            println!("{} (ignored)", field);
        }
    }

    if needs_resync(&old, &new, &policy) {
        println!("resync required");
        Ok(EXIT_RESYNC)
    } else {
        println!("in sync");
        Ok(0)
    }
}

async fn run_check_deletion(args: &CheckDeletionArgs, config: AppConfig) -> anyhow::Result<i32> {
    let timeout = config.controller.cache_sync_timeout_secs;
    let state = Arc::new(State::new(config));

    let client = create_k8s_client().await?;
    let (subscriptions, watch_handle) = start_subscription_cache(client.clone());
    let synced = wait_for_subscription_cache(&subscriptions, timeout).await;
    if let Err(e) = synced {
        watch_handle.abort();
        return Err(e.into());
    }

    let ctx = Context::new(client, subscriptions).with_state(state);
    let result = ctx.check_deletion_allowed(&args.subscription, &args.cluster);
    watch_handle.abort();

    match result {
        Ok(()) => {
            println!("deletion allowed");
            Ok(0)
        },
        Err(e) if e.is_deletion_blocked() => {
            println!("{}", e);
            Ok(EXIT_BLOCKED)
        },
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
    }

    fn diff_args(old: &str, new: &str) -> DiffArgs {
        DiffArgs {
            old: fixture(old),
            new: fixture(new),
            ignore_additions: None,
        }
    }

    fn config(ignore_additions: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.controller.ignore_additions = ignore_additions;
        config
    }

    #[test]
    fn reads_yaml_and_json_fixtures() {
        let desired = read_document(&fixture("service-desired.yaml")).unwrap();
        let live = read_document(&fixture("service-live.json")).unwrap();
        assert!(desired.get("spec").is_some());
        assert!(live.get("status").is_some());
    }

    #[test]
    fn live_object_with_populated_fields_is_in_sync() {
        let code = run_diff(&diff_args("service-desired.yaml", "service-live.json"), &config(true)).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn counted_additions_require_resync() {
        let code = run_diff(&diff_args("service-desired.yaml", "service-live.json"), &config(false)).unwrap();
        assert_eq!(code, EXIT_RESYNC);
    }

    #[test]
    fn removed_fields_require_resync() {
        let code = run_diff(&diff_args("service-live.json", "service-desired.yaml"), &config(true)).unwrap();
        assert_eq!(code, EXIT_RESYNC);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(run_diff(&diff_args("absent.yaml", "service-live.json"), &config(true)).is_err());
    }
}
