// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use mcsync_controller::controller::types::NamespacedName;

#[derive(Parser, Debug)]
#[
    clap(
        name = "mcsync",
        version,
        author,
        about = "Drift detection and deletion protection for multi-cluster resource sync"
    )
]
pub struct CliArgs {
    /// Configuration file (json, yaml or toml)
    #[clap(long, global = true, env = "MCSYNC_CONFIG")]
    pub config: Option<String>,
    #[clap(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[
        clap(
            name = "crds",
            about = "Generate Custom Resource Definitions (CRDs) for the controller"
        )
    ]
    Crds,
    #[
        clap(
            name = "diff",
            about = "Compare a desired manifest with a live object and report whether it needs a resync"
        )
    ]
    Diff(DiffArgs),
    #[
        clap(
            name = "check-deletion",
            about = "Check whether a generated resource may be deleted from a cluster",
        )
    ]
    CheckDeletion(CheckDeletionArgs),
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Desired manifest
    #[clap(long)]
    pub old: PathBuf,
    /// Live object
    #[clap(long)]
    pub new: PathBuf,
    /// Ignore fields only present in the live object
    #[clap(long, num_args = 0..=1, default_missing_value = "true")]
    pub ignore_additions: Option<bool>,
}

#[derive(Args, Debug)]
pub struct CheckDeletionArgs {
    /// Owning subscription as namespace/name
    #[clap(long)]
    pub subscription: NamespacedName,
    /// Managed cluster as namespace/name
    #[clap(long)]
    pub cluster: NamespacedName,
}
