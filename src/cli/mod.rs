// src/cli/mod.rs
//! CLI definitions for pkgdeps
//!
//! The command implementations live in the `commands` module.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pkgdeps")]
#[command(version)]
#[command(about = "Discover package dependency graphs from index manifests", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk the dependency graph of a package and list what must be installed
    Resolve {
        /// Package name
        package: String,

        /// Version or version range (defaults to any version)
        #[arg(short, long)]
        version: Option<String>,

        /// Target framework (overrides the configuration)
        #[arg(short, long)]
        framework: Option<String>,

        /// Extra baseline packages as NAME=VERSION
        #[arg(short, long = "baseline", value_name = "NAME=VERSION")]
        baseline: Vec<String>,

        /// Roll back the pass if any package requires license acceptance
        #[arg(long)]
        decline_licenses: bool,
    },

    /// Show the dependency groups and license data of one manifest
    Inspect {
        /// Package name
        package: String,

        /// Exact package version
        version: String,
    },
}
