//! Command-line interface for deplink.
//!
//! The binary is a thin front end over [`crate::resolver::LinkResolver`]:
//! it loads a deployment-topology YAML document and a release-metadata
//! YAML document, runs resolution, and prints either the resolved link
//! context or the aggregated failure report.
//!
//! # Usage
//!
//! ```bash
//! # Resolve and print the full rendering context as JSON
//! deplink deployment.yml releases.yml
//!
//! # One summary line per resolved consumer
//! deplink deployment.yml releases.yml --format summary
//!
//! # Address rendering knobs
//! deplink deployment.yml releases.yml --dns-suffix internal --network-preference static-first
//! ```
//!
//! On failure the report is printed verbatim to stderr with an `Error:`
//! prefix and the process exits non-zero. Warnings go to the log
//! (`RUST_LOG=deplink=warn` or `--verbose`), never to the primary output.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use crate::deployment::DeploymentTopology;
use crate::release::ReleaseMetadata;
use crate::renderer::{NetworkPreference, RendererConfig};
use crate::resolver::{LinkResolver, Outcome};

/// Resolve deployment links before any VM is created.
#[derive(Parser)]
#[command(
    name = "deplink",
    about = "Link-resolution engine for cluster deployments",
    version,
    long_about = "Binds named service dependencies (links) declared by release job templates \
                  to concrete providers, validates provider properties, and renders \
                  per-instance address records. A deployment with any unresolved or \
                  ambiguous link is rejected with a complete error report."
)]
pub struct Cli {
    /// Path to the deployment topology YAML document.
    pub deployment: PathBuf,

    /// Path to the release metadata YAML document (a sequence of releases).
    pub releases: PathBuf,

    /// Suffix used when synthesizing DNS names on dynamic networks.
    #[arg(long, default_value = "bosh")]
    pub dns_suffix: String,

    /// Precedence when choosing an instance group's link network.
    #[arg(long, value_enum, default_value = "default-first")]
    pub network_preference: NetworkPreferenceArg,

    /// Output format on success.
    #[arg(long, value_enum, default_value = "json")]
    pub format: Format,

    /// Enable debug logging (equivalent to RUST_LOG=deplink=debug).
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI mirror of [`NetworkPreference`].
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NetworkPreferenceArg {
    /// Prefer the explicitly marked default network.
    DefaultFirst,
    /// Prefer the sole static network.
    StaticFirst,
}

impl From<NetworkPreferenceArg> for NetworkPreference {
    fn from(arg: NetworkPreferenceArg) -> Self {
        match arg {
            NetworkPreferenceArg::DefaultFirst => Self::DefaultFirst,
            NetworkPreferenceArg::StaticFirst => Self::StaticFirst,
        }
    }
}

/// Success output format.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    /// The full rendering context as pretty-printed JSON.
    Json,
    /// One line per resolved consumer.
    Summary,
}

impl Cli {
    /// Load inputs, resolve, and print the outcome.
    pub fn execute(self) -> Result<ExitCode> {
        let topology: DeploymentTopology = load_yaml(&self.deployment)
            .with_context(|| format!("failed to load deployment topology from {}", self.deployment.display()))?;
        let releases: Vec<ReleaseMetadata> = load_yaml(&self.releases)
            .with_context(|| format!("failed to load release metadata from {}", self.releases.display()))?;

        let resolver = LinkResolver::with_config(RendererConfig {
            dns_suffix: self.dns_suffix,
            network_preference: self.network_preference.into(),
        });

        match resolver.resolve(&topology, &releases)? {
            Outcome::Resolved(resolution) => {
                match self.format {
                    Format::Json => {
                        let context = resolution.render_context();
                        println!("{}", serde_json::to_string_pretty(&context)?);
                    }
                    Format::Summary => {
                        for (id, link) in &resolution.links {
                            println!(
                                "{id} -> type '{}', {} instance(s)",
                                link.link_type,
                                link.instances.len()
                            );
                        }
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
            Outcome::Failed(report) => {
                eprintln!("{} {report}", "Error:".red().bold());
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn load_yaml<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("cannot parse {}", path.display()))
}
