//! deplink - deployment link resolution
//!
//! The link-resolution engine of a cluster-deployment orchestrator. Release
//! job templates declare that they *provide* named, typed capabilities (a
//! database's connection info, say) and/or *consume* capabilities provided
//! elsewhere in the same deployment. Before any VM is created, this engine
//! matches every consumer to exactly one provider, merges and validates the
//! properties each provider exposes, renders per-instance address records,
//! and rejects the whole deployment with an aggregated error report when any
//! consumer cannot be unambiguously resolved.
//!
//! # Architecture Overview
//!
//! Resolution is a **build-then-query pipeline** over an immutable snapshot
//! of the deployment topology and release metadata:
//!
//! 1. **Registry construction** ([`registry`]) - every provider the
//!    deployment can offer is registered first: implicit providers from
//!    release job specs, ad-hoc custom definitions from the manifest, then
//!    manifest `provides` overrides (aliases, property overrides). Duplicate
//!    definitions are conflicts, not overrides.
//! 2. **Property resolution** ([`properties`]) - each provider's declared
//!    defaults are recursively merged with manifest-supplied values, gated
//!    by the provider's dotted-path whitelist.
//! 3. **Consumer resolution** ([`resolver`]) - each consumer is matched by
//!    explicit `from` reference, alias, or type-based implicit lookup, with
//!    strict disambiguation rules.
//! 4. **Address rendering** ([`renderer`]) - a resolved provider's backing
//!    instance group becomes an ordered list of per-instance address
//!    records (static IP or synthesized DNS name).
//!
//! All validation findings flow into a single [`diagnostics`] collector
//! rather than failing fast, so one run reports every problem in the
//! deployment at once. A deployment with at least one fatal finding is
//! rejected before any infrastructure is touched.
//!
//! # Determinism
//!
//! The engine performs no I/O, generates no identifiers, and reads no
//! clock. All internal maps are ordered, so identical inputs yield
//! byte-identical resolved output on every invocation - a hard requirement
//! for recreating a failed instance without re-running the deployment.
//!
//! # Core Modules
//!
//! - [`core`] - error and warning types shared by every stage
//! - [`deployment`] - deployment topology input model (instance groups,
//!   networks, job instances, manifest overrides)
//! - [`release`] - release job template metadata input model
//! - [`registry`] - provider registration, conflict detection, and indexed
//!   lookup by name and by type
//! - [`properties`] - recursive default/override merge with whitelist
//!   enforcement
//! - [`renderer`] - per-instance address record rendering
//! - [`diagnostics`] - thread-safe error/warning aggregation and report
//!   formatting
//! - [`resolver`] - the orchestrator tying the stages together
//! - [`cli`] - the `deplink` command-line front end
//!
//! # Example
//!
//! ```rust,no_run
//! use deplink::deployment::DeploymentTopology;
//! use deplink::release::ReleaseMetadata;
//! use deplink::resolver::{LinkResolver, Outcome};
//!
//! # fn example() -> anyhow::Result<()> {
//! let topology: DeploymentTopology =
//!     serde_yaml::from_str(&std::fs::read_to_string("deployment.yml")?)?;
//! let releases: Vec<ReleaseMetadata> =
//!     serde_yaml::from_str(&std::fs::read_to_string("releases.yml")?)?;
//!
//! match LinkResolver::new().resolve(&topology, &releases)? {
//!     Outcome::Resolved(resolution) => {
//!         println!("{}", serde_json::to_string_pretty(&resolution.render_context())?);
//!     }
//!     Outcome::Failed(report) => {
//!         eprintln!("{report}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod deployment;
pub mod diagnostics;
pub mod properties;
pub mod registry;
pub mod release;
pub mod renderer;
pub mod resolver;
