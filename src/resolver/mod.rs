//! The resolution orchestrator.
//!
//! [`LinkResolver`] sequences the pipeline over every instance group and
//! job in the deployment: build the provider registry, collect and match
//! each job's consumers, render address records for every matched
//! provider, and either hand back the full consumer→data mapping or the
//! aggregated [`FailureReport`].
//!
//! The orchestrator guarantees the engine's two outward-facing contracts:
//!
//! - **No partial output.** If any fatal finding was collected anywhere in
//!   the deployment, the entire resolved mapping is discarded and only the
//!   report is returned - the caller must create zero infrastructure.
//! - **Determinism.** The pipeline walks topology order, the resolved map
//!   is ordered by consumer identity, and nothing in the engine consults a
//!   clock, RNG, or unordered structure. Resolving the same snapshot twice
//!   yields byte-identical output, which is what makes recreate-after-
//!   failure flows safe.

pub mod consumers;

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::ResolveWarning;
use crate::deployment::DeploymentTopology;
use crate::diagnostics::{Diagnostics, FailureReport, warning_report};
use crate::properties;
use crate::registry;
use crate::release::{ReleaseMetadata, find_template};
use crate::renderer::{LinkAddress, RendererConfig, render_addresses};

pub use consumers::LinkConsumer;

/// Identity of one resolved consumer: instance group, job, link name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ConsumerId {
    /// Consuming instance group name.
    pub instance_group: String,
    /// Consuming job name.
    pub job: String,
    /// Consumed link name.
    pub link_name: String,
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.instance_group, self.job, self.link_name)
    }
}

/// The data one consumer receives: the provider's property bag and the
/// ordered address records of its backing instance group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLink {
    /// The matched link type.
    #[serde(rename = "type")]
    pub link_type: String,
    /// Resolved provider properties, with any per-consumer overrides
    /// merged on top.
    pub properties: Value,
    /// Per-instance address records in index order.
    pub instances: Vec<LinkAddress>,
}

/// Successful resolution of a whole deployment.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Resolved data per consumer identity, ordered.
    pub links: BTreeMap<ConsumerId, ResolvedLink>,
    /// Non-fatal warnings for the detailed task log.
    pub warnings: Vec<ResolveWarning>,
}

impl Resolution {
    /// The rendering context handed to the job-template renderer: resolved
    /// link data nested by instance group, job, and consumed link name.
    pub fn render_context(&self) -> Value {
        let mut root = serde_json::Map::new();
        for (id, link) in &self.links {
            let group = root
                .entry(id.instance_group.clone())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            let job = group
                .as_object_mut()
                .expect("group node is a mapping")
                .entry(id.job.clone())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            job.as_object_mut()
                .expect("job node is a mapping")
                .insert(id.link_name.clone(), serde_json::to_value(link).expect("link serializes"));
        }
        Value::Object(root)
    }
}

/// Outcome of resolving one deployment.
#[derive(Debug)]
pub enum Outcome {
    /// Every consumer resolved; the mapping is complete.
    Resolved(Resolution),
    /// At least one fatal finding; no mapping is returned.
    Failed(FailureReport),
}

/// The link-resolution engine.
#[derive(Debug, Default)]
pub struct LinkResolver {
    renderer: RendererConfig,
}

impl LinkResolver {
    /// An engine with default rendering configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine with explicit rendering configuration.
    pub fn with_config(renderer: RendererConfig) -> Self {
        Self { renderer }
    }

    /// Resolve all links of a deployment.
    ///
    /// Expected validation failures land in the returned
    /// [`Outcome::Failed`] report; `Err` is reserved for structurally
    /// malformed input (unknown job template, unrenderable network
    /// layout).
    pub fn resolve(
        &self,
        topology: &DeploymentTopology,
        releases: &[ReleaseMetadata],
    ) -> Result<Outcome> {
        let diagnostics = Diagnostics::new();
        let index = registry::build(topology, releases, &diagnostics)?;
        debug!(
            deployment = %topology.name,
            providers = index.len(),
            "provider registry built"
        );

        let mut links: BTreeMap<ConsumerId, ResolvedLink> = BTreeMap::new();
        for group in &topology.instance_groups {
            for job in &group.jobs {
                let (_, template) = find_template(releases, &job.name)
                    .with_context(|| format!("job template '{}' disappeared mid-resolution", job.name))?;
                for consumer in consumers::collect(group, job, template, &diagnostics) {
                    let Some(provider_id) =
                        consumers::resolve(&consumer, &index, &topology.name, &diagnostics)
                    else {
                        continue;
                    };
                    let provider = index.get(provider_id);
                    let owner = &topology.instance_groups[provider.instance_group];
                    let instances = render_addresses(owner, &topology.name, &self.renderer)?;

                    let mut resolved_properties = provider.properties.clone();
                    if let Some(overrides) = &consumer.property_overrides {
                        properties::deep_merge(&mut resolved_properties, overrides);
                    }

                    links.insert(
                        ConsumerId {
                            instance_group: consumer.instance_group,
                            job: consumer.job,
                            link_name: consumer.link_name,
                        },
                        ResolvedLink {
                            link_type: provider.link_type.clone(),
                            properties: resolved_properties,
                            instances,
                        },
                    );
                }
            }
        }

        let (errors, warnings) = diagnostics.into_findings();
        if let Some(report) = warning_report(&warnings) {
            // Task-log surface only; never part of the primary outcome.
            warn!("{report}");
        }

        if errors.is_empty() {
            debug!(deployment = %topology.name, links = links.len(), "all links resolved");
            Ok(Outcome::Resolved(Resolution { links, warnings }))
        } else {
            Ok(Outcome::Failed(FailureReport {
                deployment: topology.name.clone(),
                errors,
                warnings,
            }))
        }
    }
}
