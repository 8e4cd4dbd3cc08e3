//! Provider registration and indexed lookup.
//!
//! The registry is built in two passes over the full deployment before any
//! consumer is looked at, so a provider declared later in manifest order is
//! still visible to an earlier consumer:
//!
//! - **Pass 1** registers one [`LinkProvider`] per release-spec provided
//!   link (implicit providers) and one per manifest
//!   `custom_provider_definitions` entry (explicit providers), resolving
//!   each provider's property bag as it goes. Duplicate definitions within
//!   a job are conflicts, not overrides, and are collected as fatal
//!   findings.
//! - **Pass 2** applies manifest `provides` overrides: alias assignment and
//!   property overrides, matched by link name. An override naming a link
//!   the release spec never declared is a warning, not an error.
//!
//! Providers live in an arena ([`ProviderIndex::get`] by [`ProviderId`]);
//! the name and type indexes hold arena ids, and a provider's owning
//! instance group is an index into the topology's instance-group list,
//! never an owning back-reference.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::core::{ResolveError, ResolveWarning};
use crate::deployment::DeploymentTopology;
use crate::diagnostics::Diagnostics;
use crate::properties;
use crate::release::{ReleaseMetadata, find_template};

/// Arena id of a registered provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProviderId(pub usize);

/// One provider the deployment offers.
///
/// Identity is `(instance group, job, link name)`; the exported name - the
/// alias when one is set, the declared link name otherwise - is what
/// consumers reference via `from`.
#[derive(Debug, Clone)]
pub struct LinkProvider {
    /// Index of the owning instance group in the topology.
    pub instance_group: usize,
    /// Declaring job template name.
    pub job: String,
    /// Declared link name.
    pub link_name: String,
    /// Link type, matched against consumer declarations.
    pub link_type: String,
    /// Alias assigned by a manifest `provides` override, when any.
    pub alias: Option<String>,
    /// Dotted-path property whitelist from the declaring spec.
    pub whitelist: Vec<String>,
    /// Resolved property bag (defaults merged with manifest values).
    pub properties: Value,
}

impl LinkProvider {
    /// The name this provider is referenced by: alias if set, declared
    /// link name otherwise. An aliased provider is *not* reachable via its
    /// bare declared name.
    pub fn exported_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.link_name)
    }
}

/// The full provider set of one deployment, indexed by exported name and
/// by type.
///
/// Index values keep registration order (topology order), so every lookup
/// is deterministic.
#[derive(Debug, Default)]
pub struct ProviderIndex {
    deployment: String,
    providers: Vec<LinkProvider>,
    by_name: BTreeMap<String, Vec<ProviderId>>,
    by_type: BTreeMap<String, Vec<ProviderId>>,
}

impl ProviderIndex {
    /// Providers exported under `name`, scoped to a deployment.
    ///
    /// The registry holds only the current deployment; a reference
    /// qualified with a foreign deployment name yields no candidates.
    pub fn lookup_by_name(&self, name: &str, deployment: Option<&str>) -> &[ProviderId] {
        if let Some(scope) = deployment
            && scope != self.deployment
        {
            return &[];
        }
        self.by_name.get(name).map_or(&[], Vec::as_slice)
    }

    /// All providers of the given type, in registration order.
    pub fn lookup_by_type(&self, link_type: &str) -> &[ProviderId] {
        self.by_type.get(link_type).map_or(&[], Vec::as_slice)
    }

    /// Fetch a provider from the arena.
    pub fn get(&self, id: ProviderId) -> &LinkProvider {
        &self.providers[id.0]
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the deployment offers no providers at all.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn push(&mut self, provider: LinkProvider) -> ProviderId {
        let id = ProviderId(self.providers.len());
        self.providers.push(provider);
        id
    }

    fn rebuild_indexes(&mut self) {
        self.by_name.clear();
        self.by_type.clear();
        for (i, provider) in self.providers.iter().enumerate() {
            let id = ProviderId(i);
            self.by_name.entry(provider.exported_name().to_string()).or_default().push(id);
            self.by_type.entry(provider.link_type.clone()).or_default().push(id);
        }
    }
}

/// Build the provider registry for a deployment.
///
/// Definition conflicts and whitelist violations are collected into
/// `diagnostics`; only structural problems (a job naming a template no
/// release defines) fail hard.
pub fn build(
    topology: &DeploymentTopology,
    releases: &[ReleaseMetadata],
    diagnostics: &Diagnostics,
) -> Result<ProviderIndex> {
    let mut index = ProviderIndex {
        deployment: topology.name.clone(),
        ..ProviderIndex::default()
    };

    // Pass 1: register implicit and custom providers, resolving properties.
    for (group_idx, group) in topology.instance_groups.iter().enumerate() {
        for job in &group.jobs {
            let (release, template) = find_template(releases, &job.name).with_context(|| {
                format!(
                    "job template '{}' in instance group '{}' is not defined by any release",
                    job.name, group.name
                )
            })?;

            // Custom definitions that survive conflict detection.
            let mut seen_custom: BTreeSet<&str> = BTreeSet::new();
            let mut valid_custom = Vec::new();
            for definition in &job.custom_provider_definitions {
                if template.provided(&definition.name).is_some() {
                    diagnostics.error(ResolveError::CustomProviderInRelease {
                        name: definition.name.clone(),
                        job: job.name.clone(),
                        instance_group: group.name.clone(),
                        release: release.name.clone(),
                    });
                    continue;
                }
                if !seen_custom.insert(definition.name.as_str()) {
                    diagnostics.error(ResolveError::DuplicateCustomProvider {
                        name: definition.name.clone(),
                        job: job.name.clone(),
                        instance_group: group.name.clone(),
                    });
                    continue;
                }
                valid_custom.push(definition);
            }

            // One whitelist check per job, against the union of its
            // providers' whitelists, so each rogue property reports once.
            let whitelists: Vec<&[String]> = template
                .provides
                .iter()
                .map(|spec| spec.properties.as_slice())
                .chain(valid_custom.iter().map(|def| def.properties.as_slice()))
                .collect();
            properties::check_supplied(&job.properties, &whitelists, &job.name, diagnostics);

            for spec in &template.provides {
                let bag = properties::resolve(&spec.properties, &spec.defaults, &job.properties);
                debug!(
                    group = %group.name,
                    job = %job.name,
                    link = %spec.name,
                    link_type = %spec.link_type,
                    "registered implicit provider"
                );
                index.push(LinkProvider {
                    instance_group: group_idx,
                    job: job.name.clone(),
                    link_name: spec.name.clone(),
                    link_type: spec.link_type.clone(),
                    alias: None,
                    whitelist: spec.properties.clone(),
                    properties: bag,
                });
            }

            for definition in valid_custom {
                let bag = properties::resolve(
                    &definition.properties,
                    &Value::Null,
                    &job.properties,
                );
                debug!(
                    group = %group.name,
                    job = %job.name,
                    link = %definition.name,
                    link_type = %definition.link_type,
                    "registered custom provider"
                );
                index.push(LinkProvider {
                    instance_group: group_idx,
                    job: job.name.clone(),
                    link_name: definition.name.clone(),
                    link_type: definition.link_type.clone(),
                    alias: None,
                    whitelist: definition.properties.clone(),
                    properties: bag,
                });
            }
        }
    }

    // Pass 2: manifest `provides` overrides - aliases and property
    // overrides, matched by (group, job, link name).
    for (group_idx, group) in topology.instance_groups.iter().enumerate() {
        for job in &group.jobs {
            for (link_name, o_ride) in &job.provides {
                let slot = index.providers.iter().position(|p| {
                    p.instance_group == group_idx && p.job == job.name && p.link_name == *link_name
                });
                let Some(slot) = slot else {
                    diagnostics.warn(ResolveWarning::UnknownProvider {
                        job: job.name.clone(),
                        name: link_name.clone(),
                    });
                    continue;
                };
                let provider = &mut index.providers[slot];
                if let Some(alias) = &o_ride.alias {
                    debug!(
                        group = %group.name,
                        job = %job.name,
                        link = %link_name,
                        alias = %alias,
                        "aliased provider"
                    );
                    provider.alias = Some(alias.clone());
                }
                if let Some(overrides) = &o_ride.properties {
                    let whitelist = provider.whitelist.clone();
                    properties::apply_overrides(
                        &mut provider.properties,
                        overrides,
                        &whitelist,
                        &job.name,
                        diagnostics,
                    );
                }
            }
        }
    }

    index.rebuild_indexes();
    Ok(index)
}
