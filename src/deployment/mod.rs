//! Deployment topology input model.
//!
//! These types describe the already-loaded, immutable snapshot of a
//! deployment that the engine resolves links over: instance groups, their
//! networks and deployed instances, and the job instances each group runs
//! with their manifest-level link overrides. The manifest/config loader is
//! an external collaborator - by the time a [`DeploymentTopology`] reaches
//! this crate it is structurally valid YAML; the engine validates link
//! *semantics*, not document shape.
//!
//! # Topology Format
//!
//! ```yaml
//! name: simple
//! instance_groups:
//!   - name: mysql
//!     azs: [z1]
//!     networks:
//!       - name: default
//!         type: static
//!       - name: dynamic-network
//!         type: dynamic
//!         default: true
//!     instances:
//!       - id: 3f1a9c2e
//!         index: 0
//!         az: z1
//!         static_ips:
//!           default: 192.168.1.10
//!     jobs:
//!       - name: database
//!         properties:
//!           test: test value
//!         provides:
//!           db:
//!             as: main_db
//! ```
//!
//! All collections preserve manifest order; maps are [`BTreeMap`] so every
//! traversal of the topology is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An immutable snapshot of one deployment: its name and instance groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentTopology {
    /// Deployment name, used in DNS names and error messages.
    pub name: String,
    /// Instance groups in manifest order.
    #[serde(default)]
    pub instance_groups: Vec<InstanceGroup>,
}

impl DeploymentTopology {
    /// Look up an instance group by name.
    pub fn instance_group(&self, name: &str) -> Option<&InstanceGroup> {
        self.instance_groups.iter().find(|ig| ig.name == name)
    }
}

/// A named set of identically-configured deployed instances running one or
/// more job templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceGroup {
    /// Instance group name. Doubles as the `name` field of rendered
    /// address records and as the job segment of dynamic DNS names.
    pub name: String,
    /// Availability zones this group is placed in.
    #[serde(default)]
    pub azs: Vec<String>,
    /// Networks attached to this group, in manifest order.
    #[serde(default)]
    pub networks: Vec<Network>,
    /// Deployed instances in index order. Index order is stable across
    /// re-renders; recreating an instance replaces the entry at its slot.
    #[serde(default)]
    pub instances: Vec<Instance>,
    /// Job templates this group runs, in manifest order.
    #[serde(default)]
    pub jobs: Vec<JobInstance>,
}

/// A network attached to an instance group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    /// Network name, used in dynamic DNS names.
    pub name: String,
    /// Static or dynamic addressing.
    #[serde(rename = "type")]
    pub kind: NetworkKind,
    /// Explicitly marked as the group's default link network.
    #[serde(default)]
    pub default: bool,
    /// AZ the network's subnet is pinned to, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub az: Option<String>,
}

/// Addressing mode of a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    /// Instances hold assigned static IPs on this network.
    Static,
    /// Instances are addressed by synthesized DNS names.
    Dynamic,
}

/// One deployed instance of an instance group.
///
/// The `id` is assigned by the upstream lifecycle manager; the engine never
/// generates identifiers. When an instance is recreated, a new entry with
/// the same `index` but a fresh `id` takes its slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Opaque instance identifier from the lifecycle manager.
    pub id: String,
    /// Stable index within the group.
    pub index: u32,
    /// AZ this instance is placed in, when AZ-placed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub az: Option<String>,
    /// Assigned static IP per network name, for static networks only.
    #[serde(default)]
    pub static_ips: BTreeMap<String, String>,
}

/// A job template instance within an instance group, together with its
/// manifest-level link configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInstance {
    /// Release job template name.
    pub name: String,
    /// Manifest-level properties for this job (nested mapping, may be
    /// partial). `Null` when the manifest supplies none.
    #[serde(default)]
    pub properties: serde_json::Value,
    /// Manifest `consumes` overrides keyed by consumer link name.
    #[serde(default)]
    pub consumes: BTreeMap<String, ConsumesOverride>,
    /// Manifest `provides` overrides keyed by provider link name.
    #[serde(default)]
    pub provides: BTreeMap<String, ProvidesOverride>,
    /// Ad-hoc providers declared directly in the manifest rather than in
    /// the release spec.
    #[serde(default)]
    pub custom_provider_definitions: Vec<CustomProviderDefinition>,
}

/// Manifest override for one consumed link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsumesOverride {
    /// Redirect this consumer to a provider name or alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Deployment scope of the `from` reference. Providers of other
    /// deployments are outside this engine's registry, so a foreign scope
    /// resolves to zero candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    /// Per-consumer property overrides merged over the resolved provider
    /// property bag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

/// Manifest override for one provided link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidesOverride {
    /// Alias to expose this provider under. An aliased provider is
    /// referenced by the alias only, never by its declared name.
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Property overrides applied on top of the resolved property bag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

/// An ad-hoc provider declared in the manifest.
///
/// Custom definitions participate in resolution exactly like release-spec
/// providers: they are indexed by name and type and carry their own
/// property whitelist. A custom definition whose name collides with a
/// release-spec provider of the same job, or with another custom
/// definition, is a fatal conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomProviderDefinition {
    /// Link name to expose.
    pub name: String,
    /// Link type.
    #[serde(rename = "type")]
    pub link_type: String,
    /// Dotted-path property whitelist.
    #[serde(default)]
    pub properties: Vec<String>,
}
