//! Per-instance address record rendering.
//!
//! A resolved provider exposes, besides its property bag, the ordered list
//! of address records of its owning instance group - one record per
//! deployed instance, in index order. Consuming templates project these
//! records into whatever shape their property mapping asks for (a detailed
//! record with `id` and `address`, a summary record with `az`); the
//! renderer always emits the full record.
//!
//! Address computation per instance:
//!
//! - the group's *link network* is selected first (see
//!   [`NetworkPreference`]),
//! - on a static network the address is the instance's assigned static IP,
//! - on a dynamic network it is the synthesized DNS name
//!   `<instance-id>.<group-name>.<network-name>.<deployment-name>.<dns-suffix>`.
//!
//! Rendering is a pure function of the topology. Replacing an instance in
//! the same index slot changes only that record's `id` and (on dynamic
//! networks) `address`; order and count are untouched.

use anyhow::{Result, bail};
use serde::Serialize;

use crate::deployment::{InstanceGroup, Network, NetworkKind};

/// Which network an instance group's link addresses are rendered from.
///
/// The observed orchestrator behavior does not pin a single precedence
/// between "explicitly marked default network" and "sole static network",
/// so the order is configurable rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkPreference {
    /// Prefer a network explicitly marked `default`; fall back to the sole
    /// static network when none is marked.
    #[default]
    DefaultFirst,
    /// Prefer the sole static network; fall back to an explicitly marked
    /// default network.
    StaticFirst,
}

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Suffix of synthesized DNS names.
    pub dns_suffix: String,
    /// Link network selection precedence.
    pub network_preference: NetworkPreference,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            dns_suffix: "bosh".to_string(),
            network_preference: NetworkPreference::default(),
        }
    }
}

/// One rendered address record.
///
/// `id` and `az` are optional projections: downstream template mappings
/// may drop either, so absent values are omitted from serialized output
/// rather than emitted as nulls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkAddress {
    /// Instance identifier from the lifecycle manager.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owning instance group name.
    pub name: String,
    /// Stable instance index.
    pub index: u32,
    /// AZ the instance is placed in, when AZ-placed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub az: Option<String>,
    /// Static IP or synthesized DNS name.
    pub address: String,
}

/// Select the instance group's link network under the given preference.
///
/// Fails hard when the choice is genuinely ambiguous - multiple networks
/// with neither a `default` marker nor a unique static network - since
/// that is a malformed topology, not a resolution finding.
pub fn link_network<'a>(
    group: &'a InstanceGroup,
    preference: NetworkPreference,
) -> Result<&'a Network> {
    if group.networks.is_empty() {
        bail!("instance group '{}' has no networks", group.name);
    }
    if group.networks.len() == 1 {
        return Ok(&group.networks[0]);
    }

    let marked_default = group.networks.iter().find(|n| n.default);
    let statics: Vec<&Network> =
        group.networks.iter().filter(|n| n.kind == NetworkKind::Static).collect();
    let sole_static = (statics.len() == 1).then(|| statics[0]);

    let selected = match preference {
        NetworkPreference::DefaultFirst => marked_default.or(sole_static),
        NetworkPreference::StaticFirst => sole_static.or(marked_default),
    };
    selected.ok_or_else(|| {
        anyhow::anyhow!(
            "cannot choose a link network for instance group '{}': no default marker and no unique static network",
            group.name
        )
    })
}

/// Render the ordered address list for a provider's owning instance group.
pub fn render_addresses(
    group: &InstanceGroup,
    deployment: &str,
    config: &RendererConfig,
) -> Result<Vec<LinkAddress>> {
    let network = link_network(group, config.network_preference)?;
    let mut records = Vec::with_capacity(group.instances.len());
    for instance in &group.instances {
        let address = match network.kind {
            NetworkKind::Static => match instance.static_ips.get(&network.name) {
                Some(ip) => ip.clone(),
                None => bail!(
                    "instance '{}' of group '{}' has no static IP on network '{}'",
                    instance.id,
                    group.name,
                    network.name
                ),
            },
            NetworkKind::Dynamic => format!(
                "{}.{}.{}.{}.{}",
                instance.id, group.name, network.name, deployment, config.dns_suffix
            ),
        };
        records.push(LinkAddress {
            id: Some(instance.id.clone()),
            name: group.name.clone(),
            index: instance.index,
            az: instance.az.clone(),
            address,
        });
    }
    Ok(records)
}
