//! Consumer collection and provider matching.
//!
//! A job's effective consumers are its release-spec `consumes`
//! declarations with manifest-level overrides layered on top: a `from`
//! redirect (optionally deployment-qualified) and per-consumer property
//! overrides. Manifest entries naming a consumer the spec never declared
//! become warnings, not errors.
//!
//! Matching order per consumer:
//!
//! 1. explicit `from` reference, looked up by exported name (alias or
//!    declared name) with the type required to match,
//! 2. otherwise implicit lookup by type across the whole deployment -
//!    exactly one candidate resolves, zero is an error unless the consumer
//!    is optional, more than one is ambiguous and rejects the deployment.

use serde_json::Value;
use tracing::debug;

use crate::core::{ResolveError, ResolveWarning};
use crate::deployment::{InstanceGroup, JobInstance};
use crate::diagnostics::Diagnostics;
use crate::registry::{ProviderId, ProviderIndex};
use crate::release::JobTemplateSpec;

/// One effective consumer: spec declaration plus manifest overrides.
#[derive(Debug, Clone)]
pub struct LinkConsumer {
    /// Consuming instance group name.
    pub instance_group: String,
    /// Consuming job name.
    pub job: String,
    /// Consumed link name.
    pub link_name: String,
    /// Required link type.
    pub link_type: String,
    /// Optional consumers resolve to nothing instead of erroring when no
    /// provider matches.
    pub optional: bool,
    /// Explicit provider reference from the manifest, when any.
    pub from: Option<String>,
    /// Deployment qualifier of the `from` reference.
    pub deployment_scope: Option<String>,
    /// Per-consumer property overrides merged over the provider bag.
    pub property_overrides: Option<Value>,
}

/// Build the effective consumer list for one job instance.
///
/// Spec order is preserved; manifest `consumes` keys with no matching spec
/// declaration are reported as unknown-consumer warnings.
pub fn collect(
    group: &InstanceGroup,
    job: &JobInstance,
    template: &JobTemplateSpec,
    diagnostics: &Diagnostics,
) -> Vec<LinkConsumer> {
    for name in job.consumes.keys() {
        if template.consumed(name).is_none() {
            diagnostics.warn(ResolveWarning::UnknownConsumer {
                job: job.name.clone(),
                name: name.clone(),
            });
        }
    }

    template
        .consumes
        .iter()
        .map(|spec| {
            let o_ride = job.consumes.get(&spec.name);
            LinkConsumer {
                instance_group: group.name.clone(),
                job: job.name.clone(),
                link_name: spec.name.clone(),
                link_type: spec.link_type.clone(),
                optional: spec.optional,
                from: o_ride.and_then(|o| o.from.clone()),
                deployment_scope: o_ride.and_then(|o| o.deployment.clone()),
                property_overrides: o_ride.and_then(|o| o.properties.clone()),
            }
        })
        .collect()
}

/// Match one consumer against the provider index.
///
/// Returns the matched provider, or `None` when resolution failed (the
/// failure is in the diagnostics) or the consumer is optional with nothing
/// to bind.
pub fn resolve(
    consumer: &LinkConsumer,
    index: &ProviderIndex,
    deployment: &str,
    diagnostics: &Diagnostics,
) -> Option<ProviderId> {
    let unresolved = || ResolveError::UnresolvedConsumer {
        name: consumer.link_name.clone(),
        link_type: consumer.link_type.clone(),
        job: consumer.job.clone(),
        instance_group: consumer.instance_group.clone(),
        deployment: deployment.to_string(),
    };
    let ambiguous = || ResolveError::AmbiguousProvider {
        name: consumer.link_name.clone(),
        link_type: consumer.link_type.clone(),
        job: consumer.job.clone(),
        instance_group: consumer.instance_group.clone(),
        deployment: deployment.to_string(),
    };

    if let Some(from) = &consumer.from {
        let named = index.lookup_by_name(from, consumer.deployment_scope.as_deref());
        let matching: Vec<ProviderId> = named
            .iter()
            .copied()
            .filter(|&id| index.get(id).link_type == consumer.link_type)
            .collect();
        return match matching.as_slice() {
            [id] => {
                debug!(
                    consumer = %consumer.link_name,
                    job = %consumer.job,
                    from = %from,
                    "resolved consumer via explicit reference"
                );
                Some(*id)
            }
            [] => {
                // A bare missing reference on an optional consumer binds
                // nothing; a present-but-wrong-type reference is always a
                // broken explicit intent.
                if named.is_empty() && consumer.optional {
                    None
                } else {
                    diagnostics.error(unresolved());
                    None
                }
            }
            _ => {
                diagnostics.error(ambiguous());
                None
            }
        };
    }

    let candidates = index.lookup_by_type(&consumer.link_type);
    match candidates {
        [id] => {
            debug!(
                consumer = %consumer.link_name,
                job = %consumer.job,
                link_type = %consumer.link_type,
                "resolved consumer via implicit type match"
            );
            Some(*id)
        }
        [] => {
            if !consumer.optional {
                diagnostics.error(unresolved());
            }
            None
        }
        _ => {
            diagnostics.error(ambiguous());
            None
        }
    }
}
