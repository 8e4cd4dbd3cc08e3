//! Error and warning types for link resolution.
//!
//! The error system distinguishes two severities:
//!
//! - [`ResolveError`] - fatal findings. One or more of these anywhere in the
//!   deployment rejects the whole deployment before any VM is created. They
//!   are collected, never raised, so a single run reports every problem.
//! - [`ResolveWarning`] - non-fatal notices about manifest entries that
//!   reference link names the release spec never declared. These surface in
//!   the detailed task log only and never affect the outcome.
//!
//! Every variant's display string is the exact text that appears as a
//! bullet in the final failure report, so the variants carry all naming
//! context (job, instance group, deployment) themselves.

use serde::Serialize;
use thiserror::Error;

/// A fatal link-resolution finding.
///
/// Variants map one-to-one onto the error taxonomy of the engine:
/// definition conflicts detected during registry construction, property
/// whitelist violations, and consumer matching failures. The
/// `UnresolvedConsumer` and `AmbiguousProvider` variants share a display
/// template deliberately - the operator-facing message is the same, only
/// the classification differs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A manifest custom provider definition collides with a provider the
    /// release spec already declares for the same job.
    #[error(
        "Custom provider '{name}' in job '{job}' in instance group '{instance_group}' is already defined in release '{release}'"
    )]
    CustomProviderInRelease {
        /// The colliding link name.
        name: String,
        /// Job declaring the custom provider.
        job: String,
        /// Instance group containing the job.
        instance_group: String,
        /// Release that already declares the provider.
        release: String,
    },

    /// Two custom provider definitions in the same job share a name.
    #[error(
        "Custom provider '{name}' in job '{job}' in instance group '{instance_group}' is defined multiple times in manifest."
    )]
    DuplicateCustomProvider {
        /// The duplicated link name.
        name: String,
        /// Job declaring the duplicates.
        job: String,
        /// Instance group containing the job.
        instance_group: String,
    },

    /// A supplied property path is not in the provider's declared whitelist.
    #[error("Link property {property} in template {job} is not defined in release spec")]
    UndeclaredProperty {
        /// Dotted path of the offending property.
        property: String,
        /// Job template the property was supplied for.
        job: String,
    },

    /// No provider satisfies a non-optional consumer, or an explicit `from`
    /// reference exists but its type does not match the consumer's.
    #[error(
        "Can't resolve link '{name}' with type '{link_type}' for job '{job}' in instance group '{instance_group}' in deployment '{deployment}'"
    )]
    UnresolvedConsumer {
        /// The consumed link name.
        name: String,
        /// The consumer's declared link type.
        link_type: String,
        /// Consuming job.
        job: String,
        /// Instance group containing the consuming job.
        instance_group: String,
        /// Deployment name.
        deployment: String,
    },

    /// More than one provider candidate matches and nothing disambiguates.
    #[error(
        "Can't resolve link '{name}' with type '{link_type}' for job '{job}' in instance group '{instance_group}' in deployment '{deployment}'"
    )]
    AmbiguousProvider {
        /// The consumed link name.
        name: String,
        /// The consumer's declared link type.
        link_type: String,
        /// Consuming job.
        job: String,
        /// Instance group containing the consuming job.
        instance_group: String,
        /// Deployment name.
        deployment: String,
    },
}

impl ResolveError {
    /// Classification of this error for reporting and filtering.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CustomProviderInRelease { .. } | Self::DuplicateCustomProvider { .. } => {
                ErrorKind::DefinitionConflict
            }
            Self::UndeclaredProperty { .. } => ErrorKind::UndeclaredProperty,
            Self::UnresolvedConsumer { .. } => ErrorKind::UnresolvedConsumer,
            Self::AmbiguousProvider { .. } => ErrorKind::AmbiguousProvider,
        }
    }
}

/// Error taxonomy for [`ResolveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Duplicate custom provider definitions or custom-vs-release collisions.
    DefinitionConflict,
    /// Zero matching providers for a non-optional consumer, or a `from`
    /// reference with a type mismatch.
    UnresolvedConsumer,
    /// More than one implicit candidate with no disambiguating reference.
    AmbiguousProvider,
    /// A supplied property path outside the provider's whitelist.
    UndeclaredProperty,
}

/// A non-fatal notice about a manifest reference the release spec never
/// declared.
///
/// Warnings are grouped into the `Manifest defines unknown consumers:` /
/// `Manifest defines unknown providers:` blocks of the detailed task log by
/// [`crate::diagnostics::warning_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// A manifest `consumes` entry names a consumer the job's release spec
    /// does not declare.
    UnknownConsumer {
        /// Job the manifest entry is attached to.
        job: String,
        /// The undeclared consumer link name.
        name: String,
    },
    /// A manifest `provides` entry names a provider the job's release spec
    /// does not declare.
    UnknownProvider {
        /// Job the manifest entry is attached to.
        job: String,
        /// The undeclared provider link name.
        name: String,
    },
}

impl ResolveWarning {
    /// The single-bullet form of this warning, as it appears under the
    /// grouped header in the task log.
    pub fn bullet(&self) -> String {
        match self {
            Self::UnknownConsumer { job, name } => {
                format!("  - Job '{job}' does not define link consumer '{name}' in the release spec")
            }
            Self::UnknownProvider { job, name } => {
                format!("  - Job '{job}' does not define link provider '{name}' in the release spec")
            }
        }
    }
}
