//! Release job template metadata input model.
//!
//! A release ships job templates; each template's spec declares the links
//! it provides and consumes, with types, property whitelists, and nested
//! default values. This metadata is immutable per release version and is
//! supplied by the release-package repository collaborator.
//!
//! # Metadata Format
//!
//! ```yaml
//! - name: bosh-release
//!   jobs:
//!     - name: database
//!       provides:
//!         - name: db
//!           type: db
//!           properties: [a, b, c, nested.one, nested.two, nested.three]
//!           defaults:
//!             a: default_a
//!             c: default_c
//!             nested:
//!               one: default_nested.one
//!               two: default_nested.two
//!       consumes:
//!         - name: backup_db
//!           type: db
//!           optional: true
//! ```

use serde::{Deserialize, Serialize};

/// Metadata for one uploaded release: its name and job template specs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    /// Release name, used in definition-conflict error messages.
    pub name: String,
    /// Job template specs in release order.
    #[serde(default)]
    pub jobs: Vec<JobTemplateSpec>,
}

/// Declared link surface of one release job template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTemplateSpec {
    /// Job template name.
    pub name: String,
    /// Links this template provides.
    #[serde(default)]
    pub provides: Vec<ProvidedLinkSpec>,
    /// Links this template consumes.
    #[serde(default)]
    pub consumes: Vec<ConsumedLinkSpec>,
}

impl JobTemplateSpec {
    /// Declared provider spec by link name.
    pub fn provided(&self, name: &str) -> Option<&ProvidedLinkSpec> {
        self.provides.iter().find(|p| p.name == name)
    }

    /// Declared consumer spec by link name.
    pub fn consumed(&self, name: &str) -> Option<&ConsumedLinkSpec> {
        self.consumes.iter().find(|c| c.name == name)
    }
}

/// One provided link declared in a job template spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidedLinkSpec {
    /// Link name.
    pub name: String,
    /// Link type, matched against consumer declarations.
    #[serde(rename = "type")]
    pub link_type: String,
    /// Dotted-path whitelist of properties this provider may expose.
    #[serde(default)]
    pub properties: Vec<String>,
    /// Nested default values for whitelisted properties. `Null` when the
    /// spec declares none.
    #[serde(default)]
    pub defaults: serde_json::Value,
}

/// One consumed link declared in a job template spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumedLinkSpec {
    /// Link name.
    pub name: String,
    /// Required link type.
    #[serde(rename = "type")]
    pub link_type: String,
    /// Optional consumers resolve to nothing, not an error, when no
    /// provider matches.
    #[serde(default)]
    pub optional: bool,
}

/// Find a job template by name across all releases.
///
/// Releases are searched in input order so a template name defined in two
/// releases resolves deterministically to the first. Returns the owning
/// release together with the spec, since conflict messages name the
/// release.
pub fn find_template<'a>(
    releases: &'a [ReleaseMetadata],
    job_name: &str,
) -> Option<(&'a ReleaseMetadata, &'a JobTemplateSpec)> {
    releases.iter().find_map(|release| {
        release.jobs.iter().find(|job| job.name == job_name).map(|job| (release, job))
    })
}
