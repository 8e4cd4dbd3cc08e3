//! Aggregated error and warning collection.
//!
//! Every stage of resolution *returns* its findings into a shared
//! [`Diagnostics`] collector instead of failing fast, so one run reports
//! every problem in the deployment. The collector is append-only behind a
//! mutex: stages only ever push, and the accumulated findings are drained
//! exactly once by the orchestrator when resolution completes.
//!
//! Fatal errors become a [`FailureReport`] whose `Display` output is the
//! exact operator-facing report:
//!
//! ```text
//! Failed to resolve links from deployment 'simple'. See errors below:
//!   - Can't resolve link 'db' with type 'db' for job 'api_server' in instance group 'my_api' in deployment 'simple'
//! ```
//!
//! Warnings never affect the outcome; they are grouped into task-log
//! blocks by [`warning_report`].

use std::fmt;
use std::sync::Mutex;

use crate::core::{ResolveError, ResolveWarning};

/// Thread-safe append-only collector for resolution findings.
///
/// Stages push through `&self`, so independent instance groups can be
/// resolved concurrently without any shared mutable state beyond this
/// collector. Insertion order of errors from concurrent branches is not
/// semantically significant, but findings pushed by one branch stay
/// contiguous.
#[derive(Debug, Default)]
pub struct Diagnostics {
    inner: Mutex<Findings>,
}

#[derive(Debug, Default)]
struct Findings {
    errors: Vec<ResolveError>,
    warnings: Vec<ResolveWarning>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fatal finding.
    pub fn error(&self, error: ResolveError) {
        tracing::debug!(kind = ?error.kind(), %error, "collected resolution error");
        self.inner.lock().expect("diagnostics lock poisoned").errors.push(error);
    }

    /// Record a non-fatal warning.
    pub fn warn(&self, warning: ResolveWarning) {
        tracing::debug!(?warning, "collected resolution warning");
        self.inner.lock().expect("diagnostics lock poisoned").warnings.push(warning);
    }

    /// Whether any fatal finding has been recorded so far.
    pub fn has_errors(&self) -> bool {
        !self.inner.lock().expect("diagnostics lock poisoned").errors.is_empty()
    }

    /// Drain the collector into its accumulated errors and warnings.
    ///
    /// Exact duplicate errors are dropped, keeping the first occurrence in
    /// collection order, so a property flagged once per affected provider
    /// still reports as a single bullet.
    pub fn into_findings(self) -> (Vec<ResolveError>, Vec<ResolveWarning>) {
        let findings = self.inner.into_inner().expect("diagnostics lock poisoned");
        let mut errors: Vec<ResolveError> = Vec::with_capacity(findings.errors.len());
        for error in findings.errors {
            if !errors.contains(&error) {
                errors.push(error);
            }
        }
        (errors, findings.warnings)
    }
}

/// The aggregated fatal report for a rejected deployment.
///
/// Produced by the orchestrator when at least one [`ResolveError`] was
/// collected. No partial resolved mapping accompanies it - a deployment
/// with any fatal finding yields zero infrastructure side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// Deployment the report is about.
    pub deployment: String,
    /// All collected fatal findings, deduplicated, in collection order.
    pub errors: Vec<ResolveError>,
    /// Warnings accumulated alongside the errors, for the task log.
    pub warnings: Vec<ResolveWarning>,
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to resolve links from deployment '{}'. See errors below:",
            self.deployment
        )?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FailureReport {}

/// Render accumulated warnings as grouped task-log blocks.
///
/// Unknown consumers and unknown providers each get their own header;
/// bullets keep collection order. Returns `None` when there is nothing to
/// report.
pub fn warning_report(warnings: &[ResolveWarning]) -> Option<String> {
    let consumers: Vec<&ResolveWarning> =
        warnings.iter().filter(|w| matches!(w, ResolveWarning::UnknownConsumer { .. })).collect();
    let providers: Vec<&ResolveWarning> =
        warnings.iter().filter(|w| matches!(w, ResolveWarning::UnknownProvider { .. })).collect();

    let mut blocks = Vec::new();
    if !consumers.is_empty() {
        let bullets: Vec<String> = consumers.iter().map(|w| w.bullet()).collect();
        blocks.push(format!("Manifest defines unknown consumers:\n{}", bullets.join("\n")));
    }
    if !providers.is_empty() {
        let bullets: Vec<String> = providers.iter().map(|w| w.bullet()).collect();
        blocks.push(format!("Manifest defines unknown providers:\n{}", bullets.join("\n")));
    }

    if blocks.is_empty() { None } else { Some(blocks.join("\n")) }
}
