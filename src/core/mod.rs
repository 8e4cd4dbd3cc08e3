//! Core types shared across the resolution pipeline.
//!
//! This module re-exports the error and warning vocabulary used by every
//! stage of link resolution. Expected validation failures are *returned* as
//! [`ResolveError`] values and aggregated by the diagnostics collector;
//! only structurally malformed input (a job referencing a template no
//! release defines, an instance group with no usable link network) takes
//! the hard [`anyhow`] failure path.

pub mod error;

pub use error::{ErrorKind, ResolveError, ResolveWarning};
