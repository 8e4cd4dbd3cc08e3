//! Integration test suite.
//!
//! Drives the public resolver API end to end over realistic deployment
//! scenarios, plus the `deplink` binary itself.

mod cli;
mod common;
mod resolution;
