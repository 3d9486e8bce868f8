//! Certificate issuance through the `letsgo` ACME agent.
//!
//! The agent is an external binary configured purely through environment
//! variables. [`Orchestrator::issue`] runs it once inside a private scratch
//! workspace and returns the PEM artifacts it produced.

pub mod core;
pub mod domain;
pub mod issuance;

pub use crate::core::{
    config::OrchestratorConfig,
    types::{AgentOptions, CaDirectory, IssuanceRequest, IssuanceResult, KeyType},
};
pub use crate::issuance::{IssueError, Issuer, Orchestrator, issue};
