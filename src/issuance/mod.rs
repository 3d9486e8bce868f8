pub mod account;
pub mod artifacts;
pub mod environment;
pub mod issuer;
pub mod orchestrator;
pub mod process;
pub mod resolver;
pub mod workspace;

#[cfg(all(test, unix))]
pub(crate) mod test_support;

pub use issuer::{IssueError, Issuer};
pub use orchestrator::{Orchestrator, issue};
