//! Environment handed to the agent process.
//!
//! The agent is configured entirely through environment variables. Each run
//! gets its own map, built from an inherited snapshot with the request and
//! workspace keys laid over it, and applied to the child `Command` only.

use std::{
    collections::BTreeMap,
    ffi::{OsStr, OsString},
    fmt,
    process::Command,
};

use super::workspace::Workspace;
use crate::core::types::IssuanceRequest;

pub const DOMAINS: &str = "DOMAINS";
pub const ACCOUNT_EMAIL: &str = "ACCOUNT_EMAIL";
pub const DNS_AUTH_TOKEN_VAULT: &str = "DNS_AUTH_TOKEN_VAULT";
pub const CA_DIR: &str = "CA_DIR";
pub const OUTPUT_DIRECTORY: &str = "OUTPUT_DIRECTORY";
pub const FILENAME: &str = "FILENAME";
pub const ACCOUNT_KEY_FILE: &str = "ACCOUNT_KEY_FILE";

pub const KEY_TYPE: &str = "LE_CRT_KEY_TYPE";
pub const TOS_AGREED: &str = "LE_TOS_AGREED";
pub const DNS_RESOLVERS: &str = "DNS_RESOLVERS";
pub const DISABLE_CP: &str = "DISABLE_CP";
pub const DNS_TIMEOUT: &str = "DNS_TIMEOUT";
pub const DNS_AUTH_TOKEN_SECRET: &str = "DNS_AUTH_TOKEN_SECRET";

/// Keys every run sets, whatever the request options.
pub const OVERLAY_KEYS: [&str; 7] = [
    DOMAINS,
    ACCOUNT_EMAIL,
    DNS_AUTH_TOKEN_VAULT,
    CA_DIR,
    OUTPUT_DIRECTORY,
    FILENAME,
    ACCOUNT_KEY_FILE,
];

/// Finished, read-only environment for one agent run.
#[derive(Clone, PartialEq, Eq)]
pub struct AgentEnvironment {
    vars: BTreeMap<OsString, OsString>,
}

impl AgentEnvironment {
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Replaces the command's environment with this one.
    pub fn apply(&self, command: &mut Command) {
        command.env_clear().envs(&self.vars);
    }
}

impl fmt::Debug for AgentEnvironment {
    // Inherited values may hold credentials; only list the names.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.vars.keys()).finish()
    }
}

pub struct EnvironmentBuilder {
    vars: BTreeMap<OsString, OsString>,
}

impl EnvironmentBuilder {
    pub fn new<I>(inherited: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        Self {
            vars: inherited.into_iter().collect(),
        }
    }

    /// Overlays the request keys, plus any agent options the caller set.
    pub fn with_request(mut self, request: &IssuanceRequest, alias: &str) -> Self {
        self.set(DOMAINS, &request.domains);
        self.set(ACCOUNT_EMAIL, &request.account_email);
        self.set(DNS_AUTH_TOKEN_VAULT, &request.keyvault_id);
        self.set(CA_DIR, &request.ca_directory);
        self.set(FILENAME, alias);

        let options = &request.options;
        if let Some(key_type) = options.key_type {
            self.set(KEY_TYPE, key_type.as_str());
        }
        if let Some(agreed) = options.terms_of_service_agreed {
            self.set(TOS_AGREED, bool_str(agreed));
        }
        if !options.dns_resolvers.is_empty() {
            self.set(DNS_RESOLVERS, &options.dns_resolvers.join(","));
        }
        if let Some(disable) = options.disable_complete_propagation {
            self.set(DISABLE_CP, bool_str(disable));
        }
        if let Some(secs) = options.dns_timeout_secs {
            self.set(DNS_TIMEOUT, &secs.to_string());
        }
        if let Some(secret) = &options.vault_secret_name {
            self.set(DNS_AUTH_TOKEN_SECRET, secret);
        }
        self
    }

    /// Overlays the workspace location keys.
    pub fn with_workspace(mut self, workspace: &Workspace) -> Self {
        self.vars.insert(
            OUTPUT_DIRECTORY.into(),
            workspace.path().as_os_str().to_os_string(),
        );
        self.vars.insert(
            ACCOUNT_KEY_FILE.into(),
            workspace.account_key_path().into_os_string(),
        );
        self
    }

    pub fn build(self) -> AgentEnvironment {
        AgentEnvironment { vars: self.vars }
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.into(), value.into());
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
