use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

pub const DEFAULT_CA_DIRECTORY: &str = "STAGING";

/// Parameters for one certificate issuance.
///
/// `domains`, `account_email`, `keyvault_id` and `ca_directory` are handed to
/// the agent untouched. An empty `account_key` asks the agent to generate a
/// fresh ACME account key.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssuanceRequest {
    /// Comma-joined domain names; the first one names the output files.
    pub domains: String,
    pub account_email: String,
    pub keyvault_id: String,
    /// PEM-encoded ACME account key, or empty.
    #[serde(default)]
    pub account_key: String,
    #[serde(default = "default_ca_directory")]
    pub ca_directory: String,
    /// Explicit agent path or bare name looked up on `PATH`.
    #[serde(default)]
    pub executable: Option<String>,
    #[serde(default)]
    pub options: AgentOptions,
}

fn default_ca_directory() -> String {
    DEFAULT_CA_DIRECTORY.to_string()
}

impl IssuanceRequest {
    pub fn new(
        domains: impl Into<String>,
        account_email: impl Into<String>,
        keyvault_id: impl Into<String>,
    ) -> Self {
        Self {
            domains: domains.into(),
            account_email: account_email.into(),
            keyvault_id: keyvault_id.into(),
            account_key: String::new(),
            ca_directory: default_ca_directory(),
            executable: None,
            options: AgentOptions::default(),
        }
    }

    pub fn with_account_key(mut self, account_key: impl Into<String>) -> Self {
        self.account_key = account_key.into();
        self
    }

    pub fn with_ca_directory(mut self, ca_directory: impl Into<String>) -> Self {
        self.ca_directory = ca_directory.into();
        self
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    pub fn with_options(mut self, options: AgentOptions) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Debug for IssuanceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuanceRequest")
            .field("domains", &self.domains)
            .field("account_email", &self.account_email)
            .field("keyvault_id", &self.keyvault_id)
            .field("account_key", &redacted(&self.account_key))
            .field("ca_directory", &self.ca_directory)
            .field("executable", &self.executable)
            .field("options", &self.options)
            .finish()
    }
}

/// Optional knobs understood by the agent. Unset values are not exported.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentOptions {
    #[serde(default)]
    pub key_type: Option<KeyType>,
    #[serde(default)]
    pub terms_of_service_agreed: Option<bool>,
    #[serde(default)]
    pub dns_resolvers: Vec<String>,
    /// Skip waiting for propagation to every authoritative nameserver.
    #[serde(default)]
    pub disable_complete_propagation: Option<bool>,
    #[serde(default)]
    pub dns_timeout_secs: Option<u64>,
    /// Secret name holding the DNS token inside the keyvault.
    #[serde(default)]
    pub vault_secret_name: Option<String>,
}

/// Certificate key types accepted by the agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum KeyType {
    #[serde(rename = "RSA2048")]
    Rsa2048,
    #[serde(rename = "RSA4096")]
    Rsa4096,
    #[serde(rename = "RSA8192")]
    Rsa8192,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Rsa2048 => "RSA2048",
            KeyType::Rsa4096 => "RSA4096",
            KeyType::Rsa8192 => "RSA8192",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Invalid key type. Allowed values are 'RSA2048', 'RSA4096' and 'RSA8192'.")]
pub struct InvalidKeyType;

impl FromStr for KeyType {
    type Err = InvalidKeyType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "RSA2048" => Ok(KeyType::Rsa2048),
            "RSA4096" => Ok(KeyType::Rsa4096),
            "RSA8192" => Ok(KeyType::Rsa8192),
            _ => Err(InvalidKeyType),
        }
    }
}

/// CA endpoints the agent knows by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaDirectory {
    Production,
    Staging,
    /// Local Boulder instance.
    Test,
    Custom(String),
}

impl CaDirectory {
    /// Interprets a selector the same way the agent does (case-insensitive).
    pub fn parse(selector: &str) -> Self {
        match selector.to_uppercase().as_str() {
            "PRODUCTION" => CaDirectory::Production,
            "STAGING" => CaDirectory::Staging,
            "TEST" => CaDirectory::Test,
            _ => CaDirectory::Custom(selector.to_string()),
        }
    }

    pub fn directory_url(&self) -> &str {
        match self {
            CaDirectory::Production => "https://acme-v02.api.letsencrypt.org/directory",
            CaDirectory::Staging => "https://acme-staging-v02.api.letsencrypt.org/directory",
            CaDirectory::Test => "http://localhost:4000/directory",
            CaDirectory::Custom(url) => url,
        }
    }
}

/// PEM artifacts harvested from a successful agent run.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssuanceResult {
    pub alias: String,
    pub certificate: String,
    pub key: String,
    pub issuer: String,
    /// The account key the agent used; persist it to skip re-registration.
    pub account_key: String,
}

impl fmt::Debug for IssuanceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuanceResult")
            .field("alias", &self.alias)
            .field("certificate", &format_args!("{} bytes", self.certificate.len()))
            .field("key", &redacted(&self.key))
            .field("issuer", &format_args!("{} bytes", self.issuer.len()))
            .field("account_key", &redacted(&self.account_key))
            .finish()
    }
}

impl Drop for IssuanceResult {
    fn drop(&mut self) {
        self.key.zeroize();
        self.account_key.zeroize();
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "<empty>" } else { "<redacted>" }
}
