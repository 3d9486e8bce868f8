//! Runs the real letsgo agent against the staging CA. Needs a DNS zone the
//! configured keyvault token can write to.

use anyhow::{Context, Result, anyhow};
use std::env;

use letsgo_runner::{IssuanceRequest, Orchestrator, OrchestratorConfig};

struct LiveTestConfig {
    domains: String,
    email: String,
    keyvault: String,
}

fn load_live_config() -> Result<LiveTestConfig> {
    let domains = env::var("LETSGO_TEST_DOMAINS").context("LETSGO_TEST_DOMAINS not set")?;
    let email = env::var("LETSGO_TEST_EMAIL").context("LETSGO_TEST_EMAIL not set")?;
    let keyvault = env::var("LETSGO_TEST_KEYVAULT").context("LETSGO_TEST_KEYVAULT not set")?;
    Ok(LiveTestConfig {
        domains,
        email,
        keyvault,
    })
}

#[test]
fn staging_issuance_and_account_reuse() -> Result<()> {
    let config = load_live_config()?;
    let orchestrator = Orchestrator::new(OrchestratorConfig::from_env()?);
    let request = IssuanceRequest::new(&config.domains, &config.email, &config.keyvault);

    let first = orchestrator.issue(&request)?;
    if !first.certificate.contains("BEGIN CERTIFICATE") {
        return Err(anyhow!("Expected a PEM certificate for {}", config.domains));
    }
    if !first.key.contains("PRIVATE KEY") {
        return Err(anyhow!("Expected a PEM private key"));
    }

    let second = orchestrator.issue(&request.clone().with_account_key(first.account_key.clone()))?;
    if second.account_key != first.account_key {
        return Err(anyhow!("Account key was not reused"));
    }

    Ok(())
}
