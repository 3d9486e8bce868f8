//! letsgo-issue: request a certificate through the letsgo agent and store the
//! resulting PEM files.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use letsgo_runner::{
    AgentOptions, CaDirectory, IssuanceRequest, IssuanceResult, KeyType, Orchestrator,
    OrchestratorConfig, core::config::ACCOUNT_KEY_FILENAME,
};

/// Issue a TLS certificate with the letsgo ACME agent
#[derive(Parser, Debug)]
#[command(name = "letsgo-issue")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Comma-separated domain names; the first one names the output files
    #[arg(long, env = "DOMAINS")]
    domains: String,

    /// ACME account contact email
    #[arg(long, env = "ACCOUNT_EMAIL")]
    email: String,

    /// Keyvault holding the DNS provider token
    #[arg(long, env = "DNS_AUTH_TOKEN_VAULT")]
    keyvault: String,

    /// CA directory: STAGING, PRODUCTION, TEST or a directory URL
    #[arg(long = "ca-dir", default_value = "STAGING", value_parser = parse_ca_dir)]
    ca_dir: String,

    /// Account key to reuse; rewritten with the key used after issuance
    #[arg(long = "account-key-file")]
    account_key_file: Option<PathBuf>,

    /// Directory receiving the certificate files
    #[arg(long = "output-dir", default_value = ".")]
    output_dir: PathBuf,

    /// Agent binary path or name (defaults to LETSGO_BIN, then `letsgo` on PATH)
    #[arg(long)]
    agent: Option<String>,

    /// Kill the agent after this many seconds
    #[arg(long = "timeout-secs")]
    timeout_secs: Option<u64>,

    /// Certificate key type: RSA2048, RSA4096 or RSA8192
    #[arg(long = "key-type")]
    key_type: Option<KeyType>,

    /// Recursive DNS resolver used for propagation checks (repeatable)
    #[arg(long = "dns-resolver")]
    dns_resolvers: Vec<String>,

    /// Print the result as JSON instead of writing files
    #[arg(long)]
    json: bool,

    /// Enable verbose logging (debug level)
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = OrchestratorConfig::from_env().context("Invalid orchestrator environment")?;
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let account_key_file = cli
        .account_key_file
        .clone()
        .unwrap_or_else(|| cli.output_dir.join(ACCOUNT_KEY_FILENAME));
    let account_key = read_optional(&account_key_file)?;

    let options = AgentOptions {
        key_type: cli.key_type,
        dns_resolvers: cli.dns_resolvers.clone(),
        ..AgentOptions::default()
    };
    let mut request = IssuanceRequest::new(&cli.domains, &cli.email, &cli.keyvault)
        .with_account_key(account_key)
        .with_ca_directory(&cli.ca_dir)
        .with_options(options);
    if let Some(agent) = &cli.agent {
        request = request.with_executable(agent);
    }

    let result = match Orchestrator::new(config).issue(&request) {
        Ok(result) => result,
        Err(err) => {
            if let Some(stderr) = err.agent_stderr().filter(|out| !out.trim().is_empty()) {
                eprintln!("letsgo output:\n{}", stderr.trim_end());
            }
            return Err(anyhow::Error::new(err)
                .context(format!("Certificate issuance failed for {}", cli.domains)));
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    write_result(&result, &cli.output_dir, &account_key_file)?;
    Ok(())
}

/// Accepts a known selector (any case) or an http(s) directory URL.
fn parse_ca_dir(value: &str) -> Result<String, String> {
    match CaDirectory::parse(value) {
        CaDirectory::Custom(url) if !(url.starts_with("https://") || url.starts_with("http://")) => {
            Err(format!(
                "expected PRODUCTION, STAGING, TEST or an http(s) directory URL, got '{url}'"
            ))
        }
        _ => Ok(value.to_string()),
    }
}

fn read_optional(path: &Path) -> Result<String> {
    if !path.exists() {
        return Ok(String::new());
    }
    info!("Reusing account key from {}", path.display());
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_result(result: &IssuanceResult, output_dir: &Path, account_key_file: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let files = [
        (output_dir.join(format!("{}.crt", result.alias)), &result.certificate),
        (output_dir.join(format!("{}.key", result.alias)), &result.key),
        (output_dir.join(format!("{}.issuer.crt", result.alias)), &result.issuer),
        (account_key_file.to_path_buf(), &result.account_key),
    ];
    for (path, content) in files {
        write_private(&path, content)?;
        println!("{}", path.display());
    }
    Ok(())
}

fn write_private(path: &Path, content: &str) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))
}
