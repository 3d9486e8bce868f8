use anyhow::{Result, anyhow};

/// Derives the file-naming alias for a comma-joined domain list.
///
/// Takes everything before the first comma and replaces each `*` with `_`, so
/// `*.example.com,example.com` becomes `_.example.com`.
pub fn derive_alias(domains: &str) -> String {
    let primary = domains.split(',').next().unwrap_or_default();
    primary.replace('*', "_")
}

/// Splits a comma-joined domain list into its entries, preserving order.
pub fn split_domains(domains: &str) -> Vec<&str> {
    domains.split(',').collect()
}

/// Checks that a comma-joined domain list is usable by the agent.
///
/// Every entry must be non-empty and convertible to ASCII. A leading `*.`
/// wildcard label is accepted.
pub fn validate_domain_list(domains: &str) -> Result<()> {
    if domains.trim().is_empty() {
        return Err(anyhow!("at least one domain is required"));
    }
    for (index, entry) in split_domains(domains).into_iter().enumerate() {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("domain entry {} is empty", index + 1));
        }
        if trimmed != entry {
            return Err(anyhow!("domain entry '{entry}' has surrounding whitespace"));
        }
        let host = trimmed.strip_prefix("*.").unwrap_or(trimmed);
        if host.is_empty() || host.contains('*') {
            return Err(anyhow!("invalid wildcard domain: {entry}"));
        }
        idna::domain_to_ascii(host).map_err(|err| anyhow!("invalid domain name {entry}: {err}"))?;
    }
    Ok(())
}
