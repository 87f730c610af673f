//! URL validation for SSRF protection.
//!
//! Checks are made against the hostname text of the URL. Names are not
//! resolved, so a public hostname whose DNS points at a private address is
//! not caught here.

use ipnet::IpNet;
use std::collections::HashSet;
use std::net::IpAddr;
use url::{Host, Url};

use crate::error::{SecurityError, SecurityResult};

const BLOCKED_CIDRS: &[&str] = &[
    "0.0.0.0/8",      // Unspecified
    "10.0.0.0/8",     // Private
    "127.0.0.0/8",    // Loopback
    "169.254.0.0/16", // Link-local / cloud metadata
    "172.16.0.0/12",  // Private
    "192.168.0.0/16", // Private
    "::/128",         // IPv6 unspecified
    "::1/128",        // IPv6 loopback
    "fc00::/7",       // IPv6 unique local
    "fe80::/10",      // IPv6 link-local
];

/// URL guard for SSRF protection.
///
/// Rejects:
/// - Non-HTTP(S) schemes (file://, ftp://, gopher://)
/// - `localhost` and anything under `.localhost`, `.local`, `.internal`
/// - Literal loopback, private, link-local and unspecified IPs, including
///   IPv4-mapped IPv6 forms
#[derive(Debug, Clone)]
pub struct UrlGuard {
    allowed_schemes: HashSet<String>,
    blocked_hosts: HashSet<String>,
    blocked_suffixes: Vec<String>,
    blocked_cidrs: Vec<IpNet>,
    /// Hosts that bypass every other check (tests, trusted mirrors)
    allowed_hosts: HashSet<String>,
}

impl Default for UrlGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlGuard {
    /// Create a guard with the default rules.
    pub fn new() -> Self {
        Self {
            allowed_schemes: ["http", "https"].into_iter().map(String::from).collect(),
            blocked_hosts: ["localhost", "metadata.google.internal", "instance-data"]
                .into_iter()
                .map(String::from)
                .collect(),
            blocked_suffixes: [".localhost", ".local", ".internal"]
                .into_iter()
                .map(String::from)
                .collect(),
            blocked_cidrs: BLOCKED_CIDRS
                .iter()
                .filter_map(|cidr| cidr.parse().ok())
                .collect(),
            allowed_hosts: HashSet::new(),
        }
    }

    /// Add an allowed host (bypasses validation).
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.insert(host.into().to_ascii_lowercase());
        self
    }

    /// Block an additional host.
    pub fn block_host(mut self, host: impl Into<String>) -> Self {
        self.blocked_hosts.insert(host.into().to_ascii_lowercase());
        self
    }

    /// Block an additional CIDR range.
    pub fn block_cidr(mut self, cidr: IpNet) -> Self {
        self.blocked_cidrs.push(cidr);
        self
    }

    /// Validate a URL, returning the parsed form on success.
    pub fn validate(&self, url: &str) -> SecurityResult<Url> {
        let parsed = Url::parse(url.trim())?;
        self.validate_url(&parsed)?;
        Ok(parsed)
    }

    /// Validate an already-parsed URL (used for redirect hops).
    pub fn validate_url(&self, url: &Url) -> SecurityResult<()> {
        let scheme = url.scheme().to_ascii_lowercase();
        if !self.allowed_schemes.contains(&scheme) {
            return Err(SecurityError::DisallowedScheme(scheme));
        }

        match url.host().ok_or(SecurityError::NoHost)? {
            Host::Domain(domain) => self.check_domain(domain),
            Host::Ipv4(ip) => self.check_ip(IpAddr::V4(ip)),
            Host::Ipv6(ip) => {
                if self.allowed_hosts.contains(&format!("[{}]", ip)) {
                    return Ok(());
                }
                if let Some(v4) = ip.to_ipv4_mapped() {
                    self.check_ip(IpAddr::V4(v4))?;
                }
                self.check_ip(IpAddr::V6(ip))
            }
        }
    }

    fn check_domain(&self, domain: &str) -> SecurityResult<()> {
        let host = domain.trim_end_matches('.').to_ascii_lowercase();

        if self.allowed_hosts.contains(&host) {
            return Ok(());
        }

        if self.blocked_hosts.contains(&host)
            || self.blocked_suffixes.iter().any(|s| host.ends_with(s.as_str()))
        {
            return Err(SecurityError::BlockedHost(host));
        }

        Ok(())
    }

    fn check_ip(&self, ip: IpAddr) -> SecurityResult<()> {
        if self.allowed_hosts.contains(&ip.to_string()) {
            return Ok(());
        }

        if self.blocked_cidrs.iter().any(|cidr| cidr.contains(&ip)) {
            return Err(SecurityError::BlockedIp(ip.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_loopback() {
        let guard = UrlGuard::new();
        assert!(guard.validate("http://localhost/").is_err());
        assert!(guard.validate("http://LOCALHOST:8080/admin").is_err());
        assert!(guard.validate("http://127.0.0.1/x").is_err());
        assert!(guard.validate("http://127.1.2.3/").is_err());
        assert!(guard.validate("http://[::1]/").is_err());
    }

    #[test]
    fn test_blocks_private_ranges() {
        let guard = UrlGuard::new();
        assert!(guard.validate("http://10.0.0.1/").is_err());
        assert!(guard.validate("http://172.16.0.1/").is_err());
        assert!(guard.validate("http://172.31.255.255/").is_err());
        assert!(guard.validate("http://192.168.1.1/").is_err());
        assert!(guard.validate("http://172.32.0.1/").is_ok());
    }

    #[test]
    fn test_blocks_link_local() {
        let guard = UrlGuard::new();
        assert!(guard.validate("http://169.254.169.254/latest/meta-data").is_err());
        assert!(guard.validate("http://[fe80::1]/").is_err());
    }

    #[test]
    fn test_blocks_internal_suffixes() {
        let guard = UrlGuard::new();
        assert!(guard.validate("http://internal.local/x").is_err());
        assert!(guard.validate("http://printer.LOCAL/").is_err());
        assert!(guard.validate("http://db.corp.internal/").is_err());
        assert!(guard.validate("http://metadata.google.internal/").is_err());
        assert!(guard.validate("http://app.localhost/").is_err());
    }

    #[test]
    fn test_blocks_ipv4_mapped_ipv6() {
        let guard = UrlGuard::new();
        assert!(guard.validate("http://[::ffff:127.0.0.1]/").is_err());
        assert!(guard.validate("http://[::ffff:10.1.2.3]/").is_err());
    }

    #[test]
    fn test_blocks_non_http() {
        let guard = UrlGuard::new();
        assert!(matches!(
            guard.validate("file:///etc/passwd"),
            Err(SecurityError::DisallowedScheme(_))
        ));
        assert!(guard.validate("ftp://example.com/").is_err());
        assert!(guard.validate("not a url").is_err());
    }

    #[test]
    fn test_allows_public_urls() {
        let guard = UrlGuard::new();
        assert!(guard.validate("https://example.com/reviews").is_ok());
        assert!(guard.validate("http://www.yelp.com/biz/cafe").is_ok());
        assert!(guard.validate("https://93.184.216.34/").is_ok());
        // Only the suffix counts, not a substring
        assert!(guard.validate("https://localhost-reviews.com/").is_ok());
    }

    #[test]
    fn test_allowed_hosts_bypass() {
        let guard = UrlGuard::new().allow_host("localhost");
        assert!(guard.validate("http://localhost/").is_ok());
    }
}
