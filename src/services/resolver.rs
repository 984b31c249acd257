// Hostname extraction and resolution for submitted URLs

use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Extract the hostname from a URL.
///
/// Scheme-less input such as `example.com:8080/path` falls back to the
/// text before the first `/`, with any port removed.
pub fn extract_hostname(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(host) = parsed.host_str() {
            return host.trim_start_matches('[').trim_end_matches(']').to_string();
        }
    }

    let authority = url.split('/').next().unwrap_or_default();
    let authority = authority.rsplit('@').next().unwrap_or_default();
    authority.split(':').next().unwrap_or_default().to_string()
}

/// Resolves hostnames to addresses
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, hostname: &str) -> Option<IpAddr>;
}

/// System resolver with a lookup timeout
pub struct DnsResolver {
    timeout: Duration,
}

impl DnsResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl HostResolver for DnsResolver {
    async fn resolve(&self, hostname: &str) -> Option<IpAddr> {
        if hostname.is_empty() {
            return None;
        }
        if let Ok(ip) = hostname.parse::<IpAddr>() {
            return Some(ip);
        }

        let lookup = tokio::net::lookup_host((hostname, 0));
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(addrs)) => {
                let addrs: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
                // Prefer IPv4 like gethostbyname does
                addrs
                    .iter()
                    .find(|ip| ip.is_ipv4())
                    .or_else(|| addrs.first())
                    .copied()
            },
            Ok(Err(e)) => {
                debug!("DNS resolution failed for {}: {}", hostname, e);
                None
            },
            Err(_) => {
                debug!("DNS resolution timed out for {}", hostname);
                None
            },
        }
    }
}

/// Resolver returning a fixed answer, for offline use and tests
pub struct StaticResolver {
    answer: Option<IpAddr>,
}

impl StaticResolver {
    pub fn new(answer: Option<IpAddr>) -> Self {
        Self { answer }
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, _hostname: &str) -> Option<IpAddr> {
        self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_hostname() {
        assert_eq!(extract_hostname("https://google.com"), "google.com");
        assert_eq!(
            extract_hostname("http://user:pw@sub.example.com:8080/a?b=c"),
            "sub.example.com"
        );
        assert_eq!(extract_hostname("example.com/path/to"), "example.com");
        assert_eq!(extract_hostname("example.com:8443/path"), "example.com");
        assert_eq!(extract_hostname("http://10.1.2.3/x"), "10.1.2.3");
        assert_eq!(extract_hostname(""), "");
    }

    #[tokio::test]
    async fn test_ip_literal_resolves_without_lookup() {
        let resolver = DnsResolver::new(Duration::from_millis(50));
        assert_eq!(
            resolver.resolve("192.0.2.7").await,
            Some("192.0.2.7".parse().unwrap())
        );
        assert_eq!(resolver.resolve("").await, None);
    }

    #[tokio::test]
    async fn test_static_resolver() {
        let resolver = StaticResolver::new(None);
        assert_eq!(resolver.resolve("example.com").await, None);
    }
}
