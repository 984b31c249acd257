// Model-free lexical URL scan
// Scores a URL from its surface features without touching the classifier

use chrono::Local;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

lazy_static! {
    static ref IP_HOST: Regex =
        Regex::new(r"^\d+\.\d+\.\d+\.\d+").expect("Invalid IP host regex");
}

const MIN_URL_LENGTH: usize = 10;
const SUSPICIOUS_HOST_TLDS: &[&str] = &[".tk", ".ml", ".ga", ".cf", ".gq"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Please enter a valid URL")]
    TooShort,
}

/// Surface features of a URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UrlLexicalFeatures {
    pub url_length: usize,
    pub domain_length: usize,
    pub path_length: usize,
    pub has_ip: bool,
    pub has_at_symbol: bool,
    pub has_double_slash: bool,
    pub num_dots: usize,
    pub num_hyphens: usize,
    pub num_underscores: usize,
    pub num_slashes: usize,
    pub num_question_marks: usize,
    pub num_equals: usize,
    pub num_ampersands: usize,
    pub has_https: bool,
    pub suspicious_tld: bool,
}

/// Scheme, network location and path, split from the raw text.
///
/// Nothing is normalized: the host keeps its case and any explicit port,
/// and a bare domain has an empty path.
#[derive(Debug, PartialEq)]
struct UrlParts<'a> {
    scheme: String,
    netloc: &'a str,
    path: &'a str,
}

impl<'a> UrlParts<'a> {
    fn split(url: &'a str) -> Self {
        let (scheme, rest) = match url.split_once(':') {
            Some((scheme, rest)) if is_scheme(scheme) => (scheme.to_ascii_lowercase(), rest),
            _ => (String::new(), url),
        };

        let (netloc, rest) = match rest.strip_prefix("//") {
            Some(authority) => {
                let end = authority.find(['/', '?', '#']).unwrap_or(authority.len());
                authority.split_at(end)
            },
            None => ("", rest),
        };

        let path_end = rest.find(['?', '#']).unwrap_or(rest.len());
        let path = &rest[..path_end];

        // `;params` on the last segment are not part of the path
        let last_segment = path.rfind('/').map_or(0, |i| i + 1);
        let path = match path[last_segment..].find(';') {
            Some(i) => &path[..last_segment + i],
            None => path,
        };

        Self {
            scheme,
            netloc,
            path,
        }
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl UrlLexicalFeatures {
    pub fn extract(url: &str) -> Self {
        let parts = UrlParts::split(url);
        let count = |c: char| url.matches(c).count();

        Self {
            url_length: url.chars().count(),
            domain_length: parts.netloc.chars().count(),
            path_length: parts.path.chars().count(),
            has_ip: IP_HOST.is_match(parts.netloc),
            has_at_symbol: url.contains('@'),
            has_double_slash: parts.path.contains("//"),
            num_dots: count('.'),
            num_hyphens: count('-'),
            num_underscores: count('_'),
            num_slashes: count('/'),
            num_question_marks: count('?'),
            num_equals: count('='),
            num_ampersands: count('&'),
            has_https: parts.scheme == "https",
            suspicious_tld: SUSPICIOUS_HOST_TLDS
                .iter()
                .any(|tld| parts.netloc.ends_with(tld)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ThreatClass {
    Normal,
    Suspicious,
    Attack,
}

/// Result of a lexical scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LexicalScanResult {
    pub url: String,
    pub threat_level: ThreatLevel,
    pub threat_class: ThreatClass,
    pub confidence: u32,
    pub threat_score: u32,
    pub indicators: Vec<String>,
    pub features: UrlLexicalFeatures,
    /// Local time of the scan, `%Y-%m-%d %H:%M:%S`
    pub timestamp: String,
}

/// Score a URL from its lexical features alone
pub fn scan_url(url: &str) -> Result<LexicalScanResult, ScanError> {
    if url.chars().count() < MIN_URL_LENGTH {
        return Err(ScanError::TooShort);
    }

    let features = UrlLexicalFeatures::extract(url);
    let mut threat_score = 0u32;
    let mut indicators = Vec::new();

    let rules: [(bool, u32, &str); 7] = [
        (
            features.has_ip,
            30,
            "Uses IP address instead of domain name",
        ),
        (features.url_length > 100, 20, "Unusually long URL"),
        (
            features.has_at_symbol,
            25,
            "Contains @ symbol (possible obfuscation)",
        ),
        (features.num_dots > 5, 15, "Excessive subdomains"),
        (features.suspicious_tld, 35, "Uses suspicious TLD"),
        (!features.has_https, 10, "Not using HTTPS"),
        (features.num_hyphens > 3, 15, "Multiple hyphens in domain"),
    ];

    for (hit, weight, indicator) in rules {
        if hit {
            threat_score += weight;
            indicators.push(indicator.to_string());
        }
    }

    let (threat_level, threat_class) = match threat_score {
        60.. => (ThreatLevel::High, ThreatClass::Attack),
        30..=59 => (ThreatLevel::Medium, ThreatClass::Suspicious),
        _ => (ThreatLevel::Low, ThreatClass::Normal),
    };

    Ok(LexicalScanResult {
        url: url.to_string(),
        threat_level,
        threat_class,
        confidence: (threat_score + 20).min(95),
        threat_score,
        indicators,
        features,
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}
