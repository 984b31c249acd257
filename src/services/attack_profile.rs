// Keyword-driven attack profile detection over the submitted URL

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::resolver::extract_hostname;

lazy_static! {
    /// IPv4-looking literal anywhere in the URL
    static ref IPV4_LITERAL: Regex =
        Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("Invalid IPv4 literal regex");
}

/// Attack family inferred from the URL text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AttackType {
    #[serde(rename = "DDoS")]
    DDoS,
    #[serde(rename = "Brute Force")]
    BruteForce,
    #[serde(rename = "Bot")]
    Bot,
    #[serde(rename = "Infiltration")]
    Infiltration,
    #[serde(rename = "PortScan")]
    PortScan,
    #[serde(rename = "Web Attack")]
    WebAttack,
    #[serde(rename = "Suspicious")]
    Suspicious,
    #[serde(rename = "Benign")]
    Benign,
}

impl AttackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackType::DDoS => "DDoS",
            AttackType::BruteForce => "Brute Force",
            AttackType::Bot => "Bot",
            AttackType::Infiltration => "Infiltration",
            AttackType::PortScan => "PortScan",
            AttackType::WebAttack => "Web Attack",
            AttackType::Suspicious => "Suspicious",
            AttackType::Benign => "Benign",
        }
    }

    /// Whether this is one of the named attack families
    pub fn is_attack(&self) -> bool {
        !matches!(self, AttackType::Benign | AttackType::Suspicious)
    }
}

impl std::fmt::Display for AttackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword families checked in order; the first family with any hit wins
const KEYWORD_RULES: &[(&[&str], AttackType, f64)] = &[
    (&["dos", "ddos", "flood", "syn", "udp"], AttackType::DDoS, 0.85),
    (&["ssh", "admin", "login", "brute", "ftp"], AttackType::BruteForce, 0.80),
    (&["bot", "botnet", "zombie", "command"], AttackType::Bot, 0.75),
    (
        &["infiltration", "backdoor", "rootkit", "exploit"],
        AttackType::Infiltration,
        0.90,
    ),
    (
        &["scan", "probe", "reconnaissance", "portscan"],
        AttackType::PortScan,
        0.70,
    ),
    (&["phish", "malware", "virus", "trojan"], AttackType::WebAttack, 0.85),
];

const SUSPICIOUS_TLDS: &[&str] = &[".tk", ".ml", ".ga", ".cf", ".gq", ".xyz"];

/// Score above which an unmatched URL is reported as Suspicious
pub const SUSPICIOUS_THRESHOLD: f64 = 0.4;

/// Detect the attack profile and risk score for a URL.
///
/// Pure function of the URL text: the same input always yields the same
/// result.
pub fn detect_attack_type(url: &str) -> (AttackType, f64) {
    let url_lower = url.to_lowercase();

    for (keywords, attack_type, score) in KEYWORD_RULES {
        if keywords.iter().any(|keyword| url_lower.contains(keyword)) {
            return (*attack_type, *score);
        }
    }

    let risk_score = generic_risk_score(url, &url_lower).min(1.0);
    if risk_score > SUSPICIOUS_THRESHOLD {
        (AttackType::Suspicious, risk_score)
    } else {
        (AttackType::Benign, risk_score)
    }
}

fn generic_risk_score(url: &str, url_lower: &str) -> f64 {
    let mut risk_score = 0.0;

    if url.chars().count() > 100 {
        risk_score += 0.2;
    }

    if IPV4_LITERAL.is_match(url) {
        risk_score += 0.25;
    }

    if extract_hostname(url).matches('.').count() > 3 {
        risk_score += 0.2;
    }

    if SUSPICIOUS_TLDS.iter().any(|tld| url_lower.ends_with(tld)) {
        risk_score += 0.3;
    }

    if url.contains('@') {
        risk_score += 0.25;
    }

    if url.matches('-').count() > 4 || url.matches('_').count() > 4 {
        risk_score += 0.1;
    }

    risk_score
}
