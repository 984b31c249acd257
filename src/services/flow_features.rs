// Synthetic network-flow features derived from an attack profile
//
// The values imitate CIC-IDS flow statistics. Nothing here is measured:
// every number comes from the profile table and the injected RNG.

use rand::Rng;
use serde::Serialize;

use crate::services::attack_profile::{AttackType, SUSPICIOUS_THRESHOLD};

/// Feature names in the order the generator emits them
pub const FLOW_FEATURE_NAMES: &[&str] = &[
    "Dst Port",
    "Protocol",
    "Flow Duration",
    "Tot Fwd Pkts",
    "Tot Bwd Pkts",
    "TotLen Fwd Pkts",
    "TotLen Bwd Pkts",
    "Fwd Pkt Len Max",
    "Fwd Pkt Len Min",
    "Fwd Pkt Len Mean",
    "Fwd Pkt Len Std",
    "Bwd Pkt Len Max",
    "Bwd Pkt Len Min",
    "Bwd Pkt Len Mean",
    "Bwd Pkt Len Std",
    "Flow Byts/s",
    "Flow Pkts/s",
    "Flow IAT Mean",
    "Flow IAT Std",
    "Flow IAT Max",
    "Flow IAT Min",
    "Fwd IAT Tot",
    "Fwd IAT Mean",
    "Fwd IAT Std",
    "Fwd IAT Max",
    "Fwd IAT Min",
    "Bwd IAT Tot",
    "Bwd IAT Mean",
    "Bwd IAT Std",
    "Bwd IAT Max",
    "Bwd IAT Min",
    "Fwd PSH Flags",
    "Bwd PSH Flags",
    "Fwd URG Flags",
    "Bwd URG Flags",
    "FIN Flag Cnt",
    "SYN Flag Cnt",
    "RST Flag Cnt",
    "PSH Flag Cnt",
    "ACK Flag Cnt",
    "URG Flag Cnt",
    "CWE Flag Count",
    "ECE Flag Cnt",
    "Fwd Header Len",
    "Bwd Header Len",
    "Fwd Pkts/s",
    "Bwd Pkts/s",
    "Pkt Len Min",
    "Pkt Len Max",
    "Pkt Len Mean",
    "Pkt Len Std",
    "Pkt Len Var",
    "Down/Up Ratio",
    "Pkt Size Avg",
    "Fwd Seg Size Avg",
    "Bwd Seg Size Avg",
    "Fwd Byts/b Avg",
    "Fwd Pkts/b Avg",
    "Fwd Blk Rate Avg",
    "Bwd Byts/b Avg",
    "Bwd Pkts/b Avg",
    "Bwd Blk Rate Avg",
    "Subflow Fwd Pkts",
    "Subflow Fwd Byts",
    "Subflow Bwd Pkts",
    "Subflow Bwd Byts",
    "Init Fwd Win Byts",
    "Init Bwd Win Byts",
    "Fwd Act Data Pkts",
    "Fwd Seg Size Min",
    "Active Mean",
    "Active Std",
    "Active Max",
    "Active Min",
    "Idle Mean",
    "Idle Std",
    "Idle Max",
    "Idle Min",
];

const BASE_DURATION_US: f64 = 5_000_000.0;
const BASE_ACTIVE_US: f64 = 1_000_000.0;
const BASE_IDLE_US: f64 = 500_000.0;
const HEADER_BYTES_PER_PKT: f64 = 40.0;
const TCP: f64 = 6.0;

/// Characteristic traffic shape for an attack family
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficProfile {
    pub duration_mult: f64,
    pub fwd_pkts: u32,
    pub bwd_pkts: u32,
    pub pkt_size: f64,
    pub flags: f64,
    pub port: u16,
}

impl TrafficProfile {
    /// Draw a concrete profile; Suspicious URLs reuse the Benign shape
    pub fn sample<R: Rng>(attack_type: AttackType, url: &str, rng: &mut R) -> Self {
        match attack_type {
            AttackType::DDoS => Self {
                duration_mult: 0.2,
                fwd_pkts: rng.gen_range(500..2000),
                bwd_pkts: rng.gen_range(100..500),
                pkt_size: 64.0,
                flags: 0.9,
                port: 80,
            },
            AttackType::BruteForce => Self {
                duration_mult: 0.5,
                fwd_pkts: rng.gen_range(50..200),
                bwd_pkts: rng.gen_range(50..200),
                pkt_size: 200.0,
                flags: 0.4,
                port: 22,
            },
            AttackType::Bot => Self {
                duration_mult: 2.0,
                fwd_pkts: rng.gen_range(100..500),
                bwd_pkts: rng.gen_range(100..500),
                pkt_size: 400.0,
                flags: 0.5,
                port: 8080,
            },
            AttackType::Infiltration => Self {
                duration_mult: 5.0,
                fwd_pkts: rng.gen_range(20..100),
                bwd_pkts: rng.gen_range(20..100),
                pkt_size: 300.0,
                flags: 0.2,
                port: 443,
            },
            AttackType::PortScan => Self {
                duration_mult: 0.1,
                fwd_pkts: rng.gen_range(1..5),
                bwd_pkts: rng.gen_range(0..2),
                pkt_size: 40.0,
                flags: 0.7,
                port: rng.gen_range(1..65535),
            },
            AttackType::WebAttack => Self {
                duration_mult: 1.0,
                fwd_pkts: rng.gen_range(30..150),
                bwd_pkts: rng.gen_range(30..150),
                pkt_size: 500.0,
                flags: 0.3,
                port: 443,
            },
            AttackType::Benign | AttackType::Suspicious => Self {
                duration_mult: 1.5,
                fwd_pkts: rng.gen_range(10..50),
                bwd_pkts: rng.gen_range(10..50),
                pkt_size: 250.0,
                flags: 0.1,
                port: if url.to_lowercase().contains("https") {
                    443
                } else {
                    80
                },
            },
        }
    }
}

/// Ordered name/value flow feature set
#[derive(Debug, Clone, Serialize)]
pub struct FlowFeatures {
    values: Vec<(&'static str, f64)>,
}

impl FlowFeatures {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    fn set(&mut self, name: &'static str, value: f64) {
        self.values.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.values.iter().copied()
    }

    /// Values ordered by `columns`; unknown columns are 0.0
    pub fn to_vector<S: AsRef<str>>(&self, columns: &[S]) -> Vec<f64> {
        columns
            .iter()
            .map(|column| self.get(column.as_ref()).unwrap_or(0.0))
            .collect()
    }
}

/// Truncate toward zero like an integer cast of the flag activity
fn flag_count(activity: f64, factor: f64) -> f64 {
    (activity * factor).trunc()
}

/// Generate a synthetic flow for the detected attack profile.
pub fn generate_flow_features<R: Rng>(
    url: &str,
    attack_type: AttackType,
    risk_score: f64,
    rng: &mut R,
) -> FlowFeatures {
    let profile = TrafficProfile::sample(attack_type, url, rng);
    let is_suspicious = attack_type.is_attack() || risk_score > SUSPICIOUS_THRESHOLD;
    let flag_activity = profile.flags;

    let mut f = FlowFeatures::with_capacity(FLOW_FEATURE_NAMES.len());

    f.set("Dst Port", f64::from(profile.port));
    f.set("Protocol", TCP);

    let duration = BASE_DURATION_US * profile.duration_mult;
    let fwd_pkts = f64::from(profile.fwd_pkts);
    let bwd_pkts = f64::from(profile.bwd_pkts);
    let total_pkts = fwd_pkts + bwd_pkts;
    f.set("Flow Duration", duration);
    f.set("Tot Fwd Pkts", fwd_pkts);
    f.set("Tot Bwd Pkts", bwd_pkts);

    let fwd_len = profile.pkt_size * rng.gen_range(0.9_f64..1.1);
    let bwd_len = profile.pkt_size * rng.gen_range(0.8_f64..1.0);
    let fwd_bytes = fwd_len * fwd_pkts;
    let bwd_bytes = bwd_len * bwd_pkts;

    f.set("TotLen Fwd Pkts", fwd_bytes);
    f.set("TotLen Bwd Pkts", bwd_bytes);
    f.set("Fwd Pkt Len Max", fwd_len * 1.5);
    f.set("Fwd Pkt Len Min", fwd_len * 0.5);
    f.set("Fwd Pkt Len Mean", fwd_len);
    f.set("Fwd Pkt Len Std", fwd_len * 0.3);
    f.set("Bwd Pkt Len Max", bwd_len * 1.5);
    f.set("Bwd Pkt Len Min", bwd_len * 0.5);
    f.set("Bwd Pkt Len Mean", bwd_len);
    f.set("Bwd Pkt Len Std", bwd_len * 0.3);

    let per_second = |count: f64| {
        if duration > 0.0 {
            count / duration * 1_000_000.0
        } else {
            0.0
        }
    };
    f.set("Flow Byts/s", per_second(fwd_bytes + bwd_bytes));
    f.set("Flow Pkts/s", per_second(total_pkts));

    // Inter-arrival times
    let flow_iat = duration / (total_pkts - 1.0).max(1.0);
    f.set("Flow IAT Mean", flow_iat);
    f.set("Flow IAT Std", flow_iat * 0.5);
    f.set("Flow IAT Max", flow_iat * 2.0);
    f.set("Flow IAT Min", flow_iat * 0.1);

    let fwd_iat_tot = duration * 0.4;
    let fwd_iat = fwd_iat_tot / (fwd_pkts - 1.0).max(1.0);
    f.set("Fwd IAT Tot", fwd_iat_tot);
    f.set("Fwd IAT Mean", fwd_iat);
    f.set("Fwd IAT Std", fwd_iat * 0.5);
    f.set("Fwd IAT Max", fwd_iat * 2.0);
    f.set("Fwd IAT Min", fwd_iat * 0.1);

    let bwd_iat_tot = duration * 0.6;
    let bwd_iat = bwd_iat_tot / (bwd_pkts - 1.0).max(1.0);
    f.set("Bwd IAT Tot", bwd_iat_tot);
    f.set("Bwd IAT Mean", bwd_iat);
    f.set("Bwd IAT Std", bwd_iat * 0.5);
    f.set("Bwd IAT Max", bwd_iat * 2.0);
    f.set("Bwd IAT Min", bwd_iat * 0.1);

    // Flags
    f.set("Fwd PSH Flags", flag_count(flag_activity, 3.0));
    f.set("Bwd PSH Flags", flag_count(flag_activity, 2.0));
    f.set("Fwd URG Flags", flag_count(flag_activity, 1.0));
    f.set("Bwd URG Flags", flag_count(flag_activity, 1.0));
    f.set("FIN Flag Cnt", 1.0);
    f.set("SYN Flag Cnt", 1.0);
    f.set("RST Flag Cnt", flag_count(flag_activity, 2.0));
    f.set("PSH Flag Cnt", flag_count(flag_activity, 5.0));
    f.set("ACK Flag Cnt", (total_pkts * 0.8).trunc());
    f.set("URG Flag Cnt", flag_count(flag_activity, 2.0));
    f.set("CWE Flag Count", 0.0);
    f.set("ECE Flag Cnt", 0.0);

    f.set("Fwd Header Len", HEADER_BYTES_PER_PKT * fwd_pkts);
    f.set("Bwd Header Len", HEADER_BYTES_PER_PKT * bwd_pkts);
    f.set("Fwd Pkts/s", per_second(fwd_pkts));
    f.set("Bwd Pkts/s", per_second(bwd_pkts));

    // Packet length statistics over the fwd + bwd population
    let stats = PacketLengthStats::from_population(fwd_len, fwd_pkts, bwd_len, bwd_pkts);
    f.set("Pkt Len Min", stats.min);
    f.set("Pkt Len Max", stats.max);
    f.set("Pkt Len Mean", stats.mean);
    f.set("Pkt Len Std", stats.variance.sqrt());
    f.set("Pkt Len Var", stats.variance);

    f.set("Down/Up Ratio", bwd_pkts / fwd_pkts.max(1.0));
    f.set("Pkt Size Avg", stats.mean);
    f.set("Fwd Seg Size Avg", fwd_len);
    f.set("Bwd Seg Size Avg", bwd_len);

    // Bulk transfer rates stay zero for request/response traffic
    for name in [
        "Fwd Byts/b Avg",
        "Fwd Pkts/b Avg",
        "Fwd Blk Rate Avg",
        "Bwd Byts/b Avg",
        "Bwd Pkts/b Avg",
        "Bwd Blk Rate Avg",
    ] {
        f.set(name, 0.0);
    }

    f.set("Subflow Fwd Pkts", fwd_pkts);
    f.set("Subflow Fwd Byts", fwd_bytes);
    f.set("Subflow Bwd Pkts", bwd_pkts);
    f.set("Subflow Bwd Byts", bwd_bytes);

    let mut window = || {
        if is_suspicious {
            f64::from(rng.gen_range(8000u32..32000))
        } else {
            65535.0
        }
    };
    let fwd_window = window();
    let bwd_window = window();
    f.set("Init Fwd Win Byts", fwd_window);
    f.set("Init Bwd Win Byts", bwd_window);

    f.set("Fwd Act Data Pkts", (fwd_pkts * 0.7).trunc());
    f.set("Fwd Seg Size Min", fwd_len * 0.5);

    let active = BASE_ACTIVE_US * if is_suspicious { 0.5 } else { 1.0 };
    f.set("Active Mean", active);
    f.set("Active Std", active * 0.3);
    f.set("Active Max", active * 1.5);
    f.set("Active Min", active * 0.5);

    let idle = BASE_IDLE_US * if is_suspicious { 2.0 } else { 1.0 };
    f.set("Idle Mean", idle);
    f.set("Idle Std", idle * 0.4);
    f.set("Idle Max", idle * 2.0);
    f.set("Idle Min", idle * 0.2);

    f
}

/// Population statistics over `fwd_count` packets of `fwd_len` bytes and
/// `bwd_count` packets of `bwd_len` bytes
#[derive(Debug, Clone, Copy, PartialEq)]
struct PacketLengthStats {
    min: f64,
    max: f64,
    mean: f64,
    variance: f64,
}

impl PacketLengthStats {
    fn from_population(fwd_len: f64, fwd_count: f64, bwd_len: f64, bwd_count: f64) -> Self {
        let n = fwd_count + bwd_count;
        if n == 0.0 {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                variance: 0.0,
            };
        }

        let present: Vec<f64> = [(fwd_len, fwd_count), (bwd_len, bwd_count)]
            .iter()
            .filter(|(_, count)| *count > 0.0)
            .map(|(len, _)| *len)
            .collect();
        let min = present.iter().copied().fold(f64::INFINITY, f64::min);
        let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mean = (fwd_len * fwd_count + bwd_len * bwd_count) / n;
        let variance =
            (fwd_count * (fwd_len - mean).powi(2) + bwd_count * (bwd_len - mean).powi(2)) / n;

        Self {
            min,
            max,
            mean,
            variance,
        }
    }
}
