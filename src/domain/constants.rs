/// Protocol version recorded in `humanklu_audit.json`.
pub const HKP_VERSION: &str = "1.1";

pub const PIPELINE_VERSION: &str = "HKP-1.1";

/// Matched case-insensitively against claim text.
pub const ABSENCE_PHRASES: [&str; 4] = [
    "no third-party audit",
    "no audit",
    "no evidence found",
    "no public audit",
];

pub const STRICT_RATIO_THRESHOLD: f64 = 0.75;
pub const STRICT_EVID_CAP: f64 = 6.5;
pub const MODERATE_RATIO_THRESHOLD: f64 = 0.60;
pub const MODERATE_EVID_CAP: f64 = 7.2;

/// Previous-hash value for the first ledger entry.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

pub const DIMENSION_CODES: [&str; 5] = ["EVID", "MECH", "INC", "RISK", "SPEC"];

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

pub const DEFAULT_TOPIC: &str = "General";
pub const DEFAULT_AUTHOR_MODEL: &str = "unknown";
pub const DEFAULT_CLAIM_CONFIDENCE: f64 = 0.5;

pub const EVIDENCE_FILE: &str = "evidence.json";
pub const SCI_SCORE_FILE: &str = "sci_score.json";
pub const REPORT_FILE: &str = "report.html";
pub const AUDIT_FILE: &str = "humanklu_audit.json";
pub const LEDGER_FILE: &str = "ledger.jsonl";
pub const SUMMARY_FILE: &str = "summary.json";
pub const SUMMARY_CSV_FILE: &str = "summary.csv";
