use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub general: ConfigGeneral,
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfigGeneral {
    #[serde(default)]
    pub ledger_path: Option<String>,
    #[serde(default)]
    pub overwrite_runs: bool,
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A validated report. Built once by `services::validation` and never mutated.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub title: String,
    pub topic: String,
    pub summary: String,
    pub author: Author,
    pub dimensions: Dimensions,
    pub hallucination_flags: Vec<String>,
    pub claims: Vec<Claim>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Author {
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DimensionScore {
    pub score: f64,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dimensions {
    pub evid: DimensionScore,
    pub mech: DimensionScore,
    pub inc: DimensionScore,
    pub risk: DimensionScore,
    pub spec: DimensionScore,
}

impl Dimensions {
    pub fn iter(&self) -> [(&'static str, &DimensionScore); 5] {
        [
            ("EVID", &self.evid),
            ("MECH", &self.mech),
            ("INC", &self.inc),
            ("RISK", &self.risk),
            ("SPEC", &self.spec),
        ]
    }

    pub fn to_map(&self) -> BTreeMap<&'static str, DimensionScore> {
        self.iter()
            .into_iter()
            .map(|(code, d)| (code, d.clone()))
            .collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceType {
    Verified,
    #[default]
    Inferred,
}

impl EvidenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::Verified => "VERIFIED",
            EvidenceType::Inferred => "INFERRED",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Source {
    #[serde(rename = "type", default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub claim_id: String,
    pub text: String,
    pub evidence_type: EvidenceType,
    pub source: Option<Source>,
    /// Legacy top-level URI field, consulted when `source.uri` is absent.
    pub source_url: Option<String>,
    pub confidence: f64,
    /// Flags supplied with the input claim, carried into the evidence entry.
    pub claim_flags: Vec<String>,
    pub notes: String,
}

impl Claim {
    /// Empty strings count as no URI.
    pub fn source_uri(&self) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|s| s.uri.as_deref())
            .or(self.source_url.as_deref())
            .filter(|u| !u.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Derived results
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClaimFlag {
    #[serde(rename = "ABSENCE_ASSERTION")]
    AbsenceAssertion,
}

impl ClaimFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimFlag::AbsenceAssertion => "ABSENCE_ASSERTION",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedClaim {
    pub claim_id: String,
    pub evidence_type: EvidenceType,
    pub flags: BTreeSet<ClaimFlag>,
    pub matched_phrase: Option<&'static str>,
}

impl ClassifiedClaim {
    pub fn has_flag(&self, flag: ClaimFlag) -> bool {
        self.flags.contains(&flag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvidCeiling {
    pub cap: f64,
    pub ratio_threshold: f64,
}

impl EvidCeiling {
    pub fn note(&self, inferred_ratio: f64) -> String {
        format!(
            "EVID capped at {} (inferred_ratio={:.4} > {:.2})",
            self.cap, inferred_ratio, self.ratio_threshold
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub evid_raw: f64,
    pub evid_effective: f64,
    pub mech: f64,
    pub inc: f64,
    pub risk: f64,
    pub spec: f64,
    pub inferred_ratio: f64,
    pub hci: f64,
    pub ceiling: Option<EvidCeiling>,
}

impl ScoreResult {
    pub fn ceiling_note(&self) -> Option<String> {
        self.ceiling.map(|c| c.note(self.inferred_ratio))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CertificationLevel {
    #[serde(rename = "HK-INSTITUTIONAL")]
    Institutional,
    #[serde(rename = "HK-PRO")]
    Pro,
    #[serde(rename = "HK-VERIFIED")]
    Verified,
    #[serde(rename = "HK-REVIEWED")]
    Reviewed,
    #[serde(rename = "HK-REJECTED")]
    Rejected,
}

impl CertificationLevel {
    /// Highest tier first.
    pub const ALL: [CertificationLevel; 5] = [
        CertificationLevel::Institutional,
        CertificationLevel::Pro,
        CertificationLevel::Verified,
        CertificationLevel::Reviewed,
        CertificationLevel::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CertificationLevel::Institutional => "HK-INSTITUTIONAL",
            CertificationLevel::Pro => "HK-PRO",
            CertificationLevel::Verified => "HK-VERIFIED",
            CertificationLevel::Reviewed => "HK-REVIEWED",
            CertificationLevel::Rejected => "HK-REJECTED",
        }
    }
}

impl fmt::Display for CertificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReviewerFlags {
    #[serde(skip_serializing_if = "is_false")]
    pub institutional_requires_two_reviews: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub pro_requires_second_review: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertificationResult {
    pub level: CertificationLevel,
    pub reviewer: ReviewerFlags,
    pub matched_rule: &'static str,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AbsenceAssertionFlag {
    pub claim_id: String,
    pub flag_type: ClaimFlag,
    pub matched_phrase: String,
    pub detail: String,
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Clone)]
pub struct EvidenceEntry {
    pub claim_id: String,
    pub claim_text: String,
    pub evidence_type: EvidenceType,
    pub source: Source,
    pub confidence: f64,
    pub claim_flags: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct EvidenceDocument {
    pub report_id: String,
    pub generated_at: String,
    pub pipeline_version: String,
    pub inferred_ratio: f64,
    pub entries: Vec<EvidenceEntry>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SciScoreDocument {
    pub report_id: String,
    pub generated_at: String,
    pub pipeline_version: String,
    pub dimensions: BTreeMap<&'static str, DimensionScore>,
    pub evid_raw: f64,
    pub evid_effective: f64,
    pub hci: f64,
    pub inferred_ratio: f64,
    pub certification_level: CertificationLevel,
    pub evid_ceiling_applied: Option<String>,
    pub flags: Vec<String>,
    pub hallucination_flags: Vec<String>,
    pub absence_assertion_flags: Vec<AbsenceAssertionFlag>,
    #[serde(flatten)]
    pub reviewer: ReviewerFlags,
}

#[derive(Debug, Serialize, Clone)]
pub struct ArtifactHashes {
    pub report_html: String,
    pub evidence_json: String,
    pub sci_score_json: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "UPPERCASE")]
pub struct SciSummary {
    pub evid: f64,
    pub mech: f64,
    pub inc: f64,
    pub risk: f64,
    pub spec: f64,
    pub hci: f64,
}

#[derive(Debug, Serialize, Clone)]
pub struct Badge {
    pub label: String,
    pub border_color: String,
    pub text_color: String,
    pub icon: String,
    pub hci_display: String,
}

/// Tamper-evident snapshot of one run, written as `humanklu_audit.json`.
#[derive(Debug, Serialize, Clone)]
pub struct AuditRecord {
    pub audit_id: String,
    pub report_id: String,
    pub created_at: String,
    pub hkp_version: String,
    pub pipeline_version: String,
    pub canonical_payload_hash: String,
    pub artifact_hashes: ArtifactHashes,
    pub sci_summary: SciSummary,
    pub evid_raw: f64,
    pub evid_effective: f64,
    pub inferred_ratio: f64,
    pub certification_level: CertificationLevel,
    pub matched_rule: String,
    pub evid_ceiling_applied: Option<String>,
    pub flags: Vec<String>,
    pub absence_assertion_flags: Vec<AbsenceAssertionFlag>,
    pub hallucination_flags: Vec<String>,
    pub human_reviewer: Option<String>,
    pub badge: Badge,
    #[serde(flatten)]
    pub reviewer: ReviewerFlags,
}

/// One line of `ledger.jsonl`. Field order is the canonical hashing order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LedgerEntry {
    pub entry_id: String,
    pub timestamp: String,
    pub report_id: String,
    pub audit_id: String,
    pub event_type: String,
    pub certification_level: CertificationLevel,
    pub hci: f64,
    pub evid_effective: f64,
    pub inferred_ratio: f64,
    pub author_model: String,
    pub human_reviewer: Option<String>,
    pub notes: String,
    pub prev_entry_id: Option<String>,
    pub prev_chain_hash: String,
    pub chain_hash: String,
}

// ---------------------------------------------------------------------------
// Command output
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Clone)]
pub struct ScoreReport {
    pub title: String,
    pub claims: usize,
    pub inferred_ratio: f64,
    pub evid_raw: f64,
    pub evid_effective: f64,
    pub hci: f64,
    pub certification_level: CertificationLevel,
    pub matched_rule: String,
    pub evid_ceiling_applied: Option<String>,
    pub flags: Vec<String>,
    #[serde(flatten)]
    pub reviewer: ReviewerFlags,
}

#[derive(Debug, Serialize, Clone)]
pub struct RunSummary {
    pub report_id: String,
    pub certification_level: CertificationLevel,
    pub hci: f64,
    pub evid_raw: f64,
    pub evid_effective: f64,
    pub inferred_ratio: f64,
    pub flags: Vec<String>,
    pub run_dir: String,
    pub ledger_path: String,
    pub chain_hash: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct BatchRunRecord {
    pub run_id: String,
    pub input_file: String,
    pub title: String,
    pub report_id: Option<String>,
    pub certification_level: String,
    pub hci: Option<f64>,
    pub evid_effective: Option<f64>,
    pub inferred_ratio: Option<f64>,
    pub flags: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct BatchSummary {
    pub total_runs: usize,
    pub counts_by_level: BTreeMap<String, usize>,
    pub avg_hci: Option<f64>,
    pub avg_evid_effective: Option<f64>,
    pub avg_inferred_ratio: Option<f64>,
    pub runs: Vec<BatchRunRecord>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChainVerification {
    pub valid: bool,
    pub total_entries: usize,
    pub verified_entries: usize,
    pub first_invalid_index: Option<usize>,
    pub error_message: Option<String>,
    pub head_hash: String,
}
