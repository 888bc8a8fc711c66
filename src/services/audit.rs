use crate::domain::constants::DEFAULT_AUTHOR_MODEL;
use crate::domain::models::{CertificationLevel, CertificationResult, ReportInput, ScoreResult};
use crate::error::HkResult;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Field order here is the canonical serialization order. Do not reorder.
#[derive(Serialize)]
struct CanonicalPayload<'a> {
    title: &'a str,
    topic: &'a str,
    author_model: &'a str,
    author_organization: Option<&'a str>,
    evid_raw: f64,
    evid_effective: f64,
    mech: f64,
    inc: f64,
    risk: f64,
    spec: f64,
    inferred_ratio: f64,
    hci: f64,
    certification_level: CertificationLevel,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn author_model(report: &ReportInput) -> &str {
    report
        .author
        .model_version
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(DEFAULT_AUTHOR_MODEL)
}

/// Compact JSON of report identity, scores and tier. Run ids and timestamps
/// are excluded so identical input always yields identical bytes.
pub fn canonical_payload(
    report: &ReportInput,
    score: &ScoreResult,
    cert: &CertificationResult,
) -> HkResult<String> {
    let payload = CanonicalPayload {
        title: &report.title,
        topic: &report.topic,
        author_model: author_model(report),
        author_organization: report.author.organization.as_deref(),
        evid_raw: score.evid_raw,
        evid_effective: score.evid_effective,
        mech: score.mech,
        inc: score.inc,
        risk: score.risk,
        spec: score.spec,
        inferred_ratio: score.inferred_ratio,
        hci: score.hci,
        certification_level: cert.level,
    };
    Ok(serde_json::to_string(&payload)?)
}

pub fn content_hash(
    report: &ReportInput,
    score: &ScoreResult,
    cert: &CertificationResult,
) -> HkResult<String> {
    Ok(sha256_hex(canonical_payload(report, score, cert)?.as_bytes()))
}
