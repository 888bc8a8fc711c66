//! End-to-end run: classify, score, certify, then record and publish.
//!
//! Ordering matters for the all-or-nothing guarantee. The ledger is opened and
//! verified before anything is written, the run folder is fully staged next, the
//! ledger entry is committed, and only then is the folder renamed into place.
//! Any failure before the commit leaves neither artifacts nor a ledger entry.

use crate::domain::constants::{AUDIT_FILE, EVIDENCE_FILE, REPORT_FILE, SCI_SCORE_FILE};
use crate::domain::models::{
    AbsenceAssertionFlag, CertificationResult, ClassifiedClaim, ReportInput, RunSummary,
    ScoreReport, ScoreResult,
};
use crate::error::HkResult;
use crate::services::ledger::{Ledger, LedgerDraft};
use crate::services::{artifacts, audit, certification, classifier, ids, scoring, storage};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Engine output for one report, before anything touches disk.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub classified: Vec<ClassifiedClaim>,
    pub score: ScoreResult,
    pub certification: CertificationResult,
    pub absence_flags: Vec<AbsenceAssertionFlag>,
    pub content_hash: String,
}

impl Assessment {
    /// One `ABSENCE_ASSERTION` per flagged claim, then `HALLUCINATION_DETECTED`.
    pub fn flags(&self, report: &ReportInput) -> Vec<String> {
        let mut out: Vec<String> = self
            .absence_flags
            .iter()
            .map(|f| f.flag_type.as_str().to_string())
            .collect();
        if !report.hallucination_flags.is_empty() {
            out.push("HALLUCINATION_DETECTED".to_string());
        }
        out
    }
}

pub fn assess(report: &ReportInput) -> HkResult<Assessment> {
    let classified = classifier::classify_claims(&report.claims);
    let absence_flags = classifier::absence_assertion_flags(&classified);
    let score = scoring::aggregate(&classified, &report.dimensions);
    debug!(
        claims = classified.len(),
        inferred_ratio = score.inferred_ratio,
        evid_raw = score.evid_raw,
        evid_effective = score.evid_effective,
        hci = score.hci,
        "scored"
    );
    if let Some(note) = score.ceiling_note() {
        info!("{}", note);
    }
    if !absence_flags.is_empty() {
        warn!(count = absence_flags.len(), "absence assertions without a source");
    }

    let certification = certification::certify(
        &score,
        !report.hallucination_flags.is_empty(),
        classifier::has_absence_assertion(&classified),
    );
    debug!(
        level = %certification.level,
        rule = certification.matched_rule,
        "certified"
    );
    let content_hash = audit::content_hash(report, &score, &certification)?;

    Ok(Assessment {
        classified,
        score,
        certification,
        absence_flags,
        content_hash,
    })
}

/// Dry run for the `score` command. No ids, no files, no ledger.
pub fn score_report(report: &ReportInput) -> HkResult<ScoreReport> {
    let a = assess(report)?;
    Ok(ScoreReport {
        title: report.title.clone(),
        claims: report.claims.len(),
        inferred_ratio: a.score.inferred_ratio,
        evid_raw: a.score.evid_raw,
        evid_effective: a.score.evid_effective,
        hci: a.score.hci,
        certification_level: a.certification.level,
        matched_rule: a.certification.matched_rule.to_string(),
        evid_ceiling_applied: a.score.ceiling_note(),
        flags: a.flags(report),
        reviewer: a.certification.reviewer,
    })
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub run_id: Option<String>,
    pub overwrite: bool,
}

pub fn run_report(
    report: &ReportInput,
    output: &Path,
    ledger_path: &Path,
    opts: &RunOptions,
) -> HkResult<RunSummary> {
    let ledger = Ledger::open(ledger_path)?;
    debug!(
        ledger = %ledger.path().display(),
        entries = ledger.entries().len(),
        head = ledger.head_hash(),
        "ledger opened"
    );
    let a = assess(report)?;

    let report_id = opts.run_id.clone().unwrap_or_else(ids::report_id);
    let audit_id = ids::audit_id();
    let now = ids::now_rfc3339();
    let docs = artifacts::assemble(&report_id, &audit_id, report, &a, &now)?;

    let staged = storage::stage_run(
        output,
        &[
            (EVIDENCE_FILE, docs.evidence_json.as_slice()),
            (SCI_SCORE_FILE, docs.sci_score_json.as_slice()),
            (REPORT_FILE, docs.report_html.as_slice()),
            (AUDIT_FILE, docs.audit_json.as_slice()),
        ],
        opts.overwrite,
    )?;

    let entry = ledger.append(LedgerDraft {
        report_id: report_id.clone(),
        audit_id: docs.audit.audit_id.clone(),
        certification_level: a.certification.level,
        hci: a.score.hci,
        evid_effective: a.score.evid_effective,
        inferred_ratio: a.score.inferred_ratio,
        author_model: audit::author_model(report).to_string(),
    })?;
    let run_dir = staged.publish()?;

    info!(
        report_id = %report_id,
        level = %a.certification.level,
        hci = a.score.hci,
        run_dir = %run_dir.display(),
        "run published"
    );
    Ok(RunSummary {
        report_id,
        certification_level: a.certification.level,
        hci: a.score.hci,
        evid_raw: a.score.evid_raw,
        evid_effective: a.score.evid_effective,
        inferred_ratio: a.score.inferred_ratio,
        flags: a.flags(report),
        run_dir: run_dir.display().to_string(),
        ledger_path: ledger_path.display().to_string(),
        chain_hash: entry.chain_hash,
    })
}

/// Convenience for callers holding a path rather than a parsed report.
pub fn run_file(
    input: &Path,
    output: &Path,
    ledger_path: &Path,
    opts: &RunOptions,
) -> HkResult<RunSummary> {
    let report = crate::services::validation::load_report(input)?;
    run_report(&report, output, ledger_path, opts)
}

pub fn default_run_dir(output_root: &Path, stem: &str) -> PathBuf {
    output_root.join("runs").join(stem)
}
