//! Packages engine results into the run documents. No decisions are made here;
//! field names and nesting are what the batch aggregator and the report
//! renderer read.

use crate::domain::constants::{HKP_VERSION, PIPELINE_VERSION};
use crate::domain::models::{
    ArtifactHashes, AuditRecord, Badge, CertificationLevel, Claim, ClassifiedClaim,
    EvidenceDocument, EvidenceEntry, ReportInput, SciScoreDocument, SciSummary, Source,
};
use crate::error::HkResult;
use crate::services::audit::sha256_hex;
use crate::services::pipeline::Assessment;

pub struct CertMeta {
    pub bg: &'static str,
    pub border: &'static str,
    pub text: &'static str,
    pub icon: &'static str,
}

pub fn cert_meta(level: CertificationLevel) -> CertMeta {
    match level {
        CertificationLevel::Institutional => CertMeta {
            bg: "#1A1200",
            border: "#D4AF37",
            text: "#D4AF37",
            icon: "🏛",
        },
        CertificationLevel::Pro => CertMeta {
            bg: "#0D2010",
            border: "#D4AF37",
            text: "#34D399",
            icon: "⭐",
        },
        CertificationLevel::Verified => CertMeta {
            bg: "#0D2010",
            border: "#34D399",
            text: "#34D399",
            icon: "✅",
        },
        CertificationLevel::Reviewed => CertMeta {
            bg: "#1A1500",
            border: "#FBBF24",
            text: "#FBBF24",
            icon: "🔍",
        },
        CertificationLevel::Rejected => CertMeta {
            bg: "#1A0A0A",
            border: "#F87171",
            text: "#F87171",
            icon: "❌",
        },
    }
}

/// Whole scores keep one decimal (`8.0`), others print as stored (`8.25`).
pub fn score_display(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

pub fn badge(level: CertificationLevel, hci: f64) -> Badge {
    let meta = cert_meta(level);
    Badge {
        label: level.as_str().to_string(),
        border_color: meta.border.to_string(),
        text_color: meta.text.to_string(),
        icon: meta.icon.to_string(),
        hci_display: format!("{}/10", score_display(hci)),
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(120).collect()
}

/// Input flags first, then any the classifier raised that are not already there.
fn entry_flags(claim: &Claim, classified: &ClassifiedClaim) -> Vec<String> {
    let mut flags = claim.claim_flags.clone();
    for f in &classified.flags {
        if !flags.iter().any(|x| x == f.as_str()) {
            flags.push(f.as_str().to_string());
        }
    }
    flags
}

pub fn build_evidence(
    report_id: &str,
    report: &ReportInput,
    a: &Assessment,
    now: &str,
) -> EvidenceDocument {
    let entries = report
        .claims
        .iter()
        .zip(&a.classified)
        .map(|(claim, classified)| EvidenceEntry {
            claim_id: claim.claim_id.clone(),
            claim_text: claim.text.clone(),
            evidence_type: claim.evidence_type,
            source: claim.source.clone().unwrap_or_else(|| Source {
                source_type: Some("MODEL_REASONING".to_string()),
                uri: None,
                title: Some("AI-generated inference".to_string()),
                retrieved_at: Some(now.to_string()),
                excerpt: Some(excerpt(&claim.text)),
            }),
            confidence: claim.confidence,
            claim_flags: entry_flags(claim, classified),
            notes: claim.notes.clone(),
        })
        .collect();
    EvidenceDocument {
        report_id: report_id.to_string(),
        generated_at: now.to_string(),
        pipeline_version: PIPELINE_VERSION.to_string(),
        inferred_ratio: a.score.inferred_ratio,
        entries,
    }
}

pub fn build_sci_score(
    report_id: &str,
    report: &ReportInput,
    a: &Assessment,
    now: &str,
) -> SciScoreDocument {
    SciScoreDocument {
        report_id: report_id.to_string(),
        generated_at: now.to_string(),
        pipeline_version: PIPELINE_VERSION.to_string(),
        dimensions: report.dimensions.to_map(),
        evid_raw: a.score.evid_raw,
        evid_effective: a.score.evid_effective,
        hci: a.score.hci,
        inferred_ratio: a.score.inferred_ratio,
        certification_level: a.certification.level,
        evid_ceiling_applied: a.score.ceiling_note(),
        flags: a.flags(report),
        hallucination_flags: report.hallucination_flags.clone(),
        absence_assertion_flags: a.absence_flags.clone(),
        reviewer: a.certification.reviewer,
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Bare report document with the certification badge. Styling belongs to the
/// external renderer; this only carries the data it needs.
pub fn render_report_html(report_id: &str, report: &ReportInput, a: &Assessment) -> String {
    let level = a.certification.level;
    let meta = cert_meta(level);
    let mut notices = String::new();
    if let Some(note) = a.score.ceiling_note() {
        notices.push_str(&format!(
            "<p class=\"notice\">EVID ceiling applied: {}</p>\n",
            escape_html(&note)
        ));
    }
    if !a.absence_flags.is_empty() {
        let ids: Vec<&str> = a.absence_flags.iter().map(|f| f.claim_id.as_str()).collect();
        notices.push_str(&format!(
            "<p class=\"notice\">Absence assertions detected: {}</p>\n",
            escape_html(&ids.join(", "))
        ));
    }
    if a.certification.reviewer.institutional_requires_two_reviews {
        notices.push_str(
            "<p class=\"notice\">HK-INSTITUTIONAL: two independent reviewers required.</p>\n",
        );
    } else if a.certification.reviewer.pro_requires_second_review {
        notices.push_str(
            "<p class=\"notice\">HK-PRO: second reviewer required before publication.</p>\n",
        );
    }

    let mut dims = String::new();
    for (code, d) in report.dimensions.iter() {
        let shown = if code == "EVID" {
            a.score.evid_effective
        } else {
            d.score
        };
        dims.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            code,
            score_display(shown)
        ));
    }

    let mut claims = String::new();
    for (claim, classified) in report.claims.iter().zip(&a.classified) {
        let flags: Vec<&str> = classified.flags.iter().map(|f| f.as_str()).collect();
        claims.push_str(&format!(
            "<li data-claim-id=\"{}\" data-evidence-type=\"{}\" data-flags=\"{}\">{}</li>\n",
            escape_html(&claim.claim_id),
            claim.evidence_type.as_str(),
            flags.join(" "),
            escape_html(&claim.text)
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{title} | HumanKlu</title>\n</head>\n<body>\n\
<header>\n<div class=\"cert-badge\" data-level=\"{level}\" style=\"background:{bg};border:2px solid {border};color:{text}\">{icon} {level} · HCI {hci}/10</div>\n\
<h1>{title}</h1>\n<p class=\"meta\">Topic: {topic} · Report: <code>{report_id}</code></p>\n</header>\n\
<section><h2>Summary</h2>\n<p>{summary}</p></section>\n\
<section><h2>Calibration</h2>\n{notices}<table class=\"dims\">\n{dims}</table></section>\n\
<section><h2>Claim Ledger</h2>\n<ul>\n{claims}</ul></section>\n\
<footer>HumanKlu {version}</footer>\n</body>\n</html>\n",
        title = escape_html(&report.title),
        level = level,
        bg = meta.bg,
        border = meta.border,
        text = meta.text,
        icon = meta.icon,
        hci = score_display(a.score.hci),
        topic = escape_html(&report.topic),
        report_id = escape_html(report_id),
        summary = escape_html(&report.summary),
        notices = notices,
        dims = dims,
        claims = claims,
        version = PIPELINE_VERSION,
    )
}

pub struct AuditInputs<'a> {
    pub audit_id: &'a str,
    pub report_id: &'a str,
    pub now: &'a str,
    pub canonical_payload_hash: String,
    pub artifact_hashes: ArtifactHashes,
}

pub fn build_audit(report: &ReportInput, a: &Assessment, inputs: AuditInputs) -> AuditRecord {
    AuditRecord {
        audit_id: inputs.audit_id.to_string(),
        report_id: inputs.report_id.to_string(),
        created_at: inputs.now.to_string(),
        hkp_version: HKP_VERSION.to_string(),
        pipeline_version: PIPELINE_VERSION.to_string(),
        canonical_payload_hash: inputs.canonical_payload_hash,
        artifact_hashes: inputs.artifact_hashes,
        sci_summary: SciSummary {
            evid: a.score.evid_raw,
            mech: a.score.mech,
            inc: a.score.inc,
            risk: a.score.risk,
            spec: a.score.spec,
            hci: a.score.hci,
        },
        evid_raw: a.score.evid_raw,
        evid_effective: a.score.evid_effective,
        inferred_ratio: a.score.inferred_ratio,
        certification_level: a.certification.level,
        matched_rule: a.certification.matched_rule.to_string(),
        evid_ceiling_applied: a.score.ceiling_note(),
        flags: a.flags(report),
        absence_assertion_flags: a.absence_flags.clone(),
        hallucination_flags: report.hallucination_flags.clone(),
        human_reviewer: None,
        badge: badge(a.certification.level, a.score.hci),
        reviewer: a.certification.reviewer,
    }
}

/// Serialized documents for one run, ready to be staged.
pub struct RunArtifacts {
    pub evidence_json: Vec<u8>,
    pub sci_score_json: Vec<u8>,
    pub report_html: Vec<u8>,
    pub audit_json: Vec<u8>,
    pub audit: AuditRecord,
}

pub fn assemble(
    report_id: &str,
    audit_id: &str,
    report: &ReportInput,
    a: &Assessment,
    now: &str,
) -> HkResult<RunArtifacts> {
    let evidence_json = serde_json::to_vec_pretty(&build_evidence(report_id, report, a, now))?;
    let sci_score_json = serde_json::to_vec_pretty(&build_sci_score(report_id, report, a, now))?;
    let report_html = render_report_html(report_id, report, a).into_bytes();

    let audit = build_audit(
        report,
        a,
        AuditInputs {
            audit_id,
            report_id,
            now,
            canonical_payload_hash: a.content_hash.clone(),
            artifact_hashes: ArtifactHashes {
                report_html: sha256_hex(&report_html),
                evidence_json: sha256_hex(&evidence_json),
                sci_score_json: sha256_hex(&sci_score_json),
            },
        },
    );
    let audit_json = serde_json::to_vec_pretty(&audit)?;

    Ok(RunArtifacts {
        evidence_json,
        sci_score_json,
        report_html,
        audit_json,
        audit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{pipeline, validation};
    use serde_json::{json, Value};

    fn report() -> ReportInput {
        validation::parse_report(
            &json!({
                "title": "Vendor <X> review",
                "summary": "Short & sharp",
                "dimensions": {
                    "EVID": {"score": 9.0, "rationale": "r"}, "MECH": {"score": 8.0},
                    "INC": {"score": 8.0}, "RISK": {"score": 8.0}, "SPEC": {"score": 8.0}
                },
                "claims": [
                    {"text": "Signed firmware", "evidence_type": "VERIFIED",
                     "source": {"type": "WEB", "uri": "https://example.com", "title": "Docs"}},
                    {"text": "There is no public audit", "evidence_type": "VERIFIED"}
                ]
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn evidence_document_shape() {
        let r = report();
        let a = pipeline::assess(&r).unwrap();
        let doc: Value = serde_json::to_value(build_evidence("HK-1", &r, &a, "t")).unwrap();
        assert_eq!(doc["inferred_ratio"], 0.0);
        assert_eq!(doc["entries"][0]["claim_flags"], json!([]));
        assert_eq!(doc["entries"][1]["claim_flags"], json!(["ABSENCE_ASSERTION"]));
        assert_eq!(doc["entries"][1]["source"]["type"], "MODEL_REASONING");
        assert_eq!(doc["entries"][1]["source"]["uri"], Value::Null);
        assert_eq!(doc["entries"][1]["evidence_type"], "VERIFIED");
    }

    #[test]
    fn sci_score_carries_raw_dimensions_and_flags() {
        let r = report();
        let a = pipeline::assess(&r).unwrap();
        let doc: Value = serde_json::to_value(build_sci_score("HK-1", &r, &a, "t")).unwrap();
        assert_eq!(doc["dimensions"]["EVID"]["score"], 9.0);
        assert_eq!(doc["evid_raw"], 9.0);
        assert_eq!(doc["evid_effective"], 9.0);
        assert_eq!(doc["certification_level"], "HK-REVIEWED");
        assert_eq!(doc["flags"], json!(["ABSENCE_ASSERTION"]));
        assert!(doc.get("pro_requires_second_review").is_none());
    }

    #[test]
    fn audit_has_protocol_version_and_hashes() {
        let r = report();
        let a = pipeline::assess(&r).unwrap();
        let arts = assemble("HK-1", "AUD-1", &r, &a, "t").unwrap();
        let doc: Value = serde_json::from_slice(&arts.audit_json).unwrap();
        assert_eq!(doc["hkp_version"], "1.1");
        assert_eq!(doc["canonical_payload_hash"], a.content_hash.as_str());
        assert_eq!(
            doc["artifact_hashes"]["evidence_json"],
            sha256_hex(&arts.evidence_json).as_str()
        );
        assert_eq!(doc["badge"]["label"], "HK-REVIEWED");
        assert_eq!(doc["badge"]["hci_display"], "8.2/10");
    }

    #[test]
    fn whole_scores_keep_one_decimal() {
        assert_eq!(score_display(8.0), "8.0");
        assert_eq!(score_display(8.25), "8.25");
        assert_eq!(badge(CertificationLevel::Pro, 9.0).hci_display, "9.0/10");
    }

    #[test]
    fn input_claim_flags_lead_the_entry() {
        let mut r = report();
        r.claims[1].claim_flags = vec!["NEEDS_FOLLOWUP".to_string()];
        r.claims[0].claim_flags = vec!["ABSENCE_ASSERTION".to_string()];
        let a = pipeline::assess(&r).unwrap();
        let doc: Value = serde_json::to_value(build_evidence("HK-1", &r, &a, "t")).unwrap();
        assert_eq!(
            doc["entries"][1]["claim_flags"],
            json!(["NEEDS_FOLLOWUP", "ABSENCE_ASSERTION"])
        );
        assert_eq!(doc["entries"][0]["claim_flags"], json!(["ABSENCE_ASSERTION"]));
    }

    #[test]
    fn html_escapes_and_embeds_badge() {
        let r = report();
        let a = pipeline::assess(&r).unwrap();
        let html = render_report_html("HK-1", &r, &a);
        assert!(html.contains("Vendor &lt;X&gt; review"));
        assert!(html.contains("Short &amp; sharp"));
        assert!(html.contains("data-level=\"HK-REVIEWED\""));
        assert!(html.contains("Absence assertions detected: CLM-002"));
        assert!(html.contains("<tr><td>MECH</td><td>8.0</td></tr>"));
    }
}
