use crate::domain::constants::{
    DEFAULT_CLAIM_CONFIDENCE, DEFAULT_TOPIC, DIMENSION_CODES, SCORE_MAX, SCORE_MIN,
};
use crate::domain::models::{
    Author, Claim, DimensionScore, Dimensions, EvidenceType, ReportInput, Source,
};
use crate::error::{HkError, HkResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawDimension {
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    rationale: String,
}

#[derive(Debug, Deserialize)]
struct RawClaim {
    #[serde(default)]
    claim_id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    evidence_type: EvidenceType,
    #[serde(default)]
    source: Option<Source>,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    claim_flags: Vec<String>,
    #[serde(default)]
    notes: String,
}

pub fn load_report(path: &Path) -> HkResult<ReportInput> {
    let raw = std::fs::read_to_string(path).map_err(|e| HkError::io(path, e))?;
    parse_report(&raw)
}

/// Parses and validates a report document. Every failure names the offending field.
pub fn parse_report(raw: &str) -> HkResult<ReportInput> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| HkError::validation("<document>", e.to_string()))?;
    let Value::Object(mut doc) = value else {
        return Err(HkError::validation("<document>", "expected a JSON object"));
    };

    let title = take_string(&mut doc, "title")?
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| HkError::validation("title", "required and must be non-empty"))?;
    let topic = take_string(&mut doc, "topic")?
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
    let summary = take_string(&mut doc, "summary")?.unwrap_or_default();

    let author = match doc.remove("author") {
        None | Some(Value::Null) => Author::default(),
        Some(v) => serde_json::from_value(v)
            .map_err(|e| HkError::validation("author", e.to_string()))?,
    };

    let mut dims = match doc.remove("dimensions") {
        None | Some(Value::Null) => return Err(HkError::validation("dimensions", "required")),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(HkError::validation(
                "dimensions",
                format!("expected an object, got {}", kind(&other)),
            ))
        }
    };
    let dimensions = Dimensions {
        evid: take_dimension(&mut dims, DIMENSION_CODES[0])?,
        mech: take_dimension(&mut dims, DIMENSION_CODES[1])?,
        inc: take_dimension(&mut dims, DIMENSION_CODES[2])?,
        risk: take_dimension(&mut dims, DIMENSION_CODES[3])?,
        spec: take_dimension(&mut dims, DIMENSION_CODES[4])?,
    };
    if let Some(extra) = dims.keys().next() {
        return Err(HkError::validation(
            format!("dimensions.{}", extra),
            format!("unknown dimension code (expected {})", DIMENSION_CODES.join(", ")),
        ));
    }

    let hallucination_flags = take_array(&mut doc, "hallucination_flags")?
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::String(s) => Ok(s),
            other => Err(HkError::validation(
                format!("hallucination_flags[{}]", i),
                format!("expected a string, got {}", kind(&other)),
            )),
        })
        .collect::<HkResult<Vec<_>>>()?;

    let claims = take_array(&mut doc, "claims")?
        .into_iter()
        .enumerate()
        .map(|(i, v)| parse_claim(i, v))
        .collect::<HkResult<Vec<_>>>()?;

    Ok(ReportInput {
        title,
        topic,
        summary,
        author,
        dimensions,
        hallucination_flags,
        claims,
    })
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Missing and `null` are both `None`.
fn take_string(doc: &mut Map<String, Value>, field: &str) -> HkResult<Option<String>> {
    match doc.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(HkError::validation(
            field,
            format!("expected a string, got {}", kind(&other)),
        )),
    }
}

fn take_array(doc: &mut Map<String, Value>, field: &str) -> HkResult<Vec<Value>> {
    match doc.remove(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(HkError::validation(
            field,
            format!("expected an array, got {}", kind(&other)),
        )),
    }
}

fn take_dimension(dims: &mut Map<String, Value>, code: &str) -> HkResult<DimensionScore> {
    let field = format!("dimensions.{}", code);
    let value = dims
        .remove(code)
        .ok_or_else(|| HkError::validation(&field, "required dimension missing"))?;
    let raw: RawDimension =
        serde_json::from_value(value).map_err(|e| HkError::validation(&field, e.to_string()))?;
    let score = raw
        .score
        .ok_or_else(|| HkError::validation(format!("{}.score", field), "required"))?;
    if !score.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&score) {
        return Err(HkError::validation(
            format!("{}.score", field),
            format!("{} is outside [{}, {}]", score, SCORE_MIN, SCORE_MAX),
        ));
    }
    Ok(DimensionScore {
        score,
        rationale: raw.rationale,
    })
}

fn parse_claim(index: usize, value: Value) -> HkResult<Claim> {
    let field = format!("claims[{}]", index);
    let raw: RawClaim =
        serde_json::from_value(value).map_err(|e| HkError::validation(&field, e.to_string()))?;
    let text = raw.text.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
        HkError::validation(format!("{}.text", field), "required and must be non-empty")
    })?;
    let confidence = raw.confidence.unwrap_or(DEFAULT_CLAIM_CONFIDENCE);
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(HkError::validation(
            format!("{}.confidence", field),
            format!("{} is outside [0, 1]", confidence),
        ));
    }
    Ok(Claim {
        claim_id: raw
            .claim_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("CLM-{:03}", index + 1)),
        text,
        evidence_type: raw.evidence_type,
        source: raw.source,
        source_url: raw.source_url,
        confidence,
        claim_flags: raw.claim_flags,
        notes: raw.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Value {
        json!({
            "title": "Vendor X security posture",
            "author": {"model_version": "model-a", "organization": "Acme"},
            "dimensions": {
                "EVID": {"score": 8.0, "rationale": "sourced"},
                "MECH": {"score": 7.0},
                "INC":  {"score": 7.0},
                "RISK": {"score": 7.0},
                "SPEC": {"score": 7.0}
            },
            "claims": [
                {"text": "Vendor publishes a SOC2 report", "evidence_type": "VERIFIED",
                 "source": {"type": "WEB", "uri": "https://example.com/soc2", "title": "SOC2"}},
                {"text": "Pricing is likely usage based"}
            ]
        })
    }

    fn err_field(v: Value) -> String {
        match parse_report(&v.to_string()) {
            Err(HkError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn parses_defaults_and_assigns_claim_ids() {
        let r = parse_report(&base().to_string()).unwrap();
        assert_eq!(r.topic, "General");
        assert_eq!(r.claims[0].claim_id, "CLM-001");
        assert_eq!(r.claims[1].claim_id, "CLM-002");
        assert_eq!(r.claims[1].evidence_type, EvidenceType::Inferred);
        assert_eq!(r.claims[1].confidence, 0.5);
        assert_eq!(r.dimensions.evid.rationale, "sourced");
        assert_eq!(r.author.organization.as_deref(), Some("Acme"));
    }

    #[test]
    fn out_of_range_score_names_the_dimension() {
        let mut v = base();
        v["dimensions"]["RISK"]["score"] = json!(10.5);
        assert_eq!(err_field(v), "dimensions.RISK.score");
    }

    #[test]
    fn boundary_scores_are_accepted() {
        let mut v = base();
        v["dimensions"]["MECH"]["score"] = json!(0.0);
        v["dimensions"]["INC"]["score"] = json!(10.0);
        assert!(parse_report(&v.to_string()).is_ok());
    }

    #[test]
    fn missing_dimension_and_title_are_reported() {
        let mut v = base();
        v["dimensions"].as_object_mut().unwrap().remove("SPEC");
        assert_eq!(err_field(v), "dimensions.SPEC");

        let mut v = base();
        v.as_object_mut().unwrap().remove("title");
        assert_eq!(err_field(v), "title");

        let mut v = base();
        v.as_object_mut().unwrap().remove("dimensions");
        assert_eq!(err_field(v), "dimensions");
    }

    #[test]
    fn malformed_claim_is_reported_by_index() {
        let mut v = base();
        v["claims"][1]["evidence_type"] = json!("GUESSED");
        assert_eq!(err_field(v), "claims[1]");

        let mut v = base();
        v["claims"][0]["text"] = json!("  ");
        assert_eq!(err_field(v), "claims[0].text");
    }

    #[test]
    fn unknown_dimension_code_is_rejected() {
        let mut v = base();
        v["dimensions"]["VIBE"] = json!({"score": 5.0});
        assert_eq!(err_field(v), "dimensions.VIBE");
    }

    #[test]
    fn mistyped_top_level_fields_are_named() {
        let cases = [
            ("title", json!(5)),
            ("topic", json!(["a"])),
            ("summary", json!({"text": "x"})),
            ("hallucination_flags", json!("x")),
            ("claims", json!({"text": "x"})),
            ("dimensions", json!([1, 2])),
        ];
        for (field, bad) in cases {
            let mut v = base();
            v[field] = bad;
            assert_eq!(err_field(v), field);
        }

        let mut v = base();
        v["hallucination_flags"] = json!(["ok", 3]);
        assert_eq!(err_field(v), "hallucination_flags[1]");
    }

    #[test]
    fn null_optional_fields_take_defaults() {
        let mut v = base();
        v["topic"] = Value::Null;
        v["summary"] = Value::Null;
        v["claims"] = Value::Null;
        let r = parse_report(&v.to_string()).unwrap();
        assert_eq!(r.topic, "General");
        assert!(r.summary.is_empty() && r.claims.is_empty());
    }

    #[test]
    fn input_claim_flags_are_kept() {
        let mut v = base();
        v["claims"][1]["claim_flags"] = json!(["NEEDS_FOLLOWUP"]);
        let r = parse_report(&v.to_string()).unwrap();
        assert_eq!(r.claims[1].claim_flags, vec!["NEEDS_FOLLOWUP".to_string()]);
        assert!(r.claims[0].claim_flags.is_empty());
    }

    #[test]
    fn invalid_json_is_a_document_error() {
        assert!(matches!(
            parse_report("{not json"),
            Err(HkError::Validation { ref field, .. }) if field == "<document>"
        ));
        assert_eq!(err_field(json!([1, 2])), "<document>");
    }
}
