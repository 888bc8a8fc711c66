use crate::domain::constants::{
    MODERATE_EVID_CAP, MODERATE_RATIO_THRESHOLD, STRICT_EVID_CAP, STRICT_RATIO_THRESHOLD,
};
use crate::domain::models::{ClassifiedClaim, Dimensions, EvidCeiling, EvidenceType, ScoreResult};

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Fraction of INFERRED claims, rounded to 4 places. An empty list is 1.0.
pub fn inferred_ratio(claims: &[ClassifiedClaim]) -> f64 {
    if claims.is_empty() {
        return 1.0;
    }
    let inferred = claims
        .iter()
        .filter(|c| c.evidence_type == EvidenceType::Inferred)
        .count();
    round_to(inferred as f64 / claims.len() as f64, 4)
}

/// Tightest applicable ceiling; thresholds are nested so at most one applies.
pub fn evid_ceiling(inferred_ratio: f64) -> Option<EvidCeiling> {
    if inferred_ratio > STRICT_RATIO_THRESHOLD {
        Some(EvidCeiling {
            cap: STRICT_EVID_CAP,
            ratio_threshold: STRICT_RATIO_THRESHOLD,
        })
    } else if inferred_ratio > MODERATE_RATIO_THRESHOLD {
        Some(EvidCeiling {
            cap: MODERATE_EVID_CAP,
            ratio_threshold: MODERATE_RATIO_THRESHOLD,
        })
    } else {
        None
    }
}

pub fn effective_evid(evid_raw: f64, ceiling: Option<EvidCeiling>) -> f64 {
    match ceiling {
        Some(c) => evid_raw.min(c.cap),
        None => evid_raw,
    }
}

/// Unweighted mean of the five effective dimension values, rounded to 2 places.
pub fn hci(evid_effective: f64, mech: f64, inc: f64, risk: f64, spec: f64) -> f64 {
    let values = [evid_effective, mech, inc, risk, spec];
    round_to(values.iter().sum::<f64>() / values.len() as f64, 2)
}

/// Derives the score result. Range validation is the caller's job; nothing is clamped here.
pub fn aggregate(claims: &[ClassifiedClaim], dimensions: &Dimensions) -> ScoreResult {
    let ratio = inferred_ratio(claims);
    let ceiling = evid_ceiling(ratio);
    let evid_raw = dimensions.evid.score;
    let evid_effective = effective_evid(evid_raw, ceiling);
    ScoreResult {
        evid_raw,
        evid_effective,
        mech: dimensions.mech.score,
        inc: dimensions.inc.score,
        risk: dimensions.risk.score,
        spec: dimensions.spec.score,
        inferred_ratio: ratio,
        hci: hci(
            evid_effective,
            dimensions.mech.score,
            dimensions.inc.score,
            dimensions.risk.score,
            dimensions.spec.score,
        ),
        ceiling,
    }
}
