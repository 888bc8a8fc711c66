use crate::domain::constants::ABSENCE_PHRASES;
use crate::domain::models::{AbsenceAssertionFlag, Claim, ClaimFlag, ClassifiedClaim};
use std::collections::BTreeSet;

/// First absence phrase contained in `text`, case-insensitively.
pub fn matched_absence_phrase(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    ABSENCE_PHRASES.iter().copied().find(|p| lower.contains(p))
}

/// Flags one claim in isolation. A source URI, verified or not, suppresses
/// the absence assertion.
pub fn classify_claim(claim: &Claim) -> ClassifiedClaim {
    let matched = matched_absence_phrase(&claim.text).filter(|_| claim.source_uri().is_none());
    let mut flags = BTreeSet::new();
    if matched.is_some() {
        flags.insert(ClaimFlag::AbsenceAssertion);
    }
    ClassifiedClaim {
        claim_id: claim.claim_id.clone(),
        evidence_type: claim.evidence_type,
        flags,
        matched_phrase: matched,
    }
}

pub fn classify_claims(claims: &[Claim]) -> Vec<ClassifiedClaim> {
    claims.iter().map(classify_claim).collect()
}

pub fn has_absence_assertion(classified: &[ClassifiedClaim]) -> bool {
    classified
        .iter()
        .any(|c| c.has_flag(ClaimFlag::AbsenceAssertion))
}

pub fn absence_assertion_flags(classified: &[ClassifiedClaim]) -> Vec<AbsenceAssertionFlag> {
    classified
        .iter()
        .filter_map(|c| {
            let phrase = c.matched_phrase?;
            Some(AbsenceAssertionFlag {
                claim_id: c.claim_id.clone(),
                flag_type: ClaimFlag::AbsenceAssertion,
                matched_phrase: phrase.to_string(),
                detail: "Claim asserts absence of evidence but provides no source URI.".to_string(),
            })
        })
        .collect()
}
