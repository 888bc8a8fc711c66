//! Certification tier resolution.
//!
//! Rules are an ordered table evaluated top-down; the first match wins. The
//! rejection gate sits first so hallucinations and floor scores disqualify a
//! report before any tier is considered.

use crate::domain::models::{CertificationLevel, CertificationResult, ReviewerFlags, ScoreResult};

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub score: &'a ScoreResult,
    pub has_hallucination: bool,
    pub has_absence_assertion: bool,
}

pub struct CertificationRule {
    pub name: &'static str,
    pub level: CertificationLevel,
    pub reviewer: ReviewerFlags,
    pub predicate: fn(&RuleInput) -> bool,
}

const NO_REVIEW: ReviewerFlags = ReviewerFlags {
    institutional_requires_two_reviews: false,
    pro_requires_second_review: false,
};

fn rejected(i: &RuleInput) -> bool {
    i.has_hallucination || i.score.evid_effective < 6.0 || i.score.hci < 5.5
}

fn institutional(i: &RuleInput) -> bool {
    let s = i.score;
    s.hci >= 8.5
        && s.evid_effective >= 8.2
        && s.inferred_ratio <= 0.40
        && s.spec >= 7.5
        && !i.has_hallucination
        && !i.has_absence_assertion
}

fn pro(i: &RuleInput) -> bool {
    let s = i.score;
    s.hci >= 7.8
        && s.evid_effective >= 7.6
        && s.inferred_ratio <= 0.50
        && s.spec >= 7.0
        && !i.has_absence_assertion
}

fn verified(i: &RuleInput) -> bool {
    let s = i.score;
    s.hci >= 7.3
        && s.evid_effective >= 7.2
        && s.inferred_ratio <= 0.60
        && s.spec >= 6.5
        && !i.has_absence_assertion
}

fn reviewed(i: &RuleInput) -> bool {
    i.score.hci >= 6.0 && i.score.evid_effective >= 6.0
}

fn always(_: &RuleInput) -> bool {
    true
}

pub static RULES: [CertificationRule; 6] = [
    CertificationRule {
        name: "reject-gate",
        level: CertificationLevel::Rejected,
        reviewer: NO_REVIEW,
        predicate: rejected,
    },
    CertificationRule {
        name: "institutional",
        level: CertificationLevel::Institutional,
        reviewer: ReviewerFlags {
            institutional_requires_two_reviews: true,
            pro_requires_second_review: false,
        },
        predicate: institutional,
    },
    CertificationRule {
        name: "pro",
        level: CertificationLevel::Pro,
        reviewer: ReviewerFlags {
            institutional_requires_two_reviews: false,
            pro_requires_second_review: true,
        },
        predicate: pro,
    },
    CertificationRule {
        name: "verified",
        level: CertificationLevel::Verified,
        reviewer: NO_REVIEW,
        predicate: verified,
    },
    CertificationRule {
        name: "reviewed",
        level: CertificationLevel::Reviewed,
        reviewer: NO_REVIEW,
        predicate: reviewed,
    },
    CertificationRule {
        name: "reviewed-default",
        level: CertificationLevel::Reviewed,
        reviewer: NO_REVIEW,
        predicate: always,
    },
];

pub fn certify(
    score: &ScoreResult,
    has_hallucination: bool,
    has_absence_assertion: bool,
) -> CertificationResult {
    let input = RuleInput {
        score,
        has_hallucination,
        has_absence_assertion,
    };
    let rule = RULES
        .iter()
        .find(|r| (r.predicate)(&input))
        .unwrap_or(&RULES[RULES.len() - 1]);
    CertificationResult {
        level: rule.level,
        reviewer: rule.reviewer,
        matched_rule: rule.name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn score(evid_effective: f64, hci: f64, inferred_ratio: f64, spec: f64) -> ScoreResult {
        ScoreResult {
            evid_raw: evid_effective,
            evid_effective,
            mech: hci,
            inc: hci,
            risk: hci,
            spec,
            inferred_ratio,
            hci,
            ceiling: None,
        }
    }

    #[test]
    fn each_rule_matches_its_own_tier() {
        let cases = [
            (score(5.9, 9.0, 0.0, 9.0), "reject-gate", CertificationLevel::Rejected),
            (score(9.0, 9.0, 0.2, 8.0), "institutional", CertificationLevel::Institutional),
            (score(8.0, 8.0, 0.5, 7.0), "pro", CertificationLevel::Pro),
            (score(7.2, 7.3, 0.6, 6.5), "verified", CertificationLevel::Verified),
            (score(6.0, 6.0, 1.0, 1.0), "reviewed", CertificationLevel::Reviewed),
            (score(6.0, 5.5, 1.0, 1.0), "reviewed-default", CertificationLevel::Reviewed),
        ];
        for (s, rule, level) in cases {
            let c = certify(&s, false, false);
            assert_eq!(c.matched_rule, rule);
            assert_eq!(c.level, level);
        }
    }

    #[test]
    fn hallucination_beats_institutional_metrics() {
        let c = certify(&score(9.5, 9.5, 0.0, 9.5), true, false);
        assert_eq!(c.level, CertificationLevel::Rejected);
        assert_eq!(c.reviewer, ReviewerFlags::default());
    }

    #[test]
    fn absence_assertion_blocks_upper_tiers_only() {
        let c = certify(&score(9.5, 9.5, 0.0, 9.5), false, true);
        assert_eq!(c.level, CertificationLevel::Reviewed);
        assert_eq!(c.matched_rule, "reviewed");
    }

    #[test]
    fn reviewer_flags_follow_tier() {
        let inst = certify(&score(9.0, 9.0, 0.2, 8.0), false, false);
        assert!(inst.reviewer.institutional_requires_two_reviews);
        assert!(!inst.reviewer.pro_requires_second_review);

        let pro = certify(&score(8.0, 8.0, 0.5, 7.0), false, false);
        assert!(pro.reviewer.pro_requires_second_review);
        assert!(!pro.reviewer.institutional_requires_two_reviews);

        let ver = certify(&score(7.2, 7.3, 0.6, 6.5), false, false);
        assert_eq!(ver.reviewer, ReviewerFlags::default());
    }

    #[test]
    fn floors_reject() {
        assert_eq!(
            certify(&score(6.0, 5.49, 0.0, 9.0), false, false).level,
            CertificationLevel::Rejected
        );
        assert_eq!(
            certify(&score(5.99, 9.0, 0.0, 9.0), false, false).level,
            CertificationLevel::Rejected
        );
    }

    #[test]
    fn institutional_misses_fall_to_pro() {
        // hci 8.2 < 8.5
        let c = certify(&score(9.0, 8.2, 0.0, 8.0), false, false);
        assert_eq!(c.level, CertificationLevel::Pro);
    }

    proptest! {
        #[test]
        fn certification_is_total_and_deterministic(
            evid in 0.0f64..=10.0,
            hci in 0.0f64..=10.0,
            ratio in 0.0f64..=1.0,
            spec in 0.0f64..=10.0,
            halluc in any::<bool>(),
            absence in any::<bool>(),
        ) {
            let s = score(evid, hci, ratio, spec);
            let first = certify(&s, halluc, absence);
            let second = certify(&s, halluc, absence);
            prop_assert_eq!(first, second);
            prop_assert!(CertificationLevel::ALL.contains(&first.level));
            if halluc {
                prop_assert_eq!(first.level, CertificationLevel::Rejected);
            }
        }
    }
}
