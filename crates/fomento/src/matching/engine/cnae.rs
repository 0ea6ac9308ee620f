use super::{preview_list, MatchReason};
use crate::matching::domain::{division_of, CnaeEntry};

/// Tier reached when classifying a company's activity codes against a
/// call's accepted/excluded lists. Evaluated in declaration order; the
/// first applicable tier wins and no further CNAE scoring happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CnaeTier {
    /// A company code appears on the excluded-activities list. Hard
    /// disqualification.
    Excluded,
    /// The call accepts every activity.
    Unrestricted,
    /// The call restricts CNAEs but the company declared none.
    MissingCompanyData,
    PrimaryExact,
    SecondaryExact,
    /// No exact hit, but an accepted code shares a division (the prefix
    /// before the first `.`) with a company code.
    DivisionOverlap,
    NoMatch,
}

/// Contribution of the CNAE factor to the overall score.
#[derive(Debug, Clone)]
pub struct CnaeAssessment {
    pub tier: CnaeTier,
    pub delta: i32,
    pub reason: Option<MatchReason>,
}

/// Classify company activity codes against a grant's CNAE rules.
///
/// Exact membership is the strongest evidence, a shared division is weak
/// evidence, and a miss after an explicit accepted list is a strong
/// negative signal without being an automatic disqualification. Only the
/// excluded list disqualifies outright.
pub fn classify_cnae(
    cnaes: &[CnaeEntry],
    accepted: Option<&[String]>,
    excluded: Option<&[String]>,
) -> CnaeAssessment {
    if let Some(excluded) = excluded {
        if cnaes.iter().any(|entry| excluded.contains(&entry.code)) {
            return CnaeAssessment {
                tier: CnaeTier::Excluded,
                delta: -50,
                reason: Some(MatchReason::blocker(
                    "a company CNAE is on this call's excluded-activities list",
                )),
            };
        }
    }

    let Some(accepted) = accepted else {
        return CnaeAssessment {
            tier: CnaeTier::Unrestricted,
            delta: 12,
            reason: None,
        };
    };

    if cnaes.is_empty() {
        return CnaeAssessment {
            tier: CnaeTier::MissingCompanyData,
            delta: 5,
            reason: Some(MatchReason::warning(
                "this call restricts CNAEs - add your CNAEs to the profile for precise matching",
            )),
        };
    }

    if let Some(primary) = cnaes.iter().find(|entry| entry.is_primary) {
        if accepted.contains(&primary.code) {
            return CnaeAssessment {
                tier: CnaeTier::PrimaryExact,
                delta: 25,
                reason: Some(MatchReason::positive(format!(
                    "primary CNAE ({}) is eligible for this call",
                    primary.code
                ))),
            };
        }
    }

    if let Some(secondary) = cnaes
        .iter()
        .find(|entry| !entry.is_primary && accepted.contains(&entry.code))
    {
        return CnaeAssessment {
            tier: CnaeTier::SecondaryExact,
            delta: 15,
            reason: Some(MatchReason::positive(format!(
                "secondary CNAE ({}) is eligible for this call",
                secondary.code
            ))),
        };
    }

    let division_overlap = accepted.iter().any(|code| {
        cnaes
            .iter()
            .any(|entry| entry.division() == division_of(code))
    });
    if division_overlap {
        return CnaeAssessment {
            tier: CnaeTier::DivisionOverlap,
            delta: 10,
            reason: Some(MatchReason::warning(
                "company CNAE is in the same division - verify the call's exact requirements",
            )),
        };
    }

    CnaeAssessment {
        tier: CnaeTier::NoMatch,
        delta: -20,
        reason: Some(MatchReason::warning(format!(
            "no company CNAE is on the accepted list (accepted: {})",
            preview_list(accepted, 3)
        ))),
    }
}
