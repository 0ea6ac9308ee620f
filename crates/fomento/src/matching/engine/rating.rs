use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::matching::domain::{CompanyProfile, Grant, PartnerRequirement};

/// Composite opportunity rating used to rank grants for a company.
///
/// Blends fit, monetary value, and qualification difficulty so that a
/// modest, easy, well-matched call ranks above a huge but nearly
/// unreachable one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Final rating, always within `[0, 100]`.
    pub value: u8,
    pub value_score: f32,
    pub ease_score: f32,
}

/// Compose the final rating from a previously computed match score.
///
/// `rating = 0.40 x matchScore + 30 x valueScore + 30 x easeScore`.
pub fn compose_rating(
    company: &CompanyProfile,
    grant: &Grant,
    match_score: u8,
    today: NaiveDate,
) -> Rating {
    let value = value_score(company, grant);
    let ease = ease_score(company, grant, today);

    let combined =
        f64::from(match_score) * 0.40 + f64::from(value) * 30.0 + f64::from(ease) * 30.0;

    Rating {
        value: combined.round().clamp(0.0, 100.0) as u8,
        value_score: value,
        ease_score: ease,
    }
}

/// How appropriately sized the grant's funding is for the company, in
/// `[0, 1]`. The sweet spot is a grant worth 10-50% of annual revenue;
/// with no revenue on file the absolute amount is banded instead.
pub fn value_score(company: &CompanyProfile, grant: &Grant) -> f32 {
    let Some(value_max) = grant.value_max else {
        return 0.5;
    };

    match company.annual_revenue {
        Some(revenue) if revenue > 0.0 => {
            let ratio = value_max / revenue;
            if (0.1..=0.5).contains(&ratio) {
                1.0
            } else if (0.05..0.1).contains(&ratio) {
                0.8
            } else if ratio > 0.5 && ratio <= 1.0 {
                0.9
            } else if ratio > 1.0 {
                0.7
            } else {
                0.6
            }
        }
        _ => {
            if value_max >= 1_000_000.0 {
                1.0
            } else if value_max >= 500_000.0 {
                0.9
            } else if value_max >= 250_000.0 {
                0.8
            } else if value_max >= 100_000.0 {
                0.7
            } else {
                0.5
            }
        }
    }
}

/// How straightforward qualifying is, in `[0, 1]`: a fixed penalty per
/// restriction type, a deadline-proximity adjustment, and a bonus for
/// requirements the company already satisfies.
pub fn ease_score(company: &CompanyProfile, grant: &Grant, today: NaiveDate) -> f32 {
    let Some(criteria) = &grant.criteria else {
        return 0.9;
    };

    let mut ease: f32 = 1.0;

    if criteria
        .company_size
        .as_ref()
        .is_some_and(|sizes| sizes.len() < 3)
    {
        ease -= 0.05;
    }
    if criteria.max_employees.is_some() {
        ease -= 0.05;
    }
    if criteria
        .states
        .as_ref()
        .is_some_and(|states| states.len() < 10)
    {
        ease -= 0.08;
    }
    if criteria
        .cnae_codes
        .as_ref()
        .is_some_and(|codes| codes.len() < 20)
    {
        ease -= 0.10;
    }
    if criteria
        .min_years_operation
        .is_some_and(|years| years > 2.0)
    {
        ease -= 0.10;
    }
    if criteria.counterpart_required {
        ease -= 0.15;
    }
    if criteria
        .required_partners
        .as_ref()
        .is_some_and(|partners| !partners.is_empty())
    {
        ease -= 0.15;
    }
    if criteria
        .priority_themes
        .as_ref()
        .is_some_and(|themes| !themes.is_empty())
    {
        ease -= 0.05;
    }
    if criteria.min_revenue.is_some() || criteria.max_revenue.is_some() {
        ease -= 0.05;
    }

    if let Some(days) = grant.days_until_deadline(today) {
        if days > 90 {
            ease += 0.10;
        } else if days > 60 {
            ease += 0.05;
        } else if days < 15 {
            ease -= 0.15;
        }
    }

    let requires_embrapii = criteria
        .required_partners
        .as_ref()
        .is_some_and(|partners| partners.contains(&PartnerRequirement::EmbrapiiUnit));
    if requires_embrapii && !company.partnerships.embrapii_units.is_empty() {
        ease += 0.10;
    }
    if criteria.counterpart_required && company.financial.has_counterpart_capacity {
        ease += 0.05;
    }

    ease.clamp(0.0, 1.0)
}
