use chrono::NaiveDate;

use super::cnae::classify_cnae;
use super::{contains_ci, preview_list, MatchReason, MatchResult};
use crate::matching::domain::{CompanyProfile, Grant, PartnerRequirement};
use crate::matching::similarity::{cosine_similarity, DimensionMismatch};

/// Score one (company, grant) pair.
///
/// Accumulates independent additive terms, each bounded and each emitting
/// at most one reason entry, then clamps the rounded sum to `[0, 100]`.
/// `today` anchors company age and is supplied by the caller so the
/// computation stays deterministic.
///
/// Missing optional company data is never an error: each factor falls back
/// to the neutral credit documented inline. The only failure mode is a
/// dimension mismatch between two present embedding vectors.
pub fn score_match(
    company: &CompanyProfile,
    grant: &Grant,
    today: NaiveDate,
) -> Result<MatchResult, DimensionMismatch> {
    let Some(criteria) = &grant.criteria else {
        // No admission rules at all: fixed baseline, not a zero-factor sum.
        return Ok(MatchResult::from_parts(
            75.0,
            vec![MatchReason::positive("call is open to all companies")],
        ));
    };

    let mut total = 0.0f64;
    let mut reasons = Vec::new();

    // Company size (max +20, fallback +10 when unrestricted).
    if let Some(allowed) = &criteria.company_size {
        if allowed.contains(&company.size) {
            total += 20.0;
            reasons.push(MatchReason::positive(format!(
                "company size ({}) is eligible",
                company.size.label()
            )));
        } else {
            reasons.push(MatchReason::warning(
                "company size may not fit this call",
            ));
        }
    } else {
        total += 10.0;
    }

    // Headcount ceiling (+5 / -10), only when both sides are known.
    if let (Some(max), Some(count)) = (criteria.max_employees, company.employee_count) {
        if count <= max {
            total += 5.0;
            reasons.push(MatchReason::positive(format!(
                "headcount ({count}) is within the limit of {max}"
            )));
        } else {
            total -= 10.0;
            reasons.push(MatchReason::blocker(format!(
                "company exceeds the limit of {max} employees"
            )));
        }
    }

    // Location (max +15, fallback +10 when unrestricted). An unknown state
    // against a restricted call gets the fallback too: a missing field
    // cannot disprove eligibility.
    if let (Some(states), Some(state)) = (&criteria.states, &company.state) {
        if states.iter().any(|allowed| allowed == state) {
            total += 15.0;
            reasons.push(MatchReason::positive(format!(
                "location ({state}) meets the geographic requirement"
            )));
        } else {
            reasons.push(MatchReason::blocker(format!(
                "call is restricted to other states ({})",
                states.join(", ")
            )));
        }
    } else {
        total += 10.0;
        if criteria.states.is_none() {
            reasons.push(MatchReason::positive("no geographic restriction"));
        }
    }

    // Revenue against the call's funding band (max +15, partial +8).
    match (grant.value_min, grant.value_max, company.annual_revenue) {
        (Some(value_min), Some(value_max), Some(revenue)) => {
            if revenue >= value_min * 0.5 && revenue <= value_max * 10.0 {
                total += 15.0;
                reasons.push(MatchReason::positive(format!(
                    "revenue is compatible with the call's funding band ({} - {})",
                    format_brl(value_min),
                    format_brl(value_max)
                )));
            } else if revenue >= value_min * 0.2 {
                total += 8.0;
                reasons.push(MatchReason::warning(
                    "revenue is below the ideal band but an application is still possible",
                ));
            } else {
                reasons.push(MatchReason::warning(
                    "revenue may fall outside the call's ideal band",
                ));
            }
        }
        _ => total += 8.0,
    }

    // Sector priority (max +20, partial +5, fallback +10).
    if let (Some(sectors), Some(sector)) = (&criteria.priority_sectors, &company.sector) {
        let aligned = sectors
            .iter()
            .any(|priority| contains_ci(sector, priority) || contains_ci(priority, sector));
        if aligned {
            total += 20.0;
            reasons.push(MatchReason::positive(format!(
                "sector ({sector}) is a priority for this call"
            )));
        } else {
            total += 5.0;
            reasons.push(MatchReason::warning(format!(
                "sector is not a priority (prioritized: {})",
                preview_list(sectors, 2)
            )));
        }
    } else {
        total += 10.0;
        if criteria.priority_sectors.is_none() {
            reasons.push(MatchReason::positive("no sector restriction"));
        }
    }

    // CNAE classification (+25 down to -50), tiered.
    let cnae = classify_cnae(
        &company.cnaes,
        criteria.cnae_codes.as_deref(),
        criteria.excluded_activities.as_deref(),
    );
    total += f64::from(cnae.delta);
    if let Some(reason) = cnae.reason {
        reasons.push(reason);
    }

    // R&D theme overlap (+5 per matched theme capped at +15, +3 when themes
    // exist but none overlap, fallback +8).
    if let Some(themes) = &criteria.priority_themes {
        if company.rd_themes.is_empty() {
            reasons.push(MatchReason::warning(
                "this call prioritizes specific R&D themes - complete the profile for better matching",
            ));
        } else {
            let matched: Vec<&String> = themes
                .iter()
                .filter(|theme| {
                    company
                        .rd_themes
                        .iter()
                        .any(|own| contains_ci(own, theme) || contains_ci(theme, own))
                })
                .collect();
            if matched.is_empty() {
                total += 3.0;
                reasons.push(MatchReason::warning(
                    "company R&D themes do not overlap the call's priorities",
                ));
            } else {
                total += (matched.len() as f64 * 5.0).min(15.0);
                if matched.len() == 1 {
                    reasons.push(MatchReason::positive(format!(
                        "aligned R&D theme: {}",
                        matched[0]
                    )));
                } else {
                    reasons.push(MatchReason::positive(format!(
                        "{} R&D themes aligned with the call",
                        matched.len()
                    )));
                }
            }
        }
    } else {
        total += 8.0;
    }

    // Revenue bounds (+15 both, +5 one, fallback +5 when unknown).
    if let Some(revenue) = company.annual_revenue {
        let meets_min = criteria.min_revenue.map_or(true, |min| revenue >= min);
        let meets_max = criteria.max_revenue.map_or(true, |max| revenue <= max);
        if meets_min && meets_max {
            total += 15.0;
            if criteria.min_revenue.is_some() || criteria.max_revenue.is_some() {
                reasons.push(MatchReason::positive(
                    "revenue is within the eligibility bounds",
                ));
            }
        } else if meets_min || meets_max {
            total += 5.0;
            if meets_min {
                reasons.push(MatchReason::warning(
                    "revenue is above the allowed maximum",
                ));
            } else {
                reasons.push(MatchReason::warning(format!(
                    "revenue is below the required minimum ({})",
                    format_brl(criteria.min_revenue.unwrap_or(0.0))
                )));
            }
        }
    } else {
        total += 5.0;
    }

    // Years of operation (+10 / -15), only when both sides are known.
    if let (Some(min_years), Some(years)) =
        (criteria.min_years_operation, company.years_of_operation(today))
    {
        if years >= f64::from(min_years) {
            total += 10.0;
            reasons.push(MatchReason::positive(format!(
                "company has {:.0} years of operation (minimum: {min_years})",
                years.floor()
            )));
        } else {
            total -= 15.0;
            reasons.push(MatchReason::blocker(format!(
                "call requires at least {min_years} years of operation"
            )));
        }
    }

    // Counterpart capacity (+10 full, +5 partial, blocker when the company
    // cannot self-declare capacity; fallback +10 when not required).
    if criteria.counterpart_required {
        let required = criteria.counterpart_percentage.unwrap_or(0.0);
        if company.financial.has_counterpart_capacity {
            let typical = company.financial.typical_counterpart.unwrap_or(0.0);
            if typical >= required {
                total += 10.0;
                reasons.push(MatchReason::positive(format!(
                    "company can cover the required counterpart ({required}%)"
                )));
            } else {
                total += 5.0;
                reasons.push(MatchReason::warning(format!(
                    "the required counterpart of {required}% may be challenging"
                )));
            }
        } else {
            reasons.push(MatchReason::blocker(format!(
                "call requires a counterpart of {required}%"
            )));
        }
    } else {
        total += 10.0;
        reasons.push(MatchReason::positive("no financial counterpart required"));
    }

    // Required partnerships (+5, no penalty). Only EMBRAPII units are
    // evaluated today.
    match &criteria.required_partners {
        Some(required) if !required.is_empty() => {
            let needs_embrapii = required.contains(&PartnerRequirement::EmbrapiiUnit);
            let has_embrapii = !company.partnerships.embrapii_units.is_empty();
            if needs_embrapii && has_embrapii {
                total += 5.0;
                reasons.push(MatchReason::positive(
                    "company already partners with an EMBRAPII unit",
                ));
            } else if needs_embrapii {
                reasons.push(MatchReason::warning(
                    "call requires a partnership with an EMBRAPII unit",
                ));
            }
        }
        Some(_) => total += 5.0,
        None => {
            total += 5.0;
            reasons.push(MatchReason::positive("no mandatory partnerships"));
        }
    }

    // Patent bonus, one point per patent capped at +5.
    let patents = company.patents.total();
    if patents > 0 {
        total += f64::from(patents.min(5));
        reasons.push(MatchReason::positive(format!(
            "holds {patents} patent{} (innovation capacity signal)",
            if patents == 1 { "" } else { "s" }
        )));
    }

    // Supplementary semantic bonus, capped at +10 and never authoritative:
    // it must not unlock or block a legal/financial requirement, so it adds
    // no reason and cannot flip eligibility.
    if let (Some(company_embedding), Some(grant_embedding)) =
        (&company.embedding, &grant.embedding)
    {
        if !company_embedding.is_empty() && !grant_embedding.is_empty() {
            let similarity = cosine_similarity(company_embedding, grant_embedding)?;
            total += f64::from(similarity) * 10.0;
        }
    }

    Ok(MatchResult::from_parts(total, reasons))
}

fn format_brl(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("R$ {:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("R$ {:.0}k", value / 1_000.0)
    } else {
        format!("R$ {value:.0}")
    }
}
