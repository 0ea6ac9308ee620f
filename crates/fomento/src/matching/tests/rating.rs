use chrono::Duration;

use super::common::*;
use crate::matching::domain::{
    CompanySize, Grant, GrantAgency, GrantEligibilityCriteria, GrantId, GrantStatus,
    PartnerRequirement,
};
use crate::matching::engine::{compose_rating, ease_score, score_match, value_score, Rating};

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn value_score_is_neutral_without_a_grant_value() {
    let company = software_company();
    let mut grant = open_grant("g-no-value");
    grant.value_max = None;

    assert_close(value_score(&company, &grant), 0.5);
}

#[test]
fn value_score_bands_on_revenue_ratio() {
    let mut company = software_company();
    company.annual_revenue = Some(1_000_000.0);
    let mut grant = open_grant("g-ratio");

    for (value_max, expected) in [
        (300_000.0, 1.0),
        (70_000.0, 0.8),
        (800_000.0, 0.9),
        (2_000_000.0, 0.7),
        (10_000.0, 0.6),
    ] {
        grant.value_max = Some(value_max);
        assert_close(value_score(&company, &grant), expected);
    }
}

#[test]
fn value_score_bands_on_absolute_amount_without_revenue() {
    let mut company = software_company();
    company.annual_revenue = None;
    let mut grant = open_grant("g-absolute");

    for (value_max, expected) in [
        (1_000_000.0, 1.0),
        (600_000.0, 0.9),
        (300_000.0, 0.8),
        (150_000.0, 0.7),
        (50_000.0, 0.5),
    ] {
        grant.value_max = Some(value_max);
        assert_close(value_score(&company, &grant), expected);
    }
}

#[test]
fn ease_score_without_criteria_is_high() {
    let company = software_company();
    assert_close(ease_score(&company, &open_grant("g-ease"), today()), 0.9);
}

#[test]
fn ease_score_penalizes_restrictions_and_rewards_long_deadlines() {
    let company = software_company();
    // Narrow size list, one state, one CNAE code, deadline 212 days out:
    // 1.0 - 0.05 - 0.08 - 0.10 + 0.10.
    assert_close(ease_score(&company, &aligned_grant("g-ease"), today()), 0.87);
}

#[test]
fn ease_score_rewards_requirements_already_met() {
    let mut company = software_company();
    company.partnerships.embrapii_units = vec!["Unidade SENAI".to_string()];
    let grant = grant_with_criteria(
        "g-partner",
        GrantEligibilityCriteria {
            required_partners: Some(vec![PartnerRequirement::EmbrapiiUnit]),
            counterpart_required: true,
            counterpart_percentage: Some(20.0),
            ..GrantEligibilityCriteria::default()
        },
    );

    // 1.0 - 0.15 (partners) - 0.15 (counterpart) + 0.10 (has partner)
    // + 0.05 (has counterpart capacity).
    assert_close(ease_score(&company, &grant, today()), 0.85);
}

#[test]
fn ease_score_stays_within_unit_interval_under_heavy_restrictions() {
    let company = software_company();
    let mut grant = grant_with_criteria(
        "g-heavy",
        GrantEligibilityCriteria {
            company_size: Some(vec![CompanySize::Large]),
            max_employees: Some(50),
            states: Some(vec!["RJ".to_string()]),
            cnae_codes: Some(vec!["10.11-2-01".to_string()]),
            min_years_operation: Some(8.0),
            counterpart_required: true,
            counterpart_percentage: Some(50.0),
            required_partners: Some(vec![PartnerRequirement::EmbrapiiUnit]),
            priority_themes: Some(vec!["Biotecnologia".to_string()]),
            min_revenue: Some(10_000_000.0),
            ..GrantEligibilityCriteria::default()
        },
    );
    grant.deadline = Some(today() + Duration::days(7));

    let ease = ease_score(&company, &grant, today());
    assert!((0.0..=1.0).contains(&ease));
    assert!(ease < 0.2, "heavy restrictions should drag ease down");
}

#[test]
fn compose_rating_blends_fit_value_and_ease() {
    let mut company = software_company();
    company.annual_revenue = Some(1_000_000.0);
    let mut grant = open_grant("g-compose");
    grant.value_max = Some(300_000.0);
    grant.deadline = None;

    let rating = compose_rating(&company, &grant, 80, today());

    // 0.40 x 80 + 30 x 1.0 + 30 x 0.9
    assert_eq!(rating.value, 89);
    assert_close(rating.value_score, 1.0);
    assert_close(rating.ease_score, 0.9);
}

#[test]
fn easy_grant_outranks_huge_but_hard_grant() {
    let mut company = software_company();
    company.annual_revenue = Some(1_000_000.0);
    company.financial.has_counterpart_capacity = false;
    company.financial.typical_counterpart = None;

    let grant_x = Grant {
        id: GrantId("g-x".to_string()),
        title: "Chamada Ampla".to_string(),
        agency: GrantAgency::Bndes,
        status: GrantStatus::Open,
        value_min: None,
        value_max: Some(10_000_000.0),
        deadline: Some(today() + Duration::days(200)),
        embedding: None,
        criteria: None,
    };
    let grant_y = Grant {
        id: GrantId("g-y".to_string()),
        title: "Edital Restrito".to_string(),
        agency: GrantAgency::Finep,
        status: GrantStatus::Open,
        value_min: Some(100_000.0),
        value_max: Some(300_000.0),
        deadline: Some(today() + Duration::days(10)),
        embedding: None,
        criteria: Some(GrantEligibilityCriteria {
            cnae_codes: Some(vec![
                "10.11-2-01".to_string(),
                "10.12-1-01".to_string(),
                "10.13-9-01".to_string(),
                "10.20-1-01".to_string(),
                "10.31-7-00".to_string(),
            ]),
            counterpart_required: true,
            counterpart_percentage: Some(30.0),
            ..GrantEligibilityCriteria::default()
        }),
    };

    let score_x = score_match(&company, &grant_x, today()).expect("scores").score;
    let score_y = score_match(&company, &grant_y, today()).expect("scores").score;
    let rating_x = compose_rating(&company, &grant_x, score_x, today());
    let rating_y = compose_rating(&company, &grant_y, score_y, today());

    assert!(
        rating_x.value > rating_y.value,
        "deadline and ease penalties should sink the restricted call ({} vs {})",
        rating_x.value,
        rating_y.value
    );
}

#[test]
fn rating_round_trips_through_json() {
    let company = software_company();
    let rating = compose_rating(&company, &aligned_grant("g-serde"), 92, today());

    let encoded = serde_json::to_string(&rating).expect("serializes");
    let decoded: Rating = serde_json::from_str(&encoded).expect("deserializes");

    assert_eq!(rating, decoded);
}
