use std::sync::Arc;

use super::common::*;
use crate::matching::domain::{CompanyId, CompanySize, GrantEligibilityCriteria, GrantId, GrantStatus};
use crate::matching::service::{MatchService, MatchServiceError, MatchingConfig};

#[test]
fn find_matches_ranks_by_rating_then_score() {
    let company = software_company();
    let company_id = company.id.clone();
    let mut closed = aligned_grant("g-closed");
    closed.status = GrantStatus::Closed;

    let service = build_service(
        vec![company],
        vec![open_grant("g-open"), aligned_grant("g-aligned"), closed],
    );

    let report = service
        .find_matches(&company_id, today())
        .expect("report builds");

    assert_eq!(report.evaluated, 2, "closed grants are never scored");
    assert_eq!(report.matches.len(), 2);
    assert_eq!(report.matches[0].grant_id, GrantId("g-aligned".to_string()));
    assert!(report.matches[0].rating.value >= report.matches[1].rating.value);
    assert!(report.matches[0].eligible);
}

#[test]
fn find_matches_drops_scores_below_the_threshold() {
    let company = software_company();
    let company_id = company.id.clone();
    let poor_fit = grant_with_criteria(
        "g-poor-fit",
        GrantEligibilityCriteria {
            company_size: Some(vec![CompanySize::Large]),
            cnae_codes: Some(vec!["10.11-2-01".to_string()]),
            ..GrantEligibilityCriteria::default()
        },
    );

    let service = build_service(vec![company], vec![poor_fit, aligned_grant("g-aligned")]);

    let report = service
        .find_matches(&company_id, today())
        .expect("report builds");

    assert_eq!(report.evaluated, 2);
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].grant_id, GrantId("g-aligned".to_string()));
}

#[test]
fn find_matches_honors_the_result_limit() {
    let company = software_company();
    let company_id = company.id.clone();
    let service = MatchService::new(
        Arc::new(MemoryCompanies::with(vec![company])),
        Arc::new(MemoryGrants::with(vec![
            open_grant("g-open"),
            aligned_grant("g-aligned"),
        ])),
        MatchingConfig {
            minimum_score: 50,
            max_results: 1,
        },
    );

    let report = service
        .find_matches(&company_id, today())
        .expect("report builds");

    assert_eq!(report.evaluated, 2);
    assert_eq!(report.matches.len(), 1);
}

#[test]
fn find_matches_fails_for_unknown_company() {
    let service = build_service(Vec::new(), vec![open_grant("g-open")]);

    let error = service
        .find_matches(&CompanyId("co-missing".to_string()), today())
        .expect_err("company is unknown");

    assert!(matches!(error, MatchServiceError::CompanyNotFound(_)));
}

#[test]
fn evaluate_pair_returns_full_result_below_threshold() {
    let company = software_company();
    let company_id = company.id.clone();
    let poor_fit = grant_with_criteria(
        "g-poor-fit",
        GrantEligibilityCriteria {
            company_size: Some(vec![CompanySize::Large]),
            cnae_codes: Some(vec!["10.11-2-01".to_string()]),
            ..GrantEligibilityCriteria::default()
        },
    );

    let service = build_service(vec![company], vec![poor_fit]);

    let evaluation = service
        .evaluate_pair(&company_id, &GrantId("g-poor-fit".to_string()), today())
        .expect("pair evaluates");

    assert_eq!(evaluation.result.score, 46);
    assert!(evaluation.result.eligible);
    assert!(!evaluation.result.reasons.is_empty());
}

#[test]
fn evaluate_pair_fails_for_unknown_grant() {
    let company = software_company();
    let company_id = company.id.clone();
    let service = build_service(vec![company], Vec::new());

    let error = service
        .evaluate_pair(&company_id, &GrantId("g-missing".to_string()), today())
        .expect_err("grant is unknown");

    assert!(matches!(error, MatchServiceError::GrantNotFound(_)));
}
