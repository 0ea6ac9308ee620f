use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{CompanyId, GrantAgency, GrantId};
use super::engine::{compose_rating, score_match, MatchReason, MatchResult, Rating};
use super::repository::{CompanyDirectory, GrantCatalog, RepositoryError};
use super::similarity::DimensionMismatch;

/// Presentation thresholds applied when ranking a whole catalog. These are
/// caller configuration, not engine constants: a pair evaluation always
/// returns its full result regardless of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Matches scoring below this are dropped from ranked listings.
    pub minimum_score: u8,
    /// Upper bound on the number of ranked matches returned.
    pub max_results: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            minimum_score: 50,
            max_results: 20,
        }
    }
}

/// One ranked opportunity in a company's match report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOpportunity {
    pub grant_id: GrantId,
    pub title: String,
    pub agency: GrantAgency,
    pub deadline: Option<NaiveDate>,
    pub score: u8,
    pub eligible: bool,
    pub rating: Rating,
    pub reasons: Vec<MatchReason>,
}

/// Ranked matches for one company across the open catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub company_id: CompanyId,
    /// Number of open grants that were scored, before threshold filtering.
    pub evaluated: usize,
    pub matches: Vec<RankedOpportunity>,
}

/// Full evaluation of a single (company, grant) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairEvaluation {
    pub company_id: CompanyId,
    pub grant_id: GrantId,
    pub result: MatchResult,
    pub rating: Rating,
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchServiceError {
    #[error("company {0} not found")]
    CompanyNotFound(CompanyId),
    #[error("grant {0} not found")]
    GrantNotFound(GrantId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Similarity(#[from] DimensionMismatch),
}

/// Service composing the repositories and the scoring engine. Scoring each
/// (company, grant) pair is independent and side-effect free, so the loop
/// below could be fanned out across workers without coordination; a plain
/// iteration keeps the service deterministic and simple.
pub struct MatchService<C, G> {
    companies: Arc<C>,
    grants: Arc<G>,
    config: MatchingConfig,
}

impl<C, G> MatchService<C, G>
where
    C: CompanyDirectory + 'static,
    G: GrantCatalog + 'static,
{
    pub fn new(companies: Arc<C>, grants: Arc<G>, config: MatchingConfig) -> Self {
        Self {
            companies,
            grants,
            config,
        }
    }

    /// Score a company against every open grant and return the ranked,
    /// threshold-filtered report. Ordered by rating, then score, descending.
    pub fn find_matches(
        &self,
        company_id: &CompanyId,
        today: NaiveDate,
    ) -> Result<MatchReport, MatchServiceError> {
        let company = self
            .companies
            .fetch(company_id)?
            .ok_or_else(|| MatchServiceError::CompanyNotFound(company_id.clone()))?;

        let open_grants = self.grants.open_grants()?;
        let evaluated = open_grants.len();

        let mut matches = Vec::new();
        for grant in &open_grants {
            let result = score_match(&company, grant, today)?;
            debug!(
                grant = %grant.id.0,
                score = result.score,
                eligible = result.eligible,
                "scored grant"
            );

            if result.score < self.config.minimum_score {
                continue;
            }

            let rating = compose_rating(&company, grant, result.score, today);
            matches.push(RankedOpportunity {
                grant_id: grant.id.clone(),
                title: grant.title.clone(),
                agency: grant.agency,
                deadline: grant.deadline,
                score: result.score,
                eligible: result.eligible,
                rating,
                reasons: result.reasons,
            });
        }

        matches.sort_by(|a, b| {
            (b.rating.value, b.score).cmp(&(a.rating.value, a.score))
        });
        matches.truncate(self.config.max_results);

        info!(
            company = %company_id.0,
            evaluated,
            matched = matches.len(),
            "matching pass complete"
        );

        Ok(MatchReport {
            company_id: company_id.clone(),
            evaluated,
            matches,
        })
    }

    /// Evaluate a single (company, grant) pair with full reasons and
    /// rating, ignoring the listing thresholds.
    pub fn evaluate_pair(
        &self,
        company_id: &CompanyId,
        grant_id: &GrantId,
        today: NaiveDate,
    ) -> Result<PairEvaluation, MatchServiceError> {
        let company = self
            .companies
            .fetch(company_id)?
            .ok_or_else(|| MatchServiceError::CompanyNotFound(company_id.clone()))?;
        let grant = self
            .grants
            .fetch(grant_id)?
            .ok_or_else(|| MatchServiceError::GrantNotFound(grant_id.clone()))?;

        let result = score_match(&company, &grant, today)?;
        let rating = compose_rating(&company, &grant, result.score, today);

        Ok(PairEvaluation {
            company_id: company_id.clone(),
            grant_id: grant_id.clone(),
            result,
            rating,
        })
    }
}
