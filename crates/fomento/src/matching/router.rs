use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CompanyId, GrantId};
use super::repository::{CompanyDirectory, GrantCatalog, RepositoryError};
use super::service::{MatchService, MatchServiceError};

/// Router builder exposing the matching endpoints.
pub fn matching_router<C, G>(service: Arc<MatchService<C, G>>) -> Router
where
    C: CompanyDirectory + 'static,
    G: GrantCatalog + 'static,
{
    Router::new()
        .route("/api/v1/matching/find", post(find_handler::<C, G>))
        .route(
            "/api/v1/matching/matches/:company_id",
            get(matches_handler::<C, G>),
        )
        .route(
            "/api/v1/matching/evaluate",
            post(evaluate_handler::<C, G>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct FindMatchesRequest {
    pub(crate) company_id: String,
    /// Reference date for age and deadline arithmetic; defaults to today.
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluatePairRequest {
    pub(crate) company_id: String,
    pub(crate) grant_id: String,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) async fn find_handler<C, G>(
    State(service): State<Arc<MatchService<C, G>>>,
    axum::Json(request): axum::Json<FindMatchesRequest>,
) -> Response
where
    C: CompanyDirectory + 'static,
    G: GrantCatalog + 'static,
{
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let company_id = CompanyId(request.company_id);
    respond_with_report(service.find_matches(&company_id, today))
}

pub(crate) async fn matches_handler<C, G>(
    State(service): State<Arc<MatchService<C, G>>>,
    Path(company_id): Path<String>,
) -> Response
where
    C: CompanyDirectory + 'static,
    G: GrantCatalog + 'static,
{
    let today = Local::now().date_naive();
    let company_id = CompanyId(company_id);
    respond_with_report(service.find_matches(&company_id, today))
}

pub(crate) async fn evaluate_handler<C, G>(
    State(service): State<Arc<MatchService<C, G>>>,
    axum::Json(request): axum::Json<EvaluatePairRequest>,
) -> Response
where
    C: CompanyDirectory + 'static,
    G: GrantCatalog + 'static,
{
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let company_id = CompanyId(request.company_id);
    let grant_id = GrantId(request.grant_id);

    match service.evaluate_pair(&company_id, &grant_id, today) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(error) => error_response(error),
    }
}

fn respond_with_report<T: serde::Serialize>(result: Result<T, MatchServiceError>) -> Response {
    match result {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: MatchServiceError) -> Response {
    let status = match &error {
        MatchServiceError::CompanyNotFound(_) | MatchServiceError::GrantNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        MatchServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        MatchServiceError::Similarity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MatchServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
