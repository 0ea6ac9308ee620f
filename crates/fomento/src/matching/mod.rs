//! Grant matching: eligibility, fit scoring, and opportunity rating.
//!
//! The engine itself is pure and synchronous; repositories and the HTTP
//! router wrap it for callers that hold records behind storage or a wire.

pub mod catalog;
pub mod domain;
pub mod engine;
pub mod repository;
pub mod router;
pub mod service;
pub mod similarity;

#[cfg(test)]
mod tests;

pub use catalog::{import_catalog, CatalogImportError};
pub use domain::{
    CnaeEntry, CompanyId, CompanyProfile, CompanySize, FinancialCapacity, Grant, GrantAgency,
    GrantEligibilityCriteria, GrantId, GrantStatus, PartnerRequirement, Partnerships,
    PatentPortfolio,
};
pub use engine::{
    classify_cnae, compose_rating, ease_score, score_match, value_score, CnaeAssessment, CnaeTier,
    MatchReason, MatchResult, Rating, ReasonTag,
};
pub use repository::{CompanyDirectory, GrantCatalog, RepositoryError};
pub use router::matching_router;
pub use service::{
    MatchReport, MatchService, MatchServiceError, MatchingConfig, PairEvaluation,
    RankedOpportunity,
};
pub use similarity::{cosine_similarity, DimensionMismatch};
