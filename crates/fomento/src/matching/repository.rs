use super::domain::{CompanyId, CompanyProfile, Grant, GrantId};

/// Read-side storage abstraction for company profiles. The engine only
/// ever consumes fully hydrated snapshots; writes stay with the caller.
pub trait CompanyDirectory: Send + Sync {
    fn fetch(&self, id: &CompanyId) -> Result<Option<CompanyProfile>, RepositoryError>;
}

/// Read-side storage abstraction for the grant catalog.
pub trait GrantCatalog: Send + Sync {
    fn fetch(&self, id: &GrantId) -> Result<Option<Grant>, RepositoryError>;

    /// Grants whose status still accepts applications (open or closing
    /// soon), in catalog order.
    fn open_grants(&self) -> Result<Vec<Grant>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
