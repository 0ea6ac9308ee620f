use chrono::NaiveDate;
use fomento::matching::{
    CompanyDirectory, CompanyId, CompanyProfile, Grant, GrantCatalog, GrantId, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCompanyDirectory {
    records: Arc<Mutex<HashMap<CompanyId, CompanyProfile>>>,
}

impl InMemoryCompanyDirectory {
    pub(crate) fn insert(&self, company: CompanyProfile) {
        let mut guard = self.records.lock().expect("directory mutex poisoned");
        guard.insert(company.id.clone(), company);
    }
}

impl CompanyDirectory for InMemoryCompanyDirectory {
    fn fetch(&self, id: &CompanyId) -> Result<Option<CompanyProfile>, RepositoryError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryGrantCatalog {
    records: Arc<Mutex<Vec<Grant>>>,
}

impl InMemoryGrantCatalog {
    pub(crate) fn extend(&self, grants: Vec<Grant>) {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        guard.extend(grants);
    }

    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("catalog mutex poisoned").len()
    }
}

impl GrantCatalog for InMemoryGrantCatalog {
    fn fetch(&self, id: &GrantId) -> Result<Option<Grant>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().find(|grant| &grant.id == id).cloned())
    }

    fn open_grants(&self) -> Result<Vec<Grant>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard
            .iter()
            .filter(|grant| grant.status.accepts_applications())
            .cloned()
            .collect())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
