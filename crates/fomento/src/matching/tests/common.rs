use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::matching::domain::{
    CnaeEntry, CompanyId, CompanyProfile, CompanySize, FinancialCapacity, Grant, GrantAgency,
    GrantEligibilityCriteria, GrantId, GrantStatus, Partnerships, PatentPortfolio,
};
use crate::matching::repository::{CompanyDirectory, GrantCatalog, RepositoryError};
use crate::matching::service::{MatchService, MatchingConfig};

/// Fixed reference date so age and deadline arithmetic stay deterministic.
pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
}

/// A well-filled SP software company: primary CNAE 62.01-5-01, small,
/// R$ 1.5M revenue, eight years old.
pub(super) fn software_company() -> CompanyProfile {
    CompanyProfile {
        id: CompanyId("co-001".to_string()),
        name: "Vetor Sistemas".to_string(),
        size: CompanySize::Small,
        sector: Some("Tecnologia da Informação".to_string()),
        state: Some("SP".to_string()),
        annual_revenue: Some(1_500_000.0),
        employee_count: Some(25),
        foundation_date: NaiveDate::from_ymd_opt(2018, 3, 1),
        cnaes: vec![
            CnaeEntry {
                code: "62.01-5-01".to_string(),
                description: "Desenvolvimento de software sob encomenda".to_string(),
                is_primary: true,
            },
            CnaeEntry {
                code: "62.02-3-00".to_string(),
                description: "Licenciamento de software customizável".to_string(),
                is_primary: false,
            },
        ],
        rd_themes: vec!["Inteligência Artificial".to_string()],
        financial: FinancialCapacity {
            has_counterpart_capacity: true,
            typical_counterpart: Some(20.0),
        },
        patents: PatentPortfolio::default(),
        partnerships: Partnerships::default(),
        embedding: None,
    }
}

pub(super) fn open_grant(id: &str) -> Grant {
    Grant {
        id: GrantId(id.to_string()),
        title: "Programa Aberto de Inovação".to_string(),
        agency: GrantAgency::Sebrae,
        status: GrantStatus::Open,
        value_min: None,
        value_max: Some(200_000.0),
        deadline: None,
        embedding: None,
        criteria: None,
    }
}

pub(super) fn grant_with_criteria(id: &str, criteria: GrantEligibilityCriteria) -> Grant {
    Grant {
        id: GrantId(id.to_string()),
        title: "Edital de Inovação".to_string(),
        agency: GrantAgency::Finep,
        status: GrantStatus::Open,
        value_min: None,
        value_max: None,
        deadline: None,
        embedding: None,
        criteria: Some(criteria),
    }
}

/// The well-aligned call of the happy-path scenario: accepted CNAE, size
/// and state lists matching the software company, compatible funding band.
pub(super) fn aligned_grant(id: &str) -> Grant {
    Grant {
        id: GrantId(id.to_string()),
        title: "Subvenção para Software".to_string(),
        agency: GrantAgency::Finep,
        status: GrantStatus::Open,
        value_min: Some(500_000.0),
        value_max: Some(3_000_000.0),
        deadline: NaiveDate::from_ymd_opt(2026, 9, 30),
        embedding: None,
        criteria: Some(GrantEligibilityCriteria {
            company_size: Some(vec![CompanySize::Small, CompanySize::Medium]),
            states: Some(vec!["SP".to_string()]),
            cnae_codes: Some(vec!["62.01-5-01".to_string()]),
            ..GrantEligibilityCriteria::default()
        }),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryCompanies {
    records: Arc<Mutex<HashMap<CompanyId, CompanyProfile>>>,
}

impl MemoryCompanies {
    pub(super) fn with(companies: Vec<CompanyProfile>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.records.lock().expect("directory mutex poisoned");
            for company in companies {
                guard.insert(company.id.clone(), company);
            }
        }
        store
    }
}

impl CompanyDirectory for MemoryCompanies {
    fn fetch(&self, id: &CompanyId) -> Result<Option<CompanyProfile>, RepositoryError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryGrants {
    records: Arc<Mutex<Vec<Grant>>>,
}

impl MemoryGrants {
    pub(super) fn with(grants: Vec<Grant>) -> Self {
        Self {
            records: Arc::new(Mutex::new(grants)),
        }
    }
}

impl GrantCatalog for MemoryGrants {
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

pub(super) struct UnavailableCompanies;

impl CompanyDirectory for UnavailableCompanies {
    fn fetch(&self, _id: &CompanyId) -> Result<Option<CompanyProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service(
    companies: Vec<CompanyProfile>,
    grants: Vec<Grant>,
) -> MatchService<MemoryCompanies, MemoryGrants> {
    MatchService::new(
        Arc::new(MemoryCompanies::with(companies)),
        Arc::new(MemoryGrants::with(grants)),
        MatchingConfig::default(),
    )
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
