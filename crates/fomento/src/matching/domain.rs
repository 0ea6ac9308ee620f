use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered companies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for published grant calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantId(pub String);

impl fmt::Display for GrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Brazilian company size bands used by funding agencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanySize {
    Mei,
    Micro,
    Small,
    Medium,
    Large,
}

impl CompanySize {
    pub const fn label(self) -> &'static str {
        match self {
            CompanySize::Mei => "individual microentrepreneur",
            CompanySize::Micro => "microenterprise",
            CompanySize::Small => "small company",
            CompanySize::Medium => "mid-sized company",
            CompanySize::Large => "large company",
        }
    }
}

/// One CNAE activity registration. Codes are hierarchical and dot-separated,
/// e.g. `62.01-5-01` where `62` is the division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnaeEntry {
    pub code: String,
    pub description: String,
    pub is_primary: bool,
}

impl CnaeEntry {
    /// The division prefix, i.e. everything before the first `.` separator.
    pub fn division(&self) -> &str {
        division_of(&self.code)
    }
}

pub(crate) fn division_of(code: &str) -> &str {
    code.split('.').next().unwrap_or(code)
}

/// Self-declared counterpart funding capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FinancialCapacity {
    pub has_counterpart_capacity: bool,
    /// Percentage of project cost the company typically self-funds (0-100).
    /// Only meaningful when `has_counterpart_capacity` is true.
    pub typical_counterpart: Option<f32>,
}

/// Intellectual-property counts used as an innovation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PatentPortfolio {
    pub registered: u32,
    pub pending: u32,
}

impl PatentPortfolio {
    pub fn total(&self) -> u32 {
        self.registered + self.pending
    }
}

/// Declared institutional partnerships. Presence is what matters for
/// eligibility, not the identity of the partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Partnerships {
    #[serde(default)]
    pub embrapii_units: Vec<String>,
}

/// Immutable company snapshot consumed per evaluation. Hydration is the
/// persistence layer's job; the engine never queries storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: CompanyId,
    pub name: String,
    pub size: CompanySize,
    pub sector: Option<String>,
    /// Two-letter federation unit code, e.g. `SP`.
    pub state: Option<String>,
    pub annual_revenue: Option<f64>,
    pub employee_count: Option<u32>,
    pub foundation_date: Option<NaiveDate>,
    #[serde(default)]
    pub cnaes: Vec<CnaeEntry>,
    #[serde(default)]
    pub rd_themes: Vec<String>,
    #[serde(default)]
    pub financial: FinancialCapacity,
    #[serde(default)]
    pub patents: PatentPortfolio,
    #[serde(default)]
    pub partnerships: Partnerships,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl CompanyProfile {
    /// Company age in fractional years as of `today`, when the foundation
    /// date is known.
    pub fn years_of_operation(&self, today: NaiveDate) -> Option<f64> {
        self.foundation_date
            .map(|founded| (today - founded).num_days() as f64 / 365.25)
    }
}

/// Partner types a call may require. Only EMBRAPII units are currently
/// evaluated by the scorer; other tags are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerRequirement {
    EmbrapiiUnit,
    Ict,
    University,
}

/// A grant's admission rules. Every field is optional: absence means the
/// call imposes no restriction of that kind, and each factor in the scorer
/// documents its own absence fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GrantEligibilityCriteria {
    pub company_size: Option<Vec<CompanySize>>,
    pub max_employees: Option<u32>,
    pub states: Option<Vec<String>>,
    pub priority_sectors: Option<Vec<String>>,
    pub cnae_codes: Option<Vec<String>>,
    pub excluded_activities: Option<Vec<String>>,
    pub min_revenue: Option<f64>,
    pub max_revenue: Option<f64>,
    pub min_years_operation: Option<f32>,
    pub priority_themes: Option<Vec<String>>,
    #[serde(default)]
    pub counterpart_required: bool,
    pub counterpart_percentage: Option<f32>,
    pub required_partners: Option<Vec<PartnerRequirement>>,
}

/// Funding agencies tracked by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantAgency {
    Finep,
    Fapesp,
    Embrapii,
    Sebrae,
    Bndes,
    Cnpq,
    Other,
}

impl GrantAgency {
    pub const fn label(self) -> &'static str {
        match self {
            GrantAgency::Finep => "FINEP",
            GrantAgency::Fapesp => "FAPESP",
            GrantAgency::Embrapii => "EMBRAPII",
            GrantAgency::Sebrae => "SEBRAE",
            GrantAgency::Bndes => "BNDES",
            GrantAgency::Cnpq => "CNPq",
            GrantAgency::Other => "other",
        }
    }
}

/// Publication status of a grant call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantStatus {
    Upcoming,
    Open,
    ClosingSoon,
    Closed,
    Cancelled,
}

impl GrantStatus {
    pub const fn label(self) -> &'static str {
        match self {
            GrantStatus::Upcoming => "upcoming",
            GrantStatus::Open => "open",
            GrantStatus::ClosingSoon => "closing_soon",
            GrantStatus::Closed => "closed",
            GrantStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the call still accepts applications and should be matched.
    pub const fn accepts_applications(self) -> bool {
        matches!(self, GrantStatus::Open | GrantStatus::ClosingSoon)
    }
}

/// A published grant opportunity, including its admission rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub id: GrantId,
    pub title: String,
    pub agency: GrantAgency,
    pub status: GrantStatus,
    pub value_min: Option<f64>,
    pub value_max: Option<f64>,
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    pub criteria: Option<GrantEligibilityCriteria>,
}

impl Grant {
    /// Days from `today` to the submission deadline, negative once past.
    pub fn days_until_deadline(&self, today: NaiveDate) -> Option<i64> {
        self.deadline.map(|deadline| (deadline - today).num_days())
    }
}
