//! CSV grant-catalog import.
//!
//! Catalog exports carry one grant per row. List-valued columns (states,
//! CNAE codes, sizes, themes) are pipe-separated; empty cells mean "no
//! restriction". Scraping and storage of the export itself are out of
//! scope; callers hand the importer any `Read`.

use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::domain::{
    CompanySize, Grant, GrantAgency, GrantEligibilityCriteria, GrantId, GrantStatus,
    PartnerRequirement,
};

/// Error raised while importing a grant catalog export.
#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("failed to read catalog export: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

/// Parse a CSV catalog export into hydrated grants, in file order.
pub fn import_catalog<R: Read>(reader: R) -> Result<Vec<Grant>, CatalogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut grants = Vec::new();
    for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        // Header occupies line 1.
        let row_number = index + 2;
        let row = record?;
        grants.push(row.into_grant(row_number)?);
    }

    Ok(grants)
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    title: String,
    agency: String,
    status: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    value_min: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    value_max: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    deadline: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    company_size: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    max_employees: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    states: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    priority_sectors: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    cnae_codes: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    excluded_activities: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    min_revenue: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    max_revenue: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    min_years_operation: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    priority_themes: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    counterpart_required: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    counterpart_percentage: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    required_partners: Option<String>,
}

impl CatalogRow {
    fn into_grant(self, row: usize) -> Result<Grant, CatalogImportError> {
        let invalid = |message: String| CatalogImportError::InvalidRow { row, message };

        let agency = parse_agency(&self.agency);
        let status = parse_status(&self.status)
            .ok_or_else(|| invalid(format!("unknown status '{}'", self.status)))?;

        let value_min = parse_optional(self.value_min.as_deref(), "value_min", row)?;
        let value_max = parse_optional(self.value_max.as_deref(), "value_max", row)?;
        let min_revenue = parse_optional(self.min_revenue.as_deref(), "min_revenue", row)?;
        let max_revenue = parse_optional(self.max_revenue.as_deref(), "max_revenue", row)?;
        let min_years_operation: Option<f32> =
            parse_optional(self.min_years_operation.as_deref(), "min_years_operation", row)?;
        let max_employees: Option<u32> =
            parse_optional(self.max_employees.as_deref(), "max_employees", row)?;
        let counterpart_percentage: Option<f32> = parse_optional(
            self.counterpart_percentage.as_deref(),
            "counterpart_percentage",
            row,
        )?;

        let deadline = self
            .deadline
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|err| invalid(format!("deadline '{raw}' is not YYYY-MM-DD ({err})")))
            })
            .transpose()?;

        let company_size = self
            .company_size
            .as_deref()
            .map(|raw| {
                split_list(raw)
                    .map(|token| {
                        parse_size(token)
                            .ok_or_else(|| invalid(format!("unknown company size '{token}'")))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let required_partners = self
            .required_partners
            .as_deref()
            .map(|raw| {
                split_list(raw)
                    .map(|token| {
                        parse_partner(token)
                            .ok_or_else(|| invalid(format!("unknown partner tag '{token}'")))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let counterpart_required = self
            .counterpart_required
            .as_deref()
            .map(|raw| matches!(raw.to_ascii_lowercase().as_str(), "true" | "yes" | "1"))
            .unwrap_or(false);

        let criteria = GrantEligibilityCriteria {
            company_size,
            max_employees,
            states: self.states.as_deref().map(owned_list),
            priority_sectors: self.priority_sectors.as_deref().map(owned_list),
            cnae_codes: self.cnae_codes.as_deref().map(owned_list),
            excluded_activities: self.excluded_activities.as_deref().map(owned_list),
            min_revenue,
            max_revenue,
            min_years_operation,
            priority_themes: self.priority_themes.as_deref().map(owned_list),
            counterpart_required,
            counterpart_percentage,
            required_partners,
        };

        // A row with every criteria cell empty is an open call.
        let criteria = if criteria == GrantEligibilityCriteria::default() {
            None
        } else {
            Some(criteria)
        };

        Ok(Grant {
            id: GrantId(self.id),
            title: self.title,
            agency,
            status,
            value_min,
            value_max,
            deadline,
            embedding: None,
            criteria,
        })
    }
}

fn parse_optional<T: std::str::FromStr>(
    raw: Option<&str>,
    field: &str,
    row: usize,
) -> Result<Option<T>, CatalogImportError>
where
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.parse::<T>().map_err(|err| CatalogImportError::InvalidRow {
            row,
            message: format!("{field} '{value}' is invalid ({err})"),
        })
    })
    .transpose()
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('|')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn owned_list(raw: &str) -> Vec<String> {
    split_list(raw).map(str::to_string).collect()
}

fn parse_agency(raw: &str) -> GrantAgency {
    match raw.trim().to_ascii_uppercase().as_str() {
        "FINEP" => GrantAgency::Finep,
        "FAPESP" => GrantAgency::Fapesp,
        "EMBRAPII" => GrantAgency::Embrapii,
        "SEBRAE" => GrantAgency::Sebrae,
        "BNDES" => GrantAgency::Bndes,
        "CNPQ" => GrantAgency::Cnpq,
        _ => GrantAgency::Other,
    }
}

fn parse_status(raw: &str) -> Option<GrantStatus> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "UPCOMING" => Some(GrantStatus::Upcoming),
        "OPEN" => Some(GrantStatus::Open),
        "CLOSING_SOON" => Some(GrantStatus::ClosingSoon),
        "CLOSED" => Some(GrantStatus::Closed),
        "CANCELLED" => Some(GrantStatus::Cancelled),
        _ => None,
    }
}

fn parse_size(raw: &str) -> Option<CompanySize> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "MEI" => Some(CompanySize::Mei),
        "MICRO" => Some(CompanySize::Micro),
        "SMALL" => Some(CompanySize::Small),
        "MEDIUM" => Some(CompanySize::Medium),
        "LARGE" => Some(CompanySize::Large),
        _ => None,
    }
}

fn parse_partner(raw: &str) -> Option<PartnerRequirement> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "EMBRAPII_UNIT" => Some(PartnerRequirement::EmbrapiiUnit),
        "ICT" => Some(PartnerRequirement::Ict),
        "UNIVERSITY" => Some(PartnerRequirement::University),
        _ => None,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
