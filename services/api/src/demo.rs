use crate::infra::{InMemoryCompanyDirectory, InMemoryGrantCatalog};
use crate::server::{load_catalog, load_companies};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use fomento::error::AppError;
use fomento::matching::{
    CnaeEntry, CompanyId, CompanyProfile, CompanySize, FinancialCapacity, Grant, GrantAgency,
    GrantEligibilityCriteria, GrantId, GrantStatus, MatchReport, MatchService, MatchingConfig,
    PartnerRequirement, Partnerships, PatentPortfolio, ReasonTag,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// JSON file with an array of company profiles
    #[arg(long)]
    pub(crate) companies: PathBuf,
    /// Identifier of the company to rank, as found in the profiles file
    #[arg(long)]
    pub(crate) company_id: String,
    /// Grant catalog CSV export
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    /// Reference date for age and deadline arithmetic (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Drop matches scoring below this threshold
    #[arg(long)]
    pub(crate) min_score: Option<u8>,
    /// Maximum number of ranked matches to print
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Print the classified reasons for every match
    #[arg(long)]
    pub(crate) show_reasons: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for age and deadline arithmetic (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the classified reasons for every match
    #[arg(long)]
    pub(crate) show_reasons: bool,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        companies,
        company_id,
        catalog,
        today,
        min_score,
        limit,
        show_reasons,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let defaults = MatchingConfig::default();
    let config = MatchingConfig {
        minimum_score: min_score.unwrap_or(defaults.minimum_score),
        max_results: limit.unwrap_or(defaults.max_results),
    };

    let directory = Arc::new(InMemoryCompanyDirectory::default());
    for profile in load_companies(&companies)? {
        directory.insert(profile);
    }
    let grants = Arc::new(InMemoryGrantCatalog::default());
    grants.extend(load_catalog(&catalog)?);

    let service = MatchService::new(directory, grants, config);
    let report = service.find_matches(&CompanyId(company_id), today)?;
    render_report(&report, show_reasons);

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, show_reasons } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    println!("Grant matching demo (reference date {today})");

    let company = sample_company();
    let company_id = company.id.clone();
    println!(
        "\nCompany: {} ({}, {})",
        company.name,
        company.size.label(),
        company.state.as_deref().unwrap_or("state unknown")
    );

    let directory = Arc::new(InMemoryCompanyDirectory::default());
    directory.insert(company);
    let grants = Arc::new(InMemoryGrantCatalog::default());
    grants.extend(sample_catalog(today));
    println!("Catalog: {} grant calls loaded", grants.len());

    let service = MatchService::new(directory, grants, MatchingConfig::default());
    let report = service.find_matches(&company_id, today)?;
    render_report(&report, show_reasons);

    if let Some(best) = report.matches.first() {
        let evaluation = service.evaluate_pair(&company_id, &best.grant_id, today)?;
        println!("\nBest opportunity: {}", best.title);
        println!(
            "  score {} | rating {} (value {:.2}, ease {:.2})",
            evaluation.result.score,
            evaluation.rating.value,
            evaluation.rating.value_score,
            evaluation.rating.ease_score
        );
        for reason in &evaluation.result.reasons {
            println!("  {} {}", tag_marker(reason.tag), reason.text);
        }
    }

    Ok(())
}

fn render_report(report: &MatchReport, show_reasons: bool) {
    println!(
        "\nRanked opportunities for {} ({} scored, {} shown)",
        report.company_id.0,
        report.evaluated,
        report.matches.len()
    );

    for (position, opportunity) in report.matches.iter().enumerate() {
        let deadline = opportunity
            .deadline
            .map(|date| date.to_string())
            .unwrap_or_else(|| "rolling".to_string());
        println!(
            "{:>2}. [{:>3}] {} - {} (score {}, {}, deadline {})",
            position + 1,
            opportunity.rating.value,
            opportunity.agency.label(),
            opportunity.title,
            opportunity.score,
            if opportunity.eligible {
                "eligible"
            } else {
                "blocked"
            },
            deadline
        );

        if show_reasons {
            for reason in &opportunity.reasons {
                println!("      {} {}", tag_marker(reason.tag), reason.text);
            }
        }
    }
}

fn tag_marker(tag: ReasonTag) -> &'static str {
    match tag {
        ReasonTag::Positive => "+",
        ReasonTag::Warning => "!",
        ReasonTag::Blocker => "x",
    }
}

fn sample_company() -> CompanyProfile {
    CompanyProfile {
        id: CompanyId("co-demo".to_string()),
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
        rd_themes: vec![
            "Inteligência Artificial".to_string(),
            "IoT".to_string(),
        ],
        financial: FinancialCapacity {
            has_counterpart_capacity: true,
            typical_counterpart: Some(20.0),
        },
        patents: PatentPortfolio {
            registered: 1,
            pending: 1,
        },
        partnerships: Partnerships::default(),
        embedding: None,
    }
}

fn sample_catalog(today: NaiveDate) -> Vec<Grant> {
    vec![
        Grant {
            id: GrantId("finep-subvencao".to_string()),
            title: "Subvenção Econômica à Inovação".to_string(),
            agency: GrantAgency::Finep,
            status: GrantStatus::Open,
            value_min: Some(500_000.0),
            value_max: Some(3_000_000.0),
            deadline: Some(today + Duration::days(120)),
            embedding: None,
            criteria: Some(GrantEligibilityCriteria {
                company_size: Some(vec![CompanySize::Small, CompanySize::Medium]),
                states: Some(vec![
                    "SP".to_string(),
                    "RJ".to_string(),
                    "MG".to_string(),
                ]),
                cnae_codes: Some(vec![
                    "62.01-5-01".to_string(),
                    "62.02-3-00".to_string(),
                    "62.03-1-00".to_string(),
                ]),
                min_years_operation: Some(3.0),
                ..GrantEligibilityCriteria::default()
            }),
        },
        Grant {
            id: GrantId("fapesp-pipe".to_string()),
            title: "PIPE - Pesquisa Inovativa em Pequenas Empresas".to_string(),
            agency: GrantAgency::Fapesp,
            status: GrantStatus::Open,
            value_min: Some(50_000.0),
            value_max: Some(1_000_000.0),
            deadline: Some(today + Duration::days(45)),
            embedding: None,
            criteria: Some(GrantEligibilityCriteria {
                max_employees: Some(250),
                states: Some(vec!["SP".to_string()]),
                priority_themes: Some(vec![
                    "Inteligência Artificial".to_string(),
                    "Saúde Digital".to_string(),
                ]),
                ..GrantEligibilityCriteria::default()
            }),
        },
        Grant {
            id: GrantId("embrapii-cooperativo".to_string()),
            title: "Projeto Cooperativo EMBRAPII".to_string(),
            agency: GrantAgency::Embrapii,
            status: GrantStatus::ClosingSoon,
            value_min: Some(1_000_000.0),
            value_max: Some(5_000_000.0),
            deadline: Some(today + Duration::days(20)),
            embedding: None,
            criteria: Some(GrantEligibilityCriteria {
                counterpart_required: true,
                counterpart_percentage: Some(30.0),
                required_partners: Some(vec![PartnerRequirement::EmbrapiiUnit]),
                ..GrantEligibilityCriteria::default()
            }),
        },
        Grant {
            id: GrantId("sebrae-aberto".to_string()),
            title: "Programa Nacional Aberto de Inovação".to_string(),
            agency: GrantAgency::Sebrae,
            status: GrantStatus::Open,
            value_min: None,
            value_max: Some(200_000.0),
            deadline: Some(today + Duration::days(100)),
            embedding: None,
            criteria: None,
        },
        Grant {
            id: GrantId("bndes-encerrado".to_string()),
            title: "Crédito à Inovação (encerrado)".to_string(),
            agency: GrantAgency::Bndes,
            status: GrantStatus::Closed,
            value_min: Some(2_000_000.0),
            value_max: Some(20_000_000.0),
            deadline: Some(today - Duration::days(30)),
            embedding: None,
            criteria: None,
        },
    ]
}
