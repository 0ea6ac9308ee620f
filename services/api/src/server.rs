use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCompanyDirectory, InMemoryGrantCatalog};
use crate::routes::with_matching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fomento::config::AppConfig;
use fomento::error::AppError;
use fomento::matching::{import_catalog, CompanyProfile, MatchService};
use fomento::telemetry;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let companies = Arc::new(InMemoryCompanyDirectory::default());
    let grants = Arc::new(InMemoryGrantCatalog::default());

    if let Some(path) = args.catalog.take() {
        let imported = load_catalog(&path)?;
        info!(catalog = %path.display(), grants = imported.len(), "catalog hydrated");
        grants.extend(imported);
    }
    if let Some(path) = args.companies.take() {
        let profiles = load_companies(&path)?;
        info!(directory = %path.display(), companies = profiles.len(), "directory hydrated");
        for profile in profiles {
            companies.insert(profile);
        }
    }

    let service = Arc::new(MatchService::new(companies, grants.clone(), config.matching));

    let app = with_matching_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        open_grants = grants.len(),
        "grant matching service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn load_catalog(path: &Path) -> Result<Vec<fomento::matching::Grant>, AppError> {
    let file = File::open(path)?;
    Ok(import_catalog(BufReader::new(file))?)
}

pub(crate) fn load_companies(path: &Path) -> Result<Vec<CompanyProfile>, AppError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
