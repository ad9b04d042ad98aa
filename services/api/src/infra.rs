use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use upae_alloc::allocation::{
    AllocationService, Coordinates, FacilityDirectory, MunicipalityGeocoder, RouteObservation,
    RoutingError, TransitRouter,
};
use upae_alloc::config::AllocationSettings;
use upae_alloc::error::AppError;

pub(crate) type UpaeAllocationService = AllocationService<MunicipalityGeocoder, OfflineTransitRouter>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in for a transit provider; every trip is scored with the distance heuristic.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OfflineTransitRouter;

impl TransitRouter for OfflineTransitRouter {
    fn route(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
    ) -> Result<RouteObservation, RoutingError> {
        Err(RoutingError::Unavailable(
            "no transit provider configured".to_string(),
        ))
    }
}

pub(crate) fn load_directory(settings: &AllocationSettings) -> Result<FacilityDirectory, AppError> {
    match &settings.facility_csv {
        Some(path) => {
            let directory = FacilityDirectory::from_path(path)?;
            info!(path = %path.display(), offers = directory.len(), "facility directory imported");
            Ok(directory)
        }
        None => Ok(FacilityDirectory::standard()),
    }
}

pub(crate) fn build_allocation_service(
    settings: &AllocationSettings,
) -> Result<Arc<UpaeAllocationService>, AppError> {
    let directory = load_directory(settings)?;
    let service = AllocationService::new(
        Arc::new(MunicipalityGeocoder::pernambuco()),
        Arc::new(OfflineTransitRouter),
        Arc::new(directory),
        settings.scoring,
    )?
    .with_route_timeout(settings.route_timeout);
    Ok(Arc::new(service))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
