use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::collaborators::{Geocoder, TransitRouter};
use super::ranking::AllocationResult;
use super::service::{AllocationRequest, AllocationService, EligibilityQuery};
use crate::error::AppError;

/// Router builder exposing allocation, eligibility and directory endpoints.
pub fn allocation_router<G, R>(service: Arc<AllocationService<G, R>>) -> Router
where
    G: Geocoder + 'static,
    R: TransitRouter + 'static,
{
    Router::new()
        .route("/api/v1/allocations", post(allocate_handler::<G, R>))
        .route(
            "/api/v1/specialties/eligible",
            post(eligible_specialties_handler::<G, R>),
        )
        .route(
            "/api/v1/specialties/:specialty/conditions",
            get(conditions_handler::<G, R>),
        )
        .route("/api/v1/facilities", get(facilities_handler::<G, R>))
        .route(
            "/api/v1/facilities/:specialty",
            get(facilities_by_specialty_handler::<G, R>),
        )
        .with_state(service)
}

pub(crate) async fn allocate_handler<G, R>(
    State(service): State<Arc<AllocationService<G, R>>>,
    axum::Json(request): axum::Json<AllocationRequest>,
) -> Result<axum::Json<AllocationResult>, AppError>
where
    G: Geocoder + 'static,
    R: TransitRouter + 'static,
{
    let result = service.allocate(request).await?;
    Ok(axum::Json(result))
}

pub(crate) async fn eligible_specialties_handler<G, R>(
    State(service): State<Arc<AllocationService<G, R>>>,
    axum::Json(query): axum::Json<EligibilityQuery>,
) -> Response
where
    G: Geocoder + 'static,
    R: TransitRouter + 'static,
{
    let eligible = service.eligible_specialties(query.gender, query.age);
    (StatusCode::OK, axum::Json(eligible)).into_response()
}

pub(crate) async fn conditions_handler<G, R>(
    State(service): State<Arc<AllocationService<G, R>>>,
    Path(specialty): Path<String>,
) -> Response
where
    G: Geocoder + 'static,
    R: TransitRouter + 'static,
{
    let payload = json!({
        "conditions": service.conditions_for(&specialty),
        "specialty": specialty,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn facilities_handler<G, R>(
    State(service): State<Arc<AllocationService<G, R>>>,
) -> Response
where
    G: Geocoder + 'static,
    R: TransitRouter + 'static,
{
    let payload = json!({
        "specialties": service.directory().specialties(),
        "offers": service.directory().offers(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn facilities_by_specialty_handler<G, R>(
    State(service): State<Arc<AllocationService<G, R>>>,
    Path(specialty): Path<String>,
) -> Response
where
    G: Geocoder + 'static,
    R: TransitRouter + 'static,
{
    let offers = service.directory().offers_for(&specialty);
    if offers.is_empty() {
        let payload = json!({
            "error": format!("no facility offers {specialty}"),
        });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    }
    (StatusCode::OK, axum::Json(offers)).into_response()
}
