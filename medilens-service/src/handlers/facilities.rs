use crate::dtos::{Facility, FacilitySearchRequest, FacilitySearchResponse};
use crate::services::overpass::FacilityElement;
use crate::startup::AppState;
use axum::{extract::State, Json};
use geo::{Distance, Geodesic, Point};
use service_core::error::AppError;
use validator::Validate;

const DEFAULT_RADIUS_KM: f64 = 5.0;
const DEFAULT_NAME: &str = "Unnamed Facility";
const DEFAULT_ADDRESS: &str = "N/A";
const DEFAULT_CATEGORY: &str = "hospital";

/// Find medical facilities around a location, ordered by ascending geodesic
/// distance.
pub async fn find_nearby_facilities(
    State(state): State<AppState>,
    Json(request): Json<FacilitySearchRequest>,
) -> Result<Json<FacilitySearchResponse>, AppError> {
    request.validate()?;

    let (latitude, longitude) = match (request.latitude, request.longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Latitude and longitude are required"
            )))
        }
    };
    let radius_km = request.radius_km.unwrap_or(DEFAULT_RADIUS_KM);

    let elements = state
        .facility_index
        .search_around(latitude, longitude, radius_km * 1000.0)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Facility index query failed");
            AppError::Upstream(format!("Failed to find nearby facilities: {}", e))
        })?;

    let facilities = facilities_by_distance(latitude, longitude, elements);

    tracing::info!(
        count = facilities.len(),
        radius_km = radius_km,
        "Facility search completed"
    );

    Ok(Json(FacilitySearchResponse { facilities }))
}

/// Shape raw index elements into facilities sorted by ascending distance.
///
/// Elements without a tag set or without resolvable coordinates are dropped.
fn facilities_by_distance(
    latitude: f64,
    longitude: f64,
    elements: Vec<FacilityElement>,
) -> Vec<Facility> {
    let origin = Point::new(longitude, latitude);

    let mut facilities: Vec<Facility> = elements
        .into_iter()
        .filter_map(|element| {
            let (lat, lon) = element.coordinates()?;
            let tags = element.tags?;
            let meters = Geodesic::distance(origin, Point::new(lon, lat));

            Some(Facility {
                name: tags
                    .get("name")
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_NAME.to_string()),
                latitude: lat,
                longitude: lon,
                address: tags
                    .get("addr:full")
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
                category: tags
                    .get("amenity")
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                distance_km: round_km(meters / 1000.0),
            })
        })
        .collect();

    facilities.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    facilities
}

fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
