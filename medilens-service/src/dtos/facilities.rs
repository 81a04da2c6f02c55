use serde::{Deserialize, Serialize};
use validator::Validate;

/// Location query for the nearby-facility endpoint. Latitude and longitude are
/// optional at the wire level so their absence maps to a 400 instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize, Validate)]
pub struct FacilitySearchRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub radius_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Facility {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub category: String,
    /// Geodesic distance from the query point, rounded to 2 decimal places.
    pub distance_km: f64,
}

#[derive(Debug, Serialize)]
pub struct FacilitySearchResponse {
    pub facilities: Vec<Facility>,
}
