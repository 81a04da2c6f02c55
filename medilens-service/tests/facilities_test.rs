mod common;

use axum::http::StatusCode;
use common::{facility_node, TestApp};
use medilens_service::services::overpass::{Center, FacilityElement};
use serde_json::json;

#[tokio::test]
async fn empty_upstream_yields_empty_list_not_an_error() {
    let app = TestApp::with_elements(Vec::new());

    let (status, body) = app
        .post_json(
            "/api/leaflet-hospitals",
            json!({"latitude": 0.0, "longitude": 0.0, "radius_km": 1.0}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["facilities"], json!([]));
}

#[tokio::test]
async fn facilities_are_returned_sorted_by_distance() {
    let elements = vec![
        facility_node(1, 0.05, 0.0, &[("name", "Far Hospital"), ("amenity", "hospital")]),
        facility_node(2, 0.01, 0.0, &[("name", "Near Clinic"), ("amenity", "clinic")]),
        facility_node(3, 0.03, 0.0, &[("name", "Mid Doctors"), ("amenity", "doctors")]),
    ];
    let app = TestApp::with_elements(elements);

    let (status, body) = app
        .post_json(
            "/api/leaflet-hospitals",
            json!({"latitude": 0.0, "longitude": 0.0}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let facilities = body["facilities"].as_array().expect("facilities array");
    assert_eq!(facilities.len(), 3);
    assert_eq!(facilities[0]["name"], "Near Clinic");
    assert_eq!(facilities[1]["name"], "Mid Doctors");
    assert_eq!(facilities[2]["name"], "Far Hospital");

    let distances: Vec<f64> = facilities
        .iter()
        .map(|f| f["distance_km"].as_f64().expect("distance_km"))
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn elements_without_coordinates_are_excluded() {
    let elements = vec![
        FacilityElement {
            element_type: "relation".to_string(),
            id: 1,
            lat: None,
            lon: None,
            center: None,
            tags: Some(
                [("amenity".to_string(), "hospital".to_string())]
                    .into_iter()
                    .collect(),
            ),
        },
        FacilityElement {
            element_type: "way".to_string(),
            id: 2,
            lat: None,
            lon: None,
            center: Some(Center { lat: 0.02, lon: 0.0 }),
            tags: Some(
                [
                    ("amenity".to_string(), "clinic".to_string()),
                    ("name".to_string(), "Centered Clinic".to_string()),
                ]
                .into_iter()
                .collect(),
            ),
        },
    ];
    let app = TestApp::with_elements(elements);

    let (status, body) = app
        .post_json(
            "/api/leaflet-hospitals",
            json!({"latitude": 0.0, "longitude": 0.0}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let facilities = body["facilities"].as_array().expect("facilities array");
    assert_eq!(facilities.len(), 1);
    assert_eq!(facilities[0]["name"], "Centered Clinic");
    assert_eq!(facilities[0]["category"], "clinic");
}

#[tokio::test]
async fn distance_is_rounded_to_two_decimals() {
    let elements = vec![facility_node(1, 0.0123, 0.0456, &[("amenity", "hospital")])];
    let app = TestApp::with_elements(elements);

    let (_, body) = app
        .post_json(
            "/api/leaflet-hospitals",
            json!({"latitude": 0.0, "longitude": 0.0}),
        )
        .await;

    let d = body["facilities"][0]["distance_km"]
        .as_f64()
        .expect("distance_km");
    assert_eq!(d, (d * 100.0).round() / 100.0);
}

#[tokio::test]
async fn default_values_are_applied() {
    let elements = vec![facility_node(1, 0.01, 0.0, &[("emergency", "yes")])];
    let app = TestApp::with_elements(elements);

    let (_, body) = app
        .post_json(
            "/api/leaflet-hospitals",
            json!({"latitude": 0.0, "longitude": 0.0}),
        )
        .await;

    let facility = &body["facilities"][0];
    assert_eq!(facility["name"], "Unnamed Facility");
    assert_eq!(facility["address"], "N/A");
    assert_eq!(facility["category"], "hospital");
}

#[tokio::test]
async fn missing_coordinates_yield_400_with_error_field() {
    let app = TestApp::with_elements(Vec::new());

    let (status, body) = app
        .post_json("/api/leaflet-hospitals", json!({"radius_km": 2.0}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Latitude and longitude are required");
}

#[tokio::test]
async fn out_of_range_latitude_yields_400() {
    let app = TestApp::with_elements(Vec::new());

    let (status, body) = app
        .post_json(
            "/api/leaflet-hospitals",
            json!({"latitude": 123.0, "longitude": 0.0}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn non_positive_radius_yields_400() {
    let app = TestApp::with_elements(Vec::new());

    let (status, _) = app
        .post_json(
            "/api/leaflet-hospitals",
            json!({"latitude": 0.0, "longitude": 0.0, "radius_km": 0.0}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_failure_surfaces_as_500_with_message() {
    let app = TestApp::with_failing_upstreams();

    let (status, body) = app
        .post_json(
            "/api/leaflet-hospitals",
            json!({"latitude": 0.0, "longitude": 0.0}),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap_or_default();
    assert!(error.starts_with("Failed to find nearby facilities"));
}
