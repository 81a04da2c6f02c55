#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use medilens_service::config::MedilensConfig;
use medilens_service::services::overpass::{FacilityElement, MockFacilityIndex};
use medilens_service::services::providers::mock::MockGenerativeProvider;
use medilens_service::services::providers::GenerativeProvider;
use medilens_service::startup::{build_router, AppState};
use std::sync::Arc;
use tower::util::ServiceExt;

pub const MULTIPART_BOUNDARY: &str = "medilens-test-boundary";

/// Router over mock providers, plus handles onto the mocks for assertions.
pub struct TestApp {
    pub router: Router,
    pub generative: Arc<MockGenerativeProvider>,
}

impl TestApp {
    /// App whose facility index returns the given elements.
    pub fn with_elements(elements: Vec<FacilityElement>) -> Self {
        Self::build(
            MockGenerativeProvider::new(true),
            MockFacilityIndex::new(elements),
            None,
        )
    }

    /// App whose upstreams all fail.
    pub fn with_failing_upstreams() -> Self {
        Self::build(
            MockGenerativeProvider::new(false),
            MockFacilityIndex::failing(),
            None,
        )
    }

    /// App serving static assets from the given directory.
    pub fn with_build_dir(build_dir: &str) -> Self {
        Self::build(
            MockGenerativeProvider::new(true),
            MockFacilityIndex::new(Vec::new()),
            Some(build_dir.to_string()),
        )
    }

    fn build(
        generative: MockGenerativeProvider,
        index: MockFacilityIndex,
        build_dir: Option<String>,
    ) -> Self {
        let mut config = MedilensConfig::load().expect("Failed to load configuration");
        if let Some(dir) = build_dir {
            config.frontend.build_dir = dir;
        }

        let generative = Arc::new(generative);
        let state = AppState {
            config,
            generative: generative.clone() as Arc<dyn GenerativeProvider>,
            facility_index: Arc::new(index),
        };

        Self {
            router: build_router(state),
            generative,
        }
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");

        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

        (status, json)
    }
}

/// A part of a hand-built multipart body.
pub struct MultipartPart<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub data: &'a [u8],
}

/// Build a `multipart/form-data` request the way a browser would encode it.
pub fn multipart_request(uri: &str, parts: &[MultipartPart<'_>]) -> Request<Body> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .body(Body::from(body))
        .expect("Failed to build request")
}

/// Overpass node element with the given tags.
pub fn facility_node(id: u64, lat: f64, lon: f64, tags: &[(&str, &str)]) -> FacilityElement {
    FacilityElement {
        element_type: "node".to_string(),
        id,
        lat: Some(lat),
        lon: Some(lon),
        center: None,
        tags: Some(
            tags.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
    }
}
