pub mod chat;
pub mod facilities;

pub use chat::{ChatRequest, ChatResponse, ImageAnalysisResponse};
pub use facilities::{Facility, FacilitySearchRequest, FacilitySearchResponse};
