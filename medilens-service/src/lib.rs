//! MediLens backend: relay endpoints for Gemini text chat and image analysis,
//! nearby medical facility lookup via an Overpass-style index, and static
//! serving of the prebuilt frontend bundle.
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod services;
pub mod startup;
