pub mod overpass;
pub mod providers;
