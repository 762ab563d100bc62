pub mod geolocation;
pub mod google_maps;
pub mod preferences;
