use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::viewport::MapCenter;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CHAT_RESULT_LIMIT: u32 = 5;

pub const DEFAULT_MAP_CENTER: MapCenter = MapCenter {
    lat: 35.6938,
    lng: 139.7034,
};
pub const DEFAULT_MAP_ZOOM: u8 = 14;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppProfile {
    Dev,
    Prod,
}

impl AppProfile {
    pub fn from_env(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("prod") | Some("production") => Self::Prod,
            _ => Self::Dev,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub google_maps_api_key: Option<String>,
    pub google_map_id: Option<String>,
    pub default_center: MapCenter,
    pub default_zoom: u8,
    pub profile: AppProfile,
    pub request_timeout: Duration,
    pub chat_result_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            google_maps_api_key: None,
            google_map_id: None,
            default_center: DEFAULT_MAP_CENTER,
            default_zoom: DEFAULT_MAP_ZOOM,
            profile: AppProfile::Dev,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            chat_result_limit: DEFAULT_CHAT_RESULT_LIMIT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        crate::config::load_dotenv();

        Self::from_lookup(read_env)
    }

    /// Builds the config from an arbitrary key lookup, falling back to defaults
    /// for anything missing or unparsable.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("RISKMAP_API_BASE_URL") {
            config.api_base_url = url;
        }

        config.google_maps_api_key = lookup("RISKMAP_GOOGLE_MAPS_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        config.google_map_id = lookup("RISKMAP_GOOGLE_MAP_ID")
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        if let Some(lat) = lookup("RISKMAP_DEFAULT_LAT").and_then(|value| value.parse::<f64>().ok())
        {
            if (-90.0..=90.0).contains(&lat) {
                config.default_center.lat = lat;
            }
        }

        if let Some(lng) = lookup("RISKMAP_DEFAULT_LNG").and_then(|value| value.parse::<f64>().ok())
        {
            if (-180.0..=180.0).contains(&lng) {
                config.default_center.lng = lng;
            }
        }

        if let Some(zoom) = lookup("RISKMAP_DEFAULT_ZOOM").and_then(|value| value.parse::<u8>().ok())
        {
            config.default_zoom = zoom.clamp(1, 21);
        }

        config.profile = AppProfile::from_env(lookup("RISKMAP_PROFILE"));

        if let Some(secs) =
            lookup("RISKMAP_REQUEST_TIMEOUT_SECS").and_then(|value| value.parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(limit) =
            lookup("RISKMAP_CHAT_RESULT_LIMIT").and_then(|value| value.parse::<u32>().ok())
        {
            config.chat_result_limit = limit.clamp(1, 20);
        }

        config
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| option_env_from_build(key).map(|s| s.to_string()))
}

fn option_env_from_build(key: &str) -> Option<&'static str> {
    match key {
        "RISKMAP_API_BASE_URL" => option_env!("RISKMAP_API_BASE_URL"),
        "RISKMAP_GOOGLE_MAPS_API_KEY" => option_env!("RISKMAP_GOOGLE_MAPS_API_KEY"),
        "RISKMAP_GOOGLE_MAP_ID" => option_env!("RISKMAP_GOOGLE_MAP_ID"),
        "RISKMAP_DEFAULT_LAT" => option_env!("RISKMAP_DEFAULT_LAT"),
        "RISKMAP_DEFAULT_LNG" => option_env!("RISKMAP_DEFAULT_LNG"),
        "RISKMAP_DEFAULT_ZOOM" => option_env!("RISKMAP_DEFAULT_ZOOM"),
        "RISKMAP_PROFILE" => option_env!("RISKMAP_PROFILE"),
        "RISKMAP_REQUEST_TIMEOUT_SECS" => option_env!("RISKMAP_REQUEST_TIMEOUT_SECS"),
        "RISKMAP_CHAT_RESULT_LIMIT" => option_env!("RISKMAP_CHAT_RESULT_LIMIT"),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            tracing::warn!("failed to load .env: {err}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn load_dotenv() {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.default_center, DEFAULT_MAP_CENTER);
        assert_eq!(config.default_zoom, DEFAULT_MAP_ZOOM);
        assert_eq!(config.profile, AppProfile::Dev);
        assert_eq!(config.chat_result_limit, 5);
        assert!(config.google_maps_api_key.is_none());
    }

    #[test]
    fn overrides_are_parsed_and_bounded() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("RISKMAP_API_BASE_URL", "https://api.example.test/api/v1"),
            ("RISKMAP_DEFAULT_LAT", "35.658"),
            ("RISKMAP_DEFAULT_LNG", "999"),
            ("RISKMAP_DEFAULT_ZOOM", "40"),
            ("RISKMAP_PROFILE", "production"),
            ("RISKMAP_REQUEST_TIMEOUT_SECS", "0"),
            ("RISKMAP_GOOGLE_MAPS_API_KEY", "   "),
        ]));

        assert_eq!(config.api_base_url, "https://api.example.test/api/v1");
        assert_eq!(config.default_center.lat, 35.658);
        assert_eq!(config.default_center.lng, DEFAULT_MAP_CENTER.lng);
        assert_eq!(config.default_zoom, 21);
        assert_eq!(config.profile, AppProfile::Prod);
        assert_eq!(config.request_timeout, Duration::from_secs(1));
        assert!(config.google_maps_api_key.is_none());
    }
}
