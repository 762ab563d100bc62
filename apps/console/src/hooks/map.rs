use tracing::warn;

use crate::api::NearbyQuery;
use crate::hooks::shops::fetch_nearby_shops;
use crate::services::geolocation::{self, GeolocationError};
use crate::state::viewport::MapCenter;
use crate::state::AppActions;
use crate::APP_CONFIG;

pub const AREA_ZOOM: u8 = 15;
pub const DEFAULT_AREA_RADIUS: f64 = 1500.0;
pub const AREA_SHOP_LIMIT: u32 = 100;

/// Recenters on an area and replaces the shop list with what is near it.
pub async fn go_to_area(actions: AppActions, lat: f64, lng: f64, radius: Option<f64>) {
    actions.move_to_location(lat, lng, Some(AREA_ZOOM));
    fetch_nearby_shops(
        actions,
        NearbyQuery {
            lat,
            lng,
            radius: Some(radius.unwrap_or(DEFAULT_AREA_RADIUS)),
            limit: Some(AREA_SHOP_LIMIT),
            risk_level: None,
        },
    )
    .await;
}

pub async fn go_to_current_location(actions: AppActions) {
    let target = match geolocation::current_position().await {
        Ok(position) => position,
        Err(GeolocationError::Unsupported) => {
            warn!("geolocation is not supported by this browser");
            return;
        }
        Err(err) => {
            warn!("geolocation failed, using the default center: {err}");
            fallback_center()
        }
    };

    go_to_area(actions, target.lat, target.lng, None).await;
}

fn fallback_center() -> MapCenter {
    APP_CONFIG
        .get()
        .map(|config| config.default_center)
        .unwrap_or(crate::config::DEFAULT_MAP_CENTER)
}
