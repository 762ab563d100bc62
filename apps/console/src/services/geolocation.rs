//! One-shot browser geolocation.

use js_sys::Promise;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::state::viewport::MapCenter;

#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported")]
    Unsupported,
    #[error("geolocation failed: {0}")]
    Failed(String),
}

/// Resolves the device position once. No retries; callers decide the fallback.
pub async fn current_position() -> Result<MapCenter, GeolocationError> {
    let window = web_sys::window().ok_or(GeolocationError::Unsupported)?;
    let geolocation = window
        .navigator()
        .geolocation()
        .map_err(|_| GeolocationError::Unsupported)?;

    let promise = Promise::new(&mut |resolve, reject| {
        if let Err(err) =
            geolocation.get_current_position_with_error_callback(&resolve, Some(&reject))
        {
            let _ = reject.call1(&JsValue::NULL, &err);
        }
    });

    let value = JsFuture::from(promise)
        .await
        .map_err(|err| GeolocationError::Failed(describe(&err)))?;

    let position: web_sys::Position = value
        .dyn_into()
        .map_err(|_| GeolocationError::Failed("unexpected position payload".into()))?;
    let coords = position.coords();

    Ok(MapCenter::new(coords.latitude(), coords.longitude()))
}

fn describe(err: &JsValue) -> String {
    if let Some(position_error) = err.dyn_ref::<web_sys::PositionError>() {
        return format!("code {}: {}", position_error.code(), position_error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
