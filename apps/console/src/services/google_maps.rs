//! Google Maps JavaScript API bindings and the [`MapWidget`] implementation
//! backed by them.

use std::cell::RefCell;

use js_sys::{Function, Object, Promise, Reflect};
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::models::RiskLevel;
use crate::state::chat::ChatSession;
use crate::state::filter::FilterCriteria;
use crate::state::shops::ShopState;
use crate::state::viewport::{MapBounds, MapCenter, MapWidget};

const MAPS_SCRIPT_ID: &str = "google-maps-js";
const DIMMED_OPACITY: f64 = 0.35;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = Map)]
    pub type GoogleMap;

    #[wasm_bindgen(constructor, catch, js_namespace = ["google", "maps"], js_class = "Map")]
    fn new(element: &web_sys::Element, options: &JsValue) -> Result<GoogleMap, JsValue>;

    #[wasm_bindgen(method, js_name = panTo)]
    fn pan_to(this: &GoogleMap, latlng: &JsValue);

    #[wasm_bindgen(method, js_name = setZoom)]
    fn set_zoom(this: &GoogleMap, zoom: f64);

    #[wasm_bindgen(method, js_name = getCenter)]
    fn get_center(this: &GoogleMap) -> Option<LatLng>;

    #[wasm_bindgen(method, js_name = getZoom)]
    fn get_zoom(this: &GoogleMap) -> Option<f64>;

    #[wasm_bindgen(method, js_name = getBounds)]
    fn get_bounds(this: &GoogleMap) -> Option<LatLngBounds>;

    #[wasm_bindgen(js_namespace = ["google", "maps"])]
    type LatLng;

    #[wasm_bindgen(method)]
    fn lat(this: &LatLng) -> f64;

    #[wasm_bindgen(method)]
    fn lng(this: &LatLng) -> f64;

    #[wasm_bindgen(js_namespace = ["google", "maps"])]
    type LatLngBounds;

    #[wasm_bindgen(method, js_name = getNorthEast)]
    fn get_north_east(this: &LatLngBounds) -> LatLng;

    #[wasm_bindgen(method, js_name = getSouthWest)]
    fn get_south_west(this: &LatLngBounds) -> LatLng;

    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = Marker)]
    type GoogleMarker;

    #[wasm_bindgen(constructor, catch, js_namespace = ["google", "maps"], js_class = "Marker")]
    fn new(options: &JsValue) -> Result<GoogleMarker, JsValue>;

    #[wasm_bindgen(method, js_name = setMap)]
    fn set_map(this: &GoogleMarker, map: Option<&GoogleMap>);

    type MapsEventListener;

    #[wasm_bindgen(method)]
    fn remove(this: &MapsEventListener);

    #[wasm_bindgen(js_namespace = ["google", "maps", "event"], js_name = addListener)]
    fn add_listener(instance: &JsValue, event_name: &str, handler: &Function) -> MapsEventListener;
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map container `{0}` not found")]
    MissingContainer(String),
    #[error("Google Maps API key is not configured")]
    MissingApiKey,
    #[error("Google Maps error: {0}")]
    Js(String),
}

impl From<JsValue> for MapError {
    fn from(value: JsValue) -> Self {
        MapError::Js(
            value
                .as_string()
                .unwrap_or_else(|| format!("{value:?}")),
        )
    }
}

fn api_loaded() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    Reflect::get(&window, &JsValue::from_str("google"))
        .ok()
        .filter(|google| google.is_object())
        .and_then(|google| Reflect::get(&google, &JsValue::from_str("maps")).ok())
        .map(|maps| maps.is_object())
        .unwrap_or(false)
}

/// Injects the Maps JavaScript API script once and waits for it to load.
pub async fn load_api(api_key: Option<&str>) -> Result<(), MapError> {
    if api_loaded() {
        return Ok(());
    }
    let api_key = api_key.ok_or(MapError::MissingApiKey)?;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| MapError::Js("document unavailable".into()))?;

    if document.get_element_by_id(MAPS_SCRIPT_ID).is_some() {
        return Err(MapError::Js("Maps script is still loading".into()));
    }

    let script: web_sys::HtmlScriptElement = document
        .create_element("script")?
        .dyn_into()
        .map_err(JsValue::from)?;
    script.set_id(MAPS_SCRIPT_ID);
    script.set_src(&format!(
        "https://maps.googleapis.com/maps/api/js?key={api_key}&v=weekly"
    ));
    script.set_async(true);

    let loaded = Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });

    let head = document
        .head()
        .ok_or_else(|| MapError::Js("document has no <head>".into()))?;
    head.append_child(&script)?;

    JsFuture::from(loaded).await?;
    Ok(())
}

/// What a single marker shows.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerSpec {
    pub shop_id: String,
    pub title: String,
    pub position: MapCenter,
    pub risk_level: Option<RiskLevel>,
    pub dimmed: bool,
    pub highlighted: bool,
}

/// One marker per held shop. Shops the filter rejects stay on the map, dimmed.
pub fn marker_specs(shops: &ShopState, filter: &FilterCriteria, chat: &ChatSession) -> Vec<MarkerSpec> {
    let selected = shops.selected_shop.as_ref().map(|shop| shop.id.as_str());

    shops
        .shops
        .iter()
        .map(|shop| MarkerSpec {
            shop_id: shop.id.clone(),
            title: shop.name.clone(),
            position: MapCenter::new(shop.location.lat, shop.location.lng),
            risk_level: shop.risk_level(),
            dimmed: !filter.is_shop_visible(shop.analytics.as_ref(), shop.rating),
            highlighted: selected == Some(shop.id.as_str()) || chat.is_highlighted(&shop.id),
        })
        .collect()
}

fn marker_opacity(spec: &MarkerSpec) -> f64 {
    let base = spec.risk_level.map(RiskLevel::marker_opacity).unwrap_or(1.0);
    if spec.dimmed {
        DIMMED_OPACITY.min(base)
    } else {
        base
    }
}

struct PlacedMarker {
    marker: GoogleMarker,
    listener: MapsEventListener,
    _on_click: Closure<dyn FnMut()>,
}

impl Drop for PlacedMarker {
    fn drop(&mut self) {
        self.listener.remove();
        self.marker.set_map(None);
    }
}

pub struct GoogleMapWidget {
    map: GoogleMap,
    idle_listener: MapsEventListener,
    _on_idle: Closure<dyn FnMut()>,
    markers: RefCell<Vec<PlacedMarker>>,
}

impl GoogleMapWidget {
    pub fn mount(
        container_id: &str,
        center: MapCenter,
        zoom: u8,
        map_id: Option<&str>,
        on_idle: impl FnMut() + 'static,
    ) -> Result<Self, MapError> {
        let element = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(container_id))
            .ok_or_else(|| MapError::MissingContainer(container_id.to_string()))?;

        let options = js_object(&[
            ("center", lat_lng(center)),
            ("zoom", JsValue::from_f64(f64::from(zoom))),
            ("gestureHandling", JsValue::from_str("greedy")),
            ("mapTypeControl", JsValue::FALSE),
            ("disableDefaultUI", JsValue::FALSE),
        ]);
        if let Some(map_id) = map_id {
            Reflect::set(&options, &JsValue::from_str("mapId"), &JsValue::from_str(map_id))?;
        }

        let map = GoogleMap::new(&element, &options)?;
        let on_idle = Closure::wrap(Box::new(on_idle) as Box<dyn FnMut()>);
        let idle_listener = add_listener(&map, "idle", on_idle.as_ref().unchecked_ref());

        Ok(Self {
            map,
            idle_listener,
            _on_idle: on_idle,
            markers: RefCell::new(Vec::new()),
        })
    }

    /// Replaces every marker on the map.
    pub fn render_markers<F>(&self, specs: &[MarkerSpec], on_click: F) -> Result<(), MapError>
    where
        F: Fn(String) + Clone + 'static,
    {
        let mut placed = Vec::with_capacity(specs.len());
        for spec in specs {
            let marker = GoogleMarker::new(&marker_options(spec))?;
            marker.set_map(Some(&self.map));

            let shop_id = spec.shop_id.clone();
            let on_click = on_click.clone();
            let handler =
                Closure::wrap(Box::new(move || on_click(shop_id.clone())) as Box<dyn FnMut()>);
            let listener = add_listener(&marker, "click", handler.as_ref().unchecked_ref());

            placed.push(PlacedMarker {
                marker,
                listener,
                _on_click: handler,
            });
        }

        // dropping the old set detaches it
        *self.markers.borrow_mut() = placed;
        Ok(())
    }
}

impl Drop for GoogleMapWidget {
    fn drop(&mut self) {
        self.markers.borrow_mut().clear();
        self.idle_listener.remove();
    }
}

impl MapWidget for GoogleMapWidget {
    fn pan_to(&self, center: MapCenter) {
        self.map.pan_to(&lat_lng(center));
    }

    fn set_zoom(&self, zoom: u8) {
        self.map.set_zoom(f64::from(zoom));
    }

    fn center(&self) -> Option<MapCenter> {
        self.map
            .get_center()
            .map(|center| MapCenter::new(center.lat(), center.lng()))
    }

    fn zoom(&self) -> Option<u8> {
        self.map
            .get_zoom()
            .filter(|zoom| zoom.is_finite())
            .map(|zoom| zoom.round().clamp(0.0, 22.0) as u8)
    }

    fn bounds(&self) -> Option<MapBounds> {
        self.map.get_bounds().map(|bounds| {
            let north_east = bounds.get_north_east();
            let south_west = bounds.get_south_west();
            MapBounds {
                north: north_east.lat(),
                south: south_west.lat(),
                east: north_east.lng(),
                west: south_west.lng(),
            }
        })
    }
}

fn marker_options(spec: &MarkerSpec) -> JsValue {
    let (fill, stroke) = spec
        .risk_level
        .map(RiskLevel::marker_colors)
        .unwrap_or(("#6366f1", "#4338ca"));
    let opacity = marker_opacity(spec);

    // google.maps.SymbolPath.CIRCLE
    let icon = js_object(&[
        ("path", JsValue::from_f64(0.0)),
        ("fillColor", JsValue::from_str(fill)),
        ("fillOpacity", JsValue::from_f64(1.0)),
        ("strokeColor", JsValue::from_str(stroke)),
        ("strokeWeight", JsValue::from_f64(if spec.highlighted { 4.0 } else { 2.0 })),
        ("scale", JsValue::from_f64(if spec.highlighted { 12.0 } else { 9.0 })),
    ]);

    js_object(&[
        ("position", lat_lng(spec.position)),
        ("title", JsValue::from_str(&spec.title)),
        ("icon", icon),
        ("opacity", JsValue::from_f64(opacity)),
        ("zIndex", JsValue::from_f64(if spec.highlighted { 1000.0 } else { 1.0 })),
    ])
}

fn lat_lng(center: MapCenter) -> JsValue {
    js_object(&[
        ("lat", JsValue::from_f64(center.lat)),
        ("lng", JsValue::from_f64(center.lng)),
    ])
}

fn js_object(entries: &[(&str, JsValue)]) -> JsValue {
    let object = Object::new();
    for (key, value) in entries {
        let _ = Reflect::set(&object, &JsValue::from_str(key), value);
    }
    object.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Shop, ShopAnalytics};

    fn shop(id: &str, level: RiskLevel, rating: f64) -> Shop {
        Shop {
            id: id.to_string(),
            place_id: format!("place-{id}"),
            name: format!("Shop {id}"),
            formatted_address: None,
            location: Location {
                lat: 35.69,
                lng: 139.70,
            },
            rating: Some(rating),
            user_ratings_total: None,
            price_level: None,
            business_status: None,
            opening_hours: None,
            phone_number: None,
            website: None,
            created_at: None,
            updated_at: None,
            last_fetched_at: None,
            analytics: Some(ShopAnalytics {
                risk_level: Some(level),
                ..ShopAnalytics::default()
            }),
        }
    }

    #[test]
    fn filtered_out_shops_are_dimmed_not_dropped() {
        let mut shops = ShopState::default();
        shops.set_shops(vec![
            shop("a", RiskLevel::Safe, 4.5),
            shop("b", RiskLevel::Mine, 4.0),
        ]);
        let mut filter = FilterCriteria::default();
        filter.toggle_risk_level(RiskLevel::Mine);

        let specs = marker_specs(&shops, &filter, &ChatSession::default());

        assert_eq!(specs.len(), 2);
        assert!(!specs[0].dimmed);
        assert!(specs[1].dimmed);
        assert_eq!(marker_opacity(&specs[1]), DIMMED_OPACITY);
    }

    #[test]
    fn selected_shop_is_highlighted() {
        let mut shops = ShopState::default();
        shops.set_shops(vec![shop("a", RiskLevel::Gamble, 3.5), shop("b", RiskLevel::Safe, 4.0)]);
        shops.select_shop(Some(shop("b", RiskLevel::Safe, 4.0)));

        let specs = marker_specs(&shops, &FilterCriteria::default(), &ChatSession::default());

        assert!(!specs[0].highlighted);
        assert!(specs[1].highlighted);
    }

    #[test]
    fn fake_shops_keep_their_own_opacity() {
        let spec = MarkerSpec {
            shop_id: "f".into(),
            title: "Fake".into(),
            position: MapCenter::new(0.0, 0.0),
            risk_level: Some(RiskLevel::Fake),
            dimmed: false,
            highlighted: false,
        };
        assert_eq!(marker_opacity(&spec), RiskLevel::Fake.marker_opacity());
    }
}
