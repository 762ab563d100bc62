//! Map viewport controller.
//!
//! The stored center/zoom is the source of truth. Changes to it are pushed to
//! the map widget by [`ViewportState::sync_widget`], and gestures on the widget
//! are read back by [`ViewportState::handle_idle`]. A single-shot flag keeps the
//! idle event that follows our own command from being mistaken for a gesture.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MapCenter {
    pub lat: f64,
    pub lng: f64,
}

impl MapCenter {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MapBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl MapBounds {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        let within_lat = lat <= self.north && lat >= self.south;
        let within_lng = if self.west <= self.east {
            lng >= self.west && lng <= self.east
        } else {
            // antimeridian
            lng >= self.west || lng <= self.east
        };
        within_lat && within_lng
    }
}

/// The operations the controller needs from the embedded map widget.
pub trait MapWidget {
    fn pan_to(&self, center: MapCenter);
    fn set_zoom(&self, zoom: u8);
    fn center(&self) -> Option<MapCenter>;
    fn zoom(&self) -> Option<u8>;
    fn bounds(&self) -> Option<MapBounds>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleOutcome {
    /// The idle followed a programmatic move and was swallowed.
    Suppressed,
    /// A user gesture was read back into state.
    Committed,
    /// The widget had nothing to report yet.
    NotReady,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewportState {
    pub center: MapCenter,
    pub zoom: u8,
    pub bounds: Option<MapBounds>,
    pub is_map_ready: bool,
    home_center: MapCenter,
    home_zoom: u8,
    applied_center: MapCenter,
    applied_zoom: u8,
    suppress_next_idle: bool,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM)
    }
}

impl ViewportState {
    /// `center`/`zoom` are also what the widget is created with, so they
    /// count as already applied.
    pub fn new(center: MapCenter, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            bounds: None,
            is_map_ready: false,
            home_center: center,
            home_zoom: zoom,
            applied_center: center,
            applied_zoom: zoom,
            suppress_next_idle: false,
        }
    }

    pub fn set_center(&mut self, center: MapCenter) {
        self.center = center;
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom;
    }

    pub fn set_bounds(&mut self, bounds: MapBounds) {
        self.bounds = Some(bounds);
    }

    pub fn set_map_ready(&mut self, ready: bool) {
        self.is_map_ready = ready;
    }

    pub fn move_to_location(&mut self, lat: f64, lng: f64, zoom: Option<u8>) {
        self.center = MapCenter::new(lat, lng);
        if let Some(zoom) = zoom {
            self.zoom = zoom;
        }
    }

    pub fn reset_view(&mut self) {
        self.center = self.home_center;
        self.zoom = self.home_zoom;
    }

    pub fn home(&self) -> (MapCenter, u8) {
        (self.home_center, self.home_zoom)
    }

    pub fn is_idle_suppressed(&self) -> bool {
        self.suppress_next_idle
    }

    /// True when stored center or zoom has not been pushed to the widget yet.
    pub fn needs_sync(&self) -> bool {
        self.center != self.applied_center || self.zoom != self.applied_zoom
    }

    /// Pushes pending center/zoom changes to the widget. Returns whether any
    /// command was issued; issuing one arms the idle suppression.
    pub fn sync_widget(&mut self, widget: &dyn MapWidget) -> bool {
        let mut issued = false;

        if self.center != self.applied_center {
            widget.pan_to(self.center);
            self.applied_center = self.center;
            issued = true;
        }

        if self.zoom != self.applied_zoom {
            widget.set_zoom(self.zoom);
            self.applied_zoom = self.zoom;
            issued = true;
        }

        if issued {
            self.suppress_next_idle = true;
        }
        issued
    }

    /// Reconciles state with the widget after it settles.
    pub fn handle_idle(&mut self, widget: &dyn MapWidget) -> IdleOutcome {
        if self.suppress_next_idle {
            self.suppress_next_idle = false;
            return IdleOutcome::Suppressed;
        }

        let center = widget.center();
        let zoom = widget.zoom();
        let bounds = widget.bounds();

        if center.is_none() && zoom.is_none() && bounds.is_none() {
            return IdleOutcome::NotReady;
        }

        if let Some(center) = center {
            self.applied_center = center;
            self.set_center(center);
        }
        if let Some(zoom) = zoom {
            self.applied_zoom = zoom;
            self.set_zoom(zoom);
        }
        if let Some(bounds) = bounds {
            self.set_bounds(bounds);
        }

        IdleOutcome::Committed
    }
}

/// Which overlays of the map screen are open.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapLayout {
    pub is_detail_panel_open: bool,
    pub is_filter_expanded: bool,
    pub is_ai_chat_expanded: bool,
    pub is_carousel_visible: bool,
}

impl Default for MapLayout {
    fn default() -> Self {
        Self {
            is_detail_panel_open: false,
            is_filter_expanded: false,
            is_ai_chat_expanded: false,
            is_carousel_visible: true,
        }
    }
}

impl MapLayout {
    pub fn toggle_filter(&mut self) {
        self.is_filter_expanded = !self.is_filter_expanded;
    }

    pub fn toggle_carousel(&mut self) {
        self.is_carousel_visible = !self.is_carousel_visible;
    }
}
