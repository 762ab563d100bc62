use std::rc::Rc;

use dioxus::prelude::*;
use futures::StreamExt;
use gloo_timers::future::TimeoutFuture;
use tracing::{debug, error, info};

use crate::hooks::map::go_to_current_location;
use crate::hooks::shops::open_shop;
use crate::services::google_maps::{self, marker_specs, GoogleMapWidget};
use crate::state::viewport::IdleOutcome;
use crate::state::{use_app_actions, use_app_state};
use crate::APP_CONFIG;

const MAP_CONTAINER_ID: &str = "riskmap-canvas";

enum MapEvent {
    Idle,
    MarkerClicked(String),
}

#[component]
pub fn MapView() -> Element {
    let state = use_app_state();
    let actions = use_app_actions();
    let mut widget = use_signal(|| None::<Rc<GoogleMapWidget>>);
    let mut load_error = use_signal(|| None::<String>);

    let events = use_coroutine(move |mut rx: UnboundedReceiver<MapEvent>| async move {
        while let Some(event) = rx.next().await {
            match event {
                MapEvent::Idle => {
                    let Some(map) = widget.peek().clone() else {
                        continue;
                    };
                    match actions.handle_map_idle(map.as_ref()) {
                        IdleOutcome::Committed => debug!("viewport committed from map gesture"),
                        IdleOutcome::Suppressed => debug!("idle after programmatic move ignored"),
                        IdleOutcome::NotReady => debug!("map not ready on idle"),
                    }
                }
                MapEvent::MarkerClicked(shop_id) => {
                    spawn(open_shop(actions, shop_id));
                }
            }
        }
    });

    use_future(move || async move {
        TimeoutFuture::new(0).await;

        let config = APP_CONFIG.get().cloned().unwrap_or_default();
        if let Err(err) = google_maps::load_api(config.google_maps_api_key.as_deref()).await {
            error!("failed to load Google Maps: {err}");
            load_error.set(Some(err.to_string()));
            return;
        }

        let (center, zoom) = state.peek().viewport.home();
        let tx = events.tx();
        match GoogleMapWidget::mount(
            MAP_CONTAINER_ID,
            center,
            zoom,
            config.google_map_id.as_deref(),
            move || {
                let _ = tx.unbounded_send(MapEvent::Idle);
            },
        ) {
            Ok(map) => {
                info!("map widget mounted");
                widget.set(Some(Rc::new(map)));
                actions.set_map_ready(true);
            }
            Err(err) => {
                error!("failed to mount map: {err}");
                load_error.set(Some(err.to_string()));
            }
        }
    });

    let target = use_memo(move || {
        let snapshot = state.read();
        (snapshot.viewport.center, snapshot.viewport.zoom)
    });

    use_effect(move || {
        let (center, zoom) = target();
        let Some(map) = widget.read().clone() else {
            return;
        };
        if actions.sync_map_widget(map.as_ref()) {
            debug!(lat = center.lat, lng = center.lng, zoom, "map moved programmatically");
        }
    });

    let markers = use_memo(move || {
        let snapshot = state.read();
        marker_specs(&snapshot.shops, &snapshot.filter, &snapshot.chat)
    });

    use_effect(move || {
        let specs = markers.read();
        let Some(map) = widget.read().clone() else {
            return;
        };
        let tx = events.tx();
        let rendered = map.render_markers(&specs, move |shop_id| {
            let _ = tx.unbounded_send(MapEvent::MarkerClicked(shop_id));
        });
        if let Err(err) = rendered {
            error!("failed to render markers: {err}");
        }
    });

    let is_ready = state.read().viewport.is_map_ready;

    rsx! {
        div { class: "absolute inset-0",
            div { id: MAP_CONTAINER_ID, class: "h-full w-full" }

            if let Some(message) = load_error() {
                div { class: "absolute inset-0 flex items-center justify-center bg-black/80",
                    div { class: "rounded-lg border border-red-500/40 bg-red-950/80 p-4 text-sm text-red-200",
                        p { class: "font-semibold", "地図を読み込めませんでした" }
                        p { class: "mt-1 text-xs text-red-300", "{message}" }
                    }
                }
            } else if !is_ready {
                div { class: "absolute inset-0 flex items-center justify-center bg-black/60 text-sm text-amber-200",
                    "地図を読み込み中..."
                }
            }

            div { class: "absolute bottom-40 right-4 z-20 flex flex-col gap-2",
                button {
                    class: "rounded-full bg-black/70 px-3 py-2 text-xs text-amber-200 shadow hover:bg-black/90",
                    title: "現在地へ移動",
                    onclick: move |_| {
                        spawn(go_to_current_location(actions));
                    },
                    "📍 現在地"
                }
                button {
                    class: "rounded-full bg-black/70 px-3 py-2 text-xs text-amber-200 shadow hover:bg-black/90",
                    title: "初期表示に戻す",
                    onclick: move |_| actions.reset_view(),
                    "🏠 リセット"
                }
            }
        }
    }
}
