#![allow(non_snake_case)]

mod api;
mod config;
mod hooks;
mod models;
mod services;
mod state;
mod ui;

use api::{ClientError, ShopApiClient};
use config::AppConfig;
use dioxus::prelude::*;
use once_cell::sync::OnceCell;
use services::preferences;
use state::{use_app_state, AppState};
use tracing::{error, info};
use ui::carousel::ShopCarousel;
use ui::chat_panel::ChatPanel;
use ui::filter_panel::{FilterChips, FilterPanel};
use ui::map_view::MapView;
use ui::notifications::NotificationCenter;
use ui::ranking::RankingPanel;
use ui::shop_detail::ShopDetailPanel;

pub(crate) static APP_CONFIG: OnceCell<AppConfig> = OnceCell::new();
pub(crate) static API_CLIENT: OnceCell<ShopApiClient> = OnceCell::new();

fn main() {
    console_error_panic_hook::set_once();
    init_logging();
    bootstrap_infrastructure();

    LaunchBuilder::web()
        .with_cfg(dioxus_web::Config::new().rootname("main"))
        .launch(App);
}

fn init_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = dioxus_logger::init(tracing::Level::INFO);
    });
}

fn bootstrap_infrastructure() {
    let config = AppConfig::from_env();
    let _ = APP_CONFIG.set(config.clone());

    if config.google_maps_api_key.is_none() {
        tracing::warn!("RISKMAP_GOOGLE_MAPS_API_KEY is not set; the map will not load");
    }

    match ShopApiClient::new(config) {
        Ok(client) => {
            let client_config = client.config();
            info!(
                base_url = %client_config.api_base_url,
                profile = ?client_config.profile,
                "shop API client initialized"
            );
            let _ = API_CLIENT.set(client);
        }
        Err(err) => {
            report_client_error("店舗 API クライアントの初期化に失敗しました", &err);
        }
    }
}

fn report_client_error(context: &str, err: &ClientError) {
    error!(%context, ?err, status = ?err.status(), "api bootstrap error");
}

#[component]
fn App() -> Element {
    let app_state = use_signal(|| {
        let config = APP_CONFIG.get().cloned().unwrap_or_default();
        AppState::new(&config, preferences::load_filter())
    });

    use_context_provider(|| app_state);

    rsx! {
        div { class: "relative",
            Router::<Route> {}
            NotificationCenter {}
        }
    }
}

#[derive(Clone, Routable, Debug, PartialEq)]
enum Route {
    #[route("/")]
    MapPage {},
}

#[component]
fn MapPage() -> Element {
    hooks::shops::use_initial_shops();

    let state = use_app_state();
    let (visible_count, shop_count, is_loading) = {
        let snapshot = state.read();
        (
            snapshot.shops.visible_shops(&snapshot.filter).count(),
            snapshot.shops.shops.len(),
            snapshot.shops.is_loading,
        )
    };

    rsx! {
        main { class: "relative h-screen w-screen overflow-hidden bg-neutral-950",
            MapView {}

            header { class: "absolute left-1/2 top-4 z-20 flex -translate-x-1/2 items-center gap-3 rounded-full border border-amber-400/20 bg-black/80 px-5 py-2 shadow-lg",
                span { class: "text-sm font-semibold tracking-widest text-amber-300", "RISK MAP" }
                span { class: "text-[11px] text-white/40",
                    if is_loading { "読み込み中..." } else { "{visible_count} / {shop_count} 店舗" }
                }
            }

            FilterChips {}
            RankingPanel {}
            ShopCarousel {}
            ShopDetailPanel {}
            FilterPanel {}
            ChatPanel {}
        }
    }
}
