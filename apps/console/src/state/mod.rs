pub mod character;
pub mod chat;
pub mod filter;
pub mod shops;
pub mod viewport;

use dioxus::prelude::*;
use dioxus_signals::Signal;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::models::{ChatSearchResponse, RankingItem, RankingSort, Review, RiskLevel, RiskSummary, Shop};
use crate::services::preferences;

use character::CharacterState;
use chat::{ChatSession, PendingSearch};
use filter::{FilterCriteria, FilterMode};
use shops::{RankingState, RequestSlot, RequestTicket, RiskSummaryState, ShopState};
use viewport::{IdleOutcome, MapLayout, MapWidget, ViewportState};

pub type AppSignal = Signal<AppState>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OperationState {
    pub last_message: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppState {
    pub viewport: ViewportState,
    pub layout: MapLayout,
    pub shops: ShopState,
    pub filter: FilterCriteria,
    pub chat: ChatSession,
    pub character: CharacterState,
    pub ranking: RankingState,
    pub risk_summary: RiskSummaryState,
    pub operation: OperationState,
}

impl AppState {
    pub fn new(config: &AppConfig, filter: FilterCriteria) -> Self {
        Self {
            viewport: ViewportState::new(config.default_center, config.default_zoom),
            filter,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy)]
pub struct AppActions {
    state: AppSignal,
}

impl AppActions {
    pub fn new(state: AppSignal) -> Self {
        Self { state }
    }

    fn update<R>(&self, apply: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = self.state;
        let mut guard = state.write();
        apply(&mut guard)
    }

    // viewport

    pub fn set_map_ready(&self, ready: bool) {
        self.update(|state| state.viewport.set_map_ready(ready));
    }

    pub fn move_to_location(&self, lat: f64, lng: f64, zoom: Option<u8>) {
        self.update(|state| state.viewport.move_to_location(lat, lng, zoom));
    }

    pub fn reset_view(&self) {
        self.update(|state| state.viewport.reset_view());
    }

    /// Only writes when there is something to push, so effects that read the
    /// viewport do not retrigger themselves.
    pub fn sync_map_widget(&self, widget: &dyn MapWidget) -> bool {
        if !self.state.peek().viewport.needs_sync() {
            return false;
        }
        self.update(|state| state.viewport.sync_widget(widget))
    }

    pub fn handle_map_idle(&self, widget: &dyn MapWidget) -> IdleOutcome {
        self.update(|state| state.viewport.handle_idle(widget))
    }

    // layout

    pub fn set_ai_chat_expanded(&self, expanded: bool) {
        self.update(|state| state.layout.is_ai_chat_expanded = expanded);
    }

    pub fn toggle_filter_panel(&self) {
        self.update(|state| state.layout.toggle_filter());
    }

    pub fn toggle_carousel(&self) {
        self.update(|state| state.layout.toggle_carousel());
    }

    // shops

    pub fn begin_shop_request(&self, slot: RequestSlot) -> RequestTicket {
        self.update(|state| state.shops.begin(slot))
    }

    pub fn finish_shop_collection(&self, ticket: RequestTicket, outcome: Result<Vec<Shop>, String>) {
        self.update(|state| state.shops.finish_collection(ticket, outcome));
    }

    pub fn finish_shop_selection(&self, ticket: RequestTicket, outcome: Result<Shop, String>) -> bool {
        self.update(|state| state.shops.finish_selection(ticket, outcome))
    }

    /// Returns whether the character started a celebration.
    pub fn select_shop(&self, shop: Option<Shop>) -> bool {
        self.update(|state| {
            state.shops.select_shop(shop);
            reveal_selection(state)
        })
    }

    /// Opens the detail panel for whatever the selection fetch produced.
    pub fn reveal_selected_shop(&self) -> bool {
        self.update(reveal_selection)
    }

    /// Centers the map on the selected shop and opens its detail panel.
    pub fn focus_selected_shop(&self, zoom: u8) -> bool {
        self.update(|state| {
            let target = state
                .shops
                .selected_shop
                .as_ref()
                .map(|shop| (shop.location.lat, shop.location.lng));
            if let Some((lat, lng)) = target {
                state.viewport.move_to_location(lat, lng, Some(zoom));
            }
            reveal_selection(state)
        })
    }

    pub fn clear_shop_error(&self) {
        self.update(|state| state.shops.clear_error());
    }

    pub fn begin_reviews(&self, shop_id: &str) -> u64 {
        self.update(|state| state.shops.reviews.begin(shop_id))
    }

    pub fn finish_reviews(&self, seq: u64, outcome: Result<(Vec<Review>, u64), String>) {
        self.update(|state| state.shops.reviews.finish(seq, outcome));
    }

    // filter

    pub fn set_filter_mode(&self, mode: FilterMode) {
        self.update_filter(|filter| filter.set_mode(mode));
    }

    pub fn set_min_rating(&self, rating: f64) {
        self.update_filter(|filter| filter.set_min_rating(rating));
    }

    pub fn set_max_sakura_risk(&self, risk: f64) {
        self.update_filter(|filter| filter.set_max_sakura_risk(risk));
    }

    pub fn toggle_risk_level(&self, level: RiskLevel) {
        self.update_filter(|filter| {
            filter.toggle_risk_level(level);
        });
    }

    pub fn reset_filters(&self) {
        self.update_filter(FilterCriteria::reset);
    }

    fn update_filter(&self, apply: impl FnOnce(&mut FilterCriteria)) {
        let snapshot = self.update(|state| {
            apply(&mut state.filter);
            state.filter.clone()
        });
        preferences::save_filter(&snapshot);
    }

    // chat

    pub fn begin_search(&self, query: &str) -> Option<PendingSearch> {
        self.update(|state| {
            let pending = state.chat.begin_search(query);
            if pending.is_some() {
                state.character.start_searching();
            }
            pending
        })
    }

    /// Returns whether the character started a celebration.
    pub fn complete_search(
        &self,
        pending: PendingSearch,
        outcome: Result<ChatSearchResponse, String>,
    ) -> bool {
        self.update(|state| {
            let top_level = outcome
                .as_ref()
                .ok()
                .and_then(|response| response.results.first())
                .and_then(|item| item.analytics.as_ref())
                .and_then(|analytics| analytics.risk_level);

            if !state.chat.complete_search(pending, outcome) {
                return false;
            }

            match top_level {
                Some(level) => state.character.react_to_risk(level, pick_index()),
                None => {
                    state.character.reset_to_idle();
                    false
                }
            }
        })
    }

    pub fn clear_messages(&self) {
        self.update(|state| {
            state.chat.clear_messages();
            state.character.show_greeting(pick_index());
        });
    }

    pub fn hide_particles(&self) {
        self.update(|state| state.character.hide_particles());
    }

    // ranking / summary

    pub fn begin_ranking(&self, area_key: Option<String>, sort_by: RankingSort) -> u64 {
        self.update(|state| state.ranking.begin(area_key, sort_by))
    }

    pub fn finish_ranking(&self, seq: u64, outcome: Result<Vec<RankingItem>, String>) {
        self.update(|state| state.ranking.finish(seq, outcome));
    }

    pub fn set_risk_summary(&self, outcome: Result<RiskSummary, String>) {
        self.update(|state| match outcome {
            Ok(summary) => {
                state.risk_summary.summary = Some(summary);
                state.risk_summary.error = None;
            }
            Err(message) => state.risk_summary.error = Some(message),
        });
    }

    // operation notices

    pub fn set_operation_success(&self, message: String) {
        self.update(|state| {
            state.operation.last_message = Some(message);
            state.operation.error = None;
        });
    }

    pub fn set_operation_error(&self, message: String) {
        self.update(|state| {
            state.operation.error = Some(message);
            state.operation.last_message = None;
        });
    }

    pub fn clear_operation_status(&self) {
        self.update(|state| state.operation = OperationState::default());
    }
}

fn reveal_selection(state: &mut AppState) -> bool {
    state.layout.is_detail_panel_open = state.shops.selected_shop.is_some();
    match state.shops.selected_shop.as_ref().and_then(Shop::risk_level) {
        Some(level) => state.character.react_to_risk(level, pick_index()),
        None => false,
    }
}

/// Spreads picks across message pools without a dedicated RNG.
fn pick_index() -> usize {
    (uuid::Uuid::new_v4().as_u128() % 1024) as usize
}

pub fn use_app_state() -> AppSignal {
    use_context::<AppSignal>()
}

pub fn use_app_actions() -> AppActions {
    AppActions::new(use_app_state())
}
