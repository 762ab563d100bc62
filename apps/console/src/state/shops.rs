//! Shop data store.
//!
//! Every fetch takes a [`RequestTicket`] before going to the network and hands
//! it back with the outcome. Only the most recently issued ticket of a slot may
//! write; responses that lost the race are dropped.

use serde::{Deserialize, Serialize};

use crate::models::{RankingItem, RankingSort, Review, RiskSummary, Shop};
use crate::state::filter::FilterCriteria;
use crate::state::viewport::MapBounds;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestSlot {
    Collection,
    Selection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket {
    pub slot: RequestSlot,
    seq: u64,
}

/// Monotonic issue counter for one store slot.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestSequence {
    latest: u64,
    in_flight: u32,
}

impl RequestSequence {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.in_flight += 1;
        self.latest
    }

    /// Marks one request as settled and reports whether it was the latest.
    pub fn settle(&mut self, seq: u64) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        seq == self.latest
    }

    /// Invalidates everything issued so far without starting a request.
    pub fn supersede(&mut self) {
        self.latest += 1;
    }

    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShopState {
    pub shops: Vec<Shop>,
    pub selected_shop: Option<Shop>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub reviews: ReviewsState,
    collection: RequestSequence,
    selection: RequestSequence,
}

impl ShopState {
    pub fn begin(&mut self, slot: RequestSlot) -> RequestTicket {
        let seq = match slot {
            RequestSlot::Collection => self.collection.issue(),
            RequestSlot::Selection => self.selection.issue(),
        };
        self.error = None;
        self.is_loading = true;
        RequestTicket { slot, seq }
    }

    /// Applies a list response. On failure the previous list is kept.
    pub fn finish_collection(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<Vec<Shop>, String>,
    ) -> bool {
        debug_assert_eq!(ticket.slot, RequestSlot::Collection);
        let current = self.collection.settle(ticket.seq);
        self.refresh_loading();
        if !current {
            tracing::debug!(seq = ticket.seq, "discarding stale shop list response");
            return false;
        }

        match outcome {
            Ok(shops) => self.shops = shops,
            Err(message) => self.error = Some(message),
        }
        true
    }

    pub fn finish_selection(&mut self, ticket: RequestTicket, outcome: Result<Shop, String>) -> bool {
        debug_assert_eq!(ticket.slot, RequestSlot::Selection);
        let current = self.selection.settle(ticket.seq);
        self.refresh_loading();
        if !current {
            tracing::debug!(seq = ticket.seq, "discarding stale shop detail response");
            return false;
        }

        match outcome {
            Ok(shop) => self.selected_shop = Some(shop),
            Err(message) => self.error = Some(message),
        }
        true
    }

    /// Hydrates the list directly. Any list request still in flight is
    /// superseded by this write.
    pub fn set_shops(&mut self, shops: Vec<Shop>) {
        self.collection.supersede();
        self.shops = shops;
    }

    pub fn select_shop(&mut self, shop: Option<Shop>) {
        if shop.as_ref().map(|s| &s.id) != self.selected_shop.as_ref().map(|s| &s.id) {
            self.reviews.reset();
        }
        self.selection.supersede();
        self.selected_shop = shop;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn visible_shops<'a>(&'a self, filter: &'a FilterCriteria) -> impl Iterator<Item = &'a Shop> + 'a {
        self.shops
            .iter()
            .filter(move |shop| filter.is_shop_visible(shop.analytics.as_ref(), shop.rating))
    }

    /// Shops inside the last reported viewport; everything before the map
    /// has reported bounds.
    pub fn in_bounds<'a>(&'a self, bounds: Option<&'a MapBounds>) -> impl Iterator<Item = &'a Shop> + 'a {
        self.shops.iter().filter(move |shop| {
            bounds.map_or(true, |bounds| bounds.contains(shop.location.lat, shop.location.lng))
        })
    }

    fn refresh_loading(&mut self) {
        self.is_loading = self.collection.in_flight() + self.selection.in_flight() > 0;
    }
}

/// Reviews of the selected shop.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReviewsState {
    pub shop_id: Option<String>,
    pub items: Vec<Review>,
    pub total: u64,
    pub is_loading: bool,
    pub error: Option<String>,
    sequence: RequestSequence,
}

impl ReviewsState {
    pub fn begin(&mut self, shop_id: &str) -> u64 {
        if self.shop_id.as_deref() != Some(shop_id) {
            self.items.clear();
            self.total = 0;
        }
        self.shop_id = Some(shop_id.to_string());
        self.is_loading = true;
        self.error = None;
        self.sequence.issue()
    }

    /// Empties the panel and invalidates fetches already issued. Requests
    /// still in flight keep counting towards `is_loading` until they settle.
    pub fn reset(&mut self) {
        self.sequence.supersede();
        self.shop_id = None;
        self.items.clear();
        self.total = 0;
        self.error = None;
        self.is_loading = self.sequence.in_flight() > 0;
    }

    pub fn finish(&mut self, seq: u64, outcome: Result<(Vec<Review>, u64), String>) -> bool {
        let current = self.sequence.settle(seq);
        self.is_loading = self.sequence.in_flight() > 0;
        if !current {
            return false;
        }
        match outcome {
            Ok((items, total)) => {
                self.items = items;
                self.total = total;
            }
            Err(message) => self.error = Some(message),
        }
        true
    }
}

/// Area ranking panel.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RankingState {
    pub area_key: Option<String>,
    pub sort_by: RankingSort,
    pub entries: Vec<RankingItem>,
    pub is_loading: bool,
    pub error: Option<String>,
    sequence: RequestSequence,
}

impl RankingState {
    pub fn begin(&mut self, area_key: Option<String>, sort_by: RankingSort) -> u64 {
        self.area_key = area_key;
        self.sort_by = sort_by;
        self.is_loading = true;
        self.error = None;
        self.sequence.issue()
    }

    pub fn finish(&mut self, seq: u64, outcome: Result<Vec<RankingItem>, String>) -> bool {
        let current = self.sequence.settle(seq);
        self.is_loading = self.sequence.in_flight() > 0;
        if !current {
            return false;
        }
        match outcome {
            Ok(entries) => self.entries = entries,
            Err(message) => {
                self.entries.clear();
                self.error = Some(message);
            }
        }
        true
    }
}

/// Per-level shop counts shown next to the risk filter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RiskSummaryState {
    pub summary: Option<RiskSummary>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, RiskLevel, ShopAnalytics};

    fn shop(id: &str, level: Option<RiskLevel>, rating: Option<f64>) -> Shop {
        Shop {
            id: id.to_string(),
            place_id: format!("place-{id}"),
            name: format!("Shop {id}"),
            location: Location { lat: 35.69, lng: 139.70 },
            rating,
            analytics: level.map(|level| ShopAnalytics {
                risk_level: Some(level),
                sakura_risk: Some(10.0),
                ..ShopAnalytics::default()
            }),
            ..Shop::default()
        }
    }

    #[test]
    fn successful_fetch_replaces_collection() {
        let mut state = ShopState::default();
        state.set_shops(vec![shop("old", None, None)]);

        let ticket = state.begin(RequestSlot::Collection);
        assert!(state.is_loading);

        assert!(state.finish_collection(ticket, Ok(vec![shop("a", None, None), shop("b", None, None)])));
        assert!(!state.is_loading);
        assert_eq!(
            state.shops.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
            ["a", "b"]
        );
        assert!(state.selected_shop.is_none());
    }

    #[test]
    fn failed_fetch_keeps_previous_collection() {
        let mut state = ShopState::default();
        state.set_shops(vec![shop("kept", None, None)]);

        let ticket = state.begin(RequestSlot::Collection);
        state.finish_collection(ticket, Err("API Error: 500".into()));

        assert_eq!(state.shops.len(), 1);
        assert_eq!(state.shops[0].id, "kept");
        assert_eq!(state.error.as_deref(), Some("API Error: 500"));
        assert!(!state.is_loading);
    }

    #[test]
    fn new_request_clears_previous_error() {
        let mut state = ShopState::default();
        let ticket = state.begin(RequestSlot::Collection);
        state.finish_collection(ticket, Err("boom".into()));

        let _next = state.begin(RequestSlot::Collection);
        assert!(state.error.is_none());
    }

    #[test]
    fn latest_issued_request_wins() {
        let mut state = ShopState::default();
        let slow = state.begin(RequestSlot::Collection);
        let fast = state.begin(RequestSlot::Collection);

        assert!(state.finish_collection(fast, Ok(vec![shop("new", None, None)])));
        assert!(state.is_loading);
        assert!(!state.finish_collection(slow, Ok(vec![shop("stale", None, None)])));

        assert_eq!(state.shops[0].id, "new");
        assert!(!state.is_loading);
    }

    #[test]
    fn stale_failure_does_not_set_error() {
        let mut state = ShopState::default();
        let slow = state.begin(RequestSlot::Collection);
        let fast = state.begin(RequestSlot::Collection);

        state.finish_collection(fast, Ok(vec![shop("a", None, None)]));
        state.finish_collection(slow, Err("timeout".into()));
        assert!(state.error.is_none());
    }

    #[test]
    fn hydration_supersedes_in_flight_fetch() {
        let mut state = ShopState::default();
        let ticket = state.begin(RequestSlot::Collection);

        state.set_shops(vec![shop("prefetched", None, None)]);
        assert!(!state.finish_collection(ticket, Ok(vec![shop("late", None, None)])));
        assert_eq!(state.shops[0].id, "prefetched");
    }

    #[test]
    fn selection_fetch_leaves_collection_alone() {
        let mut state = ShopState::default();
        state.set_shops(vec![shop("a", None, None)]);

        let ticket = state.begin(RequestSlot::Selection);
        assert!(state.finish_selection(ticket, Ok(shop("detail", None, None))));

        assert_eq!(state.shops.len(), 1);
        assert_eq!(state.selected_shop.as_ref().map(|s| s.id.as_str()), Some("detail"));
    }

    #[test]
    fn loading_spans_both_slots() {
        let mut state = ShopState::default();
        let list = state.begin(RequestSlot::Collection);
        let detail = state.begin(RequestSlot::Selection);

        state.finish_collection(list, Ok(Vec::new()));
        assert!(state.is_loading);
        state.finish_selection(detail, Ok(shop("a", None, None)));
        assert!(!state.is_loading);
    }

    #[test]
    fn visible_shops_apply_filter() {
        let mut state = ShopState::default();
        state.set_shops(vec![
            shop("safe", Some(RiskLevel::Safe), Some(4.5)),
            shop("mine", Some(RiskLevel::Mine), Some(2.0)),
            shop("unknown", None, Some(1.0)),
        ]);

        let mut filter = FilterCriteria::default();
        filter.set_mode(crate::state::filter::FilterMode::SafeFirst);

        let visible: Vec<&str> = state.visible_shops(&filter).map(|s| s.id.as_str()).collect();
        assert_eq!(visible, ["safe", "unknown"]);
    }

    #[test]
    fn selecting_another_shop_resets_reviews() {
        let mut state = ShopState::default();
        state.select_shop(Some(shop("a", None, None)));
        let seq = state.reviews.begin("a");
        state.reviews.finish(seq, Ok((vec![Review::default()], 1)));
        assert_eq!(state.reviews.items.len(), 1);

        state.select_shop(Some(shop("a", None, None)));
        assert_eq!(state.reviews.items.len(), 1);

        state.select_shop(Some(shop("b", None, None)));
        assert!(state.reviews.items.is_empty());
        assert!(state.reviews.shop_id.is_none());
    }

    #[test]
    fn reviews_from_a_closed_shop_do_not_reach_the_next_one() {
        let mut state = ShopState::default();
        state.select_shop(Some(shop("a", None, None)));
        let for_a = state.reviews.begin("a");

        state.select_shop(None);
        state.select_shop(Some(shop("b", None, None)));
        let for_b = state.reviews.begin("b");
        assert_ne!(for_a, for_b);

        let late = Review {
            id: "from-a".into(),
            ..Review::default()
        };
        assert!(!state.reviews.finish(for_a, Ok((vec![late], 1))));
        assert!(state.reviews.items.is_empty());
        assert!(state.reviews.is_loading);

        let fresh = Review {
            id: "from-b".into(),
            ..Review::default()
        };
        assert!(state.reviews.finish(for_b, Ok((vec![fresh], 1))));
        assert_eq!(state.reviews.shop_id.as_deref(), Some("b"));
        assert_eq!(state.reviews.items[0].id, "from-b");
        assert!(!state.reviews.is_loading);
    }

    #[test]
    fn ranking_failure_is_an_empty_state_with_error() {
        let mut ranking = RankingState::default();
        let first = ranking.begin(Some("shinjuku".into()), RankingSort::AvgScore);
        ranking.finish(
            first,
            Ok(vec![RankingItem {
                rank: 1,
                shop: shop("a", Some(RiskLevel::Safe), Some(4.8)),
                avg_score: 8.2,
            }]),
        );
        assert_eq!(ranking.entries.len(), 1);

        let second = ranking.begin(Some("bogus".into()), RankingSort::ScoreSafety);
        ranking.finish(second, Err("Invalid area key: bogus".into()));
        assert!(ranking.entries.is_empty());
        assert!(ranking.error.is_some());
        assert!(!ranking.is_loading);
    }

    #[test]
    fn carousel_sees_only_shops_in_view() {
        let mut state = ShopState::default();
        let mut inside = shop("in", Some(RiskLevel::Safe), Some(4.0));
        inside.location = Location { lat: 35.69, lng: 139.70 };
        let mut outside = shop("out", Some(RiskLevel::Safe), Some(4.0));
        outside.location = Location { lat: 35.10, lng: 139.70 };
        state.set_shops(vec![inside, outside]);

        assert_eq!(state.in_bounds(None).count(), 2);

        let bounds = MapBounds {
            north: 35.72,
            south: 35.66,
            east: 139.74,
            west: 139.66,
        };
        let ids: Vec<&str> = state.in_bounds(Some(&bounds)).map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["in"]);
    }
}
