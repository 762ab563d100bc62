use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use tracing::{error, info};

use crate::api::{NearbyQuery, ShopListQuery};
use crate::hooks::chat::fade_particles;
use crate::hooks::{api_client, describe};
use crate::state::shops::RequestSlot;
use crate::state::{use_app_actions, AppActions};

pub const INITIAL_PAGE_SIZE: u32 = 500;
pub const REVIEW_PAGE_SIZE: u32 = 50;

pub async fn fetch_shops(actions: AppActions, query: ShopListQuery) {
    let ticket = actions.begin_shop_request(RequestSlot::Collection);

    let outcome = match api_client() {
        Ok(client) => client
            .get_shops(&query)
            .await
            .map(|page| page.shops)
            .map_err(|err| {
                error!("shop list fetch failed: {err}");
                describe(&err, "店舗データの取得に失敗しました")
            }),
        Err(message) => Err(message),
    };

    if let Ok(shops) = &outcome {
        info!(count = shops.len(), "shop list loaded");
    }
    actions.finish_shop_collection(ticket, outcome);
}

pub async fn fetch_nearby_shops(actions: AppActions, query: NearbyQuery) {
    let ticket = actions.begin_shop_request(RequestSlot::Collection);

    let outcome = match api_client() {
        Ok(client) => client.get_nearby_shops(&query).await.map_err(|err| {
            error!(lat = query.lat, lng = query.lng, "nearby shop fetch failed: {err}");
            describe(&err, "近隣店舗の取得に失敗しました")
        }),
        Err(message) => Err(message),
    };

    actions.finish_shop_collection(ticket, outcome);
}

/// Loads one shop into the selection. Returns whether it was applied.
pub async fn fetch_shop_by_id(actions: AppActions, shop_id: String) -> bool {
    let ticket = actions.begin_shop_request(RequestSlot::Selection);

    let outcome = match api_client() {
        Ok(client) => client.get_shop(&shop_id).await.map_err(|err| {
            if err.is_not_found() {
                tracing::warn!(%shop_id, "shop not found");
            } else {
                error!(%shop_id, "shop fetch failed: {err}");
            }
            describe(&err, "店舗詳細の取得に失敗しました")
        }),
        Err(message) => Err(message),
    };

    let succeeded = outcome.is_ok();
    actions.finish_shop_selection(ticket, outcome) && succeeded
}

pub async fn fetch_shop_reviews(actions: AppActions, shop_id: String) {
    let seq = actions.begin_reviews(&shop_id);

    let outcome = match api_client() {
        Ok(client) => client
            .get_shop_reviews(&shop_id, REVIEW_PAGE_SIZE)
            .await
            .map(|page| (page.reviews, page.total))
            .map_err(|err| {
                error!(%shop_id, "review fetch failed: {err}");
                describe(&err, "口コミの取得に失敗しました")
            }),
        Err(message) => Err(message),
    };

    actions.finish_reviews(seq, outcome);
}

/// Opens a shop from a marker, carousel card or ranking row: loads the full
/// record, shows the detail panel and pulls its reviews.
pub async fn open_shop(actions: AppActions, shop_id: String) {
    if fetch_shop_by_id(actions, shop_id.clone()).await {
        if actions.reveal_selected_shop() {
            spawn(fade_particles(actions));
        }
        fetch_shop_reviews(actions, shop_id).await;
    }
}

/// Fills the map with the first page of shops once, on mount.
pub fn use_initial_shops() {
    let actions = use_app_actions();

    use_future(move || async move {
        TimeoutFuture::new(0).await;
        fetch_shops(
            actions,
            ShopListQuery {
                per_page: Some(INITIAL_PAGE_SIZE),
                ..ShopListQuery::default()
            },
        )
        .await;
    });
}
