use dioxus::prelude::*;
use tracing::error;

use crate::api::RankingQuery;
use crate::hooks::{api_client, describe};
use crate::models::{find_area, RankingSort, TOKYO_AREAS};
use crate::state::{use_app_actions, use_app_state, AppActions};

pub const RANKING_SIZE: u32 = 10;

/// Loads the top shops of a preset area. A newer call for another area or
/// sort order wins over this one.
pub async fn load_ranking(actions: AppActions, area_key: String, sort_by: RankingSort) {
    let seq = actions.begin_ranking(Some(area_key.clone()), sort_by);

    let query = RankingQuery {
        area: Some(area_key.clone()),
        radius: find_area(&area_key).map(|area| area.radius),
        limit: Some(RANKING_SIZE),
        sort_by: Some(sort_by),
        ..RankingQuery::default()
    };

    let outcome = match api_client() {
        Ok(client) => client
            .get_shop_ranking(&query)
            .await
            .map(|response| response.ranking)
            .map_err(|err| {
                error!(area = %area_key, "ranking fetch failed: {err}");
                describe(&err, "ランキングの取得に失敗しました")
            }),
        Err(message) => Err(message),
    };

    actions.finish_ranking(seq, outcome);
}

/// Loads the first preset area once the panel mounts.
pub fn use_area_ranking() {
    let actions = use_app_actions();
    let state = use_app_state();

    use_future(move || async move {
        if state.peek().ranking.area_key.is_some() {
            return;
        }
        if let Some(area) = TOKYO_AREAS.first() {
            load_ranking(actions, area.key.to_string(), RankingSort::default()).await;
        }
    });
}
