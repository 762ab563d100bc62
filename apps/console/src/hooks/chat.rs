use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use tracing::{error, info};

use crate::config::DEFAULT_CHAT_RESULT_LIMIT;
use crate::hooks::shops::{fetch_shop_by_id, fetch_shop_reviews};
use crate::hooks::{api_client, describe};
use crate::models::{ChatSearchRequest, EmbeddingStatus, VectorSearchResponse};
use crate::state::AppActions;
use crate::APP_CONFIG;

pub const RESULT_ZOOM: u8 = 16;
pub const PARTICLE_DURATION_MS: u32 = 3_000;
pub const REVIEW_SEARCH_LIMIT: u32 = 10;
pub const EMBEDDING_BATCH_SIZE: u32 = 100;

/// Runs one conversational search. Failures end up in the transcript.
pub async fn search(actions: AppActions, query: String) {
    let Some(pending) = actions.begin_search(&query) else {
        return;
    };

    let limit = APP_CONFIG
        .get()
        .map(|config| config.chat_result_limit)
        .unwrap_or(DEFAULT_CHAT_RESULT_LIMIT);
    let request = ChatSearchRequest {
        query: pending.query.clone(),
        limit,
    };

    let outcome = match api_client() {
        Ok(client) => client.chat_search(&request).await.map_err(|err| {
            error!("chat search failed: {err}");
            describe(&err, "検索に失敗しました")
        }),
        Err(message) => Err(message),
    };

    if let Ok(response) = &outcome {
        info!(results = response.results.len(), "chat search answered");
    }

    if actions.complete_search(pending, outcome) {
        fade_particles(actions).await;
    }
}

/// Jumps from a search hit to the shop: loads it, recenters and opens the
/// detail panel.
pub async fn open_search_result(actions: AppActions, shop_id: String) {
    if !fetch_shop_by_id(actions, shop_id.clone()).await {
        return;
    }
    if actions.focus_selected_shop(RESULT_ZOOM) {
        spawn(fade_particles(actions));
    }
    fetch_shop_reviews(actions, shop_id).await;
}

pub(crate) async fn fade_particles(actions: AppActions) {
    TimeoutFuture::new(PARTICLE_DURATION_MS).await;
    actions.hide_particles();
}

pub async fn search_reviews(query: String) -> Result<VectorSearchResponse, String> {
    let client = api_client()?;
    client
        .vector_search(query.trim(), REVIEW_SEARCH_LIMIT)
        .await
        .map_err(|err| {
            error!("review search failed: {err}");
            describe(&err, "口コミ検索に失敗しました")
        })
}

pub async fn load_embedding_status() -> Result<EmbeddingStatus, String> {
    let client = api_client()?;
    client.get_embedding_status().await.map_err(|err| {
        error!("embedding status fetch failed: {err}");
        describe(&err, "埋め込み状況の取得に失敗しました")
    })
}

/// Asks the backend to embed pending reviews and reports through the
/// operation notice.
pub async fn generate_embeddings(actions: AppActions) {
    let client = match api_client() {
        Ok(client) => client,
        Err(message) => {
            actions.set_operation_error(message);
            return;
        }
    };

    match client.generate_embeddings(EMBEDDING_BATCH_SIZE).await {
        Ok(report) => {
            info!(
                embedded = report.embedded,
                skipped = report.skipped,
                failed = report.failed,
                "embedding batch finished"
            );
            actions.set_operation_success(format!(
                "埋め込み生成: {} 件完了 / {} 件スキップ / {} 件失敗",
                report.embedded, report.skipped, report.failed
            ));
        }
        Err(err) => {
            error!("embedding generation failed: {err}");
            actions.set_operation_error(describe(&err, "埋め込み生成に失敗しました"));
        }
    }
}
