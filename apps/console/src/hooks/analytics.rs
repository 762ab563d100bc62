use dioxus::prelude::*;
use tracing::warn;

use crate::hooks::{api_client, describe};
use crate::models::AnalyticsResponse;
use crate::state::use_app_actions;

/// Fetches the per-risk-level counts for the filter panel once.
pub fn use_risk_summary() {
    let actions = use_app_actions();

    use_future(move || async move {
        let outcome = match api_client() {
            Ok(client) => client.get_risk_summary(None).await.map_err(|err| {
                warn!("risk summary unavailable: {err}");
                describe(&err, "リスク集計の取得に失敗しました")
            }),
            Err(message) => Err(message),
        };
        actions.set_risk_summary(outcome);
    });
}

/// Analysis metadata for one shop. A shop the backend has not analysed yet
/// is an empty state, not a failure.
pub async fn load_shop_analysis(shop_id: String) -> Result<Option<AnalyticsResponse>, String> {
    let client = api_client()?;
    match client.get_shop_analytics(&shop_id).await {
        Ok(analysis) => Ok(Some(analysis)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => {
            warn!(%shop_id, "shop analysis unavailable: {err}");
            Err(describe(&err, "分析情報の取得に失敗しました"))
        }
    }
}
