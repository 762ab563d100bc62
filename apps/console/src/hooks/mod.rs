//! Async flows that talk to the backend and feed the stores.
//!
//! Every flow converts [`ClientError`] into the display string the stores keep;
//! nothing here returns an error to the rendering layer.

pub mod analytics;
pub mod chat;
pub mod map;
pub mod ranking;
pub mod shops;

use crate::api::{ClientError, ShopApiClient};
use crate::API_CLIENT;

pub(crate) const CLIENT_UNAVAILABLE: &str = "API クライアントが初期化されていません";

pub(crate) fn api_client() -> Result<ShopApiClient, String> {
    API_CLIENT
        .get()
        .cloned()
        .ok_or_else(|| CLIENT_UNAVAILABLE.to_string())
}

/// Store-facing text for a failed call. API errors already carry the
/// backend's `detail`; anything else gets the action-specific fallback.
pub(crate) fn describe(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::Api { detail, .. } => detail.clone(),
        ClientError::Transport(_) | ClientError::EmptyResponse(_) | ClientError::Decode(_) => {
            format!("{fallback} ({err})")
        }
        ClientError::Setup(_) => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn api_detail_is_shown_verbatim() {
        let err = ClientError::Api {
            status: StatusCode::NOT_FOUND,
            detail: "Shop not found".into(),
        };
        assert_eq!(describe(&err, "店舗の取得に失敗しました"), "Shop not found");
    }

    #[test]
    fn other_failures_use_the_fallback() {
        let err = ClientError::EmptyResponse(StatusCode::OK);
        let text = describe(&err, "店舗の取得に失敗しました");
        assert!(text.starts_with("店舗の取得に失敗しました"));

        let setup = ClientError::Setup(anyhow::anyhow!("bad url"));
        assert_eq!(describe(&setup, "検索に失敗しました"), "検索に失敗しました");
    }
}
