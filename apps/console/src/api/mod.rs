use std::sync::Arc;

use anyhow::Context;
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::{
    AnalyticsResponse, ChatSearchRequest, ChatSearchResponse, EmbeddingGenerateResponse,
    EmbeddingStatus, RankingSort, ReviewListResponse, RiskLevel, RiskSummary, Shop,
    ShopListResponse, ShopRankingResponse, VectorSearchResponse,
};

pub type ClientResult<T> = Result<T, ClientError>;

/// Query for `GET shops`.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ShopListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
}

/// Query for `GET shops/nearby`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

/// Query for `GET shops/ranking`. Either `area` or `lat`/`lng` must be set.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct RankingQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<RankingSort>,
}

#[derive(Serialize)]
struct LimitQuery {
    limit: u32,
}

#[derive(Serialize)]
struct RiskSummaryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    risk_level: Option<RiskLevel>,
}

#[derive(Serialize)]
struct VectorSearchQuery<'a> {
    query: &'a str,
    limit: u32,
}

#[derive(Clone)]
pub struct ShopApiClient {
    inner: reqwest::Client,
    config: Arc<AppConfig>,
    base_url: String,
}

impl ShopApiClient {
    pub fn new(config: AppConfig) -> ClientResult<Self> {
        let base_url = normalize_base_url(&config.api_base_url);

        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout);

        let client = builder
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            inner: client,
            config: Arc::new(config),
            base_url,
        })
    }

    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    pub async fn get_shops(&self, query: &ShopListQuery) -> ClientResult<ShopListResponse> {
        let builder = self.request(Method::GET, "shops").query(query);
        self.send(builder).await
    }

    pub async fn get_nearby_shops(&self, query: &NearbyQuery) -> ClientResult<Vec<Shop>> {
        let builder = self.request(Method::GET, "shops/nearby").query(query);
        self.send(builder).await
    }

    pub async fn get_shop(&self, shop_id: &str) -> ClientResult<Shop> {
        let path = format!("shops/{shop_id}");
        self.send(self.request(Method::GET, &path)).await
    }

    pub async fn get_shop_reviews(
        &self,
        shop_id: &str,
        limit: u32,
    ) -> ClientResult<ReviewListResponse> {
        let path = format!("shops/{shop_id}/reviews");
        let builder = self
            .request(Method::GET, &path)
            .query(&LimitQuery { limit });
        self.send(builder).await
    }

    pub async fn get_shop_ranking(&self, query: &RankingQuery) -> ClientResult<ShopRankingResponse> {
        let builder = self.request(Method::GET, "shops/ranking").query(query);
        self.send(builder).await
    }

    pub async fn get_shop_analytics(&self, shop_id: &str) -> ClientResult<AnalyticsResponse> {
        let path = format!("analytics/shop/{shop_id}");
        self.send(self.request(Method::GET, &path)).await
    }

    pub async fn get_risk_summary(&self, risk_level: Option<RiskLevel>) -> ClientResult<RiskSummary> {
        let builder = self
            .request(Method::GET, "analytics/risk-summary")
            .query(&RiskSummaryQuery { risk_level });
        self.send(builder).await
    }

    pub async fn chat_search(&self, payload: &ChatSearchRequest) -> ClientResult<ChatSearchResponse> {
        let builder = self.request(Method::POST, "search/chat").json(payload);
        self.send(builder).await
    }

    pub async fn vector_search(&self, query: &str, limit: u32) -> ClientResult<VectorSearchResponse> {
        let builder = self
            .request(Method::GET, "search/vector")
            .query(&VectorSearchQuery { query, limit });
        self.send(builder).await
    }

    pub async fn get_embedding_status(&self) -> ClientResult<EmbeddingStatus> {
        self.send(self.request(Method::GET, "search/embeddings/status"))
            .await
    }

    pub async fn generate_embeddings(&self, limit: u32) -> ClientResult<EmbeddingGenerateResponse> {
        let builder = self
            .request(Method::POST, "search/embeddings/generate")
            .json(&LimitQuery { limit });
        self.send(builder).await
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.inner
            .request(method, self.join_path(path))
            .header(header::ACCEPT, "application/json")
    }

    fn join_path(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T>(&self, builder: reqwest::RequestBuilder) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status,
                detail: extract_detail(&bytes).unwrap_or_else(|| fallback_detail(status)),
            });
        }

        if bytes.is_empty() {
            return Err(ClientError::EmptyResponse(status));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn normalize_base_url(input: &str) -> String {
    input.trim_end_matches('/').to_string()
}

/// FastAPI error bodies carry `detail` as a string for handled errors and as a
/// list for validation failures; only the former is user-facing text.
fn extract_detail(bytes: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: Option<Value>,
    }

    let body: ErrorBody = serde_json::from_slice(bytes).ok()?;
    match body.detail? {
        Value::String(text) if !text.trim().is_empty() => Some(text),
        _ => None,
    }
}

fn fallback_detail(status: StatusCode) -> String {
    format!("API Error: {}", status.as_u16())
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{detail}")]
    Api { status: StatusCode, detail: String },
    #[error("empty response body: {0}")]
    EmptyResponse(StatusCode),
    #[error("client setup failed: {0}")]
    Setup(#[from] anyhow::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::EmptyResponse(status) => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer) -> ShopApiClient {
        let config = AppConfig {
            api_base_url: format!("{}/api/v1/", server.uri()),
            ..AppConfig::default()
        };
        ShopApiClient::new(config).expect("client builds")
    }

    fn shop_json(id: &str) -> Value {
        json!({
            "id": id,
            "place_id": format!("place-{id}"),
            "name": format!("Shop {id}"),
            "location": { "lat": 35.69, "lng": 139.70 },
            "rating": 4.0,
            "analytics": { "risk_level": "safe", "sakura_risk": 10 }
        })
    }

    #[tokio::test]
    async fn get_shops_sends_only_present_parameters() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/shops"))
            .and(query_param("per_page", "500"))
            .and(query_param("risk_level", "gamble"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "shops": [shop_json("a"), shop_json("b")],
                "total": 2,
                "page": 1,
                "per_page": 500
            })))
            .mount(&server)
            .await;

        let query = ShopListQuery {
            per_page: Some(500),
            risk_level: Some(RiskLevel::Gamble),
            ..ShopListQuery::default()
        };
        let response = client_for(&server)
            .get_shops(&query)
            .await
            .expect("shop list");

        assert_eq!(response.shops.len(), 2);
        assert_eq!(response.per_page, 500);

        let requests: Vec<Request> = server.received_requests().await.unwrap_or_default();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0]
            .url
            .query_pairs()
            .any(|(key, _)| key == "page" || key == "min_rating"));
    }

    #[tokio::test]
    async fn nearby_shops_returns_plain_array() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/shops/nearby"))
            .and(query_param("lat", "35.658"))
            .and(query_param("lng", "139.7016"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([shop_json("c")])))
            .mount(&server)
            .await;

        let shops = client_for(&server)
            .get_nearby_shops(&NearbyQuery {
                lat: 35.658,
                lng: 139.7016,
                radius: Some(1000.0),
                limit: Some(100),
                risk_level: None,
            })
            .await
            .expect("nearby shops");

        assert_eq!(shops.len(), 1);
        assert_eq!(shops[0].id, "c");
    }

    #[tokio::test]
    async fn api_error_carries_detail_from_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/shops/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "detail": "Shop not found" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_shop("missing")
            .await
            .expect_err("404 is an error");

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Shop not found");
    }

    #[tokio::test]
    async fn api_error_falls_back_to_generic_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/shops/ranking"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": [{ "loc": ["query", "limit"], "msg": "too large" }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/analytics/risk-summary"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let err = client
            .get_shop_ranking(&RankingQuery {
                area: Some("shinjuku".into()),
                limit: Some(500),
                ..RankingQuery::default()
            })
            .await
            .expect_err("validation failure");
        assert_eq!(err.to_string(), "API Error: 422");

        let err = client
            .get_risk_summary(None)
            .await
            .expect_err("server failure");
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.to_string(), "API Error: 500");
    }

    #[tokio::test]
    async fn chat_search_posts_query_and_limit() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/search/chat"))
            .and(body_json(json!({ "query": "quiet clean shop", "limit": 5 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": "quiet clean shop",
                "answer": "2件見つかりました",
                "results": [{
                    "shop_id": "a",
                    "shop_name": "Shop a",
                    "relevance_score": 0.91,
                    "matched_reviews": [{ "text": "とても清潔", "rating": 5, "similarity": 0.88 }],
                    "analytics": { "risk_level": "safe", "sakura_risk": 5 }
                }],
                "total_results": 1
            })))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .chat_search(&ChatSearchRequest {
                query: "quiet clean shop".into(),
                limit: 5,
            })
            .await
            .expect("chat search");

        assert_eq!(response.total_results, 1);
        assert_eq!(response.results[0].matched_reviews[0].rating, Some(5));
        assert_eq!(
            response.results[0]
                .analytics
                .as_ref()
                .and_then(|a| a.risk_level),
            Some(RiskLevel::Safe)
        );
    }

    #[tokio::test]
    async fn reviews_and_vector_search_pass_limits() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/shops/a/reviews"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "reviews": [{ "id": "r1", "shop_id": "a", "text": "good", "rating": 4 }],
                "total": 1
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/search/vector"))
            .and(query_param("query", "清潔"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": "清潔",
                "results": [],
                "total": 0
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let reviews = client.get_shop_reviews("a", 50).await.expect("reviews");
        assert_eq!(reviews.reviews.len(), 1);

        let hits = client.vector_search("清潔", 10).await.expect("vector search");
        assert!(hits.results.is_empty());
    }

    #[tokio::test]
    async fn empty_success_body_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/search/embeddings/status"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_embedding_status()
            .await
            .expect_err("empty body");
        assert!(matches!(err, ClientError::EmptyResponse(StatusCode::OK)));
    }

    #[tokio::test]
    async fn shop_analytics_flattens_scores() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/analytics/shop/a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "shop_id": "a",
                "risk_level": "mine",
                "score_safety": 20,
                "positive_points": null,
                "analyzed_review_count": 42
            })))
            .mount(&server)
            .await;

        let report = client_for(&server)
            .get_shop_analytics("a")
            .await
            .expect("analytics");

        assert_eq!(report.analytics.risk_level, Some(RiskLevel::Mine));
        assert_eq!(report.analytics.score_safety, Some(20));
        assert!(report.analytics.positive_points.is_empty());
        assert_eq!(report.analyzed_review_count, Some(42));
    }
}
