use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnNull};

/// Categorical trust rating assigned by the backend. The client never derives it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Gamble,
    Mine,
    Fake,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Safe,
        RiskLevel::Gamble,
        RiskLevel::Mine,
        RiskLevel::Fake,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Gamble => "gamble",
            Self::Mine => "mine",
            Self::Fake => "fake",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Safe => "安全",
            Self::Gamble => "賛否両論",
            Self::Mine => "要注意",
            Self::Fake => "サクラ疑惑",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Safe => "★",
            Self::Gamble => "?",
            Self::Mine => "!",
            Self::Fake => "👻",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Safe => "高評価で信頼できる店舗",
            Self::Gamble => "評価にばらつきがある店舗",
            Self::Mine => "レビューで問題が指摘された店舗",
            Self::Fake => "不自然なレビューが多い店舗",
        }
    }

    /// (background, border) marker colours.
    pub fn marker_colors(self) -> (&'static str, &'static str) {
        match self {
            Self::Safe => ("#22c55e", "#16a34a"),
            Self::Gamble => ("#eab308", "#ca8a04"),
            Self::Mine => ("#ef4444", "#dc2626"),
            Self::Fake => ("#9ca3af", "#6b7280"),
        }
    }

    pub fn marker_opacity(self) -> f64 {
        match self {
            Self::Fake => 0.5,
            _ => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

#[serde_as]
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ShopAnalytics {
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub score_operation: Option<u8>,
    #[serde(default)]
    pub score_accuracy: Option<u8>,
    #[serde(default)]
    pub score_hygiene: Option<u8>,
    #[serde(default)]
    pub score_sincerity: Option<u8>,
    #[serde(default)]
    pub score_safety: Option<u8>,
    #[serde(default)]
    pub variance_score: Option<f64>,
    #[serde(default)]
    pub sakura_risk: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_summary: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub positive_points: Vec<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub negative_points: Vec<String>,
}

impl ShopAnalytics {
    /// Sub-scores in display order, paired with their labels.
    pub fn scores(&self) -> [(&'static str, Option<u8>); 5] {
        [
            ("運営", self.score_operation),
            ("正確性", self.score_accuracy),
            ("衛生", self.score_hygiene),
            ("誠実さ", self.score_sincerity),
            ("安全性", self.score_safety),
        ]
    }

    /// Mean of the sub-scores that are present.
    pub fn average_score(&self) -> Option<f64> {
        let present: Vec<f64> = self
            .scores()
            .iter()
            .filter_map(|(_, score)| score.map(f64::from))
            .collect();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Shop {
    pub id: String,
    pub place_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    pub location: Location,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fetched_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<ShopAnalytics>,
}

impl Shop {
    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.analytics.as_ref().and_then(|a| a.risk_level)
    }

    pub fn price_label(&self) -> Option<&'static str> {
        const LABELS: [&str; 5] = ["無料", "安い", "普通", "高い", "とても高い"];
        self.price_level
            .and_then(|level| LABELS.get(usize::from(level)).copied())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShopListResponse {
    #[serde(default)]
    pub shops: Vec<Shop>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: String,
    pub shop_id: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub text_ja: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub relative_time_description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Review {
    /// Japanese translation when available, original text otherwise.
    pub fn display_text(&self) -> Option<&str> {
        self.text_ja
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .or(self.text.as_deref())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReviewListResponse {
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RankingSort {
    #[default]
    AvgScore,
    ScoreSafety,
    ScoreAccuracy,
}

impl RankingSort {
    pub const ALL: [RankingSort; 3] = [
        RankingSort::AvgScore,
        RankingSort::ScoreSafety,
        RankingSort::ScoreAccuracy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::AvgScore => "総合",
            Self::ScoreSafety => "安全性",
            Self::ScoreAccuracy => "正確性",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RankingItem {
    pub rank: u32,
    pub shop: Shop,
    pub avg_score: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShopRankingResponse {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub ranking: Vec<RankingItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskSummaryEntry {
    pub risk_level: Option<RiskLevel>,
    pub count: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RiskSummary {
    #[serde(default)]
    pub summary: Vec<RiskSummaryEntry>,
    #[serde(default)]
    pub total: u64,
}

impl RiskSummary {
    pub fn count_for(&self, level: RiskLevel) -> u64 {
        self.summary
            .iter()
            .filter(|entry| entry.risk_level == Some(level))
            .map(|entry| entry.count)
            .sum()
    }
}

/// `GET analytics/shop/{id}`: the analysis plus how it was produced.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsResponse {
    pub shop_id: String,
    #[serde(flatten)]
    pub analytics: ShopAnalytics,
    #[serde(default)]
    pub analyzed_review_count: Option<u32>,
    #[serde(default)]
    pub analysis_version: Option<String>,
    #[serde(default)]
    pub last_analyzed_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatSearchRequest {
    pub query: String,
    pub limit: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchedReview {
    pub text: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub similarity: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchResultAnalytics {
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub score_operation: Option<u8>,
    #[serde(default)]
    pub score_accuracy: Option<u8>,
    #[serde(default)]
    pub score_hygiene: Option<u8>,
    #[serde(default)]
    pub score_sincerity: Option<u8>,
    #[serde(default)]
    pub score_safety: Option<u8>,
    #[serde(default)]
    pub sakura_risk: Option<f64>,
    #[serde(default)]
    pub risk_summary: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchResultItem {
    pub shop_id: String,
    pub shop_name: String,
    pub relevance_score: f64,
    #[serde(default)]
    pub matched_reviews: Vec<MatchedReview>,
    #[serde(default)]
    pub analytics: Option<SearchResultAnalytics>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatSearchResponse {
    pub query: String,
    pub answer: String,
    #[serde(default)]
    pub results: Vec<SearchResultItem>,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VectorSearchHit {
    pub review_id: String,
    pub shop_id: String,
    pub review_text: String,
    #[serde(default)]
    pub rating: Option<u8>,
    pub shop_name: String,
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub similarity: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VectorSearchResponse {
    pub query: String,
    #[serde(default)]
    pub results: Vec<VectorSearchHit>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingStatus {
    pub total_reviews: u64,
    pub embedded_reviews: u64,
    pub pending_reviews: u64,
    pub embedding_rate: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EmbeddingGenerateResponse {
    pub total_reviews: u64,
    pub embedded: u64,
    pub skipped: u64,
    pub failed: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Predefined navigation areas, mirroring the areas the backend ingests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaPreset {
    pub key: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
}

pub static TOKYO_AREAS: [AreaPreset; 5] = [
    AreaPreset {
        key: "shinjuku",
        name: "新宿",
        lat: 35.6938,
        lng: 139.7034,
        radius: 1500.0,
    },
    AreaPreset {
        key: "shibuya",
        name: "渋谷",
        lat: 35.658,
        lng: 139.7016,
        radius: 1000.0,
    },
    AreaPreset {
        key: "ikebukuro",
        name: "池袋",
        lat: 35.7295,
        lng: 139.7109,
        radius: 1000.0,
    },
    AreaPreset {
        key: "ueno",
        name: "上野",
        lat: 35.7141,
        lng: 139.7774,
        radius: 1000.0,
    },
    AreaPreset {
        key: "akihabara",
        name: "秋葉原",
        lat: 35.6984,
        lng: 139.7731,
        radius: 800.0,
    },
];

pub fn find_area(key: &str) -> Option<&'static AreaPreset> {
    TOKYO_AREAS.iter().find(|area| area.key == key)
}
