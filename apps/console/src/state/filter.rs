use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{RiskLevel, SearchResultAnalytics, ShopAnalytics};

pub const MAX_RATING: f64 = 5.0;
pub const RATING_STEP: f64 = 0.5;
pub const MAX_SAKURA_RISK: f64 = 100.0;
pub const SAKURA_RISK_STEP: f64 = 10.0;

/// Named presets over the risk levels.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    #[default]
    All,
    SafeFirst,
    Gambler,
    Minefield,
}

impl FilterMode {
    pub const ALL: [FilterMode; 4] = [
        FilterMode::All,
        FilterMode::SafeFirst,
        FilterMode::Gambler,
        FilterMode::Minefield,
    ];

    pub fn included_risk_levels(self) -> &'static [RiskLevel] {
        match self {
            Self::All => &RiskLevel::ALL,
            Self::SafeFirst => &[RiskLevel::Safe, RiskLevel::Gamble],
            Self::Gambler => &[RiskLevel::Gamble],
            Self::Minefield => &[RiskLevel::Mine],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "全表示",
            Self::SafeFirst => "安全第一",
            Self::Gambler => "ギャンブラー",
            Self::Minefield => "地雷原",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::All => "すべての店舗を表示",
            Self::SafeFirst => "地雷・サクラ疑惑店を除外",
            Self::Gambler => "賛否両論の店舗のみ",
            Self::Minefield => "低評価店舗のみ表示",
        }
    }
}

/// What the visibility predicate needs to know about an analysed shop.
pub trait RiskSignals {
    fn risk_level(&self) -> Option<RiskLevel>;
    fn sakura_risk(&self) -> Option<f64>;
}

impl RiskSignals for ShopAnalytics {
    fn risk_level(&self) -> Option<RiskLevel> {
        self.risk_level
    }

    fn sakura_risk(&self) -> Option<f64> {
        self.sakura_risk
    }
}

impl RiskSignals for SearchResultAnalytics {
    fn risk_level(&self) -> Option<RiskLevel> {
        self.risk_level
    }

    fn sakura_risk(&self) -> Option<f64> {
        self.sakura_risk
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FilterCriteria {
    pub mode: FilterMode,
    pub min_rating: f64,
    pub max_sakura_risk: f64,
    pub selected_risk_levels: BTreeSet<RiskLevel>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            mode: FilterMode::All,
            min_rating: 0.0,
            max_sakura_risk: MAX_SAKURA_RISK,
            selected_risk_levels: RiskLevel::ALL.into_iter().collect(),
        }
    }
}

impl FilterCriteria {
    /// Replaces the selection with the mode's preset.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
        self.selected_risk_levels = mode.included_risk_levels().iter().copied().collect();
    }

    pub fn set_min_rating(&mut self, rating: f64) {
        self.min_rating = snap(rating, RATING_STEP, MAX_RATING);
    }

    pub fn set_max_sakura_risk(&mut self, risk: f64) {
        self.max_sakura_risk = snap(risk, SAKURA_RISK_STEP, MAX_SAKURA_RISK);
    }

    /// Manual toggles leave any preset, so the mode drops back to `All`.
    /// Deselecting the last level is refused. Returns whether anything changed.
    pub fn toggle_risk_level(&mut self, level: RiskLevel) -> bool {
        if self.selected_risk_levels.contains(&level) {
            if self.selected_risk_levels.len() <= 1 {
                return false;
            }
            self.selected_risk_levels.remove(&level);
        } else {
            self.selected_risk_levels.insert(level);
        }
        self.mode = FilterMode::All;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_level_selected(&self, level: RiskLevel) -> bool {
        self.selected_risk_levels.contains(&level)
    }

    pub fn has_active_filters(&self) -> bool {
        self.mode != FilterMode::All
            || self.min_rating > 0.0
            || self.max_sakura_risk < MAX_SAKURA_RISK
            || self.selected_risk_levels.len() < RiskLevel::ALL.len()
    }

    /// A hand-picked selection reads as custom rather than "all".
    pub fn mode_label(&self) -> &'static str {
        if self.mode == FilterMode::All && self.selected_risk_levels.len() < RiskLevel::ALL.len() {
            "カスタム"
        } else {
            self.mode.label()
        }
    }

    /// Shops without analytics are always shown. Otherwise the risk level,
    /// sakura risk, and rating gates must all pass; absent values pass.
    pub fn is_shop_visible<A>(&self, analytics: Option<&A>, rating: Option<f64>) -> bool
    where
        A: RiskSignals + ?Sized,
    {
        let Some(analytics) = analytics else {
            return true;
        };

        if let Some(level) = analytics.risk_level() {
            if !self.selected_risk_levels.contains(&level) {
                return false;
            }
        }

        if let Some(sakura) = analytics.sakura_risk() {
            if sakura > self.max_sakura_risk {
                return false;
            }
        }

        if let Some(rating) = rating {
            if rating < self.min_rating {
                return false;
            }
        }

        true
    }

    /// Re-establishes the invariants on criteria restored from storage.
    pub fn sanitized(mut self) -> Self {
        if self.selected_risk_levels.is_empty() {
            return Self::default();
        }
        self.min_rating = snap(self.min_rating, RATING_STEP, MAX_RATING);
        self.max_sakura_risk = snap(self.max_sakura_risk, SAKURA_RISK_STEP, MAX_SAKURA_RISK);
        self
    }
}

fn snap(value: f64, step: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    ((value / step).round() * step).clamp(0.0, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analytics(level: RiskLevel, sakura: f64) -> ShopAnalytics {
        ShopAnalytics {
            risk_level: Some(level),
            sakura_risk: Some(sakura),
            ..ShopAnalytics::default()
        }
    }

    #[test]
    fn unanalysed_shops_are_always_visible() {
        let mut criteria = FilterCriteria::default();
        criteria.set_mode(FilterMode::Minefield);
        criteria.set_min_rating(5.0);
        criteria.set_max_sakura_risk(0.0);

        assert!(criteria.is_shop_visible::<ShopAnalytics>(None, Some(1.0)));
        assert!(criteria.is_shop_visible::<ShopAnalytics>(None, None));
    }

    #[test]
    fn sakura_threshold_scenario() {
        let mut criteria = FilterCriteria::default();
        let shop = analytics(RiskLevel::Mine, 20.0);

        assert!(criteria.is_shop_visible(Some(&shop), Some(4.2)));

        criteria.set_max_sakura_risk(10.0);
        assert!(!criteria.is_shop_visible(Some(&shop), Some(4.2)));
    }

    #[test]
    fn each_gate_hides_independently() {
        let criteria = FilterCriteria {
            mode: FilterMode::All,
            min_rating: 3.5,
            max_sakura_risk: 50.0,
            selected_risk_levels: [RiskLevel::Safe, RiskLevel::Gamble].into_iter().collect(),
        };

        assert!(criteria.is_shop_visible(Some(&analytics(RiskLevel::Safe, 50.0)), Some(3.5)));
        assert!(!criteria.is_shop_visible(Some(&analytics(RiskLevel::Fake, 0.0)), Some(5.0)));
        assert!(!criteria.is_shop_visible(Some(&analytics(RiskLevel::Safe, 60.0)), Some(5.0)));
        assert!(!criteria.is_shop_visible(Some(&analytics(RiskLevel::Gamble, 0.0)), Some(3.0)));
        // missing rating never fails the rating gate
        assert!(criteria.is_shop_visible(Some(&analytics(RiskLevel::Gamble, 0.0)), None));
    }

    #[test]
    fn search_results_use_the_same_predicate() {
        let mut criteria = FilterCriteria::default();
        criteria.set_mode(FilterMode::SafeFirst);

        let result = SearchResultAnalytics {
            risk_level: Some(RiskLevel::Mine),
            score_operation: None,
            score_accuracy: None,
            score_hygiene: None,
            score_sincerity: None,
            score_safety: None,
            sakura_risk: None,
            risk_summary: None,
        };
        assert!(!criteria.is_shop_visible(Some(&result), None));
    }

    #[test]
    fn modes_apply_fixed_presets() {
        let mut criteria = FilterCriteria::default();

        criteria.set_mode(FilterMode::SafeFirst);
        assert_eq!(
            criteria.selected_risk_levels,
            [RiskLevel::Safe, RiskLevel::Gamble].into_iter().collect()
        );

        criteria.set_mode(FilterMode::Gambler);
        assert_eq!(
            criteria.selected_risk_levels,
            [RiskLevel::Gamble].into_iter().collect()
        );

        criteria.set_mode(FilterMode::All);
        assert_eq!(criteria.selected_risk_levels.len(), 4);
    }

    #[test]
    fn toggling_leaves_preset_and_keeps_one_level() {
        let mut criteria = FilterCriteria::default();
        criteria.set_mode(FilterMode::Minefield);

        assert!(!criteria.toggle_risk_level(RiskLevel::Mine));
        assert_eq!(criteria.selected_risk_levels.len(), 1);
        assert_eq!(criteria.mode, FilterMode::Minefield);

        assert!(criteria.toggle_risk_level(RiskLevel::Safe));
        assert_eq!(criteria.mode, FilterMode::All);
        assert!(criteria.toggle_risk_level(RiskLevel::Mine));
        assert_eq!(
            criteria.selected_risk_levels,
            [RiskLevel::Safe].into_iter().collect()
        );
        assert!(!criteria.toggle_risk_level(RiskLevel::Safe));
        assert!(criteria.is_level_selected(RiskLevel::Safe));
    }

    #[test]
    fn sliders_snap_and_clamp() {
        let mut criteria = FilterCriteria::default();

        criteria.set_min_rating(3.7);
        assert_eq!(criteria.min_rating, 3.5);
        criteria.set_min_rating(9.0);
        assert_eq!(criteria.min_rating, 5.0);
        criteria.set_min_rating(-1.0);
        assert_eq!(criteria.min_rating, 0.0);

        criteria.set_max_sakura_risk(46.0);
        assert_eq!(criteria.max_sakura_risk, 50.0);
        criteria.set_max_sakura_risk(f64::NAN);
        assert_eq!(criteria.max_sakura_risk, 0.0);
    }

    #[test]
    fn active_filter_detection_and_reset() {
        let mut criteria = FilterCriteria::default();
        assert!(!criteria.has_active_filters());

        criteria.toggle_risk_level(RiskLevel::Fake);
        assert!(criteria.has_active_filters());

        criteria.reset();
        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn restored_criteria_are_sanitized() {
        let broken = FilterCriteria {
            mode: FilterMode::Gambler,
            min_rating: 2.0,
            max_sakura_risk: 30.0,
            selected_risk_levels: BTreeSet::new(),
        };
        assert_eq!(broken.sanitized(), FilterCriteria::default());

        let stretched = FilterCriteria {
            min_rating: 7.3,
            max_sakura_risk: 140.0,
            ..FilterCriteria::default()
        }
        .sanitized();
        assert_eq!(stretched.min_rating, 5.0);
        assert_eq!(stretched.max_sakura_risk, 100.0);
    }

    #[test]
    fn criteria_round_trip_through_storage_format() {
        let mut criteria = FilterCriteria::default();
        criteria.set_mode(FilterMode::SafeFirst);
        let json = serde_json::to_value(&criteria).expect("serialize");
        assert_eq!(json["mode"], "safe-first");
        assert_eq!(json["selected_risk_levels"], serde_json::json!(["safe", "gamble"]));
    }

    #[test]
    fn manual_selection_is_labelled_custom() {
        let mut criteria = FilterCriteria::default();
        assert_eq!(criteria.mode_label(), "全表示");

        criteria.toggle_risk_level(RiskLevel::Fake);
        assert_eq!(criteria.mode_label(), "カスタム");

        criteria.set_mode(FilterMode::Gambler);
        assert_eq!(criteria.mode_label(), "ギャンブラー");
    }
}
