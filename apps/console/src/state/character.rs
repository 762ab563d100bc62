//! Companion character shown beside the search overlay.

use serde::{Deserialize, Serialize};

use crate::models::RiskLevel;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CharacterMood {
    Idle,
    Thinking,
    Searching,
    Excited,
    Cautious,
    Warning,
    Suspicious,
    Celebrating,
    #[default]
    Greeting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoodAnimation {
    Bounce,
    Pulse,
    Shake,
    Spin,
    Float,
}

impl MoodAnimation {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Bounce => "animate-bounce",
            Self::Pulse => "animate-pulse",
            Self::Shake => "animate-shake",
            Self::Spin => "animate-spin-slow",
            Self::Float => "animate-float",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoodConfig {
    pub emoji: &'static str,
    pub label: &'static str,
    pub animation: MoodAnimation,
}

impl CharacterMood {
    pub fn config(self) -> MoodConfig {
        let (emoji, label, animation) = match self {
            Self::Idle => ("🔮", "待機中", MoodAnimation::Float),
            Self::Thinking => ("🎴", "考え中", MoodAnimation::Pulse),
            Self::Searching => ("🔮", "占い中", MoodAnimation::Spin),
            Self::Excited => ("✨", "大吉！", MoodAnimation::Bounce),
            Self::Cautious => ("🎲", "半吉", MoodAnimation::Pulse),
            Self::Warning => ("⚠️", "凶", MoodAnimation::Shake),
            Self::Suspicious => ("👻", "サクラ注意", MoodAnimation::Pulse),
            Self::Celebrating => ("🎉", "大当たり！", MoodAnimation::Bounce),
            Self::Greeting => ("🃏", "ようこそ", MoodAnimation::Bounce),
        };
        MoodConfig {
            emoji,
            label,
            animation,
        }
    }
}

/// How the character responds when a shop of a given risk level is found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RiskReaction {
    pub mood: CharacterMood,
    pub messages: &'static [&'static str],
    pub celebrates: bool,
}

pub fn risk_reaction(level: RiskLevel) -> RiskReaction {
    match level {
        RiskLevel::Safe => RiskReaction {
            mood: CharacterMood::Excited,
            messages: &[
                "大吉！安心してください✨",
                "こちらは安全な店舗です！",
                "Lucky の占いは大当たり！",
                "素晴らしい選択です！",
            ],
            celebrates: true,
        },
        RiskLevel::Gamble => RiskReaction {
            mood: CharacterMood::Cautious,
            messages: &[
                "半吉...慎重に🎲",
                "賭けの要素がありますね",
                "運次第かもしれません",
                "口コミをよく確認してください",
            ],
            celebrates: false,
        },
        RiskLevel::Mine => RiskReaction {
            mood: CharacterMood::Warning,
            messages: &[
                "凶...要注意です💣",
                "危険な兆候を感じます",
                "別の店舗をお勧めします",
                "注意が必要です！",
            ],
            celebrates: false,
        },
        RiskLevel::Fake => RiskReaction {
            mood: CharacterMood::Suspicious,
            messages: &[
                "サクラの影を感じます👻",
                "レビューに不自然さがあります",
                "要注意...何かが怪しい",
                "本物かどうか疑わしいです",
            ],
            celebrates: false,
        },
    }
}

const GREETINGS: [&str; 4] = [
    "ようこそ！Lucky の占い検索へ🔮",
    "どんな運命をお探しですか？",
    "Lucky があなたの店探しをお手伝いします",
    "今日の運勢を占いましょう",
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CharacterState {
    pub mood: CharacterMood,
    pub message: String,
    pub is_typing: bool,
    pub show_particles: bool,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self {
            mood: CharacterMood::Greeting,
            message: GREETINGS[0].to_string(),
            is_typing: false,
            show_particles: false,
        }
    }
}

impl CharacterState {
    pub fn start_searching(&mut self) {
        self.mood = CharacterMood::Searching;
        self.message = "運命を占っています...".to_string();
        self.is_typing = true;
        self.show_particles = false;
    }

    /// `pick` selects from the greeting pool, wrapping around.
    pub fn show_greeting(&mut self, pick: usize) {
        self.mood = CharacterMood::Greeting;
        self.message = GREETINGS[pick % GREETINGS.len()].to_string();
        self.is_typing = false;
        self.show_particles = false;
    }

    /// Returns whether particles were switched on.
    pub fn react_to_risk(&mut self, level: RiskLevel, pick: usize) -> bool {
        let reaction = risk_reaction(level);
        self.mood = reaction.mood;
        self.message = reaction.messages[pick % reaction.messages.len()].to_string();
        self.is_typing = false;
        self.show_particles = reaction.celebrates;
        reaction.celebrates
    }

    pub fn reset_to_idle(&mut self) {
        self.mood = CharacterMood::Idle;
        self.message = "何かお探しですか？".to_string();
        self.is_typing = false;
        self.show_particles = false;
    }

    pub fn hide_particles(&mut self) {
        self.show_particles = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_risk_level_maps_to_its_mood() {
        let moods: Vec<CharacterMood> = RiskLevel::ALL
            .iter()
            .map(|level| risk_reaction(*level).mood)
            .collect();
        assert_eq!(
            moods,
            [
                CharacterMood::Excited,
                CharacterMood::Cautious,
                CharacterMood::Warning,
                CharacterMood::Suspicious
            ]
        );
    }

    #[test]
    fn only_safe_shops_celebrate() {
        let mut state = CharacterState::default();
        assert!(state.react_to_risk(RiskLevel::Safe, 1));
        assert!(state.show_particles);
        assert_eq!(state.message, "こちらは安全な店舗です！");

        assert!(!state.react_to_risk(RiskLevel::Fake, 9));
        assert!(!state.show_particles);
        assert_eq!(state.mood, CharacterMood::Suspicious);
    }

    #[test]
    fn searching_then_idle() {
        let mut state = CharacterState::default();
        state.start_searching();
        assert!(state.is_typing);
        assert_eq!(state.mood.config().label, "占い中");

        state.reset_to_idle();
        assert_eq!(state.mood, CharacterMood::Idle);
        assert!(!state.is_typing);
    }

    #[test]
    fn greeting_pick_wraps() {
        let mut state = CharacterState::default();
        state.show_greeting(5);
        assert_eq!(state.message, GREETINGS[1]);
    }
}
