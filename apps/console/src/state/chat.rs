//! Conversational search transcript.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ChatSearchResponse, SearchResultItem};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    /// `Some` on every successful assistant answer, even when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchResultItem>>,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub is_error: bool,
}

impl ChatMessage {
    fn new(role: ChatRole, content: String) -> Self {
        Self {
            id: format!("{}-{}", role_prefix(role), Uuid::new_v4()),
            role,
            content,
            results: None,
            timestamp_ms: now_ms(),
            is_error: false,
        }
    }
}

/// Handle for a search between `begin_search` and `complete_search`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSearch {
    pub query: String,
    epoch: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatSession {
    pub messages: Vec<ChatMessage>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub highlighted_shop_ids: Vec<String>,
    in_flight: u32,
    epoch: u64,
}

impl ChatSession {
    /// Appends the user turn as typed. Blank queries are ignored.
    pub fn begin_search(&mut self, query: &str) -> Option<PendingSearch> {
        if query.trim().is_empty() {
            return None;
        }

        self.messages
            .push(ChatMessage::new(ChatRole::User, query.to_string()));
        self.in_flight += 1;
        self.is_loading = true;
        self.error = None;

        Some(PendingSearch {
            query: query.to_string(),
            epoch: self.epoch,
        })
    }

    /// Appends the assistant turn in completion order. Failures become an
    /// assistant message rather than an error for the caller. Searches issued
    /// before the last `clear_messages` are dropped.
    pub fn complete_search(
        &mut self,
        pending: PendingSearch,
        outcome: Result<ChatSearchResponse, String>,
    ) -> bool {
        if pending.epoch != self.epoch {
            return false;
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        self.is_loading = self.in_flight > 0;

        match outcome {
            Ok(response) => {
                self.highlighted_shop_ids = response
                    .results
                    .iter()
                    .map(|item| item.shop_id.clone())
                    .collect();
                let mut message = ChatMessage::new(ChatRole::Assistant, response.answer);
                message.results = Some(response.results);
                self.messages.push(message);
            }
            Err(reason) => {
                let mut message =
                    ChatMessage::new(ChatRole::Assistant, format!("エラー: {reason}"));
                message.is_error = true;
                self.messages.push(message);
                self.error = Some(reason);
            }
        }
        true
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.highlighted_shop_ids.clear();
        self.error = None;
        self.in_flight = 0;
        self.is_loading = false;
        self.epoch += 1;
    }

    pub fn is_highlighted(&self, shop_id: &str) -> bool {
        self.highlighted_shop_ids.iter().any(|id| id == shop_id)
    }
}

fn role_prefix(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    }
}

fn now_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(answer: &str, shop_ids: &[&str]) -> ChatSearchResponse {
        ChatSearchResponse {
            query: "q".into(),
            answer: answer.into(),
            results: shop_ids
                .iter()
                .map(|id| SearchResultItem {
                    shop_id: id.to_string(),
                    shop_name: format!("Shop {id}"),
                    relevance_score: 0.8,
                    matched_reviews: Vec::new(),
                    analytics: None,
                })
                .collect(),
            total_results: shop_ids.len() as u64,
        }
    }

    #[test]
    fn empty_result_answer_appends_two_messages() {
        let mut session = ChatSession::default();
        let pending = session.begin_search("quiet clean shop").expect("accepted");
        assert!(session.is_loading);

        session.complete_search(pending, Ok(response("No matches found", &[])));

        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].role, ChatRole::User);
        assert_eq!(session.messages[0].content, "quiet clean shop");
        let answer = &session.messages[1];
        assert_eq!(answer.role, ChatRole::Assistant);
        assert_eq!(answer.content, "No matches found");
        assert_eq!(answer.results, Some(Vec::new()));
        assert!(!session.is_loading);
    }

    #[test]
    fn blank_query_is_ignored() {
        let mut session = ChatSession::default();
        assert!(session.begin_search("   ").is_none());
        assert!(session.messages.is_empty());
        assert!(!session.is_loading);
    }

    #[test]
    fn query_is_recorded_and_sent_as_typed() {
        let mut session = ChatSession::default();
        let pending = session.begin_search("  静かな店 ").expect("accepted");

        assert_eq!(pending.query, "  静かな店 ");
        assert_eq!(session.messages[0].content, "  静かな店 ");
    }

    #[test]
    fn failure_is_reported_in_transcript() {
        let mut session = ChatSession::default();
        let pending = session.begin_search("清潔な店").expect("accepted");
        session.complete_search(pending, Err("API Error: 503".into()));

        assert_eq!(session.messages.len(), 2);
        let answer = &session.messages[1];
        assert_eq!(answer.role, ChatRole::Assistant);
        assert!(answer.is_error);
        assert!(answer.results.is_none());
        assert!(answer.content.contains("API Error: 503"));
        assert_eq!(session.error.as_deref(), Some("API Error: 503"));
    }

    #[test]
    fn overlapping_searches_append_in_completion_order() {
        let mut session = ChatSession::default();
        let first = session.begin_search("first").expect("accepted");
        let second = session.begin_search("second").expect("accepted");

        session.complete_search(second, Ok(response("answer two", &["b"])));
        assert!(session.is_loading);
        session.complete_search(first, Ok(response("answer one", &["a"])));
        assert!(!session.is_loading);

        let contents: Vec<&str> = session.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "answer two", "answer one"]);
        assert!(session.is_highlighted("a"));
        assert!(!session.is_highlighted("b"));
    }

    #[test]
    fn clear_drops_searches_still_in_flight() {
        let mut session = ChatSession::default();
        let pending = session.begin_search("before clear").expect("accepted");

        session.clear_messages();
        assert!(!session.complete_search(pending, Ok(response("late", &["x"]))));

        assert!(session.messages.is_empty());
        assert!(session.highlighted_shop_ids.is_empty());
        assert!(!session.is_loading);
    }
}
