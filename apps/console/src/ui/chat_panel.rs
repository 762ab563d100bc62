use dioxus::prelude::*;

use crate::hooks::chat::{
    generate_embeddings, load_embedding_status, open_search_result, search, search_reviews,
};
use crate::models::{EmbeddingStatus, SearchResultItem, VectorSearchHit};
use crate::state::chat::{ChatMessage, ChatRole};
use crate::state::{use_app_actions, use_app_state};
use crate::ui::companion::Companion;
use crate::ui::shop_detail::RiskBadge;

#[component]
pub fn ChatPanel() -> Element {
    let actions = use_app_actions();
    let state = use_app_state();
    let mut draft = use_signal(String::new);

    let (expanded, messages, is_loading) = {
        let snapshot = state.read();
        (
            snapshot.layout.is_ai_chat_expanded,
            snapshot.chat.messages.clone(),
            snapshot.chat.is_loading,
        )
    };

    let mut submit = move || {
        let query = draft();
        if query.trim().is_empty() {
            return;
        }
        draft.set(String::new());
        spawn(search(actions, query));
    };

    if !expanded {
        return rsx! {
            button {
                class: "absolute bottom-40 left-4 z-30 flex items-center gap-2 rounded-full bg-black/80 px-4 py-2 text-sm text-amber-300 shadow-lg",
                onclick: move |_| actions.set_ai_chat_expanded(true),
                span { "🔮" }
                span { "Lucky に相談" }
            }
        };
    }

    rsx! {
        section { class: "absolute bottom-4 left-4 z-30 flex max-h-[70vh] w-96 flex-col rounded-xl border border-amber-400/20 bg-black/90 text-white shadow-2xl",
            header { class: "flex items-center justify-between border-b border-white/10 px-4 py-2",
                h2 { class: "text-sm font-semibold text-amber-300", "AI 占い検索" }
                div { class: "flex gap-2",
                    button {
                        class: "text-[11px] text-white/50 hover:text-white",
                        onclick: move |_| actions.clear_messages(),
                        "クリア"
                    }
                    button {
                        class: "text-xs text-white/50 hover:text-white",
                        onclick: move |_| actions.set_ai_chat_expanded(false),
                        "✕"
                    }
                }
            }

            Companion {}

            div { class: "flex-1 space-y-3 overflow-y-auto px-4 py-3",
                if messages.is_empty() {
                    p { class: "text-center text-xs text-white/40",
                        "「清潔で静かな店」のように話しかけてください"
                    }
                }
                for message in messages.iter() {
                    MessageBubble { key: "{message.id}", message: message.clone() }
                }
                if is_loading {
                    div { class: "flex items-center gap-2 text-sm text-amber-300/70",
                        span { class: "animate-spin-slow", "🔮" }
                        span { "占い中..." }
                    }
                }
            }

            form {
                class: "flex gap-2 border-t border-white/10 p-3",
                onsubmit: move |evt| {
                    evt.prevent_default();
                    submit();
                },
                input {
                    class: "flex-1 rounded-full border border-amber-400/20 bg-white/5 px-4 py-2 text-sm text-white placeholder-white/40 focus:border-amber-400 focus:outline-none",
                    placeholder: "どんな運命をお探しですか？",
                    value: "{draft}",
                    oninput: move |evt| draft.set(evt.value()),
                }
                button {
                    r#type: "submit",
                    class: "rounded-full bg-amber-400 px-4 text-sm font-medium text-black disabled:opacity-40",
                    disabled: draft().trim().is_empty(),
                    "占う"
                }
            }

            ReviewSearch {}
            EmbeddingStatusBar {}
        }
    }
}

#[component]
fn MessageBubble(message: ChatMessage) -> Element {
    let (row, bubble) = match (message.role, message.is_error) {
        (ChatRole::User, _) => ("justify-end", "bg-amber-400 text-black"),
        (ChatRole::Assistant, true) => ("justify-start", "border border-rose-500/40 bg-rose-950/60 text-rose-200"),
        (ChatRole::Assistant, false) => ("justify-start", "bg-white/10 text-white"),
    };
    let results = message.results.clone().unwrap_or_default();

    rsx! {
        div { class: format!("flex {row}"),
            div { class: "max-w-[85%] space-y-2",
                p { class: format!("whitespace-pre-wrap rounded-2xl px-3 py-2 text-sm {bubble}"), "{message.content}" }
                for (index, item) in results.iter().enumerate() {
                    ResultCard { key: "{item.shop_id}", rank: index + 1, item: item.clone() }
                }
            }
        }
    }
}

#[component]
fn ResultCard(rank: usize, item: SearchResultItem) -> Element {
    let actions = use_app_actions();
    let state = use_app_state();
    let visible = state
        .read()
        .filter
        .is_shop_visible(item.analytics.as_ref(), None);
    let relevance = item.relevance_score * 100.0;
    let shop_id = item.shop_id.clone();
    let level = item.analytics.as_ref().and_then(|analytics| analytics.risk_level);
    let excerpt = item
        .matched_reviews
        .first()
        .map(|review| review.text.chars().take(80).collect::<String>());

    rsx! {
        button {
            class: format!(
                "w-full rounded-lg border border-white/10 bg-black/60 p-2 text-left hover:border-amber-400/60 {}",
                if visible { "" } else { "opacity-40" },
            ),
            onclick: move |_| {
                spawn(open_search_result(actions, shop_id.clone()));
            },
            div { class: "flex items-center gap-2",
                span { class: "font-mono text-xs text-amber-300", "#{rank}" }
                span { class: "flex-1 truncate text-sm", "{item.shop_name}" }
                RiskBadge { level, show_label: false }
            }
            p { class: "mt-1 text-[10px] text-white/40", "関連度 {relevance:.0}%" }
            if let Some(excerpt) = excerpt {
                p { class: "mt-1 text-[11px] italic text-white/60", "“{excerpt}”" }
            }
        }
    }
}

#[component]
fn ReviewSearch() -> Element {
    let actions = use_app_actions();
    let mut query = use_signal(String::new);
    let mut hits = use_signal(Vec::<VectorSearchHit>::new);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let run = move |_: MouseEvent| {
        let text = query();
        if text.trim().is_empty() {
            return;
        }
        spawn(async move {
            busy.set(true);
            match search_reviews(text).await {
                Ok(response) => {
                    hits.set(response.results);
                    error.set(None);
                }
                Err(message) => error.set(Some(message)),
            }
            busy.set(false);
        });
    };

    rsx! {
        details { class: "border-t border-white/10 px-3 py-2 text-xs",
            summary { class: "cursor-pointer text-white/50", "口コミから探す" }
            div { class: "mt-2 flex gap-2",
                input {
                    class: "flex-1 rounded border border-white/10 bg-white/5 px-2 py-1 text-white",
                    placeholder: "例: 接客が丁寧",
                    value: "{query}",
                    oninput: move |evt| query.set(evt.value()),
                }
                button {
                    class: "rounded bg-white/10 px-2 text-white/70 hover:bg-white/20 disabled:opacity-40",
                    disabled: busy(),
                    onclick: run,
                    "検索"
                }
            }
            if let Some(message) = error() {
                p { class: "mt-1 text-rose-300", "{message}" }
            }
            ul { class: "mt-2 max-h-40 space-y-1 overflow-y-auto",
                for hit in hits() {
                    li { key: "{hit.review_id}",
                        button {
                            class: "w-full rounded bg-white/5 p-1.5 text-left hover:bg-white/10",
                            onclick: {
                                let shop_id = hit.shop_id.clone();
                                move |_| {
                                    spawn(open_search_result(actions, shop_id.clone()));
                                }
                            },
                            p { class: "font-medium text-amber-300", "{hit.shop_name}" }
                            p { class: "line-clamp-2 text-white/60", "{hit.review_text}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn EmbeddingStatusBar() -> Element {
    let actions = use_app_actions();
    let mut status = use_signal(|| None::<EmbeddingStatus>);
    let mut generating = use_signal(|| false);

    let mut refresh = use_future(move || async move {
        match load_embedding_status().await {
            Ok(current) => status.set(Some(current)),
            Err(message) => tracing::warn!("embedding status unavailable: {message}"),
        }
    });

    let Some(current) = status() else {
        return rsx! { Fragment {} };
    };
    let rate = current.embedding_rate;

    rsx! {
        div { class: "flex items-center justify-between border-t border-white/10 px-3 py-1.5 text-[10px] text-white/40",
            span { "ベクトル化 {current.embedded_reviews}/{current.total_reviews} ({rate:.0}%)" }
            if current.pending_reviews > 0 {
                button {
                    class: "rounded bg-white/10 px-2 py-0.5 text-white/70 hover:bg-white/20 disabled:opacity-40",
                    disabled: generating(),
                    onclick: move |_| {
                        spawn(async move {
                            generating.set(true);
                            generate_embeddings(actions).await;
                            generating.set(false);
                            refresh.restart();
                        });
                    },
                    "未処理 {current.pending_reviews} 件を生成"
                }
            }
        }
    }
}
