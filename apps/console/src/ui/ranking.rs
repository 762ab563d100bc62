use dioxus::prelude::*;

use crate::hooks::chat::open_search_result;
use crate::hooks::ranking::{load_ranking, use_area_ranking};
use crate::models::{find_area, RankingItem, RankingSort, TOKYO_AREAS};
use crate::state::{use_app_actions, use_app_state};
use crate::ui::shop_detail::RiskBadge;

/// Strips the country and postal code prefix Google puts on Japanese addresses.
fn short_address(address: &str) -> String {
    let trimmed = address.strip_prefix("日本、").unwrap_or(address);
    let trimmed = match trimmed.strip_prefix('〒') {
        Some(rest) => rest
            .split_once(char::is_whitespace)
            .map(|(_, tail)| tail)
            .unwrap_or(rest),
        None => trimmed,
    };
    trimmed.trim().chars().take(20).collect()
}

#[component]
pub fn RankingPanel() -> Element {
    use_area_ranking();

    let actions = use_app_actions();
    let state = use_app_state();
    let mut open = use_signal(|| true);
    let ranking = state.read().ranking.clone();

    let current_area = ranking.area_key.clone().unwrap_or_default();
    let area_name = find_area(&current_area)
        .map(|area| area.name.to_string())
        .unwrap_or_else(|| current_area.clone());
    let sort_by = ranking.sort_by;

    rsx! {
        section { class: "absolute left-4 top-32 z-20 w-72 overflow-hidden rounded-lg border border-amber-400/20 bg-black/85 text-white shadow-xl",
            button {
                class: "flex w-full items-center justify-between px-3 py-2 text-xs text-amber-300",
                onclick: move |_| open.toggle(),
                span { "🏆 エリアランキング" }
                span { if open() { "▴" } else { "▾" } }
            }

            if open() {
                div { class: "flex gap-1 overflow-x-auto border-b border-amber-400/10 p-2",
                    for area in TOKYO_AREAS.iter() {
                        button {
                            key: "{area.key}",
                            class: if current_area == area.key {
                                "shrink-0 rounded-full bg-amber-400 px-3 py-1 text-xs font-medium text-black"
                            } else {
                                "shrink-0 rounded-full bg-white/5 px-3 py-1 text-xs text-white/60 hover:text-amber-300"
                            },
                            onclick: move |_| {
                                spawn(load_ranking(actions, area.key.to_string(), sort_by));
                            },
                            "{area.name}"
                        }
                    }
                }

                div { class: "flex items-center justify-between border-b border-amber-400/10 px-3 py-2",
                    p { class: "text-xs text-white/40",
                        span { class: "text-amber-300", "{area_name}" }
                        " エリア TOP10"
                    }
                    select {
                        class: "rounded bg-white/5 px-1 py-0.5 text-[11px] text-white/70",
                        onchange: {
                            let area = current_area.clone();
                            move |evt: Event<FormData>| {
                                let chosen = RankingSort::ALL
                                    .into_iter()
                                    .find(|sort| sort.label() == evt.value());
                                if let Some(sort) = chosen {
                                    spawn(load_ranking(actions, area.clone(), sort));
                                }
                            }
                        },
                        for sort in RankingSort::ALL {
                            option {
                                key: "{sort.label()}",
                                value: sort.label(),
                                selected: sort == sort_by,
                                "{sort.label()}"
                            }
                        }
                    }
                }

                if ranking.is_loading {
                    div { class: "py-8 text-center text-xs text-amber-300/70", "読み込み中..." }
                } else if let Some(error) = ranking.error.as_ref() {
                    p { class: "p-3 text-xs text-rose-300", "{error}" }
                } else if ranking.entries.is_empty() {
                    p { class: "p-3 text-xs text-white/40", "このエリアの分析済み店舗はまだありません" }
                } else {
                    div { class: "max-h-80 overflow-y-auto",
                        for item in ranking.entries.iter() {
                            RankingRow { key: "{item.shop.id}", item: item.clone() }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn RankingRow(item: RankingItem) -> Element {
    let actions = use_app_actions();
    let shop_id = item.shop.id.clone();
    let address = item
        .shop
        .formatted_address
        .as_deref()
        .map(short_address)
        .unwrap_or_default();
    let medal = if item.rank <= 3 {
        "bg-gradient-to-br from-amber-300 to-amber-500 text-black"
    } else {
        "bg-white/10 text-white/60"
    };

    rsx! {
        button {
            class: "flex w-full items-center gap-2 border-b border-white/5 p-2 text-left last:border-b-0 hover:bg-amber-400/5",
            onclick: move |_| {
                spawn(open_search_result(actions, shop_id.clone()));
            },
            div { class: format!("flex h-7 w-7 shrink-0 items-center justify-center rounded-full text-sm font-bold {medal}"),
                "{item.rank}"
            }
            div { class: "min-w-0 flex-1",
                p { class: "truncate text-sm", "{item.shop.name}" }
                p { class: "truncate text-[10px] text-white/40", "{address}" }
            }
            p { class: "shrink-0 font-mono text-base font-bold text-amber-300", "{item.avg_score:.1}" }
            RiskBadge { level: item.shop.risk_level(), show_label: false }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::short_address;

    #[test]
    fn postal_prefix_is_removed() {
        assert_eq!(
            short_address("日本、〒160-0022 東京都新宿区新宿3丁目"),
            "東京都新宿区新宿3丁目"
        );
        assert_eq!(short_address("東京都渋谷区"), "東京都渋谷区");
    }
}
