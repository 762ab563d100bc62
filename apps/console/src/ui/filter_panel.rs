use dioxus::prelude::*;

use crate::hooks::analytics::use_risk_summary;
use crate::hooks::map::go_to_area;
use crate::models::{RiskLevel, TOKYO_AREAS};
use crate::state::filter::{FilterMode, MAX_RATING, MAX_SAKURA_RISK, RATING_STEP, SAKURA_RISK_STEP};
use crate::state::{use_app_actions, use_app_state};

fn level_accent(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Safe => "border-emerald-400 text-emerald-300",
        RiskLevel::Gamble => "border-amber-400 text-amber-300",
        RiskLevel::Mine => "border-rose-500 text-rose-300",
        RiskLevel::Fake => "border-violet-400 text-violet-300",
    }
}

/// Mode chips shown over the top-left of the map.
#[component]
pub fn FilterChips() -> Element {
    let actions = use_app_actions();
    let state = use_app_state();
    let (current, label, active) = {
        let snapshot = state.read();
        (
            snapshot.filter.mode,
            snapshot.filter.mode_label(),
            snapshot.filter.has_active_filters(),
        )
    };

    rsx! {
        div { class: "absolute left-4 top-20 z-20 flex flex-wrap items-center gap-2",
            for mode in FilterMode::ALL {
                button {
                    key: "{mode.label()}",
                    class: if mode == current {
                        "rounded-full bg-amber-400 px-3 py-1 text-xs font-medium text-black"
                    } else {
                        "rounded-full bg-black/70 px-3 py-1 text-xs text-white/70 hover:text-amber-300"
                    },
                    title: mode.description(),
                    onclick: move |_| actions.set_filter_mode(mode),
                    "{mode.label()}"
                }
            }
            button {
                class: if active {
                    "rounded-full border border-amber-400 bg-black/70 px-3 py-1 text-xs text-amber-300"
                } else {
                    "rounded-full bg-black/70 px-3 py-1 text-xs text-white/60 hover:text-amber-300"
                },
                onclick: move |_| actions.toggle_filter_panel(),
                "⚙ {label}"
            }
        }
    }
}

#[component]
pub fn FilterPanel() -> Element {
    use_risk_summary();

    let actions = use_app_actions();
    let state = use_app_state();
    let snapshot = state.read();

    if !snapshot.layout.is_filter_expanded {
        return rsx! { Fragment {} };
    }

    let filter = snapshot.filter.clone();
    let summary = snapshot.risk_summary.summary.clone();
    let min_rating = format!("{:.1}", filter.min_rating);
    let max_sakura = format!("{:.0}", filter.max_sakura_risk);

    rsx! {
        section { class: "absolute right-4 top-20 z-30 w-72 space-y-4 rounded-lg border border-amber-400/20 bg-black/85 p-4 text-white shadow-xl",
            header { class: "flex items-center justify-between",
                h2 { class: "text-xs uppercase tracking-widest text-amber-300/70", "詳細フィルター" }
                button {
                    class: "text-xs text-white/50 hover:text-white",
                    onclick: move |_| actions.toggle_filter_panel(),
                    "✕"
                }
            }

            div { class: "space-y-1.5 border-b border-white/10 pb-3",
                p { class: "text-[10px] uppercase tracking-widest text-white/40", "Risk Level" }
                for level in RiskLevel::ALL {
                    button {
                        key: "{level.as_str()}",
                        class: format!(
                            "flex w-full items-center gap-2 rounded border border-dashed px-2 py-1 text-left {} {}",
                            level_accent(level),
                            if filter.is_level_selected(level) { "bg-white/5" } else { "opacity-40" },
                        ),
                        onclick: move |_| actions.toggle_risk_level(level),
                        span { class: "text-sm", "{level.icon()}" }
                        div { class: "min-w-0 flex-1",
                            span { class: "text-[11px] font-medium", "{level.label()}" }
                            p { class: "truncate text-[10px] text-white/40", "{level.description()}" }
                        }
                        if let Some(summary) = summary.as_ref() {
                            span { class: "font-mono text-[11px] text-white/60", "{summary.count_for(level)}" }
                        }
                    }
                }
            }

            label { class: "block space-y-1",
                div { class: "flex justify-between text-[11px] text-white/60",
                    span { "最低評価" }
                    span { class: "font-mono text-amber-300", "★ {min_rating}" }
                }
                input {
                    r#type: "range",
                    class: "w-full accent-amber-400",
                    min: "0",
                    max: "{MAX_RATING}",
                    step: "{RATING_STEP}",
                    value: "{filter.min_rating}",
                    oninput: move |evt| {
                        if let Ok(value) = evt.value().parse::<f64>() {
                            actions.set_min_rating(value);
                        }
                    },
                }
            }

            label { class: "block space-y-1",
                div { class: "flex justify-between text-[11px] text-white/60",
                    span { "サクラ度上限" }
                    span { class: "font-mono text-violet-300", "{max_sakura}%" }
                }
                input {
                    r#type: "range",
                    class: "w-full accent-violet-400",
                    min: "0",
                    max: "{MAX_SAKURA_RISK}",
                    step: "{SAKURA_RISK_STEP}",
                    value: "{filter.max_sakura_risk}",
                    oninput: move |evt| {
                        if let Ok(value) = evt.value().parse::<f64>() {
                            actions.set_max_sakura_risk(value);
                        }
                    },
                }
            }

            AreaSelector {}

            button {
                class: "w-full rounded border border-white/20 py-1.5 text-xs text-white/70 hover:border-amber-400 hover:text-amber-300",
                onclick: move |_| actions.reset_filters(),
                "リセット"
            }
        }
    }
}

#[component]
fn AreaSelector() -> Element {
    let actions = use_app_actions();

    rsx! {
        div { class: "space-y-1.5",
            p { class: "text-[10px] uppercase tracking-widest text-white/40", "エリア" }
            div { class: "flex flex-wrap gap-1",
                for area in TOKYO_AREAS.iter() {
                    button {
                        key: "{area.key}",
                        class: "rounded-full bg-white/10 px-2.5 py-1 text-[11px] text-white/70 hover:bg-amber-400 hover:text-black",
                        onclick: move |_| {
                            spawn(go_to_area(actions, area.lat, area.lng, Some(area.radius)));
                        },
                        "{area.name}"
                    }
                }
            }
        }
    }
}
