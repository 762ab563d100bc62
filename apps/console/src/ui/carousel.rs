use dioxus::prelude::*;

use crate::hooks::shops::open_shop;
use crate::models::Shop;
use crate::state::{use_app_actions, use_app_state};
use crate::ui::shop_detail::RiskBadge;

#[component]
pub fn ShopCarousel() -> Element {
    let actions = use_app_actions();
    let state = use_app_state();
    let snapshot = state.read();

    if !snapshot.layout.is_carousel_visible {
        return rsx! {
            button {
                class: "absolute bottom-4 left-1/2 z-20 -translate-x-1/2 rounded-full bg-black/70 px-4 py-1.5 text-xs text-amber-300 shadow",
                onclick: move |_| actions.toggle_carousel(),
                "店舗一覧を表示"
            }
        };
    }

    let selected_id = snapshot.shops.selected_shop.as_ref().map(|shop| shop.id.clone());
    let shops: Vec<(Shop, bool)> = snapshot
        .shops
        .in_bounds(snapshot.viewport.bounds.as_ref())
        .map(|shop| {
            let visible = snapshot
                .filter
                .is_shop_visible(shop.analytics.as_ref(), shop.rating);
            (shop.clone(), visible)
        })
        .collect();

    if shops.is_empty() {
        return rsx! { Fragment {} };
    }
    let count = shops.len();

    rsx! {
        div { class: "absolute bottom-0 left-0 right-0 z-20 rounded-t-2xl border border-b-0 border-amber-400/10 bg-black/70 pb-3",
            div { class: "flex items-center justify-between px-4 py-2",
                span { class: "text-xs tracking-wider text-amber-300/60", "{count} 件の店舗" }
                button {
                    class: "p-1 text-white/40 hover:text-amber-300",
                    title: "カルーセルを閉じる",
                    onclick: move |_| actions.toggle_carousel(),
                    "▾"
                }
            }
            div { class: "flex gap-3 overflow-x-auto px-4",
                for (shop, visible) in shops.iter() {
                    ShopCard {
                        key: "{shop.id}",
                        selected: selected_id.as_deref() == Some(shop.id.as_str()),
                        dimmed: !*visible,
                        shop: shop.clone(),
                    }
                }
            }
        }
    }
}

#[component]
fn ShopCard(shop: Shop, selected: bool, dimmed: bool) -> Element {
    let actions = use_app_actions();
    let rating = shop
        .rating
        .map(|rating| format!("★ {rating:.1}"))
        .unwrap_or_else(|| "-".into());
    let (lat, lng) = (shop.location.lat, shop.location.lng);
    let shop_id = shop.id.clone();

    rsx! {
        button {
            class: format!(
                "w-72 shrink-0 rounded-lg border bg-black/80 p-3 text-left transition {} {}",
                if selected { "border-amber-400" } else { "border-white/10 hover:border-amber-400/50" },
                if dimmed { "opacity-40" } else { "" },
            ),
            onclick: move |_| {
                actions.move_to_location(lat, lng, None);
                spawn(open_shop(actions, shop_id.clone()));
            },
            div { class: "flex items-start justify-between gap-2",
                p { class: "truncate text-sm font-medium text-white", "{shop.name}" }
                RiskBadge { level: shop.risk_level(), show_label: false }
            }
            if let Some(address) = shop.formatted_address.as_ref() {
                p { class: "mt-0.5 truncate text-[10px] text-white/40", "{address}" }
            }
            div { class: "mt-2 flex items-center justify-between text-xs",
                span { class: "font-mono text-amber-300", "{rating}" }
                if let Some(average) = shop.analytics.as_ref().and_then(|a| a.average_score()) {
                    span { class: "text-white/50", "信頼度 {average:.0}" }
                }
            }
        }
    }
}
