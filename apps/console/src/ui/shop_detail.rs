use dioxus::prelude::*;

use crate::hooks::analytics::load_shop_analysis;
use crate::models::{Review, RiskLevel, Shop};
use crate::state::{use_app_actions, use_app_state};

pub(crate) fn risk_badge_class(level: Option<RiskLevel>) -> &'static str {
    match level {
        Some(RiskLevel::Safe) => "border-emerald-400 text-emerald-300",
        Some(RiskLevel::Gamble) => "border-amber-400 text-amber-300",
        Some(RiskLevel::Mine) => "border-rose-500 text-rose-300",
        Some(RiskLevel::Fake) => "border-violet-400 text-violet-300",
        None => "border-white/20 text-white/50",
    }
}

#[component]
pub fn RiskBadge(
    #[props(!optional)] level: Option<RiskLevel>,
    #[props(default = true)] show_label: bool,
) -> Element {
    let icon = level.map(RiskLevel::icon).unwrap_or("?");
    let label = level.map(RiskLevel::label).unwrap_or("未分析");

    rsx! {
        span {
            class: format!(
                "inline-flex items-center gap-1 rounded-full border border-dashed bg-black/60 px-2 py-0.5 text-[11px] font-bold {}",
                risk_badge_class(level),
            ),
            title: label,
            span { "{icon}" }
            if show_label {
                span { "{label}" }
            }
        }
    }
}

#[component]
fn ScoreBar(label: &'static str, #[props(!optional)] score: Option<u8>) -> Element {
    let width = score.map(|value| u32::from(value.min(100))).unwrap_or(0);
    let text = score.map(|value| value.to_string()).unwrap_or_else(|| "-".into());

    rsx! {
        div { class: "flex items-center gap-2 text-[11px]",
            span { class: "w-12 shrink-0 text-white/60", "{label}" }
            div { class: "h-1.5 flex-1 overflow-hidden rounded bg-white/10",
                div { class: "h-full rounded bg-amber-400", style: "width: {width}%" }
            }
            span { class: "w-8 text-right font-mono text-amber-300", "{text}" }
        }
    }
}

#[component]
pub fn ShopDetailPanel() -> Element {
    let actions = use_app_actions();
    let state = use_app_state();
    let snapshot = state.read();

    if !snapshot.layout.is_detail_panel_open {
        return rsx! { Fragment {} };
    }
    let Some(shop) = snapshot.shops.selected_shop.clone() else {
        return rsx! { Fragment {} };
    };
    let reviews = snapshot.shops.reviews.clone();

    rsx! {
        aside { class: "absolute bottom-0 right-0 top-0 z-40 w-full max-w-sm overflow-y-auto border-l border-amber-400/20 bg-black/90 p-5 text-white shadow-2xl",
            header { class: "mb-4 flex items-start justify-between gap-3",
                div { class: "min-w-0 space-y-1",
                    h2 { class: "text-lg font-semibold", "{shop.name}" }
                    if let Some(address) = shop.formatted_address.as_ref() {
                        p { class: "text-xs text-white/50", "{address}" }
                    }
                    RiskBadge { level: shop.risk_level() }
                }
                button {
                    class: "rounded bg-white/10 px-2 py-1 text-xs text-white/70 hover:bg-white/20",
                    onclick: move |_| {
                        actions.select_shop(None);
                    },
                    "閉じる"
                }
            }

            ShopFacts { shop: shop.clone() }

            if let Some(analytics) = shop.analytics.as_ref() {
                section { class: "mt-4 space-y-2",
                    h3 { class: "text-xs uppercase tracking-widest text-amber-300/70", "信頼スコア" }
                    for (label, score) in analytics.scores() {
                        ScoreBar { key: "{label}", label, score }
                    }
                    if let Some(average) = analytics.average_score() {
                        p { class: "text-right text-xs text-white/60", "平均 {average:.1}" }
                    }
                    if let Some(sakura) = analytics.sakura_risk {
                        p { class: "text-xs text-violet-300", "サクラ度 {sakura:.0}%" }
                    }
                    if let Some(summary) = analytics.risk_summary.as_ref() {
                        p { class: "rounded bg-white/5 p-2 text-xs leading-relaxed text-white/80", "{summary}" }
                    }
                }
                PointList { title: "良い点", tone: "text-emerald-300", points: analytics.positive_points.clone() }
                PointList { title: "気になる点", tone: "text-rose-300", points: analytics.negative_points.clone() }
            } else {
                p { class: "mt-4 text-xs text-white/40", "まだ分析されていません" }
            }

            AnalysisFooter { shop_id: shop.id.clone() }

            section { class: "mt-5 space-y-2",
                h3 { class: "text-xs uppercase tracking-widest text-amber-300/70", "口コミ ({reviews.total})" }
                if reviews.is_loading {
                    p { class: "text-xs text-white/40", "読み込み中..." }
                } else if let Some(error) = reviews.error.as_ref() {
                    p { class: "text-xs text-rose-300", "{error}" }
                } else if reviews.items.is_empty() {
                    p { class: "text-xs text-white/40", "口コミはまだありません" }
                } else {
                    for review in reviews.items.iter() {
                        ReviewCard { key: "{review.id}", review: review.clone() }
                    }
                }
            }
        }
    }
}

#[component]
fn AnalysisFooter(shop_id: String) -> Element {
    let analysis = use_resource(use_reactive!(|(shop_id,)| async move {
        load_shop_analysis(shop_id).await
    }));

    let text = match &*analysis.read_unchecked() {
        Some(Ok(Some(report))) => {
            let count = report.analyzed_review_count.unwrap_or(0);
            let when = report.last_analyzed_at.as_deref().unwrap_or("-");
            format!("{count} 件の口コミを分析 / 最終分析 {when}")
        }
        Some(Ok(None)) => "分析待ち".to_string(),
        Some(Err(message)) => message.clone(),
        None => return rsx! { Fragment {} },
    };

    rsx! {
        p { class: "mt-3 text-[10px] text-white/30", "{text}" }
    }
}

#[component]
fn ShopFacts(shop: Shop) -> Element {
    let rating = shop
        .rating
        .map(|rating| format!("★ {rating:.1}"))
        .unwrap_or_else(|| "評価なし".into());
    let total = shop.user_ratings_total.unwrap_or(0);

    rsx! {
        dl { class: "grid grid-cols-2 gap-2 text-xs",
            div {
                dt { class: "text-white/40", "Google 評価" }
                dd { class: "font-mono text-amber-300", "{rating} ({total})" }
            }
            if let Some(price) = shop.price_label() {
                div {
                    dt { class: "text-white/40", "価格帯" }
                    dd { "{price}" }
                }
            }
            if let Some(phone) = shop.phone_number.as_ref() {
                div {
                    dt { class: "text-white/40", "電話" }
                    dd { class: "font-mono", "{phone}" }
                }
            }
            if let Some(website) = shop.website.as_ref() {
                div {
                    dt { class: "text-white/40", "Web" }
                    dd {
                        a { class: "text-amber-300 underline", href: "{website}", target: "_blank", rel: "noopener", "サイトを開く" }
                    }
                }
            }
        }
    }
}

#[component]
fn PointList(title: &'static str, tone: &'static str, points: Vec<String>) -> Element {
    if points.is_empty() {
        return rsx! { Fragment {} };
    }

    rsx! {
        section { class: "mt-3 space-y-1",
            h4 { class: format!("text-[11px] font-semibold {tone}"), "{title}" }
            ul { class: "list-inside list-disc space-y-0.5 text-xs text-white/70",
                for point in points.iter() {
                    li { "{point}" }
                }
            }
        }
    }
}

#[component]
fn ReviewCard(review: Review) -> Element {
    let author = review.author_name.clone().unwrap_or_else(|| "匿名".into());
    let stars = review.rating.map(|rating| "★".repeat(usize::from(rating.min(5))));
    let text = review.display_text().unwrap_or("").to_string();

    rsx! {
        article { class: "rounded border border-white/10 bg-white/5 p-2 text-xs",
            div { class: "mb-1 flex items-center justify-between text-white/50",
                span { "{author}" }
                if let Some(stars) = stars {
                    span { class: "text-amber-300", "{stars}" }
                }
            }
            p { class: "leading-relaxed text-white/80", "{text}" }
            if let Some(when) = review.relative_time_description.as_ref() {
                p { class: "mt-1 text-[10px] text-white/30", "{when}" }
            }
        }
    }
}
