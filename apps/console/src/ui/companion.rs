use dioxus::prelude::*;

use crate::state::use_app_state;

/// Lucky, the fortune-teller that reacts to search results.
#[component]
pub fn Companion() -> Element {
    let state = use_app_state();
    let character = state.read().character.clone();
    let mood = character.mood.config();

    rsx! {
        div { class: "relative flex items-center gap-3 border-b border-white/10 px-4 py-2",
            div { class: format!("text-3xl {}", mood.animation.css_class()), "{mood.emoji}" }
            div { class: "min-w-0 flex-1",
                p { class: "text-[10px] uppercase tracking-widest text-amber-300/60", "{mood.label}" }
                p { class: "text-sm text-white/90",
                    "{character.message}"
                    if character.is_typing {
                        span { class: "ml-1 animate-pulse", "▍" }
                    }
                }
            }
            if character.show_particles {
                div { class: "pointer-events-none absolute inset-0 overflow-hidden",
                    for (index, spark) in ["✨", "🎉", "⭐", "✨", "🎊"].iter().enumerate() {
                        span {
                            key: "{index}",
                            class: "absolute animate-float text-lg",
                            style: format!("left: {}%; top: {}%;", 10 + index * 18, 10 + (index % 2) * 40),
                            "{spark}"
                        }
                    }
                }
            }
        }
    }
}
