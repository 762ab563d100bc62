use crate::state::{use_app_actions, use_app_state};
use dioxus::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
}

impl ToastKind {
    fn accent_classes(self) -> (&'static str, &'static str) {
        match self {
            Self::Success => ("border-emerald-500 bg-emerald-950/90", "text-emerald-300"),
            Self::Error => ("border-red-500 bg-red-950/90", "text-red-300"),
            Self::Warning => ("border-amber-500 bg-amber-950/90", "text-amber-300"),
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct ToastProps {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    #[props(optional)]
    pub on_close: Option<EventHandler<MouseEvent>>,
}

#[component]
pub fn Toast(props: ToastProps) -> Element {
    let (container_class, accent_text) = props.kind.accent_classes();

    rsx! {
        div { class: format!("pointer-events-auto rounded-lg border-l-4 p-4 shadow-lg {}", container_class),
            div { class: "flex items-start justify-between gap-4",
                div { class: "space-y-1",
                    h3 { class: format!("text-sm font-semibold {}", accent_text), "{props.title}" }
                    p { class: "text-xs text-white/80", "{props.message}" }
                }
                if let Some(handler) = props.on_close {
                    button {
                        class: "rounded bg-white/10 px-2 py-1 text-[11px] text-white/70 transition hover:bg-white/20",
                        onclick: move |evt| handler.call(evt),
                        "閉じる"
                    }
                }
            }
        }
    }
}

#[component]
pub fn NotificationCenter() -> Element {
    let actions = use_app_actions();
    let snapshot = use_app_state();
    let snapshot = snapshot.read();

    let mut toasts: Vec<Element> = Vec::new();

    if let Some(error) = snapshot.operation.error.clone() {
        toasts.push(rsx! {
            Toast {
                key: "operation-error",
                kind: ToastKind::Error,
                title: "操作に失敗しました".to_string(),
                message: error,
                on_close: move |_| actions.clear_operation_status(),
            }
        });
    } else if let Some(message) = snapshot.operation.last_message.clone() {
        toasts.push(rsx! {
            Toast {
                key: "operation-success",
                kind: ToastKind::Success,
                title: "完了しました".to_string(),
                message,
                on_close: move |_| actions.clear_operation_status(),
            }
        });
    }

    if let Some(error) = snapshot.shops.error.clone() {
        toasts.push(rsx! {
            Toast {
                key: "shops-error",
                kind: ToastKind::Error,
                title: "店舗データを読み込めません".to_string(),
                message: error,
                on_close: move |_| actions.clear_shop_error(),
            }
        });
    }

    if let Some(error) = snapshot.risk_summary.error.clone() {
        toasts.push(rsx! {
            Toast {
                key: "summary-error",
                kind: ToastKind::Warning,
                title: "リスク集計を表示できません".to_string(),
                message: error,
            }
        });
    }

    if toasts.is_empty() {
        return rsx! { Fragment {} };
    }

    rsx! {
        div { class: "pointer-events-none fixed right-4 top-20 z-50 flex w-80 flex-col gap-3",
            for toast in toasts {
                {toast}
            }
        }
    }
}
