pub mod carousel;
pub mod chat_panel;
pub mod companion;
pub mod filter_panel;
pub mod map_view;
pub mod notifications;
pub mod ranking;
pub mod shop_detail;
