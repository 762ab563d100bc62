//! Filter preferences persisted in `localStorage`.

use gloo_storage::{LocalStorage, Storage};

use crate::state::filter::FilterCriteria;

const FILTER_KEY: &str = "riskmap.filters";

/// Restores the saved criteria, falling back to defaults when nothing usable
/// is stored.
pub fn load_filter() -> FilterCriteria {
    if web_sys::window().is_none() {
        return FilterCriteria::default();
    }

    match LocalStorage::get::<FilterCriteria>(FILTER_KEY) {
        Ok(criteria) => criteria.sanitized(),
        Err(gloo_storage::errors::StorageError::KeyNotFound(_)) => FilterCriteria::default(),
        Err(err) => {
            tracing::warn!("ignoring stored filter preferences: {err}");
            LocalStorage::delete(FILTER_KEY);
            FilterCriteria::default()
        }
    }
}

pub fn save_filter(criteria: &FilterCriteria) {
    if web_sys::window().is_none() {
        return;
    }

    if let Err(err) = LocalStorage::set(FILTER_KEY, criteria) {
        tracing::warn!("failed to persist filter preferences: {err}");
    }
}
