//! Query keys shared by views and mutations.
//!
//! Views read under a page-specific key; mutations invalidate the root so
//! every page of that list refetches.

use serde_json::json;

use super::{pagination::Pager, QueryKey};

pub fn sensors() -> QueryKey {
    QueryKey::new("sensors")
}

pub fn sensors_page(pager: Pager) -> QueryKey {
    sensors().with(&json!({ "page": pager.page_number() }))
}

pub fn items() -> QueryKey {
    QueryKey::new("items")
}

pub fn items_page(pager: Pager) -> QueryKey {
    items().with(&json!({ "page": pager.page_number() }))
}

pub fn users() -> QueryKey {
    QueryKey::new("users")
}

pub fn users_page(pager: Pager) -> QueryKey {
    users().with(&json!({ "page": pager.page_number() }))
}

pub fn current_user() -> QueryKey {
    QueryKey::new("currentUser")
}

pub fn equipment_options() -> QueryKey {
    QueryKey::new("equipment_options")
}

pub fn bar_chart() -> QueryKey {
    QueryKey::new("sensor-bar-chart")
}

pub fn line_chart() -> QueryKey {
    QueryKey::new("sensor-line-chart")
}
