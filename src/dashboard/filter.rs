use chrono::NaiveDateTime;
use serde_json::json;

use crate::{
    forms::FieldErrors,
    models::{DashboardFetch, FetchMode},
    query::{keys, Pager, QueryKey},
};

/// Filter form behind the bar chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardFilter {
    pub fetch_mode: FetchMode,
    pub begin_custom_date: Option<NaiveDateTime>,
    pub end_custom_date: Option<NaiveDateTime>,
    pub equipment_ids: Vec<String>,
    /// Zero-based.
    pub page: u32,
}

impl DashboardFilter {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.fetch_mode == FetchMode::Custom && self.begin_custom_date.is_none() {
            errors.add("begin_custom_date", "Timerange start is required");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Rows per page: grows with the equipment selection so every selected
    /// bar fits on one page.
    pub fn limit(&self, page_size: u64) -> u64 {
        (self.equipment_ids.len() as u64).max(page_size)
    }

    pub fn pager(&self, page_size: u64) -> Pager {
        Pager::new(self.page, self.limit(page_size))
    }

    /// The same filter one page further.
    pub fn next_page(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn to_fetch(&self, page_size: u64) -> DashboardFetch {
        let pager = self.pager(page_size);
        DashboardFetch {
            page: Some(self.page),
            skip: Some(pager.skip()),
            limit: pager.limit(),
            fetch_mode: self.fetch_mode,
            begin_custom_date: self.begin_custom_date,
            end_custom_date: self.end_custom_date,
            equipment_ids: Some(self.equipment_ids.clone()),
        }
    }

    /// Cache key covering every field that changes the response.
    pub fn query_key(&self, page_size: u64) -> QueryKey {
        keys::bar_chart().with(&json!({
            "fetch_mode": self.fetch_mode,
            "begin_custom_date": self.begin_custom_date,
            "end_custom_date": self.end_custom_date,
            "equipment_ids": self.equipment_ids,
            "page": self.page,
            "limit": self.limit(page_size),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("EQ-{i}")).collect()
    }

    #[test]
    fn defaults_are_last_24h_first_page() {
        let filter = DashboardFilter::default();
        assert_eq!(filter.fetch_mode, FetchMode::Last24h);
        assert_eq!(filter.page, 0);
        assert!(filter.equipment_ids.is_empty());
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn custom_mode_requires_start() {
        let mut filter = DashboardFilter {
            fetch_mode: FetchMode::Custom,
            ..Default::default()
        };
        let errors = filter.validate().unwrap_err();
        assert_eq!(errors.get("begin_custom_date"), Some("Timerange start is required"));

        filter.begin_custom_date = Some(
            NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
        );
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn limit_grows_with_selection() {
        let mut filter = DashboardFilter::default();
        assert_eq!(filter.limit(5), 5);
        filter.equipment_ids = ids(3);
        assert_eq!(filter.limit(5), 5);
        filter.equipment_ids = ids(8);
        assert_eq!(filter.limit(5), 8);
    }

    #[test]
    fn skip_is_page_times_limit() {
        let filter = DashboardFilter {
            equipment_ids: ids(7),
            page: 2,
            ..Default::default()
        };
        let fetch = filter.to_fetch(5);
        assert_eq!(fetch.limit, 7);
        assert_eq!(fetch.skip, Some(14));
        assert_eq!(fetch.page, Some(2));
    }

    #[test]
    fn fetch_body_carries_mode_as_integer() {
        let filter = DashboardFilter {
            fetch_mode: FetchMode::AllTime,
            ..Default::default()
        };
        let body = serde_json::to_value(filter.to_fetch(5)).unwrap();
        assert_eq!(body["fetch_mode"], 6);
        assert_eq!(body["limit"], 5);
        assert_eq!(body["skip"], 0);
        assert_eq!(body["equipment_ids"], serde_json::json!([]));
    }

    #[test]
    fn distinct_filters_get_distinct_keys() {
        let base = DashboardFilter::default();
        let other_mode = DashboardFilter {
            fetch_mode: FetchMode::LastWeek,
            ..Default::default()
        };
        let other_page = DashboardFilter {
            page: 1,
            ..Default::default()
        };
        assert_ne!(base.query_key(5), other_mode.query_key(5));
        assert_ne!(base.query_key(5), other_page.query_key(5));
        assert_eq!(base.query_key(5), DashboardFilter::default().query_key(5));
        assert!(base.query_key(5).starts_with(&keys::bar_chart()));
    }

    #[test]
    fn next_page_keeps_filter_and_saturates() {
        let filter = DashboardFilter {
            fetch_mode: FetchMode::LastWeek,
            equipment_ids: ids(2),
            page: 3,
            ..Default::default()
        };
        let next = filter.next_page();
        assert_eq!(next.page, 4);
        assert_eq!(next.fetch_mode, FetchMode::LastWeek);
        assert_eq!(next.equipment_ids, filter.equipment_ids);

        let last = DashboardFilter {
            page: u32::MAX,
            ..Default::default()
        };
        assert_eq!(last.next_page().page, u32::MAX);
    }
}
