use std::{fmt, str::FromStr};

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDataPublic {
    pub id: Uuid,
    /// Free-text identifier of the emitting equipment.
    pub equipment_id: String,
    pub value: f64,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDataListPublic {
    pub data: Vec<SensorDataPublic>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorDataCreate {
    pub equipment_id: String,
    pub value: f64,
    pub timestamp: NaiveDateTime,
}

/// Full replacement body for `PUT /sensor-data/{id}`.
pub type SensorDataUpdate = SensorDataCreate;

// ---------------------------------------------------------------------------
// FetchMode
//
// Travels as a bare integer (1..=6) in the bar-chart request body.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FetchMode {
    #[default]
    Last24h,
    Last48h,
    LastWeek,
    LastMonth,
    Custom,
    AllTime,
}

impl FetchMode {
    pub const ALL: [FetchMode; 6] = [
        FetchMode::Last24h,
        FetchMode::Last48h,
        FetchMode::LastWeek,
        FetchMode::LastMonth,
        FetchMode::Custom,
        FetchMode::AllTime,
    ];

    /// Label shown in the period selector.
    pub fn label(self) -> &'static str {
        match self {
            FetchMode::Last24h => "Last 24h",
            FetchMode::Last48h => "Last 48h",
            FetchMode::LastWeek => "Last week",
            FetchMode::LastMonth => "Last month",
            FetchMode::Custom => "Custom",
            FetchMode::AllTime => "All time",
        }
    }
}

impl From<FetchMode> for u8 {
    fn from(mode: FetchMode) -> Self {
        match mode {
            FetchMode::Last24h => 1,
            FetchMode::Last48h => 2,
            FetchMode::LastWeek => 3,
            FetchMode::LastMonth => 4,
            FetchMode::Custom => 5,
            FetchMode::AllTime => 6,
        }
    }
}

impl TryFrom<u8> for FetchMode {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(FetchMode::Last24h),
            2 => Ok(FetchMode::Last48h),
            3 => Ok(FetchMode::LastWeek),
            4 => Ok(FetchMode::LastMonth),
            5 => Ok(FetchMode::Custom),
            6 => Ok(FetchMode::AllTime),
            other => Err(format!("unknown fetch mode: {other}")),
        }
    }
}

impl FromStr for FetchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "24h" | "last-24h" => Ok(Self::Last24h),
            "2" | "48h" | "last-48h" => Ok(Self::Last48h),
            "3" | "week" | "last-week" => Ok(Self::LastWeek),
            "4" | "month" | "last-month" => Ok(Self::LastMonth),
            "5" | "custom" => Ok(Self::Custom),
            "6" | "all" | "all-time" => Ok(Self::AllTime),
            other => Err(anyhow::anyhow!("unknown fetch mode: {other:?}")),
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Dashboard: POST /sensor-data/dashboard/bar-chart
// ---------------------------------------------------------------------------

/// Request body for the bar-chart aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardFetch {
    pub page: Option<u32>,
    pub skip: Option<u64>,
    pub limit: u64,
    pub fetch_mode: FetchMode,
    pub begin_custom_date: Option<NaiveDateTime>,
    pub end_custom_date: Option<NaiveDateTime>,
    pub equipment_ids: Option<Vec<String>>,
}

/// Average value of one equipment over the selected window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChartItem {
    pub equipment_id: String,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChartDashboard {
    pub data: Vec<BarChartItem>,
    /// Distinct equipment ids with data in the window, across all pages.
    pub count: i64,
}

// ---------------------------------------------------------------------------
// Dashboard: POST /sensor-data/dashboard/line-chart
// ---------------------------------------------------------------------------

/// Hourly average of one equipment. `date_trunc` is the start of the hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChartItem {
    pub equipment_id: String,
    pub date_trunc: NaiveDateTime,
    pub avg: f64,
}

/// Hourly averages over the last 24 hours, ordered by equipment then hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChartDashboard {
    pub data: Vec<LineChartItem>,
}

// ---------------------------------------------------------------------------
// Equipment options: GET /sensor-data/options/equipment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionList {
    pub data: Vec<EquipmentOption>,
}

// ---------------------------------------------------------------------------
// CSV import: POST /sensor-data/csv
// ---------------------------------------------------------------------------

/// Row counts of one upload. Shown once, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvImportStatus {
    pub count_success: u64,
    pub count_fail: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_mode_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&FetchMode::Last24h).unwrap(), "1");
        assert_eq!(serde_json::to_string(&FetchMode::Custom).unwrap(), "5");
        assert_eq!(serde_json::to_string(&FetchMode::AllTime).unwrap(), "6");
    }

    #[test]
    fn fetch_mode_rejects_out_of_range_integers() {
        assert!(serde_json::from_str::<FetchMode>("0").is_err());
        assert!(serde_json::from_str::<FetchMode>("7").is_err());
        assert_eq!(serde_json::from_str::<FetchMode>("4").unwrap(), FetchMode::LastMonth);
    }

    #[test]
    fn fetch_mode_from_str_accepts_names_and_numbers() {
        assert_eq!("all".parse::<FetchMode>().unwrap(), FetchMode::AllTime);
        assert_eq!("Week".parse::<FetchMode>().unwrap(), FetchMode::LastWeek);
        assert_eq!("2".parse::<FetchMode>().unwrap(), FetchMode::Last48h);
        let err = "yesterday".parse::<FetchMode>().unwrap_err();
        assert!(err.to_string().contains("unknown fetch mode"));
    }

    #[test]
    fn dashboard_fetch_body_shape() {
        let begin = NaiveDateTime::parse_from_str("2024-03-01T00:00:00", "%Y-%m-%dT%H:%M:%S")
            .unwrap();
        let body = serde_json::to_value(DashboardFetch {
            page: Some(1),
            skip: Some(5),
            limit: 5,
            fetch_mode: FetchMode::Custom,
            begin_custom_date: Some(begin),
            end_custom_date: None,
            equipment_ids: Some(vec!["EQ-1".into()]),
        })
        .unwrap();

        assert_eq!(body["fetch_mode"], 5);
        assert_eq!(body["skip"], 5);
        assert_eq!(body["limit"], 5);
        assert_eq!(body["begin_custom_date"], "2024-03-01T00:00:00");
        assert!(body["end_custom_date"].is_null());
        assert_eq!(body["equipment_ids"][0], "EQ-1");
    }

    #[test]
    fn sensor_record_parses_naive_backend_timestamps() {
        let raw = r#"{
            "id": "2f1b7c1e-2d6a-4e38-9d43-2f4b3c8f6a10",
            "equipment_id": "EQ-12345",
            "value": 78.42,
            "timestamp": "2023-02-15T01:30:00.000123"
        }"#;
        let record: SensorDataPublic = serde_json::from_str(raw).unwrap();
        assert_eq!(record.equipment_id, "EQ-12345");
        assert_eq!(record.timestamp.format("%d/%m/%Y %H:%M:%S").to_string(), "15/02/2023 01:30:00");
    }
}
