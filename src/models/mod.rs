//! Wire types for every request and response body the backend exchanges.
//!
//! Field names match the backend's JSON exactly; timestamps are zone-less
//! because the backend stores naive UTC date-times.

pub mod auth;
pub mod item;
pub mod sensor_data;
pub mod user;

pub use auth::{LoginForm, Message, NewPassword, Token};
pub use item::{ItemCreate, ItemPublic, ItemUpdate, ItemsPublic};
pub use sensor_data::{
    BarChartDashboard, BarChartItem, CsvImportStatus, DashboardFetch, EquipmentOption, FetchMode,
    LineChartDashboard, LineChartItem, OptionList, SensorDataCreate, SensorDataListPublic, SensorDataPublic, SensorDataUpdate,
};
pub use user::{
    UpdatePassword, UserCreate, UserPublic, UserRegister, UserUpdate, UserUpdateMe, UsersPublic,
};
