//! Admin client for the sensor data backend: typed REST access, a query
//! cache, the dashboard filter flow and CSV import.

pub mod client;
pub mod config;
pub mod csv_import;
pub mod dashboard;
pub mod forms;
pub mod models;
pub mod mutations;
pub mod query;
pub mod services;
pub mod session;
pub mod toast;
pub mod views;
