//! Sensor dashboard: per-equipment averages over a selectable time window.

pub mod controller;
pub mod filter;

pub use controller::{DashboardController, DashboardError, DashboardView};
pub use filter::DashboardFilter;
