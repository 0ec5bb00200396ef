//! Stats module - Dashboard aggregation

mod calculator;

pub use calculator::{DashboardCalculator, DashboardData};
