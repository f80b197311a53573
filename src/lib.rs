pub mod app;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod screener;
pub mod ui;
