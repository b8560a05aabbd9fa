pub mod config;
pub mod ui;
