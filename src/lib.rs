pub mod config;
pub mod db;
pub mod logging;
pub mod manager;
pub mod operations;
pub mod tui;
