//! Spark Clock: a terminal clock and weather display with an animated mascot.
//!
//! The data pipeline lives in [`location`] and [`api`]; everything else is
//! the ratatui presentation layer driven from `main.rs`.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod location;
pub mod logging;
pub mod mascot;
pub mod mock;
pub mod models;
pub mod pager;
pub mod ui;
