//! Pitwall library
//!
//! Season data aggregation for Formula 1: a paginated, cached loader over the
//! Jolpica API, derived driver and constructor statistics, and the CLI
//! surface used by the `pitwall` binary and integration tests.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod news;
pub mod output;
pub mod season;
pub mod stats;
