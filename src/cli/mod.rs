//! CLI module for the dataset-verify library
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
#[path = "main.rs"]
mod main_impl;
mod progress;

pub use main_impl::{main, run, Cli, CliLogFormat};
