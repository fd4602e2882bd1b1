pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod file_store;
pub mod fixtures;
pub mod report;
