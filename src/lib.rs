//! File pipeline and configuration for the `uds-tokens` command.

pub mod config;
pub mod pipeline;
