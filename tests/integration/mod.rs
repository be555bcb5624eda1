//! Integration tests for upload folder resolution and materialization

mod cli_commands;
mod config_integration;
mod local_materialization;
mod properties;
mod resolution_flow;
mod test_utils;
