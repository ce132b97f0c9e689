//! Integration tests for the siteio CLI.
//!
//! These tests spawn the actual binary against a temporary data directory.

mod cli_tests;
mod config_command;
