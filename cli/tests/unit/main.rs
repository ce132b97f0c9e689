//! Unit tests for the siteio CLI.
//!
//! Services run against scripted hosts and in-memory fakes; nothing here
//! spawns a process or touches the network.

mod helpers;
mod remote_service;
mod teardown_service;
