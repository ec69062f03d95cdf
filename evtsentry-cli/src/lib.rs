//! evtsentry command-line front-end.
//!
//! The binary in `main.rs` is a thin wrapper; argument parsing, command
//! handlers, output rendering and tracing setup live here so they can be
//! exercised from integration tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
