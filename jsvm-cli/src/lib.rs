//! jsvm CLI library
//!
//! This module exports the internal components of the CLI for testing purposes.

pub mod cli;
pub mod commands;
pub mod config;
