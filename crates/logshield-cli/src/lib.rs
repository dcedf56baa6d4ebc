//! Command-line front end for LogShield.

pub mod cli;
pub mod commands;
