//! Subcommand implementations.

pub mod catalog;
pub mod migrate;
pub mod password;
pub mod service;
pub mod tenant;
