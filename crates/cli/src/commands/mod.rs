//! Subcommand implementations

pub mod headers;
pub mod run;
pub mod scan;
