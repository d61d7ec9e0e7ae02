//! # bagmind
//!
//! The command-line front end of the bagmind memory - THE BINARY.
//!
//! The library half holds everything the binary plugs into
//! `bagmind-core`, so integration tests can drive it directly:
//!
//! - [`parser`] - the s-expression task syntax
//! - [`deriver`] - a deduction-only reference deriver
//! - [`settings`] - TOML configuration files
//! - [`cli`] - clap commands

pub mod cli;
pub mod deriver;
pub mod parser;
pub mod settings;

pub use deriver::SyllogisticDeriver;
pub use parser::SexprParser;
