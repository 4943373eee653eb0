//! Meow playground: run Meow programs from a terminal editor or the command line.

pub mod bridge;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod consent;
pub mod engine;
pub mod error;
pub mod loader;
pub mod logging;
pub mod printer;
pub mod share;
pub mod tui;
pub mod utils;
