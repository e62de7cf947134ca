//! # gamekit-cli
//!
//! Command-line interface for gamekit.
//!
//! ## Commands
//!
//! - `gamekit functions <platform>` - list a platform's functions
//! - `gamekit invoke <platform> <name> [ARGS]...` - call one function
//! - `gamekit webhook <file>` - parse a Telegram update
//! - `gamekit simulate` / `gamekit deploy` - talk to the GAME backend
//! - `gamekit config` - show the resolved configuration

pub mod commands;

pub use commands::Cli;
