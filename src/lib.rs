//! Dotfiles installation engine.
//!
//! Moves configuration files between `$HOME` and a dotfiles store by
//! composing small filesystem operations (copy, symlink, delete, write,
//! change-owner) into trees that are validated before anything is mutated.
//!
//! The public API is organised into these layers:
//!
//! - **[`fs`]**: the filesystem port and its real implementation
//! - **[`operation`]**: the operation tree: leaves, gates, fallback, messages
//! - **[`commands`]**: tree builders for `link`, `unlink`, `install` and the
//!   per-entry driver
//! - **[`config`]**, **[`flags`]**, **[`paths`]**: settings, run options and
//!   path derivation
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod flags;
pub mod fs;
pub mod logging;
pub mod operation;
pub mod paths;
pub mod prompt;
pub mod template;
