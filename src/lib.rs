//! Development environment provisioner.
//!
//! Installs system packages and a few third-party tools, then symlinks every
//! file of the selected dotfile packages into the home directory, backing up
//! whatever regular files were there before. Everything is driven by optional
//! TOML files in `<root>/conf` and filtered by profile and platform.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: environment detection, profiles and the `conf/*.toml` lists
//! - **[`linker`]**: the dotfile linker (plan, back up, link, unlink, inspect)
//! - **[`resources`]**: idempotent `check + apply` primitives
//! - **[`tasks`]**: named units of work run strictly in order
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod linker;
pub mod logging;
pub mod net;
pub mod platform;
pub mod resources;
pub mod tasks;
