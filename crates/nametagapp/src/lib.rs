//! # nametag
//!
//! An image library whose tags live in the file names themselves:
//! `vacation @beach @sunset.jpg` is `vacation.jpg` tagged `beach` and
//! `sunset`. Any tool that can rename a file can tag it, and the tags
//! survive being copied anywhere.
//!
//! ## Architecture
//!
//! ```text
//! UI (CLI) ──▶ api ──▶ commands ──▶ library ──┬──▶ file ──▶ codec
//!                                             ├──▶ tags::TagIndex
//!                                             ├──▶ store (images.json, tags.json)
//!                                             ├──▶ rename_log (nameLog.txt)
//!                                             └──▶ events
//! ```
//!
//! - [`codec`]: the file name grammar, pure functions.
//! - [`file`]: one file on disk with its tags and name history; every tag
//!   change is a rename.
//! - [`tags`]: the tag table and tag → file membership.
//! - [`library`]: keeps files, tags and the store consistent.
//! - [`store`]: JSON persistence of tracked files and tags.
//! - [`rename_log`]: the append-only rename audit.
//! - [`events`]: change notifications for presentation layers.
//! - [`commands`] and [`api`]: UI-agnostic operations returning
//!   [`commands::CmdResult`].
//! - [`config`] and [`init`]: configuration and production wiring.

pub mod api;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod file;
pub mod init;
pub mod library;
pub mod rename_log;
pub mod store;
pub mod tags;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
