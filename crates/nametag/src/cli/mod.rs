//! # CLI Behavior
//!
//! This is **one possible UI client** for nametag, not the application
//! itself. The CLI is the only place that knows about terminal I/O, exit
//! codes, and output formatting.
//!
//! ## Directory First
//!
//! Every file command names the directory it works in:
//!
//! ```text
//! nametag tag ~/pics vacation.jpg beach sunset
//! ```
//!
//! The directory is listed (images only, see `extensions` in the config),
//! loaded as the working set, and only then is the command applied. The file
//! may be named in any rendering: `vacation.jpg` finds
//! `vacation @beach.jpg`.
//!
//! ## Exit Codes
//!
//! `0` on success, `1` when the command failed or a rename or save reported
//! an error.
//!
//! ## Module Structure
//!
//! - `commands`: dispatch, logging setup, and context wiring
//! - `render`: output formatting (columns, colors, messages)
//! - `setup`: argument parsing via clap

mod commands;
mod render;
pub mod setup;

pub use commands::run;
