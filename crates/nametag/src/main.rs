//! # Nametag CLI
//!
//! The binary is thin: the CLI lives in `src/cli/`, and this file only
//! invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/nametagapp/`: core library, UI-agnostic
//! - `crates/nametag/`: this CLI, depends on `nametagapp`
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/nametag/src/)                            │
//! │  - clap argument parsing (cli/setup.rs)                     │
//! │  - directory discovery (discover.rs)                        │
//! │  - dispatch + context wiring (cli/commands.rs)              │
//! │  - terminal rendering (cli/render.rs)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/nametagapp/src/api.rs)                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (crates/nametagapp/src/commands/*)           │
//! │  - No knowledge of stdout/stderr or process exits           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything from `api.rs` inward is UI agnostic. The CLI layer owns argument
//! parsing, logging setup, file discovery, exit codes, and rendering.

mod cli;
mod discover;

fn main() {
    match cli::run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
