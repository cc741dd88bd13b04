//! # Educenter CLI
//!
//! A terminal client for the education-center admin backend. It drives the same views the web
//! client uses (student list, archive, detail) and prints what they hold, so the binary stays
//! thin: this file only invokes `cli::run()` and handles process termination.
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/educenter/src/cli/)                      │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Config, logging and runtime wiring (commands.rs)         │
//! │  - Text tables from grid column definitions (render.rs)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Views (crates/educenterapp/src/views.rs)                   │
//! │  - List, archive and detail view-models                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Resources (crates/educenterapp/src/resource/)              │
//! │  - REST client over reqwest                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Testing Approach
//!
//! - **Library**: unit and integration tests against the in-memory resource.
//! - **CLI**: argument parsing and rendering are unit tested in place; `tests/cli.rs` runs the
//!   binary for the paths that need no backend.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
