//! # CLI Behavior
//!
//! This is **one possible UI client** for educenter, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and output formatting.
//!
//! For the overall architecture, see the crate-level documentation in [`crate`].
//!
//! ## Commands
//!
//! Running `educenter` with no arguments defaults to `educenter students`.
//!
//! - `students`: the active list, loaded in full.
//! - `students --archive -f lastName=Iv -f learningType.name=2`: the archive, filtered by the
//!   backend. Filters are keyed by grid column, exactly as the grid reports them.
//! - `students --as-of 2024-03-01T09:30:00Z`: the list as it was at an instant.
//! - `student <id>`: one record, as the detail view holds it.
//! - `learning-types`, `reasons`: reference lists.
//! - `config`: the effective configuration.
//!
//! Every listing accepts `--json` to print the raw records instead of a table.
//!
//! ## Module Structure
//!
//! - `commands`: Runtime wiring and per-command handlers
//! - `render`: Text tables and detail blocks
//! - `setup`: Argument parsing via clap
//! - `styles`: Terminal styling constants

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
