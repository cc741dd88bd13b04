//! # Educenter Architecture
//!
//! Educenter is the **UI-agnostic core** of the education-center admin client. It binds remote
//! REST resources to grid and detail views: it turns column filter input into backend queries,
//! keeps list rows in step with query results, and keeps detail views current when a record is
//! saved elsewhere. Nothing here renders or writes to a terminal.
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Views (views.rs)                                           │
//! │  - Student list, archive and detail screens                 │
//! │  - Own the view-model: grid options, rows, edit buffer      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bindings (filter.rs, sync.rs, detail.rs, predicate.rs)     │
//! │  - Filter events → predicates → list loads                  │
//! │  - Request sequencing for overlapping loads                 │
//! │  - Detail records following update broadcasts (bus.rs)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Resources (resource/)                                      │
//! │  - Abstract Resource trait                                  │
//! │  - RestResource (production), MemResource (testing)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Execution Model
//!
//! Everything runs on one thread. Shared state lives in `Rc`/`RefCell`/`Cell`, async traits are
//! declared `?Send`, and callers drive futures on a current-thread runtime (the CLI) or a
//! `LocalSet`. No `RefCell` borrow is held across an `.await`, which is what lets several loads
//! be in flight on one synchronizer.
//!
//! ## Testing Strategy
//!
//! Every module carries unit tests against [`resource::memory::MemResource`], which records the
//! requests it receives so tests can assert on the exact predicate sent. Interleavings of
//! overlapping loads are driven through [`sync::ListSynchronizer::begin`] and
//! [`sync::ListSynchronizer::complete`], and end to end in `tests/`.
//!
//! ## Module Overview
//!
//! - [`predicate`]: Field maps and the predicate builder
//! - [`sync`]: List synchronizer and response ordering
//! - [`detail`]: Detail binder and update matching
//! - [`filter`]: Grid filter adapter
//! - [`grid`]: Column definitions, grid options, grid state
//! - [`bus`]: Per-entity update channels
//! - [`views`]: The student screens
//! - [`resource`]: Resource abstraction and implementations
//! - [`model`]: Entities and select options
//! - [`locale`]: Current display language
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod bus;
pub mod config;
pub mod detail;
pub mod error;
pub mod filter;
pub mod grid;
pub mod locale;
pub mod model;
pub mod predicate;
pub mod resource;
pub mod sync;
pub mod views;
