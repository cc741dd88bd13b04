//! # List Synchronization
//!
//! [`ListSynchronizer`] keeps a grid's rows in step with a remote list query. It owns three
//! things: the bound [`GridState`], the active predicate, and a request sequencer.
//!
//! ## Loading
//!
//! [`ListSynchronizer::load_all`] sends the given predicate (or none, meaning every record)
//! unmodified and, on success, replaces the rows in full. There is no diffing, retry, debounce,
//! or cancellation. On failure the rows are left exactly as they were and the error is returned.
//!
//! Two refresh policies exist because the two list screens differ:
//!
//! - [`ListSynchronizer::reload_all`]: drop any filter and reload everything.
//! - [`ListSynchronizer::reload_active`]: reload with the predicate most recently issued.
//!
//! ## Overlapping Requests
//!
//! Every load takes a monotonic [`Ticket`] when it is issued and hands it back when its response
//! arrives. What happens to a response that arrives after a newer one depends on
//! [`ResponseOrdering`]:
//!
//! ```text
//! issue A (t1) ── issue B (t2) ── B returns ── A returns
//!
//! ArrivalOrder:   rows = B, then rows = A      (stale A wins)
//! LatestApplied:  rows = B, A discarded       (t1 < last issued t2)
//! ```
//!
//! Under `LatestApplied` only the newest issued load may replace the rows, whatever the arrival
//! order. If A lands before B it is still discarded, and if B then fails the rows stay as they
//! were before A was issued, so the grid never shows a filter other than the active one.
//!
//! The halves are exposed as [`ListSynchronizer::begin`] and [`ListSynchronizer::complete`] so
//! callers that manage their own transport, and tests, can drive any interleaving.
//!
//! All state sits behind `RefCell`/`Cell` and no borrow is held across an `.await`, so several
//! loads may be in flight on the same synchronizer at once.

use crate::error::Result;
use crate::grid::GridState;
use crate::model::Entity;
use crate::predicate::Predicate;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, Ref, RefCell};
use std::marker::PhantomData;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseOrdering {
    /// Apply every successful response as it arrives.
    ArrivalOrder,
    /// Apply only the response to the most recently issued load.
    #[default]
    LatestApplied,
}

/// Handle for one issued load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    predicate: Option<Predicate>,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { rows: usize },
    Discarded,
}

pub struct ListSynchronizer<R, C> {
    resource: C,
    ordering: ResponseOrdering,
    state: RefCell<GridState<R>>,
    active: RefCell<Option<Predicate>>,
    issued: Cell<u64>,
    _entity: PhantomData<fn() -> R>,
}

impl<R, C> ListSynchronizer<R, C>
where
    R: Entity,
    C: Resource<R>,
{
    pub fn new(resource: C, ordering: ResponseOrdering) -> Self {
        Self {
            resource,
            ordering,
            state: RefCell::new(GridState::new()),
            active: RefCell::new(None),
            issued: Cell::new(0),
            _entity: PhantomData,
        }
    }

    pub fn resource(&self) -> &C {
        &self.resource
    }

    pub fn ordering(&self) -> ResponseOrdering {
        self.ordering
    }

    /// Read-only view of the bound rows.
    pub fn rows(&self) -> Ref<'_, [R]> {
        Ref::map(self.state.borrow(), GridState::rows)
    }

    pub fn revision(&self) -> u64 {
        self.state.borrow().revision()
    }

    /// The predicate of the most recently issued load.
    pub fn active_predicate(&self) -> Option<Predicate> {
        self.active.borrow().clone()
    }

    /// Issues a load: records `predicate` as active and takes the next ticket.
    pub fn begin(&self, predicate: Option<Predicate>) -> Ticket {
        let seq = self.issued.get() + 1;
        self.issued.set(seq);
        *self.active.borrow_mut() = predicate.clone();
        debug!(entity = R::NAME, seq, ?predicate, "load issued");
        Ticket { seq, predicate }
    }

    /// Applies the response for `ticket`.
    ///
    /// Errors leave the rows untouched and are passed back to the caller.
    pub fn complete(&self, ticket: Ticket, response: Result<Vec<R>>) -> Result<LoadOutcome> {
        let rows = match response {
            Ok(rows) => rows,
            Err(err) => {
                warn!(
                    entity = R::NAME,
                    seq = ticket.seq,
                    error = %err,
                    "load failed, keeping rows"
                );
                return Err(err);
            }
        };

        if self.ordering == ResponseOrdering::LatestApplied && ticket.seq < self.issued.get() {
            warn!(
                entity = R::NAME,
                seq = ticket.seq,
                issued = self.issued.get(),
                "discarding stale response"
            );
            return Ok(LoadOutcome::Discarded);
        }

        let count = rows.len();
        self.state.borrow_mut().replace(rows);
        debug!(entity = R::NAME, seq = ticket.seq, rows = count, "load applied");
        Ok(LoadOutcome::Applied { rows: count })
    }

    pub async fn load_all(&self, predicate: Option<Predicate>) -> Result<LoadOutcome> {
        let ticket = self.begin(predicate);
        let response = self.resource.query(ticket.predicate()).await;
        self.complete(ticket, response)
    }

    pub async fn reload_all(&self) -> Result<LoadOutcome> {
        self.load_all(None).await
    }

    pub async fn reload_active(&self) -> Result<LoadOutcome> {
        self.load_all(self.active_predicate()).await
    }
}
