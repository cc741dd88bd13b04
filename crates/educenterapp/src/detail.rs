//! # Detail Binding
//!
//! [`DetailBinder`] holds the one record a detail view shows. It is filled two ways:
//!
//! 1. [`DetailBinder::load`] fetches the record by id and replaces the bound value on success.
//! 2. Snapshots published on the entity's update channel replace it as they arrive.
//!
//! The binder subscribes when it is created and keeps the [`Subscription`] for its own lifetime.
//! [`DetailBinder::teardown`] (or dropping the binder) releases it; after that no broadcast can
//! reach the bound value, including through handles obtained earlier with
//! [`DetailBinder::handle`].
//!
//! ## Which Broadcasts Apply
//!
//! Under [`UpdateMatch::Any`] every snapshot on the channel replaces the bound record, whatever
//! its id. That is how the existing screens behave, so it is the default. [`UpdateMatch::SameId`]
//! only accepts snapshots whose id equals the bound record's id.

use crate::bus::{EntityChannel, Subscription};
use crate::error::Result;
use crate::model::{Entity, EntityId};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateMatch {
    #[default]
    Any,
    SameId,
}

/// Read-only handle on a binder's bound record.
pub struct BoundRecord<R> {
    cell: Rc<RefCell<Option<R>>>,
}

impl<R> Clone for BoundRecord<R> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<R: Clone> BoundRecord<R> {
    pub fn get(&self) -> Option<R> {
        self.cell.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.borrow().is_none()
    }
}

pub struct DetailBinder<R, C> {
    resource: C,
    bound: Rc<RefCell<Option<R>>>,
    subscription: Option<Subscription>,
}

impl<R, C> DetailBinder<R, C>
where
    R: Entity,
    C: Resource<R>,
{
    pub fn new(resource: C, channel: &EntityChannel<R>, policy: UpdateMatch) -> Self {
        let bound: Rc<RefCell<Option<R>>> = Rc::new(RefCell::new(None));
        // The listener only holds a weak reference; the binder owns the record.
        let target = Rc::downgrade(&bound);
        let subscription = channel.subscribe(move |snapshot: &R| {
            let Some(target) = target.upgrade() else {
                return;
            };
            let mut current = target.borrow_mut();
            if policy == UpdateMatch::SameId {
                let bound_id = current.as_ref().and_then(|r| r.id());
                if bound_id != snapshot.id() {
                    debug!(
                        entity = R::NAME,
                        ?bound_id,
                        snapshot_id = ?snapshot.id(),
                        "ignoring update for other record"
                    );
                    return;
                }
            }
            debug!(entity = R::NAME, id = ?snapshot.id(), "bound record replaced by broadcast");
            *current = Some(snapshot.clone());
        });

        Self {
            resource,
            bound,
            subscription: Some(subscription),
        }
    }

    /// Starts with an already resolved record, as when a route hands the entity in.
    pub fn with_record(self, record: R) -> Self {
        *self.bound.borrow_mut() = Some(record);
        self
    }

    pub async fn load(&self, id: EntityId) -> Result<()> {
        match self.resource.get(id).await {
            Ok(record) => {
                *self.bound.borrow_mut() = Some(record);
                Ok(())
            }
            Err(err) => {
                warn!(entity = R::NAME, id, error = %err, "detail load failed, keeping record");
                Err(err)
            }
        }
    }

    pub fn current(&self) -> Option<R> {
        self.bound.borrow().clone()
    }

    pub fn handle(&self) -> BoundRecord<R> {
        BoundRecord {
            cell: Rc::clone(&self.bound),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Releases the update subscription. Safe to call more than once.
    pub fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            debug!(entity = R::NAME, channel = subscription.channel(), "detail view torn down");
            subscription.unsubscribe();
        }
    }
}
