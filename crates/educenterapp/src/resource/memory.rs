use super::Resource;
use crate::error::{EduError, Result};
use crate::model::{Entity, EntityId};
use crate::predicate::Predicate;
use async_trait::async_trait;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// A request as seen by [`MemResource`], recorded in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Query(Option<Predicate>),
    Get(EntityId),
    Update(Option<EntityId>),
    Delete(EntityId),
}

/// In-memory collection for testing.
///
/// Uses `RefCell`/`Cell` for interior mutability since resources are driven from a single
/// thread. Matching follows what the backend does with list predicates: case-insensitive
/// substring for text, exact text for numbers and booleans, and `id`/`name` for relation objects.
pub struct MemResource<R> {
    records: RefCell<BTreeMap<EntityId, R>>,
    next_id: Cell<EntityId>,
    requests: RefCell<Vec<Request>>,
    simulate_error: Cell<bool>,
}

impl<R> Default for MemResource<R> {
    fn default() -> Self {
        Self {
            records: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(1),
            requests: RefCell::new(Vec::new()),
            simulate_error: Cell::new(false),
        }
    }
}

impl<R: Entity> MemResource<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I: IntoIterator<Item = R>>(records: I) -> Self {
        let resource = Self::new();
        for record in records {
            resource.insert(record);
        }
        resource
    }

    /// Stores `record`, assigning an id if it has none. Not logged as a request.
    pub fn insert(&self, mut record: R) -> R {
        let id = match record.id() {
            Some(id) => id,
            None => {
                let id = self.next_id.get();
                record.set_id(id);
                id
            }
        };
        if id >= self.next_id.get() {
            self.next_id.set(id + 1);
        }
        self.records.borrow_mut().insert(id, record.clone());
        record
    }

    /// Enable failure simulation for testing error handling.
    pub fn set_simulate_error(&self, simulate: bool) {
        self.simulate_error.set(simulate);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    fn record(&self, request: Request) -> Result<()> {
        self.requests.borrow_mut().push(request);
        if self.simulate_error.get() {
            return Err(EduError::Store("Simulated transport error".to_string()));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl<R: Entity> Resource<R> for MemResource<R> {
    async fn query(&self, predicate: Option<&Predicate>) -> Result<Vec<R>> {
        self.record(Request::Query(predicate.cloned()))?;
        let records = self.records.borrow();
        let mut matched = Vec::new();
        for record in records.values() {
            let keep = match predicate {
                Some(p) => matches(&serde_json::to_value(record)?, p),
                None => true,
            };
            if keep {
                matched.push(record.clone());
            }
        }
        Ok(matched)
    }

    async fn get(&self, id: EntityId) -> Result<R> {
        self.record(Request::Get(id))?;
        self.records
            .borrow()
            .get(&id)
            .cloned()
            .ok_or(EduError::NotFound {
                entity: R::NAME,
                id,
            })
    }

    async fn update(&self, record: &R) -> Result<R> {
        self.record(Request::Update(record.id()))?;
        Ok(self.insert(record.clone()))
    }

    async fn delete(&self, id: EntityId) -> Result<()> {
        self.record(Request::Delete(id))?;
        self.records
            .borrow_mut()
            .remove(&id)
            .map(|_| ())
            .ok_or(EduError::NotFound {
                entity: R::NAME,
                id,
            })
    }
}

fn matches(record: &Value, predicate: &Predicate) -> bool {
    predicate
        .iter()
        .all(|(field, term)| term_matches(record.get(field), term))
}

fn term_matches(value: Option<&Value>, term: &str) -> bool {
    match value {
        Some(Value::String(s)) => s.to_lowercase().contains(&term.to_lowercase()),
        Some(Value::Number(n)) => n.to_string() == term,
        Some(Value::Bool(b)) => b.to_string() == term,
        Some(Value::Object(map)) => ["id", "name"]
            .iter()
            .any(|key| term_matches(map.get(*key), term)),
        _ => false,
    }
}
