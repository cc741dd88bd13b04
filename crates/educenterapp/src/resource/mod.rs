//! # Resource Layer
//!
//! [`Resource`] is the client side of one backend collection (`api/<plural>/:id`). Views and
//! synchronizers only ever talk to this trait.
//!
//! ## Implementations
//!
//! - [`http::RestResource`]: production client over `reqwest`.
//! - [`memory::MemResource`]: in-memory collection for tests and demos, with a request log and a
//!   failure switch.
//!
//! ## Single-threaded Futures
//!
//! The trait is declared `?Send`: resources are driven from one logical thread (a current-thread
//! runtime in the CLI), and implementations are free to keep state in `RefCell`s.
//!
//! ## Response Parsing
//!
//! `query` always yields a JSON array of records. Single-record responses (`get`, `update`) go
//! through a [`ResponseParser`] chosen per resource, so backends that wrap records in an envelope
//! can be adapted without touching the views:
//!
//! - [`JsonParser`]: the body is the record.
//! - [`EnvelopeParser`]: the record sits under one key, e.g. `{"data": {...}}`.
//! - any `Fn(&str) -> Result<R>` closure.

use crate::error::{EduError, Result};
use crate::model::{Entity, EntityId};
use crate::predicate::Predicate;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::rc::Rc;

pub mod http;
pub mod memory;

#[async_trait(?Send)]
pub trait Resource<R: Entity> {
    /// Lists records matching `predicate`, or all records when `None`.
    async fn query(&self, predicate: Option<&Predicate>) -> Result<Vec<R>>;

    async fn get(&self, id: EntityId) -> Result<R>;

    /// Replaces the whole record. A record without an id is created.
    async fn update(&self, record: &R) -> Result<R>;

    async fn delete(&self, id: EntityId) -> Result<()>;
}

/// Lets several views share one resource.
#[async_trait(?Send)]
impl<R: Entity, T: Resource<R> + ?Sized> Resource<R> for Rc<T> {
    async fn query(&self, predicate: Option<&Predicate>) -> Result<Vec<R>> {
        (**self).query(predicate).await
    }

    async fn get(&self, id: EntityId) -> Result<R> {
        (**self).get(id).await
    }

    async fn update(&self, record: &R) -> Result<R> {
        (**self).update(record).await
    }

    async fn delete(&self, id: EntityId) -> Result<()> {
        (**self).delete(id).await
    }
}

pub trait ResponseParser<R> {
    fn parse_one(&self, body: &str) -> Result<R>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl<R: DeserializeOwned> ResponseParser<R> for JsonParser {
    fn parse_one(&self, body: &str) -> Result<R> {
        Ok(serde_json::from_str(body)?)
    }
}

#[derive(Debug, Clone)]
pub struct EnvelopeParser {
    key: String,
}

impl EnvelopeParser {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl<R: DeserializeOwned> ResponseParser<R> for EnvelopeParser {
    fn parse_one(&self, body: &str) -> Result<R> {
        let mut envelope: serde_json::Value = serde_json::from_str(body)?;
        let inner = envelope
            .get_mut(&self.key)
            .map(serde_json::Value::take)
            .ok_or_else(|| EduError::Store(format!("response has no \"{}\" field", self.key)))?;
        Ok(serde_json::from_value(inner)?)
    }
}

impl<R, F> ResponseParser<R> for F
where
    F: Fn(&str) -> Result<R>,
{
    fn parse_one(&self, body: &str) -> Result<R> {
        self(body)
    }
}
