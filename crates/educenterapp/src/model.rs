//! # Domain Model
//!
//! Records handed out by the backend, plus the small value types the views build from them.
//!
//! ## Entities
//!
//! Every record type implements [`Entity`], which ties it to:
//! - a singular name, used to namespace its update channel (`<app>:studentUpdate`)
//! - a plural path segment under `api/` (`api/students/:id`)
//! - an optional identifier (`None` until the backend has assigned one)
//!
//! Relations (`learningType`, `groupOfStudent`, `curator`) arrive already resolved by the
//! backend. They are carried as [`RelationRef`] snapshots and never edited in place: a record is
//! changed only by sending the whole record back through `update`.
//!
//! ## The Blank Student
//!
//! [`Student::default`] is the canonical empty edit buffer. It serializes to exactly
//!
//! ```text
//! {firstName:null, lastName:null, middleName:null, type:null, email:null, phone:null,
//!  university:null, specialty:null, course:null, isActive:false, id:null}
//! ```
//!
//! Relation fields and `faculty` are skipped while unset so the blank shape stays fixed.
//!
//! ## Option Lists
//!
//! [`OptionList`] feeds select-type column filters. It is derived from a reference dataset in
//! one go and rebuilt wholesale on every load; values are unique (first occurrence wins).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub type EntityId = i64;

pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// Singular name, e.g. `student`.
    const NAME: &'static str;
    /// Plural path segment under `api/`, e.g. `students`.
    const PATH: &'static str;

    fn id(&self) -> Option<EntityId>;
    fn set_id(&mut self, id: EntityId);
}

/// A server-resolved reference to another record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Option<EntityId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub university: Option<String>,
    pub specialty: Option<String>,
    pub course: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_type: Option<RelationRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_of_student: Option<RelationRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curator: Option<RelationRef>,
}

impl Student {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            email: Some(email.to_string()),
            is_active: true,
            ..Default::default()
        }
    }

    pub fn full_name(&self) -> String {
        [&self.last_name, &self.first_name, &self.middle_name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Entity for Student {
    const NAME: &'static str = "student";
    const PATH: &'static str = "students";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningType {
    pub id: Option<EntityId>,
    pub name: String,
}

impl Entity for LearningType {
    const NAME: &'static str = "learningType";
    const PATH: &'static str = "learningTypes";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasonForLeaving {
    pub id: Option<EntityId>,
    pub reason: Option<String>,
}

impl Entity for ReasonForLeaving {
    const NAME: &'static str = "reasonForLeaving";
    const PATH: &'static str = "reasonForLeavings";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

/// Outcome of one row of a student import.
///
/// Only `success` and `message` are read; any other field the backend reports is kept as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl OperationResult {
    /// A result without an explicit `success` flag counts as failed.
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// An option whose label is its value, as used for fixed enumerations.
    pub fn same(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionList(Vec<SelectOption>);

impl OptionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options<I: IntoIterator<Item = SelectOption>>(options: I) -> Self {
        let mut seen = HashSet::new();
        Self(
            options
                .into_iter()
                .filter(|opt| seen.insert(opt.value.clone()))
                .collect(),
        )
    }

    /// Learning types keyed by id and labelled by name. Unsaved records are skipped.
    pub fn from_learning_types(types: &[LearningType]) -> Self {
        Self::from_options(
            types
                .iter()
                .filter_map(|t| t.id.map(|id| SelectOption::new(id.to_string(), t.name.clone()))),
        )
    }

    pub fn label_for(&self, value: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|opt| opt.value == value)
            .map(|opt| opt.label.as_str())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|opt| opt.value == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectOption> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
