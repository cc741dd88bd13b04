//! # Query Predicates
//!
//! A [`Predicate`] is the sparse `field → term` map sent with a list query. The backend does the
//! matching; the client never filters rows itself.
//!
//! ## Rules
//!
//! - A field absent from the map is unconstrained.
//! - An empty term is the same as an absent field. It is dropped on insert, so a predicate never
//!   carries `field=""`.
//! - Terms are passed through verbatim. Boolean columns send the literal strings `"true"` and
//!   `"false"`; coercion is the backend's job.
//!
//! ## Column Bindings
//!
//! Grid filter slots are bound to backend fields through a [`FieldMap`], an ordered table of
//! `column key → field key` declared together with the grid. [`PredicateBuilder`] reads terms
//! either by column key ([`PredicateBuilder::build`]) or by slot position in declaration order
//! ([`PredicateBuilder::build_positional`]). Slots the grid did not report (e.g. a filter never
//! touched) are simply missing from the result.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Predicate(BTreeMap<String, String>);

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Empty terms leave the field unconstrained.
    pub fn with(mut self, field: impl Into<String>, term: impl Into<String>) -> Self {
        self.insert(field, term);
        self
    }

    /// Sets `field` to `term`, or removes it when `term` is empty.
    pub fn insert(&mut self, field: impl Into<String>, term: impl Into<String>) {
        let field = field.into();
        let term = term.into();
        if term.is_empty() {
            self.0.remove(&field);
        } else {
            self.0.insert(field, term);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Predicate {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut predicate = Predicate::new();
        for (field, term) in iter {
            predicate.insert(field, term);
        }
        predicate
    }
}

/// Deserializes through [`Predicate::insert`], so empty terms are dropped here too.
impl<'de> Deserialize<'de> for Predicate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let terms = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(terms.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub column: String,
    pub field: String,
}

/// Ordered `column key → field key` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(Vec<ColumnBinding>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a binding. Rebinding an existing column replaces its field in place.
    pub fn bind(mut self, column: impl Into<String>, field: impl Into<String>) -> Self {
        let column = column.into();
        let field = field.into();
        match self.0.iter_mut().find(|b| b.column == column) {
            Some(existing) => existing.field = field,
            None => self.0.push(ColumnBinding { column, field }),
        }
        self
    }

    /// Binds a column to a field of the same name.
    pub fn same(self, key: &str) -> Self {
        self.bind(key, key)
    }

    pub fn field_for(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|b| b.column == column)
            .map(|b| b.field.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|b| b.column.as_str())
    }

    pub fn bindings(&self) -> &[ColumnBinding] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PredicateBuilder {
    fields: FieldMap,
}

impl PredicateBuilder {
    pub fn new(fields: FieldMap) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Builds a predicate from `(column key, term)` pairs. Columns without a binding are ignored.
    pub fn build<I, K, T>(&self, terms: I) -> Predicate
    where
        I: IntoIterator<Item = (K, Option<T>)>,
        K: AsRef<str>,
        T: AsRef<str>,
    {
        let mut predicate = Predicate::new();
        for (column, term) in terms {
            let Some(field) = self.fields.field_for(column.as_ref()) else {
                trace!(column = column.as_ref(), "ignoring filter on unbound column");
                continue;
            };
            if let Some(term) = term {
                predicate.insert(field, term.as_ref());
            }
        }
        predicate
    }

    /// Builds a predicate from filter slots in column declaration order.
    ///
    /// Slot `i` belongs to the `i`-th binding. Extra slots beyond the table are ignored, missing
    /// slots leave their fields unconstrained.
    pub fn build_positional<I, T>(&self, slots: I) -> Predicate
    where
        I: IntoIterator<Item = Option<T>>,
        T: AsRef<str>,
    {
        let mut predicate = Predicate::new();
        for (binding, term) in self.fields.bindings().iter().zip(slots) {
            if let Some(term) = term {
                predicate.insert(binding.field.as_str(), term.as_ref());
            }
        }
        predicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive_fields() -> FieldMap {
        FieldMap::new()
            .same("lastName")
            .same("firstName")
            .same("middleName")
            .bind("learningType.name", "learningType")
            .same("isActive")
    }

    #[test]
    fn test_deserialize_drops_empty_terms() {
        let predicate: Predicate =
            serde_json::from_str(r#"{"lastName":"","university":"SGU"}"#).unwrap();
        assert!(!predicate.contains("lastName"));
        assert_eq!(predicate.get("university"), Some("SGU"));
        assert_eq!(predicate.len(), 1);
    }

    #[test]
    fn test_empty_term_is_absent() {
        let p = Predicate::new().with("lastName", "").with("email", "a@b");
        assert!(!p.contains("lastName"));
        assert_eq!(p.get("email"), Some("a@b"));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_empty_term_clears_previous_value() {
        let mut p = Predicate::new().with("lastName", "Ivanov");
        p.insert("lastName", "");
        assert!(p.is_empty());
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let p = Predicate::new().with("lastName", "Ivanov").with("isActive", "true");
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            serde_json::json!({"isActive": "true", "lastName": "Ivanov"})
        );
    }

    #[test]
    fn test_field_map_rebind_keeps_position() {
        let map = FieldMap::new().same("a").same("b").bind("a", "alpha");
        assert_eq!(map.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.field_for("a"), Some("alpha"));
    }

    #[test]
    fn test_build_only_non_empty_fields() {
        let builder = PredicateBuilder::new(archive_fields());
        let p = builder.build(vec![
            ("lastName", Some("Ivanov")),
            ("firstName", Some("")),
            ("middleName", None),
            ("learningType.name", Some("2")),
        ]);

        assert_eq!(p.len(), 2);
        assert_eq!(p.get("lastName"), Some("Ivanov"));
        assert_eq!(p.get("learningType"), Some("2"));
        assert!(!p.contains("firstName"));
        assert!(!p.contains("middleName"));
    }

    #[test]
    fn test_build_ignores_unbound_columns() {
        let builder = PredicateBuilder::new(archive_fields());
        let p = builder.build(vec![("curator", Some("Smith")), ("isActive", Some("false"))]);
        assert_eq!(p, Predicate::new().with("isActive", "false"));
    }

    #[test]
    fn test_build_positional_maps_slots_in_order() {
        let builder = PredicateBuilder::new(archive_fields());
        let p = builder.build_positional(vec![Some("Ivanov"), None, Some("S"), Some("1")]);

        assert_eq!(
            p,
            Predicate::new()
                .with("lastName", "Ivanov")
                .with("middleName", "S")
                .with("learningType", "1")
        );
    }

    #[test]
    fn test_build_positional_fewer_slots_than_columns() {
        let builder = PredicateBuilder::new(archive_fields());
        let p = builder.build_positional(vec![Some("Ivanov")]);
        assert_eq!(p.len(), 1);
        assert!(!p.contains("isActive"));
    }

    #[test]
    fn test_build_positional_passes_boolean_literals_through() {
        let builder = PredicateBuilder::new(FieldMap::new().same("isActive"));
        let p = builder.build_positional(vec![Some("false")]);
        assert_eq!(p.get("isActive"), Some("false"));
    }
}
