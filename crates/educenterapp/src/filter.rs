//! # Grid Filter Adapter
//!
//! Glue between the grid's "filter changed" notification and the list synchronizer. The grid
//! reports the current term(s) of each filterable column; the adapter reads the first term of
//! every column it tracks, in binding order, builds a [`Predicate`] and issues a load. It never
//! filters rows itself.

use crate::error::Result;
use crate::model::Entity;
use crate::predicate::{FieldMap, Predicate, PredicateBuilder};
use crate::resource::Resource;
use crate::sync::{ListSynchronizer, LoadOutcome};
use serde::{Deserialize, Serialize};

/// Filter state of one column as reported by the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilterState {
    pub column: String,
    /// One entry per filter input on the column; only the first is used.
    pub terms: Vec<Option<String>>,
}

impl ColumnFilterState {
    pub fn new(column: impl Into<String>, term: Option<&str>) -> Self {
        Self {
            column: column.into(),
            terms: vec![term.map(str::to_string)],
        }
    }

    pub fn first_term(&self) -> Option<&str> {
        self.terms.first().and_then(|t| t.as_deref())
    }
}

/// The grid's filter-changed notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChanged {
    pub columns: Vec<ColumnFilterState>,
}

impl FilterChanged {
    pub fn new(columns: Vec<ColumnFilterState>) -> Self {
        Self { columns }
    }

    /// Builds an event from `column=term` pairs.
    pub fn from_terms<I, K, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: AsRef<str>,
    {
        Self {
            columns: terms
                .into_iter()
                .map(|(column, term)| ColumnFilterState::new(column, Some(term.as_ref())))
                .collect(),
        }
    }

    pub fn column(&self, key: &str) -> Option<&ColumnFilterState> {
        self.columns.iter().find(|c| c.column == key)
    }
}

#[derive(Debug, Clone)]
pub struct GridFilterAdapter {
    builder: PredicateBuilder,
}

impl GridFilterAdapter {
    pub fn new(fields: FieldMap) -> Self {
        Self {
            builder: PredicateBuilder::new(fields),
        }
    }

    pub fn fields(&self) -> &FieldMap {
        self.builder.fields()
    }

    /// Predicate for the grid state carried by `event`.
    pub fn predicate_for(&self, event: &FilterChanged) -> Predicate {
        self.builder.build(self.fields().columns().map(|column| {
            let term = event.column(column).and_then(ColumnFilterState::first_term);
            (column, term)
        }))
    }

    pub async fn on_filter_changed<R, C>(
        &self,
        event: &FilterChanged,
        sync: &ListSynchronizer<R, C>,
    ) -> Result<LoadOutcome>
    where
        R: Entity,
        C: Resource<R>,
    {
        sync.load_all(Some(self.predicate_for(event))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::archive_field_map;
    use crate::model::Student;
    use crate::resource::memory::{MemResource, Request};
    use crate::sync::ResponseOrdering;

    #[test]
    fn test_predicate_reads_first_term_only() {
        let adapter = GridFilterAdapter::new(archive_field_map());
        let event = FilterChanged::new(vec![ColumnFilterState {
            column: "lastName".into(),
            terms: vec![Some("Ivanov".into()), Some("ignored".into())],
        }]);
        assert_eq!(
            adapter.predicate_for(&event),
            Predicate::new().with("lastName", "Ivanov")
        );
    }

    #[test]
    fn test_predicate_maps_column_keys_to_fields() {
        let adapter = GridFilterAdapter::new(archive_field_map());
        let event = FilterChanged::from_terms([
            ("learningType.name", "3"),
            ("isActive", "true"),
            ("email", ""),
        ]);
        assert_eq!(
            adapter.predicate_for(&event),
            Predicate::new()
                .with("learningType", "3")
                .with("isActive", "true")
        );
    }

    #[test]
    fn test_untracked_columns_are_ignored() {
        let adapter = GridFilterAdapter::new(archive_field_map());
        let event = FilterChanged::from_terms([("curator", "Smith")]);
        assert!(adapter.predicate_for(&event).is_empty());
    }

    #[test]
    fn test_column_without_terms() {
        let adapter = GridFilterAdapter::new(archive_field_map());
        let event = FilterChanged::new(vec![ColumnFilterState {
            column: "phone".into(),
            terms: vec![],
        }]);
        assert!(adapter.predicate_for(&event).is_empty());
    }

    #[tokio::test]
    async fn test_filter_change_issues_load() {
        let resource = MemResource::with_records(vec![
            Student::new("Ivan", "Ivanov", "ivan@example.com"),
            Student::new("Petr", "Petrov", "petr@example.com"),
        ]);
        let sync = ListSynchronizer::new(resource, ResponseOrdering::LatestApplied);
        let adapter = GridFilterAdapter::new(archive_field_map());

        let event = FilterChanged::from_terms([("lastName", "petr")]);
        let outcome = adapter.on_filter_changed(&event, &sync).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Applied { rows: 1 });
        assert_eq!(
            sync.resource().requests(),
            vec![Request::Query(Some(Predicate::new().with("lastName", "petr")))]
        );
    }
}
