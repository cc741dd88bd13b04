//! # Student Views
//!
//! The three student screens, each an instance of the same pattern:
//!
//! | View | Grid | Refresh | Extra |
//! |------|------|---------|-------|
//! | [`StudentListView`] | plain list, no filters | reload everything, clear the edit buffer | save / delete |
//! | [`StudentArchiveView`] | archive, backend-filtered | reload with the active predicate | learning-type options |
//! | [`StudentDetailView`] | none | n/a | follows update broadcasts |
//!
//! Views never render. They own the view-model (grid options, rows, edit buffer) and expose the
//! operations a renderer wires its buttons and events to.

use crate::bus::{ChannelRegistry, EntityChannel};
use crate::detail::{DetailBinder, UpdateMatch};
use crate::error::{EduError, Result};
use crate::filter::{FilterChanged, GridFilterAdapter};
use crate::grid::{
    archive_field_map, student_archive_grid, student_list_grid, GridOptions, LEARNING_TYPE_COLUMN,
};
use crate::locale::Localization;
use crate::model::{EntityId, LearningType, OptionList, Student};
use crate::resource::Resource;
use crate::sync::{ListSynchronizer, LoadOutcome, ResponseOrdering};
use std::cell::{Ref, RefCell};
use tracing::{info, warn};

pub struct StudentListView<C> {
    grid: GridOptions,
    list: ListSynchronizer<Student, C>,
    channel: EntityChannel<Student>,
    student: RefCell<Student>,
}

impl<C: Resource<Student>> StudentListView<C> {
    pub fn new(resource: C, registry: &ChannelRegistry, ordering: ResponseOrdering) -> Self {
        Self {
            grid: student_list_grid(registry.app()),
            list: ListSynchronizer::new(resource, ordering),
            channel: registry.channel(),
            student: RefCell::new(Student::default()),
        }
    }

    /// Aligns the grid with the user's language and loads every student.
    pub async fn init<L: Localization + ?Sized>(&mut self, locale: &L) -> Result<LoadOutcome> {
        self.grid.set_language(locale.current_language());
        self.list.load_all(None).await
    }

    pub fn grid(&self) -> &GridOptions {
        &self.grid
    }

    pub fn list(&self) -> &ListSynchronizer<Student, C> {
        &self.list
    }

    pub fn rows(&self) -> Ref<'_, [Student]> {
        self.list.rows()
    }

    /// Reloads all students and resets the edit buffer.
    pub async fn refresh(&self) -> Result<LoadOutcome> {
        let outcome = self.list.reload_all().await;
        self.clear();
        outcome
    }

    /// Resets the edit buffer to the blank student. The rows are not touched.
    pub fn clear(&self) {
        *self.student.borrow_mut() = Student::default();
    }

    pub fn edit(&self, record: Student) {
        *self.student.borrow_mut() = record;
    }

    pub fn edit_buffer(&self) -> Student {
        self.student.borrow().clone()
    }

    /// Sends the edit buffer to the backend, broadcasts the saved record, then refreshes.
    ///
    /// Only a failed update is an error. Once the record is saved a failed reload is logged and
    /// the saved record is still returned; the rows then keep their previous contents.
    pub async fn save(&self) -> Result<Student> {
        let draft = self.edit_buffer();
        let saved = self.list.resource().update(&draft).await?;
        let listeners = self.channel.publish(&saved);
        info!(id = ?saved.id, listeners, "student saved");
        if let Err(err) = self.refresh().await {
            warn!(id = ?saved.id, error = %err, "student saved but list reload failed");
        }
        Ok(saved)
    }

    pub async fn delete(&self, id: EntityId) -> Result<LoadOutcome> {
        self.list.resource().delete(id).await?;
        info!(id, "student deleted");
        self.list.reload_all().await
    }
}

pub struct StudentArchiveView<C, L> {
    grid: GridOptions,
    list: ListSynchronizer<Student, C>,
    learning_types: L,
    options: OptionList,
    adapter: GridFilterAdapter,
}

impl<C, L> StudentArchiveView<C, L>
where
    C: Resource<Student>,
    L: Resource<LearningType>,
{
    pub fn new(students: C, learning_types: L, app: &str, ordering: ResponseOrdering) -> Self {
        Self {
            grid: student_archive_grid(app, OptionList::new()),
            list: ListSynchronizer::new(students, ordering),
            learning_types,
            options: OptionList::new(),
            adapter: GridFilterAdapter::new(archive_field_map()),
        }
    }

    /// Loads the learning-type options and every student.
    ///
    /// Both loads are attempted; the first failure is returned.
    pub async fn init<Lc: Localization + ?Sized>(&mut self, locale: &Lc) -> Result<LoadOutcome> {
        self.grid.set_language(locale.current_language());
        let options = self.load_learning_types().await;
        let outcome = self.list.load_all(None).await;
        options?;
        outcome
    }

    /// Rebuilds the learning-type select options from the backend.
    pub async fn load_learning_types(&mut self) -> Result<usize> {
        let types = match self.learning_types.query(None).await {
            Ok(types) => types,
            Err(err) => {
                warn!(error = %err, "learning types unavailable, keeping options");
                return Err(err);
            }
        };
        self.options = OptionList::from_learning_types(&types);
        if !self
            .grid
            .set_select_options(LEARNING_TYPE_COLUMN, self.options.clone())
        {
            return Err(EduError::Config(format!(
                "archive grid has no {LEARNING_TYPE_COLUMN} column"
            )));
        }
        Ok(self.options.len())
    }

    pub async fn on_filter_changed(&self, event: &FilterChanged) -> Result<LoadOutcome> {
        self.adapter.on_filter_changed(event, &self.list).await
    }

    /// Reloads with the filter currently applied.
    pub async fn refresh(&self) -> Result<LoadOutcome> {
        self.list.reload_active().await
    }

    pub fn grid(&self) -> &GridOptions {
        &self.grid
    }

    pub fn list(&self) -> &ListSynchronizer<Student, C> {
        &self.list
    }

    pub fn rows(&self) -> Ref<'_, [Student]> {
        self.list.rows()
    }

    pub fn options(&self) -> &OptionList {
        &self.options
    }

    pub fn adapter(&self) -> &GridFilterAdapter {
        &self.adapter
    }
}

pub struct StudentDetailView<C> {
    binder: DetailBinder<Student, C>,
}

impl<C: Resource<Student>> StudentDetailView<C> {
    pub fn new(resource: C, registry: &ChannelRegistry, policy: UpdateMatch) -> Self {
        Self {
            binder: DetailBinder::new(resource, &registry.channel(), policy),
        }
    }

    pub fn with_student(self, student: Student) -> Self {
        Self {
            binder: self.binder.with_record(student),
        }
    }

    pub async fn load(&self, id: EntityId) -> Result<()> {
        self.binder.load(id).await
    }

    pub fn student(&self) -> Option<Student> {
        self.binder.current()
    }

    pub fn binder(&self) -> &DetailBinder<Student, C> {
        &self.binder
    }

    pub fn teardown(&mut self) {
        self.binder.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::StaticLocale;
    use crate::model::RelationRef;
    use crate::predicate::Predicate;
    use crate::resource::memory::{MemResource, Request};
    use async_trait::async_trait;
    use std::rc::Rc;

    fn students() -> MemResource<Student> {
        let mut evening = Student::new("Olga", "Sidorova", "olga@example.com");
        evening.learning_type = Some(RelationRef {
            id: Some(2),
            name: Some("Evening".into()),
            ..Default::default()
        });
        MemResource::with_records(vec![
            Student::new("Ivan", "Ivanov", "ivan@example.com"),
            evening,
        ])
    }

    fn learning_types() -> MemResource<LearningType> {
        MemResource::with_records(vec![
            LearningType {
                id: None,
                name: "Day".into(),
            },
            LearningType {
                id: None,
                name: "Evening".into(),
            },
        ])
    }

    #[tokio::test]
    async fn test_list_init_sets_language_and_loads() {
        let registry = ChannelRegistry::new("jeducenterApp");
        let mut view = StudentListView::new(students(), &registry, ResponseOrdering::default());
        let outcome = view.init(&StaticLocale::new("ru")).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Applied { rows: 2 });
        assert_eq!(view.grid().language.as_deref(), Some("ru"));
    }

    #[tokio::test]
    async fn test_list_refresh_clears_edit_buffer() {
        let registry = ChannelRegistry::new("app");
        let view = StudentListView::new(students(), &registry, ResponseOrdering::default());
        view.edit(Student::new("Draft", "Student", "d@example.com"));

        view.refresh().await.unwrap();
        assert_eq!(view.edit_buffer(), Student::default());
        assert_eq!(view.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_list_clear_leaves_rows() {
        let registry = ChannelRegistry::new("app");
        let view = StudentListView::new(students(), &registry, ResponseOrdering::default());
        view.list().load_all(None).await.unwrap();
        view.edit(Student::new("Draft", "Student", "d@example.com"));
        view.clear();
        assert_eq!(view.rows().len(), 2);
        assert_eq!(view.list().revision(), 1);
    }

    #[tokio::test]
    async fn test_list_save_broadcasts_to_detail_view() {
        let registry = ChannelRegistry::new("app");
        let list = StudentListView::new(students(), &registry, ResponseOrdering::default());
        let detail = StudentDetailView::new(students(), &registry, UpdateMatch::Any);
        detail.load(1).await.unwrap();

        let mut edited = detail.student().unwrap();
        edited.phone = Some("+7 900 000".into());
        list.edit(edited);
        let saved = list.save().await.unwrap();

        assert_eq!(saved.id, Some(1));
        assert_eq!(detail.student().unwrap().phone.as_deref(), Some("+7 900 000"));
        assert_eq!(list.edit_buffer(), Student::default());
    }

    #[tokio::test]
    async fn test_list_save_failure_keeps_buffer() {
        let registry = ChannelRegistry::new("app");
        let view = StudentListView::new(students(), &registry, ResponseOrdering::default());
        let draft = Student::new("Anna", "Smirnova", "anna@example.com");
        view.edit(draft.clone());
        view.list().resource().set_simulate_error(true);

        assert!(view.save().await.is_err());
        assert_eq!(view.edit_buffer(), draft);
    }

    /// Saves succeed, list queries fail.
    struct QueryDown(MemResource<Student>);

    #[async_trait(?Send)]
    impl Resource<Student> for QueryDown {
        async fn query(&self, _predicate: Option<&Predicate>) -> Result<Vec<Student>> {
            Err(EduError::Store("list unavailable".into()))
        }

        async fn get(&self, id: EntityId) -> Result<Student> {
            self.0.get(id).await
        }

        async fn update(&self, record: &Student) -> Result<Student> {
            self.0.update(record).await
        }

        async fn delete(&self, id: EntityId) -> Result<()> {
            self.0.delete(id).await
        }
    }

    #[tokio::test]
    async fn test_list_save_returns_record_when_reload_fails() {
        let registry = ChannelRegistry::new("app");
        let view = StudentListView::new(
            QueryDown(MemResource::new()),
            &registry,
            ResponseOrdering::default(),
        );
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        let _sub = registry
            .channel::<Student>()
            .subscribe(move |s: &Student| sink.borrow_mut().push(s.id));

        view.edit(Student::new("Anna", "Smirnova", "anna@example.com"));
        let saved = view.save().await.unwrap();

        assert_eq!(saved.id, Some(1));
        assert_eq!(view.list().resource().0.len(), 1);
        assert_eq!(*received.borrow(), vec![Some(1)]);
        assert_eq!(view.edit_buffer(), Student::default());
    }

    #[tokio::test]
    async fn test_list_delete_reloads() {
        let registry = ChannelRegistry::new("app");
        let view = StudentListView::new(students(), &registry, ResponseOrdering::default());
        let outcome = view.delete(1).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Applied { rows: 1 });
    }

    #[tokio::test]
    async fn test_archive_init_builds_options() {
        let mut view = StudentArchiveView::new(
            students(),
            learning_types(),
            "app",
            ResponseOrdering::default(),
        );
        view.init(&StaticLocale::default()).await.unwrap();

        assert_eq!(view.options().len(), 2);
        assert_eq!(view.options().label_for("2"), Some("Evening"));
        assert_eq!(view.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_archive_options_rebuilt_not_appended() {
        let mut view = StudentArchiveView::new(
            students(),
            learning_types(),
            "app",
            ResponseOrdering::default(),
        );
        view.load_learning_types().await.unwrap();
        view.load_learning_types().await.unwrap();
        assert_eq!(view.options().len(), 2);
    }

    #[tokio::test]
    async fn test_archive_init_loads_students_when_options_fail() {
        let types = learning_types();
        types.set_simulate_error(true);
        let mut view =
            StudentArchiveView::new(students(), types, "app", ResponseOrdering::default());

        assert!(view.init(&StaticLocale::default()).await.is_err());
        assert_eq!(view.rows().len(), 2);
        assert!(view.options().is_empty());
    }

    #[tokio::test]
    async fn test_archive_filter_then_refresh_keeps_predicate() {
        let view = StudentArchiveView::new(
            students(),
            learning_types(),
            "app",
            ResponseOrdering::default(),
        );
        let event = FilterChanged::from_terms([("learningType.name", "2")]);
        view.on_filter_changed(&event).await.unwrap();
        assert_eq!(view.rows().len(), 1);

        view.refresh().await.unwrap();
        let expected = Predicate::new().with("learningType", "2");
        assert_eq!(
            view.list().resource().requests(),
            vec![
                Request::Query(Some(expected.clone())),
                Request::Query(Some(expected))
            ]
        );
    }

    #[tokio::test]
    async fn test_detail_teardown() {
        let registry = ChannelRegistry::new("app");
        let mut detail = StudentDetailView::new(students(), &registry, UpdateMatch::Any)
            .with_student(Student::new("Ivan", "Ivanov", "ivan@example.com"));
        detail.teardown();
        registry
            .channel::<Student>()
            .publish(&Student::new("Other", "Person", "o@example.com"));
        assert_eq!(detail.student().unwrap().first_name.as_deref(), Some("Ivan"));
    }
}
