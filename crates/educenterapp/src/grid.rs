//! # Grid View-Model
//!
//! The grid renderer is not part of this crate. What lives here is the data it consumes:
//!
//! - [`GridOptions`]: ordered column descriptors plus grid-level switches (menu, resizing,
//!   external filtering, display language).
//! - [`GridState`]: the bound rows. It has exactly one mutating entry point,
//!   [`GridState::replace`], owned by the list synchronizer. Renderers get `&[R]`.
//!
//! ## Column Keys
//!
//! Each column has a key: its field path for data columns (`lastName`, `learningType.name`) or
//! its name for template-only columns (`groupOfStudent`, the action-button column). Filter
//! events and [`crate::predicate::FieldMap`] refer to columns by that key.
//!
//! ## Student Grids
//!
//! [`student_list_grid`] and [`student_archive_grid`] declare the two student tables. The archive
//! grid filters externally: every filter edit goes to the backend through
//! [`archive_field_map`].

use crate::model::{OptionList, SelectOption};
use crate::predicate::FieldMap;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "options")]
pub enum ColumnFilter {
    Text,
    Select(OptionList),
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub key: String,
    pub field: Option<String>,
    pub label_key: Option<String>,
    pub width_pct: u8,
    pub visible: bool,
    pub kind: ColumnKind,
    pub filter: ColumnFilter,
    pub sortable: bool,
    pub cell_template: Option<String>,
}

impl ColumnDef {
    /// A data column bound to a (possibly dotted) field path.
    pub fn field(path: &str) -> Self {
        Self {
            key: path.to_string(),
            field: Some(path.to_string()),
            ..Self::named(path)
        }
    }

    /// A column with no field binding, rendered through a cell template.
    pub fn named(name: &str) -> Self {
        Self {
            key: name.to_string(),
            field: None,
            label_key: None,
            width_pct: 10,
            visible: true,
            kind: ColumnKind::Text,
            filter: ColumnFilter::Text,
            sortable: true,
            cell_template: None,
        }
    }

    pub fn label(mut self, key: impl Into<String>) -> Self {
        self.label_key = Some(key.into());
        self
    }

    pub fn width(mut self, pct: u8) -> Self {
        self.width_pct = pct;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn boolean(mut self) -> Self {
        self.kind = ColumnKind::Boolean;
        self
    }

    pub fn select(mut self, options: OptionList) -> Self {
        self.filter = ColumnFilter::Select(options);
        self
    }

    pub fn no_filter(mut self) -> Self {
        self.filter = ColumnFilter::Disabled;
        self
    }

    pub fn no_sort(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.cell_template = Some(template.into());
        self
    }

    pub fn is_filterable(&self) -> bool {
        !matches!(self.filter, ColumnFilter::Disabled)
    }

    /// Reads this column's value out of a serialized record.
    pub fn value_of<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.field.as_deref().and_then(|path| lookup_path(record, path))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    pub columns: Vec<ColumnDef>,
    pub enable_grid_menu: bool,
    pub enable_column_resizing: bool,
    pub enable_filtering: bool,
    pub external_filtering: bool,
    pub language: Option<String>,
}

impl GridOptions {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self {
            columns,
            enable_grid_menu: true,
            enable_column_resizing: true,
            enable_filtering: false,
            external_filtering: false,
            language: None,
        }
    }

    /// Column filters are shown and their edits are resolved by the backend.
    pub fn with_external_filtering(mut self) -> Self {
        self.enable_filtering = true;
        self.external_filtering = true;
        self
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.visible)
    }

    pub fn filterable_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns
            .iter()
            .filter(move |c| self.enable_filtering && c.is_filterable())
    }

    /// Swaps the select options of `key`'s filter wholesale. Returns false if no such column.
    pub fn set_select_options(&mut self, key: &str, options: OptionList) -> bool {
        match self.columns.iter_mut().find(|c| c.key == key) {
            Some(column) => {
                column.filter = ColumnFilter::Select(options);
                true
            }
            None => false,
        }
    }

    pub fn set_language(&mut self, code: impl Into<String>) {
        self.language = Some(code.into());
    }
}

#[derive(Debug, Clone)]
pub struct GridState<R> {
    rows: Vec<R>,
    revision: u64,
}

impl<R> Default for GridState<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            revision: 0,
        }
    }
}

impl<R> GridState<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the bound rows in full.
    pub fn replace(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.revision += 1;
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Number of replacements so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Resolves a dotted path (`learningType.name`) inside a JSON value.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}

fn student_label(app: &str, field: &str) -> String {
    format!("{app}.student.{field}")
}

pub const GROUP_CELL_TEMPLATE: &str = "student.group.cell";
pub const CURATOR_CELL_TEMPLATE: &str = "student.curator.cell";
pub const LIST_BUTTONS_TEMPLATE: &str = "student.buttons";
pub const ARCHIVE_BUTTONS_TEMPLATE: &str = "student.archive.buttons";

/// Column key of the learning-type select filter in the archive grid.
pub const LEARNING_TYPE_COLUMN: &str = "learningType.name";

pub fn student_list_grid(app: &str) -> GridOptions {
    let l = |field: &str| student_label(app, field);
    GridOptions::new(vec![
        ColumnDef::field("firstName").label(l("firstName")).width(10),
        ColumnDef::field("middleName").label(l("middleName")).width(12),
        ColumnDef::field("lastName").label(l("lastName")).width(12),
        ColumnDef::field("type").label(l("type")).width(8),
        ColumnDef::field("email").label(l("email")).width(14),
        ColumnDef::field("phone").label(l("phone")).width(11),
        ColumnDef::field("university").label(l("university")).width(10),
        ColumnDef::field("specialty").label(l("specialty")).width(12).hidden(),
        ColumnDef::field("course").label(l("course")).width(4).hidden(),
        ColumnDef::field("isActive").label(l("isActive")).width(8).boolean(),
        ColumnDef::named("groupOfStudent")
            .label(l("groupOfStudent"))
            .width(8)
            .hidden()
            .template(GROUP_CELL_TEMPLATE),
        ColumnDef::named(" ").width(10).template(LIST_BUTTONS_TEMPLATE),
    ])
}

pub fn student_archive_grid(app: &str, learning_types: OptionList) -> GridOptions {
    let l = |field: &str| student_label(app, field);
    let universities = OptionList::from_options(["СГУ", "СГТУ"].map(SelectOption::same));
    let active = OptionList::from_options(["true", "false"].map(SelectOption::same));

    GridOptions::new(vec![
        ColumnDef::field("lastName").label(l("lastName")).width(12),
        ColumnDef::field("firstName").label(l("firstName")).width(10),
        ColumnDef::field("middleName").label(l("middleName")).width(12),
        ColumnDef::field(LEARNING_TYPE_COLUMN)
            .label(l("type"))
            .width(6)
            .select(learning_types),
        ColumnDef::field("email").label(l("email")).width(14),
        ColumnDef::field("phone").label(l("phone")).width(11),
        ColumnDef::field("university")
            .label(l("university"))
            .width(10)
            .select(universities),
        ColumnDef::field("specialty").label(l("specialty")).width(12).hidden(),
        ColumnDef::field("faculty").label(l("faculty")).width(12).hidden(),
        ColumnDef::field("course").label(l("course")).width(4).hidden(),
        ColumnDef::field("isActive")
            .label(l("isActive"))
            .width(8)
            .boolean()
            .hidden()
            .select(active),
        ColumnDef::named("groupOfStudent")
            .label(l("groupOfStudent"))
            .width(8)
            .hidden()
            .no_filter()
            .template(GROUP_CELL_TEMPLATE),
        ColumnDef::named("curator")
            .label(l("curator"))
            .width(8)
            .hidden()
            .no_filter()
            .template(CURATOR_CELL_TEMPLATE),
        ColumnDef::named(" ")
            .width(14)
            .no_sort()
            .no_filter()
            .template(ARCHIVE_BUTTONS_TEMPLATE),
    ])
    .with_external_filtering()
}

/// Filter bindings of the archive grid, in column order.
pub fn archive_field_map() -> FieldMap {
    FieldMap::new()
        .same("lastName")
        .same("firstName")
        .same("middleName")
        .bind(LEARNING_TYPE_COLUMN, "learningType")
        .same("email")
        .same("phone")
        .same("university")
        .same("specialty")
        .same("faculty")
        .same("course")
        .same("isActive")
}
