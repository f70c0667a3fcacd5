//! Sortable, paginated, in-memory CRUD tables for categorised animal records.
//!
//! A [`model::TableController`] owns one category: it loads the matching
//! entries from a [`source::DataSource`] once, then applies add, edit,
//! delete, sort and paging operations and re-derives a
//! [`view::TableView`] after each of them. The terminal front end in the
//! binary is just one consumer of that description.

pub mod app;
pub mod controller;
pub mod domain;
pub mod inputter;
pub mod model;
pub mod record;
pub mod source;
pub mod ui;
pub mod view;

pub use domain::{Field, LabelStyle, SortDirection, TableConfig, TableError};
pub use model::TableController;
pub use record::{FormMode, Record, RecordForm, make_record};
pub use source::{DataSource, JsonDirSource, StaticSource};
pub use view::TableView;
