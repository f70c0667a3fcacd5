use std::cell::RefCell;
use std::cmp::Ordering;

use feruca::Collator;
use tracing::{debug, info, instrument, trace, warn};
use tracing_error::SpanTrace;

use crate::domain::{Field, SortDirection, TableConfig, TableError};
use crate::record::{FormMode, Record, RecordForm, make_record};
use crate::source::{DataSource, SourceEntry};
use crate::view::{self, TableView};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    LOADING,
    READY,
}

/// Owns the records of one category together with its paging and sorting
/// state. Every mutation re-derives the view, so `view()` always describes
/// the current state.
#[derive(Debug)]
pub struct TableController {
    config: TableConfig,
    records: Vec<Record>,
    current_page: usize,
    sort_field: Option<Field>,
    sort_direction: SortDirection,
    status: Status,
    view: TableView,
    revision: u64,
}

impl TableController {
    pub fn new(config: TableConfig) -> Self {
        let mut table = Self {
            config,
            records: Vec::new(),
            current_page: 1,
            sort_field: None,
            sort_direction: SortDirection::Ascending,
            status: Status::LOADING,
            view: TableView::default(),
            revision: 0,
        };
        table.refresh_view();
        table
    }

    /// Creates the table and fetches its initial records.
    pub async fn load(config: TableConfig, source: &dyn DataSource) -> Self {
        let mut table = Self::new(config);
        table.load_initial(source).await;
        table
    }

    /// Fetches this table's category and keeps the entries of its species.
    /// A failing source leaves the table empty but usable.
    #[instrument(skip_all, fields(table = %self.config.table_id))]
    pub async fn load_initial(&mut self, source: &dyn DataSource) {
        self.records = match source.fetch(&self.config.category).await {
            Ok(entries) => self.records_from(entries),
            Err(e) => {
                warn!(
                    "Loading {} failed, starting empty: {e}\n{}",
                    self.config.category,
                    SpanTrace::capture()
                );
                Vec::new()
            }
        };
        info!("Loaded {} records for {}", self.records.len(), self.config.category);
        self.status = Status::READY;
        self.current_page = 1;
        self.refresh_view();
    }

    fn records_from(&self, entries: Vec<SourceEntry>) -> Vec<Record> {
        let mut records: Vec<Record> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.species_matches(&self.config.species) {
                continue;
            }
            let Some(fields) = entry.into_fields() else {
                continue;
            };
            if records.iter().any(|r| r.same_name(&fields.name)) {
                debug!("Dropping duplicate entry {}", fields.name);
                continue;
            }
            records.push(make_record(fields, &self.config.default_image));
        }
        records
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size.max(1)
    }

    pub fn total_pages(&self) -> usize {
        self.records.len().div_ceil(self.page_size()).max(1)
    }

    pub fn sort_field(&self) -> Option<&Field> {
        self.sort_field.as_ref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// The last derived view.
    pub fn view(&self) -> &TableView {
        &self.view
    }

    /// Bumped every time the view is re-derived.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn find(&self, name: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn current_page_slice(&self) -> &[Record] {
        let start = (self.current_page - 1) * self.page_size();
        let end = std::cmp::min(start + self.page_size(), self.records.len());
        self.records.get(start..end).unwrap_or(&[])
    }

    /// Derives the render description from the current state.
    pub fn derive_view(&self) -> TableView {
        view::derive(self)
    }

    #[instrument(skip_all, fields(table = %self.config.table_id, name = %record.name))]
    pub fn add(&mut self, record: Record) -> Result<(), TableError> {
        if self.records.iter().any(|r| r.same_name(&record.name)) {
            debug!("Rejected duplicate name");
            return Err(TableError::Conflict { name: record.name });
        }
        self.records.push(record);
        self.current_page = self.total_pages();
        debug!("Added, now {} records", self.records.len());
        self.refresh_view();
        Ok(())
    }

    /// Replaces the record called `old_name` in place. The new name must not
    /// collide with any other record.
    #[instrument(skip_all, fields(table = %self.config.table_id, name = %old_name))]
    pub fn edit(&mut self, old_name: &str, updated: Record) -> Result<(), TableError> {
        let Some(index) = self.records.iter().position(|r| r.name == old_name) else {
            return Err(TableError::NotFound {
                name: old_name.to_string(),
            });
        };
        let collides = self
            .records
            .iter()
            .enumerate()
            .any(|(idx, r)| idx != index && r.same_name(&updated.name));
        if collides {
            return Err(TableError::Conflict { name: updated.name });
        }
        debug!("Replaced with {}", updated.name);
        self.records[index] = updated;
        self.refresh_view();
        Ok(())
    }

    #[instrument(skip_all, fields(table = %self.config.table_id, name = %name))]
    pub fn delete(&mut self, name: &str) -> Result<(), TableError> {
        let before = self.records.len();
        self.records.retain(|r| r.name != name);
        if self.records.len() == before {
            return Err(TableError::NotFound {
                name: name.to_string(),
            });
        }
        self.clamp_page();
        debug!("Deleted, {} records left", self.records.len());
        self.refresh_view();
        Ok(())
    }

    /// Validates a submitted form and applies it as an add or an edit.
    /// Nothing changes when validation fails.
    pub fn submit(&mut self, mode: &FormMode, form: &RecordForm) -> Result<(), TableError> {
        let mut fields = form.validate()?;
        match mode {
            FormMode::Add => self.add(make_record(fields, &self.config.default_image)),
            FormMode::Edit { original_name } => {
                let Some(existing) = self.find(original_name) else {
                    return Err(TableError::NotFound {
                        name: original_name.clone(),
                    });
                };
                fields.extras = existing.extras.clone();
                let record = make_record(fields, &self.config.default_image);
                self.edit(original_name, record)
            }
        }
    }

    /// Sorts by `field`, flipping the direction when it is already the
    /// active sort. Returns false for fields that are not sortable.
    pub fn sort_by(&mut self, field: &Field) -> bool {
        if !self.config.is_sortable(field) {
            trace!("Ignoring sort on {field}");
            return false;
        }
        if self.sort_field.as_ref() == Some(field) {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_field = Some(field.clone());
            self.sort_direction = SortDirection::Ascending;
        }

        let direction = self.sort_direction;
        self.records.sort_by(|a, b| {
            let ordering = compare_records(a, b, field);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        trace!("Sorted {} by {field} {:?}", self.config.table_id, direction);

        self.current_page = 1;
        self.refresh_view();
        true
    }

    /// Moves to `page`. Out of range pages are ignored and return false.
    pub fn set_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        self.refresh_view();
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.current_page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.current_page.saturating_sub(1))
    }

    fn clamp_page(&mut self) {
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }

    fn refresh_view(&mut self) {
        self.clamp_page();
        self.view = self.derive_view();
        self.revision += 1;
        trace!(
            "View {} rev {}: page {}/{}, {} records",
            self.config.table_id,
            self.revision,
            self.current_page,
            self.total_pages(),
            self.records.len()
        );
    }
}

fn compare_records(a: &Record, b: &Record, field: &Field) -> Ordering {
    if field.is_numeric() {
        return a.size.cmp(&b.size);
    }
    let a_val = a.value(field).unwrap_or_default();
    let b_val = b.value(field).unwrap_or_default();
    match (a_val.parse::<f64>(), b_val.parse::<f64>()) {
        (Ok(a_num), Ok(b_num)) if matches!(field, Field::Extra(_)) => {
            a_num.partial_cmp(&b_num).unwrap_or(Ordering::Equal)
        }
        _ => locale_cmp(&a_val, &b_val),
    }
}

thread_local! {
    static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

/// Root-locale collation, so accents and case are secondary to the base
/// letters. Lower case sorts first among otherwise equal strings.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with(|collator| collator.borrow_mut().collate(a, b))
        .then_with(|| b.cmp(a))
}
