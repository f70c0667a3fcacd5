use tracing::{debug, trace};

use crate::domain::{HELP_TEXT, Message, TableError};
use crate::inputter::Inputter;
use crate::model::TableController;
use crate::record::{FormMode, RecordForm};

pub const FORM_FIELDS: [&str; 4] = ["Name", "Location", "Size", "Image URL"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modus {
    TABLE,
    FORM,
    CONFIRM,
    POPUP,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

/// The add/edit dialog. Species is fixed by the table and not editable.
#[derive(Debug, Clone)]
pub struct FormState {
    pub mode: FormMode,
    pub title: String,
    pub species: String,
    pub inputs: [Inputter; 4],
    pub active: usize,
    pub errors: Vec<String>,
}

impl FormState {
    fn from_form(mode: FormMode, title: String, form: &RecordForm) -> Self {
        Self {
            mode,
            title,
            species: form.species.clone(),
            inputs: [
                Inputter::with_value(&form.name),
                Inputter::with_value(&form.location),
                Inputter::with_value(&form.size),
                Inputter::with_value(&form.image),
            ],
            active: 0,
            errors: Vec::new(),
        }
    }

    pub fn to_form(&self) -> RecordForm {
        RecordForm {
            name: self.inputs[0].value().to_string(),
            location: self.inputs[1].value().to_string(),
            size: self.inputs[2].value().to_string(),
            species: self.species.clone(),
            image: self.inputs[3].value().to_string(),
        }
    }
}

/// Holds every table by name and routes messages to the active one.
pub struct App {
    tables: Vec<TableController>,
    active: usize,
    selected: Vec<usize>,
    modus: Modus,
    previous_modus: Modus,
    form: Option<FormState>,
    pending_delete: Option<String>,
    pub status: Status,
    status_message: String,
}

impl App {
    pub fn new(tables: Vec<TableController>) -> Self {
        let selected = vec![0; tables.len()];
        Self {
            tables,
            active: 0,
            selected,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            form: None,
            pending_delete: None,
            status: Status::READY,
            status_message: "Press ? for help".to_string(),
        }
    }

    pub fn tables(&self) -> &[TableController] {
        &self.tables
    }

    pub fn table(&self, table_id: &str) -> Option<&TableController> {
        self.tables.iter().find(|t| t.config().table_id == table_id)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_table(&self) -> Option<&TableController> {
        self.tables.get(self.active)
    }

    /// Selected row on the visible page of the active table.
    pub fn selected_row(&self) -> usize {
        self.selected.get(self.active).copied().unwrap_or(0)
    }

    pub fn modus(&self) -> Modus {
        self.modus
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn help_text(&self) -> &'static str {
        HELP_TEXT
    }

    pub fn update(&mut self, message: Message) {
        trace!("Update: Modus {:?}, Message {:?}", self.modus, message);
        match self.modus {
            Modus::TABLE => match message {
                Message::Quit => self.status = Status::QUITTING,
                Message::Help => self.enter(Modus::POPUP),
                Message::NextTable => self.switch_table(1),
                Message::PrevTable => self.switch_table(-1),
                Message::NextPage => self.page(true),
                Message::PrevPage => self.page(false),
                Message::MoveUp => self.move_selection(-1),
                Message::MoveDown => self.move_selection(1),
                Message::SortColumn(column) => self.sort_column(column),
                Message::Add => self.open_add_form(),
                Message::Edit => self.open_edit_form(),
                Message::Delete => self.ask_delete(),
                _ => (),
            },
            Modus::FORM => match message {
                Message::Help => self.enter(Modus::POPUP),
                Message::RawKey(key) => {
                    if let Some(form) = self.form.as_mut() {
                        form.inputs[form.active].read(key);
                    }
                }
                Message::NextField => self.cycle_field(1),
                Message::PrevField => self.cycle_field(FORM_FIELDS.len() - 1),
                Message::Submit => self.submit_form(),
                Message::Exit => {
                    self.form = None;
                    self.set_status_message("Cancelled");
                    self.exit();
                }
                _ => (),
            },
            Modus::CONFIRM => match message {
                Message::Confirm(true) => self.confirm_delete(),
                Message::Confirm(false) | Message::Exit => {
                    self.pending_delete = None;
                    self.set_status_message("Delete cancelled");
                    self.exit();
                }
                _ => (),
            },
            Modus::POPUP => match message {
                Message::Quit => self.status = Status::QUITTING,
                Message::Exit | Message::Help => self.exit(),
                _ => (),
            },
        }
    }

    fn enter(&mut self, modus: Modus) {
        self.previous_modus = self.modus;
        self.modus = modus;
    }

    /// Back to whatever was showing before the last `enter`.
    fn exit(&mut self) {
        self.modus = std::mem::replace(&mut self.previous_modus, Modus::TABLE);
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn switch_table(&mut self, step: isize) {
        if self.tables.is_empty() {
            return;
        }
        let count = self.tables.len() as isize;
        self.active = (self.active as isize + step).rem_euclid(count) as usize;
        let label = self.tables[self.active].config().display_label();
        self.set_status_message(label);
    }

    fn page(&mut self, forward: bool) {
        let Some(table) = self.tables.get_mut(self.active) else {
            return;
        };
        let moved = if forward {
            table.next_page()
        } else {
            table.prev_page()
        };
        if moved {
            self.selected[self.active] = 0;
        }
    }

    fn move_selection(&mut self, step: isize) {
        let Some(table) = self.tables.get(self.active) else {
            return;
        };
        let rows = table.current_page_slice().len();
        if rows == 0 {
            return;
        }
        let current = self.selected[self.active] as isize;
        self.selected[self.active] = (current + step).clamp(0, rows as isize - 1) as usize;
    }

    fn clamp_selection(&mut self) {
        if let Some(table) = self.tables.get(self.active) {
            let rows = table.current_page_slice().len();
            let selected = &mut self.selected[self.active];
            *selected = std::cmp::min(*selected, rows.saturating_sub(1));
        }
    }

    fn selected_name(&self) -> Option<String> {
        let table = self.tables.get(self.active)?;
        table
            .current_page_slice()
            .get(self.selected_row())
            .map(|r| r.name.clone())
    }

    fn sort_column(&mut self, column: usize) {
        let Some(table) = self.tables.get_mut(self.active) else {
            return;
        };
        let Some(field) = table.config().columns.get(column).cloned() else {
            return;
        };
        if table.sort_by(&field) {
            let direction = table.sort_direction();
            self.selected[self.active] = 0;
            self.set_status_message(format!("Sorted by {field} ({direction:?})"));
        } else {
            self.set_status_message(format!("{} is not sortable", field.label()));
        }
    }

    fn open_add_form(&mut self) {
        let Some(table) = self.tables.get(self.active) else {
            return;
        };
        let config = table.config();
        let form = RecordForm::for_species(&config.species);
        let title = format!("Add {}", config.display_label());
        self.form = Some(FormState::from_form(FormMode::Add, title, &form));
        self.enter(Modus::FORM);
    }

    fn open_edit_form(&mut self) {
        let Some(name) = self.selected_name() else {
            self.set_status_message("Nothing to edit");
            return;
        };
        let Some(record) = self.tables[self.active].find(&name) else {
            return;
        };
        let form = RecordForm::from_record(record);
        let mode = FormMode::Edit {
            original_name: name.clone(),
        };
        self.form = Some(FormState::from_form(mode, format!("Edit {name}"), &form));
        self.enter(Modus::FORM);
    }

    fn cycle_field(&mut self, step: usize) {
        if let Some(form) = self.form.as_mut() {
            form.active = (form.active + step) % FORM_FIELDS.len();
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let Some(table) = self.tables.get_mut(self.active) else {
            return;
        };
        let record_form = form.to_form();
        let adding = form.mode == FormMode::Add;
        match table.submit(&form.mode, &record_form) {
            Ok(()) => {
                debug!("Saved {}", record_form.name.trim());
                // New records land on the last page, after everything else.
                let rows = table.current_page_slice().len();
                self.form = None;
                self.set_status_message(format!("Saved {}", record_form.name.trim()));
                if adding {
                    self.selected[self.active] = rows.saturating_sub(1);
                }
                self.clamp_selection();
                self.exit();
            }
            Err(TableError::Validation(errors)) => form.errors = errors,
            Err(e) => form.errors = vec![e.to_string()],
        }
    }

    fn ask_delete(&mut self) {
        match self.selected_name() {
            Some(name) => {
                self.pending_delete = Some(name);
                self.enter(Modus::CONFIRM);
            }
            None => self.set_status_message("Nothing to delete"),
        }
    }

    fn confirm_delete(&mut self) {
        if let Some(name) = self.pending_delete.take()
            && let Some(table) = self.tables.get_mut(self.active)
        {
            match table.delete(&name) {
                Ok(()) => self.set_status_message(format!("Deleted {name}")),
                Err(e) => self.set_status_message(e.to_string()),
            }
        }
        self.clamp_selection();
        self.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TableConfig;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn app() -> App {
        App::new(
            TableConfig::presets()
                .into_iter()
                .map(TableController::new)
                .collect(),
        )
    }

    fn type_str(app: &mut App, text: &str) {
        for chr in text.chars() {
            app.update(Message::RawKey(KeyEvent::new(KeyCode::Char(chr), KeyModifiers::NONE)));
        }
    }

    fn add(app: &mut App, name: &str, location: &str, size: &str) {
        app.update(Message::Add);
        type_str(app, name);
        app.update(Message::NextField);
        type_str(app, location);
        app.update(Message::NextField);
        type_str(app, size);
        app.update(Message::Submit);
    }

    #[test]
    fn add_through_the_form() {
        let mut app = app();
        add(&mut app, "Leo", "Savanna", "8");
        assert_eq!(app.modus(), Modus::TABLE);
        let table = app.table("bigCatsTable").unwrap();
        assert_eq!(table.records()[0].species, "big cat");
        assert_eq!(table.records()[0].image, "https://via.placeholder.com/100");
        assert!(app.table("dogsTable").unwrap().records().is_empty());
    }

    #[test]
    fn invalid_form_stays_open_with_all_errors() {
        let mut app = app();
        app.update(Message::Add);
        app.update(Message::Submit);
        assert_eq!(app.modus(), Modus::FORM);
        let errors = &app.form().unwrap().errors;
        assert_eq!(errors, &["Name is required", "Location is required", "Size is required"]);
        app.update(Message::Exit);
        assert_eq!(app.modus(), Modus::TABLE);
        assert!(app.form().is_none());
    }

    #[test]
    fn duplicate_name_is_reported_in_form() {
        let mut app = app();
        add(&mut app, "Leo", "Savanna", "8");
        add(&mut app, "leo", "Zoo", "3");
        assert_eq!(app.modus(), Modus::FORM);
        assert_eq!(app.form().unwrap().errors, ["A record named leo already exists"]);
    }

    #[test]
    fn edit_prefills_and_replaces() {
        let mut app = app();
        add(&mut app, "Leo", "Savanna", "8");
        app.update(Message::Edit);
        assert_eq!(app.form().unwrap().title, "Edit Leo");
        app.update(Message::NextField);
        app.update(Message::RawKey(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        type_str(&mut app, "Zoo");
        app.update(Message::Submit);
        let table = app.active_table().unwrap();
        assert_eq!(table.records()[0].location, "Zoo");
        assert_eq!(table.records().len(), 1);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app();
        add(&mut app, "Leo", "Savanna", "8");
        app.update(Message::Delete);
        assert_eq!(app.pending_delete(), Some("Leo"));
        app.update(Message::Confirm(false));
        assert_eq!(app.active_table().unwrap().records().len(), 1);
        app.update(Message::Delete);
        app.update(Message::Confirm(true));
        assert!(app.active_table().unwrap().records().is_empty());
        assert_eq!(app.status_message(), "Deleted Leo");
    }

    #[test]
    fn tables_are_switched_explicitly() {
        let mut app = app();
        app.update(Message::PrevTable);
        assert_eq!(app.active_table().unwrap().config().table_id, "bigFishTable");
        app.update(Message::NextTable);
        assert_eq!(app.active_index(), 0);
    }

    #[test]
    fn added_record_is_selected_on_the_last_page() {
        let mut app = app();
        for (name, size) in [("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "5")] {
            add(&mut app, name, "x", size);
        }
        app.update(Message::PrevPage);
        app.update(Message::MoveDown);
        app.update(Message::MoveDown);
        assert_eq!(app.selected_row(), 2);

        add(&mut app, "Leo", "Savanna", "8");
        let table = app.active_table().unwrap();
        assert_eq!(table.current_page(), 2);
        let selected = &table.current_page_slice()[app.selected_row()];
        assert_eq!(selected.name, "Leo");
    }

    #[test]
    fn help_from_the_form_returns_to_the_form() {
        let mut app = app();
        app.update(Message::Add);
        type_str(&mut app, "Le");
        app.update(Message::Help);
        assert_eq!(app.modus(), Modus::POPUP);
        app.update(Message::Exit);
        assert_eq!(app.modus(), Modus::FORM);
        assert_eq!(app.form().unwrap().inputs[0].value(), "Le");
        app.update(Message::Exit);
        assert_eq!(app.modus(), Modus::TABLE);
    }

    #[test]
    fn sorting_unsortable_column_reports_it() {
        let mut app = app();
        add(&mut app, "Leo", "Savanna", "8");
        app.update(Message::SortColumn(1));
        assert_eq!(app.status_message(), "Species is not sortable");
        app.update(Message::SortColumn(2));
        assert_eq!(app.status_message(), "Sorted by size (Ascending)");
    }
}
