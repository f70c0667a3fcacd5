//! Presentation agnostic description of a table.
//!
//! [`derive`] is a pure function of the controller state; render targets
//! (the terminal UI, `--dump` JSON output, tests) only ever read these types.

use serde::Serialize;

use crate::domain::{Field, LabelStyle, SortDirection};
use crate::model::TableController;
use crate::record::Record;

pub const IMAGE_HEADER: &str = "Image";
pub const ACTIONS_HEADER: &str = "Actions";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableView {
    Empty(EmptyState),
    Table(TableBody),
}

impl Default for TableView {
    fn default() -> Self {
        TableView::Empty(EmptyState {
            table_id: String::new(),
            message: String::new(),
            add_label: String::new(),
        })
    }
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        matches!(self, TableView::Empty(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyState {
    pub table_id: String,
    pub message: String,
    pub add_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableBody {
    pub table_id: String,
    pub add_label: String,
    pub headers: Vec<HeaderCell>,
    /// Headings of the image and actions columns that follow `headers`.
    pub fixed_headers: Vec<String>,
    pub rows: Vec<RowView>,
    pub pagination: PaginationView,
    pub range: EntryRange,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortIndicator {
    /// Sortable, but not the active sort.
    Inactive,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderCell {
    pub field: Field,
    pub label: String,
    pub sortable: bool,
    pub indicator: Option<SortIndicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellView {
    pub text: String,
    pub style: LabelStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    /// Record name, the key edit and delete act on.
    pub key: String,
    pub cells: Vec<CellView>,
    pub image: String,
    pub image_alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLink {
    pub number: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationView {
    pub current: usize,
    pub total: usize,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub pages: Vec<PageLink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryRange {
    pub first: usize,
    pub last: usize,
    pub total: usize,
}

pub fn derive(table: &TableController) -> TableView {
    let config = table.config();
    let label = config.display_label();
    let add_label = format!("+ Add {label}");

    if table.records().is_empty() {
        return TableView::Empty(EmptyState {
            table_id: config.table_id.clone(),
            message: format!("No {label} found."),
            add_label,
        });
    }

    let headers = config
        .columns
        .iter()
        .map(|field| header_cell(table, field))
        .collect();

    let slice = table.current_page_slice();
    let rows = slice
        .iter()
        .map(|record| RowView {
            key: record.name.clone(),
            cells: config
                .columns
                .iter()
                .map(|field| format_cell(record, field, config.label_style, &config.size_unit))
                .collect(),
            image: record.image.clone(),
            image_alt: record.name.clone(),
        })
        .collect();

    let total = table.records().len();
    let first = (table.current_page() - 1) * table.page_size() + 1;
    let last = std::cmp::min(first + slice.len() - 1, total);

    TableView::Table(TableBody {
        table_id: config.table_id.clone(),
        add_label,
        headers,
        fixed_headers: vec![IMAGE_HEADER.to_string(), ACTIONS_HEADER.to_string()],
        rows,
        pagination: pagination(table.current_page(), table.total_pages()),
        range: EntryRange { first, last, total },
        summary: format!("Showing {first} to {last} of {total} entries"),
    })
}

fn header_cell(table: &TableController, field: &Field) -> HeaderCell {
    let sortable = table.config().is_sortable(field);
    let indicator = sortable.then(|| match (table.sort_field(), table.sort_direction()) {
        (Some(active), SortDirection::Ascending) if active == field => SortIndicator::Ascending,
        (Some(active), SortDirection::Descending) if active == field => SortIndicator::Descending,
        _ => SortIndicator::Inactive,
    });
    HeaderCell {
        field: field.clone(),
        label: field.label(),
        sortable,
        indicator,
    }
}

fn format_cell(record: &Record, field: &Field, label_style: LabelStyle, size_unit: &str) -> CellView {
    match field {
        Field::Name => CellView {
            text: record.name.clone(),
            style: label_style,
        },
        Field::Size => CellView {
            text: record
                .size
                .map(|size| format!("{size} {size_unit}"))
                .unwrap_or_default(),
            style: LabelStyle::Plain,
        },
        other => CellView {
            text: record.value(other).unwrap_or_default(),
            style: LabelStyle::Plain,
        },
    }
}

fn pagination(current: usize, total: usize) -> PaginationView {
    PaginationView {
        current,
        total,
        prev_enabled: current > 1,
        next_enabled: current < total,
        pages: (1..=total)
            .map(|number| PageLink {
                number,
                active: number == current,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TableConfig;
    use crate::record::{RecordFields, make_record};

    fn cat(name: &str, size: Option<u32>) -> Record {
        make_record(
            RecordFields {
                name: name.into(),
                location: "Savanna".into(),
                size,
                species: "big cat".into(),
                ..RecordFields::default()
            },
            "https://via.placeholder.com/100",
        )
    }

    fn body(view: &TableView) -> &TableBody {
        match view {
            TableView::Table(body) => body,
            TableView::Empty(_) => panic!("expected a populated table"),
        }
    }

    #[test]
    fn empty_table_offers_add() {
        let table = TableController::new(TableConfig::big_cats());
        match table.derive_view() {
            TableView::Empty(empty) => {
                assert_eq!(empty.message, "No Big Cats found.");
                assert_eq!(empty.add_label, "+ Add Big Cats");
            }
            TableView::Table(_) => panic!("expected the empty state"),
        }
    }

    #[test]
    fn derive_is_idempotent() {
        let mut table = TableController::new(TableConfig::big_cats());
        table.add(cat("Leo", Some(8))).unwrap();
        table.sort_by(&Field::Name);
        assert_eq!(table.derive_view(), table.derive_view());
        assert_eq!(&table.derive_view(), table.view());
    }

    #[test]
    fn headers_follow_declared_columns_and_sort_state() {
        let mut table = TableController::new(TableConfig::big_cats());
        table.add(cat("Leo", Some(8))).unwrap();
        table.sort_by(&Field::Size);
        table.sort_by(&Field::Size);
        let view = table.derive_view();
        let headers = &body(&view).headers;
        let labels: Vec<&str> = headers.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, ["Name", "Species", "Size", "Location"]);
        assert_eq!(headers[0].indicator, Some(SortIndicator::Inactive));
        assert_eq!(headers[1].indicator, None);
        assert!(!headers[1].sortable);
        assert_eq!(headers[2].indicator, Some(SortIndicator::Descending));
        assert_eq!(body(&view).fixed_headers, [IMAGE_HEADER, ACTIONS_HEADER]);
    }

    #[test]
    fn cells_are_formatted_per_field() {
        let mut table = TableController::new(TableConfig::big_fish().species("big cat"));
        table.add(cat("Leo", Some(8))).unwrap();
        table.add(cat("Tom", None)).unwrap();
        table.set_page(1);
        let view = table.derive_view();
        let rows = &body(&view).rows;
        assert_eq!(rows[0].cells[0].style, LabelStyle::BoldItalicAccent);
        assert_eq!(rows[0].cells[2].text, "8 ft");
        assert_eq!(rows[1].cells[2].text, "");
        assert_eq!(rows[1].cells[3].text, "Savanna");
        assert_eq!(rows[1].key, "Tom");
        assert_eq!(rows[1].image, "https://via.placeholder.com/100");
    }

    #[test]
    fn pagination_and_summary() {
        let mut table = TableController::new(TableConfig::dogs());
        for i in 1..=6 {
            table.add(cat(&format!("dog{i}"), Some(i))).unwrap();
        }
        let last_page = table.derive_view();
        let last = body(&last_page);
        assert_eq!(last.summary, "Showing 5 to 6 of 6 entries");
        assert!(last.pagination.prev_enabled);
        assert!(!last.pagination.next_enabled);
        assert_eq!(last.pagination.pages.len(), 2);
        assert!(last.pagination.pages[1].active);

        table.set_page(1);
        let first_page = table.derive_view();
        let first = body(&first_page);
        assert_eq!(first.summary, "Showing 1 to 4 of 6 entries");
        assert_eq!(first.range, EntryRange { first: 1, last: 4, total: 6 });
        assert!(!first.pagination.prev_enabled);
    }
}
