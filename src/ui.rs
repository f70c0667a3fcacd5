use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

use crate::app::{App, FORM_FIELDS, FormState, Modus};
use crate::domain::LabelStyle;
use crate::view::{CellView, PaginationView, SortIndicator, TableBody, TableView};

const IMAGE_COLUMN_WIDTH: u16 = 34;
const ACTIONS_COLUMN_WIDTH: u16 = 9;

/// Terminal render target: draws the view of the active table plus any open popup.
#[derive(Debug, Default)]
pub struct TableUI {
    table_state: TableState,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, app: &App, frame: &mut Frame) {
        let [tabs_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let titles: Vec<String> = app
            .tables()
            .iter()
            .map(|t| t.config().display_label())
            .collect();
        frame.render_widget(
            Tabs::new(titles)
                .select(app.active_index())
                .highlight_style(Style::new().bold().reversed()),
            tabs_area,
        );

        if let Some(table) = app.active_table() {
            match table.view() {
                TableView::Empty(empty) => {
                    let text = Text::from(vec![
                        Line::from(empty.message.clone()),
                        Line::from(""),
                        Line::from(vec![
                            Span::from(empty.add_label.clone()).bold(),
                            " (a)".dark_gray(),
                        ]),
                    ]);
                    frame.render_widget(
                        Paragraph::new(text).centered().block(Block::bordered()),
                        body_area,
                    );
                }
                TableView::Table(body) => self.draw_body(body, app.selected_row(), frame, body_area),
            }
        }

        frame.render_widget(
            Paragraph::new(Line::from(app.status_message().to_string()).dark_gray()),
            status_area,
        );

        match app.modus() {
            Modus::FORM => {
                if let Some(form) = app.form() {
                    Self::draw_form(form, frame);
                }
            }
            Modus::CONFIRM => {
                let name = app.pending_delete().unwrap_or_default();
                Self::draw_popup(
                    " Confirm ",
                    Text::from(format!("Are you sure you want to delete {name}? (y/n)")),
                    3,
                    frame,
                );
            }
            Modus::POPUP => {
                if let Some(form) = app.form() {
                    Self::draw_form(form, frame);
                }
                let height = app.help_text().lines().count() as u16 + 2;
                Self::draw_popup(" Help ", Text::from(app.help_text()), height, frame);
            }
            Modus::TABLE => {}
        }
    }

    fn draw_body(&mut self, body: &TableBody, selected: usize, frame: &mut Frame, area: Rect) {
        let [header_area, table_area, pager_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        let [summary_area, add_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(body.add_label.len() as u16 + 4)])
                .areas(header_area);
        frame.render_widget(Paragraph::new(body.summary.clone()), summary_area);
        frame.render_widget(
            Paragraph::new(format!("{} (a)", body.add_label)).right_aligned().bold(),
            add_area,
        );

        let mut header: Vec<Cell> = body
            .headers
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                let marker = match h.indicator {
                    Some(SortIndicator::Ascending) => " ▲",
                    Some(SortIndicator::Descending) => " ▼",
                    Some(SortIndicator::Inactive) => " ↕",
                    None => "",
                };
                Cell::from(format!("{} {}{}", idx + 1, h.label, marker))
            })
            .collect();
        header.extend(body.fixed_headers.iter().map(|h| Cell::from(h.clone())));

        let rows: Vec<Row> = body
            .rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Cell> = row.cells.iter().map(styled_cell).collect();
                cells.push(Cell::from(Span::from(row.image.clone()).blue().underlined()));
                cells.push(Cell::from("e / d"));
                Row::new(cells)
            })
            .collect();

        let mut widths: Vec<Constraint> = body.headers.iter().map(|_| Constraint::Fill(1)).collect();
        widths.push(Constraint::Length(IMAGE_COLUMN_WIDTH));
        widths.push(Constraint::Length(ACTIONS_COLUMN_WIDTH));

        let table = Table::new(rows, widths)
            .header(Row::new(header).style(Style::new().bold().reversed()))
            .block(Block::bordered().border_set(border::PLAIN))
            .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        self.table_state.select(Some(selected));
        frame.render_stateful_widget(table, table_area, &mut self.table_state);
        frame.render_widget(Paragraph::new(pager_line(&body.pagination)).centered(), pager_area);
    }

    fn draw_form(form: &FormState, frame: &mut Frame) {
        let mut lines = vec![Line::from(vec!["Species: ".into(), Span::from(form.species.clone()).italic()])];
        for (idx, label) in FORM_FIELDS.iter().enumerate() {
            let marker = if idx == form.active { "> " } else { "  " };
            lines.push(Line::from(vec![
                Span::from(format!("{marker}{label:<10} ")).bold(),
                Span::from(form.inputs[idx].value().to_string()),
            ]));
        }
        lines.push(Line::from(""));
        for error in &form.errors {
            lines.push(Line::from(Span::from(error.clone()).red()));
        }
        lines.push(Line::from("enter save · tab next field · esc cancel".dark_gray()));

        let height = lines.len() as u16 + 2;
        let area = Self::draw_popup(&format!(" {} ", form.title), Text::from(lines), height, frame);

        // Inside the border, past the species line and the label column.
        let input = &form.inputs[form.active];
        let x = area.x + 1 + 13 + input.curser_pos() as u16;
        let y = area.y + 2 + form.active as u16;
        frame.set_cursor_position(Position::new(x, y));
    }

    fn draw_popup(title: &str, text: Text, height: u16, frame: &mut Frame) -> Rect {
        let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
        let horizontal = Layout::horizontal([Constraint::Percentage(60)]).flex(Flex::Center);
        let [area] = vertical.areas(frame.area());
        let [area] = horizontal.areas(area);

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(text)
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(Line::from(title.to_string()).bold()).border_set(border::THICK)),
            area,
        );
        area
    }
}

fn styled_cell(cell: &CellView) -> Cell<'static> {
    let span = Span::from(cell.text.clone());
    let span = match cell.style {
        LabelStyle::Plain => span,
        LabelStyle::Bold => span.bold(),
        LabelStyle::BoldItalicAccent => span.bold().italic().fg(Color::Blue),
    };
    Cell::from(span)
}

fn pager_line(pagination: &PaginationView) -> Line<'static> {
    let arrow = |label: &'static str, enabled: bool| {
        if enabled {
            Span::from(label).bold()
        } else {
            Span::from(label).dark_gray()
        }
    };
    let mut spans = vec![arrow("‹ ", pagination.prev_enabled)];
    for page in &pagination.pages {
        let label = format!(" {} ", page.number);
        spans.push(if page.active {
            Span::from(label).reversed()
        } else {
            Span::from(label)
        });
    }
    spans.push(arrow(" ›", pagination.next_enabled));
    Line::from(spans)
}
