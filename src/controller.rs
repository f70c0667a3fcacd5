use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crate::app::{App, Modus};
use crate::domain::{AppError, Message};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(event_poll_time: u64) -> Self {
        Self { event_poll_time }
    }

    pub fn handle_event(&self, app: &App) -> Result<Option<Message>, AppError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.handle_key(app.modus(), key));
        }
        Ok(None)
    }

    pub fn handle_key(&self, modus: Modus, key: event::KeyEvent) -> Option<Message> {
        let message = match modus {
            Modus::TABLE => match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Char('?') => Some(Message::Help),
                KeyCode::Tab => Some(Message::NextTable),
                KeyCode::BackTab => Some(Message::PrevTable),
                KeyCode::Right | KeyCode::PageDown => Some(Message::NextPage),
                KeyCode::Left | KeyCode::PageUp => Some(Message::PrevPage),
                KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
                KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
                KeyCode::Char('a') => Some(Message::Add),
                KeyCode::Char('e') | KeyCode::Enter => Some(Message::Edit),
                KeyCode::Char('d') | KeyCode::Delete => Some(Message::Delete),
                KeyCode::Char(c @ '1'..='9') => c
                    .to_digit(10)
                    .map(|digit| Message::SortColumn(digit as usize - 1)),
                _ => None,
            },
            Modus::FORM => match (key.code, key.modifiers) {
                (KeyCode::Esc, _) => Some(Message::Exit),
                (KeyCode::Enter, _) => Some(Message::Submit),
                (KeyCode::Tab, _) | (KeyCode::Down, _) => Some(Message::NextField),
                (KeyCode::BackTab, _) | (KeyCode::Up, _) => Some(Message::PrevField),
                (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Exit),
                (KeyCode::F(1), _) => Some(Message::Help),
                _ => Some(Message::RawKey(key)),
            },
            Modus::CONFIRM => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(Message::Confirm(true)),
                KeyCode::Char('n') | KeyCode::Char('N') => Some(Message::Confirm(false)),
                KeyCode::Esc => Some(Message::Exit),
                _ => None,
            },
            Modus::POPUP => match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') => Some(Message::Exit),
                _ => None,
            },
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digits_sort_by_column_index() {
        let controller = Controller::new(100);
        assert_eq!(
            controller.handle_key(Modus::TABLE, key(KeyCode::Char('3'))),
            Some(Message::SortColumn(2))
        );
        assert_eq!(controller.handle_key(Modus::TABLE, key(KeyCode::Char('0'))), None);
    }

    #[test]
    fn form_passes_text_through() {
        let controller = Controller::new(100);
        let q = key(KeyCode::Char('q'));
        assert_eq!(controller.handle_key(Modus::FORM, q), Some(Message::RawKey(q)));
        assert_eq!(
            controller.handle_key(Modus::FORM, key(KeyCode::Enter)),
            Some(Message::Submit)
        );
        assert_eq!(
            controller.handle_key(Modus::FORM, key(KeyCode::F(1))),
            Some(Message::Help)
        );
    }

    #[test]
    fn confirm_only_accepts_yes_or_no() {
        let controller = Controller::new(100);
        assert_eq!(
            controller.handle_key(Modus::CONFIRM, key(KeyCode::Char('y'))),
            Some(Message::Confirm(true))
        );
        assert_eq!(controller.handle_key(Modus::CONFIRM, key(KeyCode::Char('d'))), None);
    }
}
