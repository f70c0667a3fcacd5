use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line text input backing one form field. Cursor positions count
/// characters, not bytes.
#[derive(Debug, Default, Clone)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
}

impl Inputter {
    pub fn with_value(value: &str) -> Self {
        let mut input = Self::default();
        input.set(value);
        input
    }

    pub fn read(&mut self, key: event::KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.curser_pos = 0,
            (KeyCode::End, _) => self.curser_pos = self.len(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.clear(),
            (kc, km) => self.key(kc, km),
        }
        trace!("Input now {:?} @ {}", self.current_input, self.curser_pos);
    }

    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = self.len();
    }

    pub fn value(&self) -> &str {
        &self.current_input
    }

    pub fn curser_pos(&self) -> usize {
        self.curser_pos
    }

    pub fn clear(&mut self) {
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn len(&self) -> usize {
        self.current_input.chars().count()
    }

    fn backspace(&mut self) {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let idx = self.getbytepos();
            self.current_input.remove(idx);
        }
    }

    fn delete(&mut self) {
        if self.curser_pos < self.len() {
            let idx = self.getbytepos();
            self.current_input.remove(idx);
        }
    }

    fn left(&mut self) {
        self.curser_pos = self.curser_pos.saturating_sub(1);
    }

    fn right(&mut self) {
        if self.curser_pos < self.len() {
            self.curser_pos += 1;
        }
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) {
        if modifier.contains(KeyModifiers::CONTROL) || modifier.contains(KeyModifiers::ALT) {
            return;
        }
        if let Some(chr) = code.as_char() {
            let idx = self.getbytepos();
            self.current_input.insert(idx, chr);
            self.curser_pos += 1;
        }
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn press(input: &mut Inputter, code: KeyCode) {
        input.read(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(input: &mut Inputter, text: &str) {
        for chr in text.chars() {
            press(input, KeyCode::Char(chr));
        }
    }

    #[test]
    fn typing_and_editing_in_the_middle() {
        let mut input = Inputter::default();
        type_str(&mut input, "Lio");
        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Backspace);
        type_str(&mut input, "e");
        assert_eq!(input.value(), "Leo");
        assert_eq!(input.curser_pos(), 2);
        press(&mut input, KeyCode::Delete);
        assert_eq!(input.value(), "Le");
    }

    #[test]
    fn multibyte_characters_are_handled_by_char() {
        let mut input = Inputter::with_value("Jägér");
        press(&mut input, KeyCode::Backspace);
        press(&mut input, KeyCode::Home);
        press(&mut input, KeyCode::Right);
        press(&mut input, KeyCode::Delete);
        assert_eq!(input.value(), "Jgé");
    }

    #[test]
    fn control_u_clears() {
        let mut input = Inputter::with_value("Savanna");
        input.read(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "");
        assert_eq!(input.curser_pos(), 0);
    }
}
