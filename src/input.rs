use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

/// What the timer sees, whichever device produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Engage,
    Release,
}

/// Maps one key to gestures. Auto-repeat presses are dropped, so holding the
/// key produces a single `Engage`.
///
/// Release events only arrive from terminals that report key event types
/// (see `crossterm::event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardAdapter {
    key: KeyCode,
}

impl Default for KeyboardAdapter {
    fn default() -> Self {
        Self {
            key: KeyCode::Char(' '),
        }
    }
}

impl KeyboardAdapter {
    pub fn new(key: KeyCode) -> Self {
        Self { key }
    }

    pub fn translate(&self, key: &KeyEvent) -> Option<Gesture> {
        if key.code != self.key {
            return None;
        }
        match key.kind {
            KeyEventKind::Press => Some(Gesture::Engage),
            KeyEventKind::Release => Some(Gesture::Release),
            KeyEventKind::Repeat => None,
        }
    }
}

/// Left-button presses inside a screen rectangle.
///
/// A release counts wherever it happens, so dragging off the surface can't
/// leave the timer stuck in a hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerAdapter {
    surface: Rect,
}

impl PointerAdapter {
    pub fn new(surface: Rect) -> Self {
        Self { surface }
    }

    pub fn translate(&self, event: &MouseEvent) -> Option<Gesture> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left)
                if self.surface.contains(Position::new(event.column, event.row)) =>
            {
                Some(Gesture::Engage)
            }
            MouseEventKind::Up(MouseButton::Left) => Some(Gesture::Release),
            _ => None,
        }
    }
}

/// The devices a timer listens to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSurface {
    pub keyboard: Option<KeyboardAdapter>,
    pub pointer: Option<PointerAdapter>,
}

impl InputSurface {
    pub fn new(keyboard: KeyboardAdapter, pointer: Option<Rect>) -> Self {
        Self {
            keyboard: Some(keyboard),
            pointer: pointer.map(PointerAdapter::new),
        }
    }

    pub fn key(&self, key: &KeyEvent) -> Option<Gesture> {
        self.keyboard.as_ref().and_then(|k| k.translate(key))
    }

    pub fn mouse(&self, event: &MouseEvent) -> Option<Gesture> {
        self.pointer.as_ref().and_then(|p| p.translate(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn space(kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(' '), KeyModifiers::NONE, kind)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_keyboard_maps_press_and_release() {
        let keyboard = KeyboardAdapter::default();
        assert_eq!(keyboard.translate(&space(KeyEventKind::Press)), Some(Gesture::Engage));
        assert_eq!(keyboard.translate(&space(KeyEventKind::Release)), Some(Gesture::Release));
    }

    #[test]
    fn test_keyboard_ignores_repeat_and_other_keys() {
        let keyboard = KeyboardAdapter::default();
        assert_eq!(keyboard.translate(&space(KeyEventKind::Repeat)), None);
        assert_eq!(
            keyboard.translate(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)),
            None
        );
    }

    #[test]
    fn test_pointer_engages_only_inside_surface() {
        let pointer = PointerAdapter::new(Rect::new(10, 5, 20, 4));
        assert_eq!(
            pointer.translate(&mouse(MouseEventKind::Down(MouseButton::Left), 12, 6)),
            Some(Gesture::Engage)
        );
        assert_eq!(
            pointer.translate(&mouse(MouseEventKind::Down(MouseButton::Left), 2, 6)),
            None
        );
        assert_eq!(
            pointer.translate(&mouse(MouseEventKind::Down(MouseButton::Right), 12, 6)),
            None
        );
    }

    #[test]
    fn test_pointer_release_counts_anywhere() {
        let pointer = PointerAdapter::new(Rect::new(10, 5, 20, 4));
        assert_eq!(
            pointer.translate(&mouse(MouseEventKind::Up(MouseButton::Left), 0, 0)),
            Some(Gesture::Release)
        );
        assert_eq!(
            pointer.translate(&mouse(MouseEventKind::Moved, 12, 6)),
            None
        );
    }

    #[test]
    fn test_unattached_surface_produces_nothing() {
        let surface = InputSurface::default();
        assert_eq!(surface.key(&space(KeyEventKind::Press)), None);
        assert_eq!(
            surface.mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 0, 0)),
            None
        );
    }
}
