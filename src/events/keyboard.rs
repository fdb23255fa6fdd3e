use crate::mappings::KeyNames;
use std::fmt;

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    Released,
}

impl KeyState {
    /// Значение поля value для EV_KEY
    pub fn value(&self) -> i32 {
        match self {
            KeyState::Pressed => 1,
            KeyState::Released => 0,
        }
    }
}

/// Код клавиши (evdev коды)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", KeyNames::describe(self.0))
    }
}

/// Событие для виртуальной клавиатуры
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualKeyEvent {
    pub key_code: KeyCode,
    pub state: KeyState,
}

impl VirtualKeyEvent {
    pub fn new(key_code: KeyCode, state: KeyState) -> Self {
        Self { key_code, state }
    }

    pub fn press(key_code: KeyCode) -> Self {
        Self::new(key_code, KeyState::Pressed)
    }

    pub fn release(key_code: KeyCode) -> Self {
        Self::new(key_code, KeyState::Released)
    }
}

impl fmt::Display for VirtualKeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.key_code, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_event_constructors() {
        let press = VirtualKeyEvent::press(KeyCode::new(24));
        let release = VirtualKeyEvent::release(KeyCode::new(24));

        assert_eq!(press.state.value(), 1);
        assert_eq!(release.state.value(), 0);
        assert_eq!(press.key_code, release.key_code);
    }

    #[test]
    fn test_key_code_display() {
        assert_eq!(KeyCode::new(24).to_string(), "o (24)");
        assert_eq!(VirtualKeyEvent::press(KeyCode::new(0x114)).to_string(), "mouse5 (276) Pressed");
    }
}
