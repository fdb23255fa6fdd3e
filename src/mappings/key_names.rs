use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Первый код кнопок (BTN_MISC). Всё, что ниже, - обычные клавиши клавиатуры
pub const FIRST_BUTTON_CODE: u16 = 0x100;

/// Максимальный код клавиши в evdev (KEY_MAX)
pub const MAX_KEY_CODE: u16 = 0x2ff;

// Единая таблица имён: из неё строятся обе карты
const KEY_TABLE: &[(&str, u16)] = &[
    // Буквенные клавиши
    ("a", 30), ("b", 48), ("c", 46), ("d", 32), ("e", 18), ("f", 33),
    ("g", 34), ("h", 35), ("i", 23), ("j", 36), ("k", 37), ("l", 38),
    ("m", 50), ("n", 49), ("o", 24), ("p", 25), ("q", 16), ("r", 19),
    ("s", 31), ("t", 20), ("u", 22), ("v", 47), ("w", 17), ("x", 45),
    ("y", 21), ("z", 44),

    // Цифровые клавиши (верхний ряд)
    ("1", 2), ("2", 3), ("3", 4), ("4", 5), ("5", 6),
    ("6", 7), ("7", 8), ("8", 9), ("9", 10), ("0", 11),

    // Специальные клавиши
    ("space", 57),
    ("enter", 28),
    ("escape", 1),
    ("backspace", 14),
    ("tab", 15),
    ("capslock", 58),
    ("grave", 41),

    // Модификаторы
    ("ctrl", 29),        // KEY_LEFTCTRL
    ("alt", 56),         // KEY_LEFTALT
    ("shift", 42),       // KEY_LEFTSHIFT
    ("super", 125),      // KEY_LEFTMETA
    ("rightctrl", 97),
    ("rightalt", 100),
    ("rightshift", 54),

    // Навигация
    ("insert", 110),
    ("delete", 111),
    ("home", 102),
    ("end", 107),
    ("pageup", 104),
    ("pagedown", 109),
    ("up", 103),
    ("down", 108),
    ("left", 105),
    ("right", 106),

    // Функциональные клавиши
    ("f1", 59), ("f2", 60), ("f3", 61), ("f4", 62), ("f5", 63), ("f6", 64),
    ("f7", 65), ("f8", 66), ("f9", 67), ("f10", 68), ("f11", 87), ("f12", 88),

    // Кнопки мыши: триггером часто служит боковая кнопка
    ("mouse1", 0x110),   // BTN_LEFT
    ("mouse2", 0x111),   // BTN_RIGHT
    ("mouse3", 0x112),   // BTN_MIDDLE
    ("mouse4", 0x113),   // BTN_SIDE
    ("mouse5", 0x114),   // BTN_EXTRA
];

static NAME_TO_CODE: Lazy<HashMap<&'static str, u16>> =
    Lazy::new(|| KEY_TABLE.iter().copied().collect());

static CODE_TO_NAME: Lazy<HashMap<u16, &'static str>> =
    Lazy::new(|| KEY_TABLE.iter().map(|&(name, code)| (code, name)).collect());

/// Трансляция между именами клавиш из конфигурации и кодами evdev
pub struct KeyNames;

impl KeyNames {
    /// Получить evdev код по имени клавиши (регистр не важен)
    pub fn translate(key_name: &str) -> Result<u16, String> {
        let normalized = key_name.trim().to_lowercase();
        NAME_TO_CODE
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| format!("Неизвестная клавиша: {}", key_name))
    }

    /// Получить имя клавиши по evdev коду
    pub fn reverse_translate(code: u16) -> Option<&'static str> {
        CODE_TO_NAME.get(&code).copied()
    }

    /// Человекочитаемое имя для логов
    pub fn describe(code: u16) -> String {
        match Self::reverse_translate(code) {
            Some(name) => format!("{} ({})", name, code),
            None => format!("KEY_{}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_keys() {
        assert_eq!(KeyNames::translate("a"), Ok(30));
        assert_eq!(KeyNames::translate("O"), Ok(24));
    }

    #[test]
    fn test_mouse_buttons() {
        assert_eq!(KeyNames::translate("mouse5"), Ok(0x114));
        assert!(KeyNames::translate("mouse4").unwrap() >= FIRST_BUTTON_CODE);
    }

    #[test]
    fn test_unknown_key() {
        assert!(KeyNames::translate("hyper").is_err());
        assert_eq!(KeyNames::reverse_translate(0x2fe), None);
    }

    #[test]
    fn test_table_is_bijective() {
        assert_eq!(NAME_TO_CODE.len(), KEY_TABLE.len());
        assert_eq!(CODE_TO_NAME.len(), KEY_TABLE.len());
        for &(name, code) in KEY_TABLE {
            assert_eq!(KeyNames::reverse_translate(code), Some(name));
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(KeyNames::describe(24), "o (24)");
        assert_eq!(KeyNames::describe(700), "KEY_700");
    }
}
