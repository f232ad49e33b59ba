use evdev::KeyCode as Evdev;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Преобразование имён клавиш из конфигурации в evdev коды и обратно
pub struct KeyNames;

// Канонические имена: по ним же клавиши выводятся в логах
const CANONICAL: &[(&str, Evdev)] = &[
    // Модификаторы
    ("shift", Evdev::KEY_LEFTSHIFT),
    ("rightshift", Evdev::KEY_RIGHTSHIFT),
    ("ctrl", Evdev::KEY_LEFTCTRL),
    ("rightctrl", Evdev::KEY_RIGHTCTRL),
    ("alt", Evdev::KEY_LEFTALT),
    ("altgr", Evdev::KEY_RIGHTALT),
    ("super", Evdev::KEY_LEFTMETA),

    // Специальные клавиши
    ("tab", Evdev::KEY_TAB),
    ("escape", Evdev::KEY_ESC),
    ("enter", Evdev::KEY_ENTER),
    ("space", Evdev::KEY_SPACE),
    ("backspace", Evdev::KEY_BACKSPACE),
    ("delete", Evdev::KEY_DELETE),
    ("insert", Evdev::KEY_INSERT),
    ("home", Evdev::KEY_HOME),
    ("end", Evdev::KEY_END),
    ("pageup", Evdev::KEY_PAGEUP),
    ("pagedown", Evdev::KEY_PAGEDOWN),
    ("print", Evdev::KEY_SYSRQ),

    // Стрелки
    ("up", Evdev::KEY_UP),
    ("down", Evdev::KEY_DOWN),
    ("left", Evdev::KEY_LEFT),
    ("right", Evdev::KEY_RIGHT),

    // Функциональные клавиши
    ("f1", Evdev::KEY_F1),
    ("f2", Evdev::KEY_F2),
    ("f3", Evdev::KEY_F3),
    ("f4", Evdev::KEY_F4),
    ("f5", Evdev::KEY_F5),
    ("f6", Evdev::KEY_F6),
    ("f7", Evdev::KEY_F7),
    ("f8", Evdev::KEY_F8),
    ("f9", Evdev::KEY_F9),
    ("f10", Evdev::KEY_F10),
    ("f11", Evdev::KEY_F11),
    ("f12", Evdev::KEY_F12),

    // Буквенные клавиши
    ("a", Evdev::KEY_A),
    ("b", Evdev::KEY_B),
    ("c", Evdev::KEY_C),
    ("d", Evdev::KEY_D),
    ("e", Evdev::KEY_E),
    ("f", Evdev::KEY_F),
    ("g", Evdev::KEY_G),
    ("h", Evdev::KEY_H),
    ("i", Evdev::KEY_I),
    ("j", Evdev::KEY_J),
    ("k", Evdev::KEY_K),
    ("l", Evdev::KEY_L),
    ("m", Evdev::KEY_M),
    ("n", Evdev::KEY_N),
    ("o", Evdev::KEY_O),
    ("p", Evdev::KEY_P),
    ("q", Evdev::KEY_Q),
    ("r", Evdev::KEY_R),
    ("s", Evdev::KEY_S),
    ("t", Evdev::KEY_T),
    ("u", Evdev::KEY_U),
    ("v", Evdev::KEY_V),
    ("w", Evdev::KEY_W),
    ("x", Evdev::KEY_X),
    ("y", Evdev::KEY_Y),
    ("z", Evdev::KEY_Z),

    // Цифровые клавиши (верхний ряд)
    ("1", Evdev::KEY_1),
    ("2", Evdev::KEY_2),
    ("3", Evdev::KEY_3),
    ("4", Evdev::KEY_4),
    ("5", Evdev::KEY_5),
    ("6", Evdev::KEY_6),
    ("7", Evdev::KEY_7),
    ("8", Evdev::KEY_8),
    ("9", Evdev::KEY_9),
    ("0", Evdev::KEY_0),
];

// Альтернативные написания, которые встречаются в конфигурациях
const ALIASES: &[(&str, &str)] = &[
    ("leftshift", "shift"),
    ("lshift", "shift"),
    ("rshift", "rightshift"),
    ("control", "ctrl"),
    ("leftctrl", "ctrl"),
    ("lctrl", "ctrl"),
    ("rctrl", "rightctrl"),
    ("leftalt", "alt"),
    ("lalt", "alt"),
    ("rightalt", "altgr"),
    ("ralt", "altgr"),
    ("meta", "super"),
    ("win", "super"),
    ("esc", "escape"),
    ("return", "enter"),
    ("del", "delete"),
    ("ins", "insert"),
    ("pgup", "pageup"),
    ("pgdn", "pagedown"),
    ("printscreen", "print"),
];

static NAME_TO_CODE: Lazy<HashMap<&'static str, u16>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, u16> = CANONICAL
        .iter()
        .map(|(name, key)| (*name, key.code()))
        .collect();

    for (alias, canonical) in ALIASES {
        if let Some(code) = map.get(canonical).copied() {
            map.insert(*alias, code);
        }
    }

    map
});

static CODE_TO_NAME: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    CANONICAL.iter().map(|(name, key)| (key.code(), *name)).collect()
});

impl KeyNames {
    /// Получить evdev код клавиши по её имени (регистронезависимо)
    pub fn translate(key_name: &str) -> Option<u16> {
        let normalized = key_name.trim().to_lowercase();
        NAME_TO_CODE.get(normalized.as_str()).copied()
    }

    /// Получить каноническое имя клавиши по её коду
    pub fn name_of(code: u16) -> Option<&'static str> {
        CODE_TO_NAME.get(&code).copied()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_key_mapping() {
        assert_eq!(KeyNames::translate("shift"), Some(42));
        assert_eq!(KeyNames::translate("tab"), Some(15));
        assert_eq!(KeyNames::translate("a"), Some(30));
        assert_eq!(KeyNames::translate("f5"), Some(63));
    }

    #[test]
    fn test_case_insensitive_and_aliases() {
        assert_eq!(KeyNames::translate("Shift"), Some(42));
        assert_eq!(KeyNames::translate(" TAB "), Some(15));
        assert_eq!(KeyNames::translate("control"), KeyNames::translate("ctrl"));
        assert_eq!(KeyNames::translate("esc"), Some(1));
        assert_eq!(KeyNames::translate("win"), Some(125));
    }

    #[test]
    fn test_reverse_mapping_uses_canonical_names() {
        assert_eq!(KeyNames::name_of(42), Some("shift"));
        assert_eq!(KeyNames::name_of(1), Some("escape"));
        assert_eq!(KeyNames::name_of(0xffff), None);
    }

    #[test]
    fn test_invalid_key() {
        assert_eq!(KeyNames::translate("hyper"), None);
        assert_eq!(KeyNames::translate(""), None);
    }

}
