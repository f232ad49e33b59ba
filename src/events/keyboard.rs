use crate::error::{Result, SwipeError};
use crate::mappings::KeyNames;
use crate::swipe_error;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Код клавиши (evdev коды)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn from_name(name: &str) -> Result<Self> {
        KeyNames::translate(name)
            .map(Self)
            .ok_or_else(|| swipe_error!(invalid_key, "'{}'", name.trim()))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match KeyNames::name_of(self.0) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "KEY_{}", self.0),
        }
    }
}

/// Комбинация клавиш: нажимаются по порядку, отпускаются в обратном порядке
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    keys: SmallVec<[KeyCode; 4]>,
}

impl KeyChord {
    pub fn new(keys: impl IntoIterator<Item = KeyCode>) -> Result<Self> {
        let mut chord: SmallVec<[KeyCode; 4]> = SmallVec::new();
        for key in keys {
            if chord.contains(&key) {
                return Err(swipe_error!(invalid_key, "{} повторяется в комбинации", key));
            }
            chord.push(key);
        }

        if chord.is_empty() {
            return Err(SwipeError::InvalidKey("пустая комбинация клавиш".to_string()));
        }

        Ok(Self { keys: chord })
    }

    pub fn keys(&self) -> &[KeyCode] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

impl Default for KeyChord {
    /// Shift+Tab
    fn default() -> Self {
        Self {
            keys: SmallVec::from_slice(&[
                KeyCode(evdev::KeyCode::KEY_LEFTSHIFT.code()),
                KeyCode(evdev::KeyCode::KEY_TAB.code()),
            ]),
        }
    }
}

impl FromStr for KeyChord {
    type Err = SwipeError;

    /// Разбор строки вида "shift+tab" или "Ctrl + Alt + T"
    fn from_str(s: &str) -> Result<Self> {
        let keys = s
            .split('+')
            .map(KeyCode::from_name)
            .collect::<Result<Vec<_>>>()?;
        Self::new(keys)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.keys.iter().map(|key| key.to_string()).collect();
        write!(f, "{}", names.join("+"))
    }
}
