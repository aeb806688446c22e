//! Canonical key names and key combinations
//!
//! Tools accept human-friendly key names ("enter", "cmd", "f5", "a"). This
//! module maps them to [`Key`], the backend-neutral key code every
//! [`InputDriver`](crate::backend::InputDriver) understands.

use std::str::FromStr;

use crate::error::{AutomationError, AutomationResult};

/// Backend-neutral key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Control modifier
    Control,
    /// Shift modifier
    Shift,
    /// Alt modifier (Option on macOS)
    Alt,
    /// Command on macOS, Windows/Super key elsewhere
    Meta,
    /// Enter / Return
    Return,
    /// Tab
    Tab,
    /// Escape
    Escape,
    /// Space bar
    Space,
    /// Backspace
    Backspace,
    /// Forward delete
    Delete,
    /// Up arrow
    UpArrow,
    /// Down arrow
    DownArrow,
    /// Left arrow
    LeftArrow,
    /// Right arrow
    RightArrow,
    /// Home
    Home,
    /// End
    End,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Caps lock
    CapsLock,
    /// Function key F1..=F20
    F(u8),
    /// Any single printable character
    Char(char),
}

/// Highest function key number accepted
pub const MAX_FUNCTION_KEY: u8 = 20;

impl Key {
    /// Returns the canonical name of this key
    pub fn name(&self) -> String {
        match self {
            Key::Control => "ctrl".to_string(),
            Key::Shift => "shift".to_string(),
            Key::Alt => "alt".to_string(),
            Key::Meta => "cmd".to_string(),
            Key::Return => "enter".to_string(),
            Key::Tab => "tab".to_string(),
            Key::Escape => "escape".to_string(),
            Key::Space => "space".to_string(),
            Key::Backspace => "backspace".to_string(),
            Key::Delete => "delete".to_string(),
            Key::UpArrow => "up".to_string(),
            Key::DownArrow => "down".to_string(),
            Key::LeftArrow => "left".to_string(),
            Key::RightArrow => "right".to_string(),
            Key::Home => "home".to_string(),
            Key::End => "end".to_string(),
            Key::PageUp => "pageup".to_string(),
            Key::PageDown => "pagedown".to_string(),
            Key::CapsLock => "capslock".to_string(),
            Key::F(n) => format!("f{}", n),
            Key::Char(c) => c.to_string(),
        }
    }

    /// Parses a key name, naming `operation` in the error
    pub fn parse_for(operation: &str, name: &str) -> AutomationResult<Self> {
        name.parse::<Key>().map_err(|reason| {
            AutomationError::invalid_argument(operation, "key", reason.to_string())
        })
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when a key name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key '{0}'")]
pub struct UnknownKey(pub String);

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Single characters keep their case: "A" types a capital A.
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return match c {
                ' ' => Ok(Key::Space),
                '\n' | '\r' => Ok(Key::Return),
                '\t' => Ok(Key::Tab),
                c if c.is_control() => Err(UnknownKey(s.escape_debug().to_string())),
                c => Ok(Key::Char(c)),
            };
        }

        let lower = s.trim().to_lowercase();
        let key = match lower.as_str() {
            "ctrl" | "control" | "ctrlleft" | "ctrlright" => Key::Control,
            "shift" | "shiftleft" | "shiftright" => Key::Shift,
            "alt" | "option" | "altleft" | "altright" => Key::Alt,
            "cmd" | "command" | "meta" | "super" | "win" | "windows" | "winleft" => Key::Meta,
            "enter" | "return" => Key::Return,
            "tab" => Key::Tab,
            "esc" | "escape" => Key::Escape,
            "space" | "spacebar" => Key::Space,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "up" | "uparrow" | "arrowup" => Key::UpArrow,
            "down" | "downarrow" | "arrowdown" => Key::DownArrow,
            "left" | "leftarrow" | "arrowleft" => Key::LeftArrow,
            "right" | "rightarrow" | "arrowright" => Key::RightArrow,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdn" => Key::PageDown,
            "capslock" => Key::CapsLock,
            other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                Some(n) if (1..=MAX_FUNCTION_KEY).contains(&n) => Key::F(n),
                _ => return Err(UnknownKey(s.to_string())),
            },
        };
        Ok(key)
    }
}

/// Ordered, non-empty sequence of keys pressed together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo(Vec<Key>);

impl KeyCombo {
    /// Parses key names in order, naming `operation` in errors
    ///
    /// # Examples
    ///
    /// ```
    /// use desktop_mcp::keys::{Key, KeyCombo};
    ///
    /// let combo = KeyCombo::parse("hotkey", &["cmd", "shift", "t"]).unwrap();
    /// assert_eq!(combo.keys(), &[Key::Meta, Key::Shift, Key::Char('t')]);
    /// ```
    pub fn parse<S: AsRef<str>>(operation: &str, names: &[S]) -> AutomationResult<Self> {
        if names.is_empty() {
            return Err(AutomationError::invalid_argument(
                operation,
                "keys",
                "at least one key is required",
            ));
        }
        let keys = names
            .iter()
            .map(|name| {
                Key::parse_for(operation, name.as_ref()).map_err(|_| {
                    AutomationError::invalid_argument(
                        operation,
                        "keys",
                        format!("unknown key '{}'", name.as_ref()),
                    )
                })
            })
            .collect::<AutomationResult<Vec<_>>>()?;
        Ok(Self(keys))
    }

    /// Keys in press order
    pub fn keys(&self) -> &[Key] {
        &self.0
    }
}

impl std::fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.0.iter().map(Key::name).collect();
        write!(f, "{}", names.join("+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_keys_are_case_insensitive() {
        assert_eq!("Enter".parse::<Key>().unwrap(), Key::Return);
        assert_eq!("TAB".parse::<Key>().unwrap(), Key::Tab);
        assert_eq!("PageDown".parse::<Key>().unwrap(), Key::PageDown);
        assert_eq!("command".parse::<Key>().unwrap(), Key::Meta);
    }

    #[test]
    fn test_function_keys() {
        assert_eq!("f1".parse::<Key>().unwrap(), Key::F(1));
        assert_eq!("F12".parse::<Key>().unwrap(), Key::F(12));
        assert!("f0".parse::<Key>().is_err());
        assert!("f21".parse::<Key>().is_err());
    }

    #[test]
    fn test_single_characters_keep_case() {
        assert_eq!("a".parse::<Key>().unwrap(), Key::Char('a'));
        assert_eq!("A".parse::<Key>().unwrap(), Key::Char('A'));
        assert_eq!("7".parse::<Key>().unwrap(), Key::Char('7'));
        assert_eq!(" ".parse::<Key>().unwrap(), Key::Space);
        assert_eq!("é".parse::<Key>().unwrap(), Key::Char('é'));
    }

    #[test]
    fn test_unknown_key() {
        let err = "hyper".parse::<Key>().unwrap_err();
        assert_eq!(err.to_string(), "unknown key 'hyper'");
        assert!("".parse::<Key>().is_err());
        assert!("\u{7}".parse::<Key>().is_err());
    }

    #[test]
    fn test_combo_parse_and_display() {
        let combo = KeyCombo::parse("hotkey", &["ctrl", "shift", "T"]).unwrap();
        assert_eq!(combo.keys(), &[Key::Control, Key::Shift, Key::Char('T')]);
        assert_eq!(combo.to_string(), "ctrl+shift+T");
    }

    #[test]
    fn test_combo_rejects_empty_and_unknown() {
        let empty: [&str; 0] = [];
        let err = KeyCombo::parse("hotkey", &empty).unwrap_err();
        assert!(err.to_string().contains("at least one key"));

        let err = KeyCombo::parse("hotkey", &["ctrl", "bogus"]).unwrap_err();
        assert!(err.to_string().contains("bogus"));
        assert_eq!(err.operation(), "hotkey");
    }
}
