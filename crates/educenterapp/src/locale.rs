use std::cell::RefCell;

/// Source of the user's display language.
///
/// Views read it once at initialization and align their grid with it.
pub trait Localization {
    fn current_language(&self) -> String;
    fn set_current_language(&self, code: &str);
}

/// Holds a language code in memory.
#[derive(Debug)]
pub struct StaticLocale {
    code: RefCell<String>,
}

impl StaticLocale {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: RefCell::new(code.into()),
        }
    }
}

impl Default for StaticLocale {
    fn default() -> Self {
        Self::new("en")
    }
}

impl Localization for StaticLocale {
    fn current_language(&self) -> String {
        self.code.borrow().clone()
    }

    fn set_current_language(&self, code: &str) {
        *self.code.borrow_mut() = code.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let locale = StaticLocale::default();
        assert_eq!(locale.current_language(), "en");
        locale.set_current_language("ru");
        assert_eq!(locale.current_language(), "ru");
    }
}
