//! Terminal styles. `console` drops the escapes when stdout is not a terminal, so piped output
//! and test assertions see plain text.

use console::Style;

pub fn header() -> Style {
    Style::new().bold()
}

pub fn muted() -> Style {
    Style::new().color256(245)
}

pub fn inactive() -> Style {
    Style::new().red()
}

pub fn label() -> Style {
    Style::new().cyan()
}
