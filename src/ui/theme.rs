//! cliclack theme

use cliclack::ThemeState;
use console::Style;

/// Green bars and symbols
#[derive(Debug, Clone, Default)]
pub struct MintdevTheme;

impl cliclack::Theme for MintdevTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().green(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active | ThemeState::Submit => Style::new().green(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
        }
    }
}

/// Install the theme globally; call once before any prompt
pub fn init_theme() {
    cliclack::set_theme(MintdevTheme);
}
