//! Terminal detection

use std::io::IsTerminal;

/// How output should be rendered
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    fancy: bool,
}

impl UiContext {
    /// Spinners and glyphs on a terminal; plain tagged lines when piped, in CI
    /// or on a dumb terminal
    pub fn detect() -> Self {
        let dumb = std::env::var("TERM").is_ok_and(|t| t == "dumb");
        let ci = std::env::var_os("CI").is_some();
        Self {
            fancy: std::io::stdout().is_terminal() && !dumb && !ci,
        }
    }

    /// Always render plain lines
    pub fn plain() -> Self {
        Self { fancy: false }
    }

    pub fn use_fancy_output(&self) -> bool {
        self.fancy
    }
}
