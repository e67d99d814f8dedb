//! Terminal output for the CLI
//!
//! Spinners and glyphs in an interactive terminal, plain `[OK]`/`[WARN]`
//! lines when piped or in CI.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{detail, intro, line, outro, Mark};
pub use progress::TaskSpinner;
