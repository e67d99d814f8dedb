//! Line-oriented output shared by the commands

use super::context::UiContext;
use console::style;

/// Leading status mark of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Ok,
    Warn,
    Info,
    Fail,
}

impl Mark {
    /// Glyph on a terminal, bracketed tag otherwise
    pub(crate) fn render(self, ctx: &UiContext) -> String {
        let (glyph, tag) = match self {
            Self::Ok => ("✓", "[OK]"),
            Self::Warn => ("!", "[WARN]"),
            Self::Info => ("●", "[INFO]"),
            Self::Fail => ("✗", "[FAIL]"),
        };
        let text = if ctx.use_fancy_output() { glyph } else { tag };
        let styled = match self {
            Self::Ok => style(text).green(),
            Self::Warn => style(text).yellow(),
            Self::Info => style(text).cyan(),
            Self::Fail => style(text).red(),
        };
        styled.to_string()
    }
}

/// Title shown before a command's output
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        println!("{} {}", style("┌").cyan(), style(title).cyan().bold());
    } else {
        println!("{}", style(title).cyan().bold());
    }
}

/// Closing summary line
pub fn outro(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        println!("{} {}", style("└").cyan(), style(message).green().bold());
    } else {
        println!("{} {}", Mark::Ok.render(ctx), message);
    }
}

/// One marked line
pub fn line(ctx: &UiContext, mark: Mark, message: &str) {
    println!("{} {}", mark.render(ctx), message);
}

/// Indented `key: value` detail under the previous line
pub fn detail(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("    {}: {}", style(key).dim(), value);
    } else {
        println!("    {}: {}", key, value);
    }
}
