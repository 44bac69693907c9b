//! Colours for the conversion summary.

use owo_colors::{OwoColorize, Style};

/// Whether stdout is a terminal that understands colour.
fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

fn paint(text: &str, style: Style) -> String {
    if supports_color() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Styles summary lines by outcome.
pub trait Colorize {
    /// A completed conversion (green)
    fn success(&self) -> String;
    /// An aborted conversion (bold red)
    fn error(&self) -> String;
    /// Supporting detail, such as individual errors
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), Style::new().green())
    }

    fn error(&self) -> String {
        paint(self.as_ref(), Style::new().red().bold())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), Style::new().dimmed())
    }
}
