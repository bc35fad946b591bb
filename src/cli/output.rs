//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

/// Disable colors for the rest of the process (`color = false` in settings).
pub fn disable_colors() {
    colored::control::set_override(false);
}

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print failure status (red X)
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✗".red(), msg);
}

/// Print key/value detail line (dimmed key)
pub fn detail(key: &str, value: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a match (bold)
pub fn highlight(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().bold());
}
