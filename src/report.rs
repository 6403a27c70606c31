//! Colored operator-facing console output.

use std::io::{self, Write};

use console::style;

/// Stage announcements and progress notes.
pub fn info(message: &str) {
    println!("{}", style(message).blue());
}

/// Completion confirmations.
pub fn success(message: &str) {
    println!("{}", style(message).green());
}

/// Failure notices, on stderr.
pub fn failure(message: &str) {
    eprintln!("{}", style(message).red());
}

/// The consent prompt, left open on the current line.
pub fn prompt(message: &str) {
    print!("{} ", style(message).yellow());
    io::stdout().flush().ok();
}
