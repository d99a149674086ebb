//! Formatting of the main molint output.

use std::fmt;

use log;

#[cfg(test)]
#[path = "format_tests.rs"]
mod format_tests;

/// Inner width of section title boxes.
const TITLE_WIDTH: usize = 97;

/// Logs an error both to the diagnostics and to the `molint-output` logger.
macro_rules! molint_error {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::error!($fmt, $($($arg)*)?);
        log::error!(target: "molint-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a main output line to the `molint-output` logger.
macro_rules! molint_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "molint-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {molint_error, molint_output};

/// The three lines of a boxed section title, widened for long titles.
fn title_lines(title: &str) -> [String; 3] {
    let width = title.chars().count().max(TITLE_WIDTH);
    let bar = "─".repeat(width);
    [
        format!("┌──{bar}──┐"),
        format!("│§ {title:^width$} §│"),
        format!("└──{bar}──┘"),
    ]
}

/// A subtitle underlined to its own length.
fn subtitle_lines(subtitle: &str) -> [String; 2] {
    [
        subtitle.to_string(),
        "═".repeat(subtitle.chars().count()),
    ]
}

pub(crate) fn write_title(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    title_lines(title)
        .iter()
        .try_for_each(|line| writeln!(f, "{line}"))
}

pub(crate) fn log_title(title: &str) {
    for line in title_lines(title) {
        molint_output!("{line}");
    }
}

pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    subtitle_lines(subtitle)
        .iter()
        .try_for_each(|line| writeln!(f, "{line}"))
}

pub(crate) fn log_subtitle(subtitle: &str) {
    for line in subtitle_lines(subtitle) {
        molint_output!("{line}");
    }
}

/// `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

/// Values whose display form goes line by line into the main output.
pub(crate) trait MolintOutput: fmt::Debug + fmt::Display {
    fn log_output_display(&self) {
        for line in self.to_string().lines() {
            molint_output!("{line}");
        }
    }
}

impl<T> MolintOutput for T where T: fmt::Debug + fmt::Display {}
