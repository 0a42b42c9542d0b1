//! Terminal output shared by the lelypkg commands.
//!
//! Status lines and aligned stats go to stdout, errors to stderr. Colors are
//! only emitted when the stream is a terminal, so piped and `--json` output
//! stays plain.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use owo_colors::{OwoColorize, Stream};

pub mod symbols {
  /// A finished build or resolution.
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  /// A package that was reused, or a section heading.
  pub const INFO: &str = "•";
  /// Component requirement in `lelypkg graph`.
  pub const ARROW: &str = "→";
  /// Option value that differs from its default in `lelypkg options`.
  pub const MODIFY: &str = "~";
}

/// Width of the label column in [`print_stat`], colon included.
const STAT_LABEL_WIDTH: usize = 17;

/// Build durations: `850ms`, `12.40s`, `3m 05s`, `1h 02m`.
pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  match secs {
    0 => format!("{}ms", duration.subsec_millis()),
    1..60 => format!("{}.{:02}s", secs, duration.subsec_millis() / 10),
    60..3600 => format!("{}m {:02}s", secs / 60, secs % 60),
    _ => format!("{}h {:02}m", secs / 3600, secs % 3600 / 60),
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

/// Print `err` with its whole context chain on one line.
pub fn print_error(err: &anyhow::Error) {
  let message = format!("{:#}", err);
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!("  {} {}", stat_label(label).if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

fn stat_label(label: &str) -> String {
  format!("{:<width$}", format!("{}:", label), width = STAT_LABEL_WIDTH)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let mut stdout = std::io::stdout().lock();
  serde_json::to_writer_pretty(&mut stdout, value).context("Failed to serialize to JSON")?;
  writeln!(stdout).context("Failed to write to stdout")?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_duration() {
    assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
    assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    assert_eq!(format_duration(Duration::from_secs(65)), "1m 05s");
    assert_eq!(format_duration(Duration::from_secs(3725)), "1h 02m");
  }

  #[test]
  fn test_format_duration_rounds_down() {
    assert_eq!(format_duration(Duration::from_millis(1999)), "1.99s");
    assert_eq!(format_duration(Duration::from_millis(59_999)), "59.99s");
    assert_eq!(format_duration(Duration::ZERO), "0ms");
  }

  #[test]
  fn stat_labels_line_up() {
    assert_eq!(stat_label("Version"), "Version:         ");
    assert_eq!(stat_label("Enabled options").len(), STAT_LABEL_WIDTH);
    assert_eq!(stat_label("A label longer than the column"), "A label longer than the column:");
  }
}
