//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag. Long
//! running work (release stages, build progress, promotion steps) reports
//! through the [`Reporter`] trait so the engine stays independent of the
//! terminal.

use std::fmt::Display;
use std::sync::Mutex;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Mask a secret for display, keeping only its length visible.
///
/// # Example
///
/// ```
/// use shipyard::ui::output::redact;
///
/// assert_eq!(redact("ghp_abcdef"), "********** (10 chars)");
/// assert_eq!(redact(""), "");
/// ```
pub fn redact(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let len = secret.chars().count();
    format!("{} ({} chars)", "*".repeat(len.min(10)), len)
}

/// Sink for progress of long running work.
pub trait Reporter: Send + Sync {
    /// A stage or step has started.
    fn stage(&self, label: &str);

    /// Something completed or progressed normally.
    fn success(&self, label: &str, detail: &str);

    /// Something failed.
    fn failure(&self, label: &str, detail: &str);
}

/// Reporter printing to the terminal.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    verbosity: Verbosity,
}

impl ConsoleReporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl Reporter for ConsoleReporter {
    fn stage(&self, label: &str) {
        if self.verbosity != Verbosity::Quiet {
            println!("==> {}", label);
        }
    }

    fn success(&self, label: &str, detail: &str) {
        if self.verbosity == Verbosity::Quiet {
            return;
        }
        if detail.is_empty() {
            println!("  ok {}", label);
        } else {
            println!("  ok {}: {}", label, detail);
        }
    }

    fn failure(&self, label: &str, detail: &str) {
        eprintln!("  FAILED {}: {}", label, detail);
    }
}

/// One event captured by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Stage(String),
    Success(String, String),
    Failure(String, String),
}

/// Reporter that keeps every event, for tests.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Report>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Report> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Labels of every stage event, in order.
    pub fn stages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Report::Stage(label) => Some(label),
                _ => None,
            })
            .collect()
    }

    fn push(&self, report: Report) {
        if let Ok(mut events) = self.events.lock() {
            events.push(report);
        }
    }
}

impl Reporter for RecordingReporter {
    fn stage(&self, label: &str) {
        self.push(Report::Stage(label.to_string()));
    }

    fn success(&self, label: &str, detail: &str) {
        self.push(Report::Success(label.to_string(), detail.to_string()));
    }

    fn failure(&self, label: &str, detail: &str) {
        self.push(Report::Failure(label.to_string(), detail.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn format_list_prefixes() {
        assert_eq!(format_list(&["a", "b"], "- "), "- a\n- b");
    }

    #[test]
    fn redact_long_secret_caps_stars() {
        let masked = redact(&"x".repeat(40));
        assert_eq!(masked, "********** (40 chars)");
        assert!(!masked.contains('x'));
    }

    #[test]
    fn recording_reporter_keeps_order() {
        let r = RecordingReporter::new();
        r.stage("tag");
        r.success("tag", "");
        r.failure("push", "rejected");
        assert_eq!(
            r.events(),
            vec![
                Report::Stage("tag".into()),
                Report::Success("tag".into(), "".into()),
                Report::Failure("push".into(), "rejected".into()),
            ]
        );
        assert_eq!(r.stages(), vec!["tag"]);
    }
}
