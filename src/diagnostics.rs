//! Diagnostics sink: routes messages to the logger and counts problems.
//!
//! Output goes through the `log` facade; where it lands (standard output or
//! a log file) is decided once when the logger is initialised.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Error,
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: usize,
    errors: usize,
}

/// Error count at some point in time, used to scope a success check.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint(usize);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, severity: Severity, msg: impl Display) {
        match severity {
            Severity::Normal => log::info!("{msg}"),
            Severity::Warning => {
                self.warnings += 1;
                log::warn!("{msg}");
            }
            Severity::Error => {
                self.errors += 1;
                log::error!("{msg}");
            }
        }
    }

    pub fn note(&mut self, msg: impl Display) {
        self.report(Severity::Normal, msg);
    }

    pub fn warn(&mut self, msg: impl Display) {
        self.report(Severity::Warning, msg);
    }

    pub fn error(&mut self, msg: impl Display) {
        self.report(Severity::Error, msg);
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.errors)
    }

    /// True when no error was recorded since `cp`. Warnings don't count.
    pub fn clean_since(&self, cp: Checkpoint) -> bool {
        self.errors == cp.0
    }
}

/// Clamp `value` into `[min, max]`, warning when it had to be moved.
pub fn clamp_range(
    diag: &mut Diagnostics,
    section: &str,
    key: &str,
    value: i64,
    min: i64,
    max: i64,
) -> i64 {
    if in_range(value, min, max) {
        return value;
    }
    let clamped = value.clamp(min, max);
    diag.warn(format_args!(
        "[{section}] {key}: {value} is outside [{min}, {max}], using {clamped}"
    ));
    clamped
}

/// Inclusive range predicate used by every range check.
pub fn in_range(value: i64, min: i64, max: i64) -> bool {
    (min..=max).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_warnings_and_errors_are_counted() {
        let mut d = Diagnostics::new();
        d.note("hello");
        d.warn("careful");
        d.error("broken");
        d.error("broken again");
        assert_eq!(d.warnings(), 1);
        assert_eq!(d.errors(), 2);
    }

    #[test]
    fn checkpoint_ignores_warnings() {
        let mut d = Diagnostics::new();
        d.error("before");
        let cp = d.checkpoint();
        d.warn("only a warning");
        assert!(d.clean_since(cp));
        d.error("now an error");
        assert!(!d.clean_since(cp));
    }

    #[test]
    fn light_values_are_clamped_with_warnings() {
        let mut d = Diagnostics::new();
        assert_eq!(clamp_range(&mut d, "Cell[0,0]", "Floor.Item[0].Light", -5, 0, 255), 0);
        assert_eq!(d.warnings(), 1);
        assert_eq!(clamp_range(&mut d, "Cell[0,0]", "Floor.Item[0].Light", 400, 0, 255), 255);
        assert_eq!(d.warnings(), 2);
        assert_eq!(clamp_range(&mut d, "Cell[0,0]", "Floor.Item[0].Light", 120, 0, 255), 120);
        assert_eq!(d.warnings(), 2);
        assert_eq!(d.errors(), 0);
    }
}
