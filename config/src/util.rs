//! Helpers for collecting several validation errors before failing.

use error_stack::{Context, Report};

/// Accumulates reports so that every problem is shown at once.
#[derive(Debug)]
pub struct Emitter<C: Context> {
    report: Option<Report<C>>,
}

impl<C: Context> Default for Emitter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Context> Emitter<C> {
    /// Empty emitter.
    pub const fn new() -> Self {
        Self { report: None }
    }

    /// Record a problem.
    pub fn emit(&mut self, report: Report<C>) {
        match &mut self.report {
            Some(existing) => existing.extend_one(report),
            None => self.report = Some(report),
        }
    }

    /// Fail with every recorded problem, if any.
    pub fn into_result(self) -> error_stack::Result<(), C> {
        self.report.map_or(Ok(()), Err)
    }
}

/// Shorthand for forwarding a failed result into an [`Emitter`].
pub trait EmitterResultExt<T, C: Context> {
    /// Return the value, or emit the error and return `None`.
    fn ok_or_emit(self, emitter: &mut Emitter<C>) -> Option<T>;
}

impl<T, C: Context> EmitterResultExt<T, C> for error_stack::Result<T, C> {
    fn ok_or_emit(self, emitter: &mut Emitter<C>) -> Option<T> {
        self.map_err(|report| emitter.emit(report)).ok()
    }
}
