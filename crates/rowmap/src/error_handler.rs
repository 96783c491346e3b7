//! Policies for errors raised while a mapper is being built.

use rowmap_core::{Error, Result};
use std::sync::Mutex;

/// Decides what happens to a build error.
///
/// Builders hand every error they hit to [`handle`](Self::handle). Returning
/// the error aborts the build; returning `Ok` lets the build continue with
/// the offending column left unmapped. [`finish`](Self::finish) runs once
/// the plan is otherwise complete and can fail the build after the fact.
/// [`begin`](Self::begin) runs when a new top-level builder takes the
/// handler, so state left by an abandoned build does not leak into the
/// next one.
pub trait BuildErrorHandler: Send + Sync {
    fn begin(&self) {}

    fn handle(&self, err: Error) -> Result<()>;

    fn finish(&self) -> Result<()> {
        Ok(())
    }
}

/// Fails the build on the first error. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rethrow;

/// Records every error and fails the build once, at the end, with all of
/// them.
///
/// Recording starts over with each builder, so one handler serves one build
/// at a time.
#[derive(Debug, Default)]
pub struct CollectErrors {
    errors: Mutex<Vec<Error>>,
}

/// Logs errors and carries on.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreErrors;

/// Holds the errors of a discriminator broadcast, where a variant rejecting
/// a column is expected.
#[derive(Debug, Default)]
pub(crate) struct CaptureErrors {
    errors: Vec<Error>,
}

impl BuildErrorHandler for Rethrow {
    fn handle(&self, err: Error) -> Result<()> {
        Err(err)
    }
}

impl CollectErrors {
    pub fn new() -> CollectErrors {
        CollectErrors::default()
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> Vec<Error> {
        self.lock().clone()
    }

    /// `Ok` if nothing was recorded, otherwise all recorded errors in one.
    pub fn into_result(&self) -> Result<()> {
        let errors = std::mem::take(&mut *self.lock());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::collected(errors))
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Error>> {
        // A poisoned lock still holds a valid list.
        self.errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BuildErrorHandler for CollectErrors {
    fn begin(&self) {
        self.lock().clear();
    }

    fn handle(&self, err: Error) -> Result<()> {
        self.lock().push(err);
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        self.into_result()
    }
}

impl BuildErrorHandler for IgnoreErrors {
    fn handle(&self, err: Error) -> Result<()> {
        log::warn!("ignoring mapping error: {err}");
        Ok(())
    }
}

impl CaptureErrors {
    pub(crate) fn capture(&mut self, err: Error) {
        log::trace!("variant rejected mapping: {err}");
        self.errors.push(err);
    }

    /// The first captured error, if any.
    pub(crate) fn into_first(self) -> Option<Error> {
        self.errors.into_iter().next()
    }
}
