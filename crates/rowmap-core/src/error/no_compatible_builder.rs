use super::Error;

/// Error when a discriminated builder has no variant that accepts a mapping.
#[derive(Debug)]
pub(super) struct NoCompatibleBuilder {
    model: Box<str>,
    column: Box<str>,
}

impl std::error::Error for NoCompatibleBuilder {}

impl core::fmt::Display for NoCompatibleBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "no builder of `{}` is compatible with `{}`",
            self.model, self.column
        )
    }
}

impl Error {
    /// Creates a no-compatible-builder error.
    pub fn no_compatible_builder(model: impl Into<String>, column: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::NoCompatibleBuilder(NoCompatibleBuilder {
            model: model.into().into(),
            column: column.into().into(),
        }))
    }

    pub fn is_no_compatible_builder(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::NoCompatibleBuilder(_)))
    }
}
