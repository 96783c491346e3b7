use super::Error;

/// Error when a required constructor parameter has no mapped source.
#[derive(Debug)]
pub(super) struct MissingConstructorArgument {
    model: Box<str>,
    param: Box<str>,
}

impl std::error::Error for MissingConstructorArgument {}

impl core::fmt::Display for MissingConstructorArgument {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "constructor argument `{}` of `{}` is not mapped",
            self.param, self.model
        )
    }
}

impl Error {
    /// Creates a missing-constructor-argument error.
    pub fn missing_constructor_argument(
        model: impl Into<String>,
        param: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::MissingConstructorArgument(
            MissingConstructorArgument {
                model: model.into().into(),
                param: param.into().into(),
            },
        ))
    }

    pub fn is_missing_constructor_argument(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::MissingConstructorArgument(_)))
    }
}
