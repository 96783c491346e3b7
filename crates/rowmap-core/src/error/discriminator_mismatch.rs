use super::Error;

/// Error when a row matches none of the cases of a discriminated model.
#[derive(Debug)]
pub(super) struct DiscriminatorMismatch {
    model: Box<str>,
}

impl std::error::Error for DiscriminatorMismatch {}

impl core::fmt::Display for DiscriminatorMismatch {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "no discriminator case matched for `{}`", self.model)
    }
}

impl Error {
    /// Creates a discriminator-mismatch error for the base model.
    pub fn discriminator_mismatch(model: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::DiscriminatorMismatch(
            DiscriminatorMismatch {
                model: model.into().into(),
            },
        ))
    }

    pub fn is_discriminator_mismatch(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::DiscriminatorMismatch(_)))
    }
}
