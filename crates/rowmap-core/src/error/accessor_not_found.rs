use super::Error;

/// Error when no getter or setter can be produced for a key.
#[derive(Debug)]
pub(super) struct AccessorNotFound {
    message: Box<str>,
}

impl std::error::Error for AccessorNotFound {}

impl core::fmt::Display for AccessorNotFound {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "accessor not found: {}", self.message)
    }
}

impl Error {
    /// Creates an accessor-not-found error.
    pub fn accessor_not_found(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::AccessorNotFound(AccessorNotFound {
            message: message.into().into(),
        }))
    }

    pub fn is_accessor_not_found(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::AccessorNotFound(_)))
    }
}
