use super::Error;

/// Error when a user-supplied field mapper cannot be added.
#[derive(Debug)]
pub(super) struct CustomFieldError {
    key: Box<str>,
    message: Box<str>,
}

impl std::error::Error for CustomFieldError {}

impl core::fmt::Display for CustomFieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "custom field mapper for `{}`: {}", self.key, self.message)
    }
}

impl Error {
    /// Creates a custom-field error for the given key.
    pub fn custom_field(key: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::CustomField(CustomFieldError {
            key: key.into().into(),
            message: message.into().into(),
        }))
    }

    pub fn is_custom_field(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::CustomField(_)))
    }
}
