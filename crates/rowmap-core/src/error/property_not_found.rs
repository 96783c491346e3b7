use super::Error;

/// Error when a column name does not resolve to any property of the target
/// model.
#[derive(Debug)]
pub(super) struct PropertyNotFound {
    model: Box<str>,
    property: Box<str>,
}

impl std::error::Error for PropertyNotFound {}

impl core::fmt::Display for PropertyNotFound {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "property `{}` not found on `{}`",
            self.property, self.model
        )
    }
}

impl Error {
    /// Creates a property-not-found error for `property` on `model`.
    pub fn property_not_found(model: impl Into<String>, property: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::PropertyNotFound(PropertyNotFound {
            model: model.into().into(),
            property: property.into().into(),
        }))
    }

    /// Returns `true` if this error, or any error it wraps, is a
    /// property-not-found error.
    pub fn is_property_not_found(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::PropertyNotFound(_)))
    }
}
