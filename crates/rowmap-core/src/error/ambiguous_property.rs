use super::Error;

/// Error when a column name resolves to more than one property and no
/// column configuration picks one.
#[derive(Debug)]
pub(super) struct AmbiguousProperty {
    model: Box<str>,
    property: Box<str>,
    candidates: Vec<String>,
}

impl std::error::Error for AmbiguousProperty {}

impl core::fmt::Display for AmbiguousProperty {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "property `{}` is ambiguous on `{}`; candidates: {}",
            self.property,
            self.model,
            self.candidates.join(", ")
        )
    }
}

impl Error {
    /// Creates an ambiguous-property error listing every candidate path.
    pub fn ambiguous_property(
        model: impl Into<String>,
        property: impl Into<String>,
        candidates: Vec<String>,
    ) -> Error {
        Error::from(super::ErrorKind::AmbiguousProperty(AmbiguousProperty {
            model: model.into().into(),
            property: property.into().into(),
            candidates,
        }))
    }

    /// Returns `true` if this error, or any error it wraps, is an
    /// ambiguous-property error.
    pub fn is_ambiguous_property(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::AmbiguousProperty(_)))
    }
}
