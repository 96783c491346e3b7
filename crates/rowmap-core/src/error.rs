mod accessor_not_found;
mod adhoc;
mod ambiguous_property;
mod build_errors;
mod custom_field;
mod discriminator_mismatch;
mod driver_operation_failed;
mod invalid_schema;
mod missing_constructor_argument;
mod no_compatible_builder;
mod property_not_found;
mod row;
mod type_conversion;

use accessor_not_found::AccessorNotFound;
use adhoc::AdhocError;
use ambiguous_property::AmbiguousProperty;
use build_errors::BuildErrors;
use custom_field::CustomFieldError;
use discriminator_mismatch::DiscriminatorMismatch;
use driver_operation_failed::DriverOperationFailed;
use invalid_schema::InvalidSchema;
use missing_constructor_argument::MissingConstructorArgument;
use no_compatible_builder::NoCompatibleBuilder;
use property_not_found::PropertyNotFound;
use row::RowError;
use std::sync::Arc;
use type_conversion::TypeConversionError;

/// Returns early with an ad-hoc [`Error`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Builds an ad-hoc [`Error`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error raised while compiling or executing a mapping plan.
///
/// The error is a single pointer wide. Errors form a chain: [`Error::context`]
/// wraps an existing error with a higher level one, and `Display` prints the
/// chain from the outermost context down to the root cause.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added context
    /// is shown first, followed by earlier context, ending with the root cause.
    #[inline(always)]
    pub fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let kind_only = consequent
            .inner
            .as_ref()
            .map(|inner| inner.cause.is_none())
            .unwrap_or(false);

        let mut err = consequent;

        // A consequent that already carries a cause (or is shared) is kept
        // intact and the new cause hangs off a fresh adhoc link instead.
        let slot = if kind_only {
            err.inner.as_mut().and_then(Arc::get_mut)
        } else {
            None
        };

        match slot {
            Some(inner) => {
                inner.cause = Some(self);
                err
            }
            None => Error {
                inner: Some(Arc::new(ErrorInner {
                    kind: ErrorKind::Adhoc(AdhocError::new(err.to_string())),
                    cause: Some(self),
                })),
            },
        }
    }

    /// Iterates the chain, starting with `self` and ending with the root cause.
    pub fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    /// The innermost error in the chain.
    pub fn root_cause(&self) -> &Error {
        let mut root = self;
        for err in self.chain() {
            root = err;
        }
        root
    }

    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }

    fn any_kind(&self, f: impl Fn(&ErrorKind) -> bool) -> bool {
        self.chain().any(|err| f(err.kind()))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => self
                .inner
                .as_ref()
                .and_then(|inner| inner.cause.as_ref())
                .map(|cause| cause as &(dyn std::error::Error + 'static)),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f.debug_struct("Error").field("kind", &"None").finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    PropertyNotFound(PropertyNotFound),
    AmbiguousProperty(AmbiguousProperty),
    AccessorNotFound(AccessorNotFound),
    MissingConstructorArgument(MissingConstructorArgument),
    NoCompatibleBuilder(NoCompatibleBuilder),
    CustomField(CustomFieldError),
    DiscriminatorMismatch(DiscriminatorMismatch),
    DriverOperationFailed(DriverOperationFailed),
    TypeConversion(TypeConversionError),
    InvalidSchema(InvalidSchema),
    Row(RowError),
    BuildErrors(BuildErrors),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            PropertyNotFound(err) => core::fmt::Display::fmt(err, f),
            AmbiguousProperty(err) => core::fmt::Display::fmt(err, f),
            AccessorNotFound(err) => core::fmt::Display::fmt(err, f),
            MissingConstructorArgument(err) => core::fmt::Display::fmt(err, f),
            NoCompatibleBuilder(err) => core::fmt::Display::fmt(err, f),
            CustomField(err) => core::fmt::Display::fmt(err, f),
            DiscriminatorMismatch(err) => core::fmt::Display::fmt(err, f),
            DriverOperationFailed(err) => core::fmt::Display::fmt(err, f),
            TypeConversion(err) => core::fmt::Display::fmt(err, f),
            InvalidSchema(err) => core::fmt::Display::fmt(err, f),
            Row(err) => core::fmt::Display::fmt(err, f),
            BuildErrors(err) => core::fmt::Display::fmt(err, f),
            Unknown => f.write_str("unknown rowmap error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause: None })),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

impl From<core::fmt::Error> for Error {
    fn from(err: core::fmt::Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

/// Trait for types that can be converted into an Error.
pub trait IntoError {
    /// Converts this type into an Error.
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}
