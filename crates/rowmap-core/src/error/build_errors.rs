use super::Error;

/// Every error collected while building a mapper under a collecting policy.
#[derive(Debug)]
pub(super) struct BuildErrors {
    errors: Vec<Error>,
}

impl std::error::Error for BuildErrors {}

impl core::fmt::Display for BuildErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{} mapping errors: ", self.errors.len())?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            core::fmt::Display::fmt(err, f)?;
        }
        Ok(())
    }
}

impl Error {
    /// Bundles several build errors into one.
    pub fn collected(errors: Vec<Error>) -> Error {
        Error::from(super::ErrorKind::BuildErrors(BuildErrors { errors }))
    }

    /// The bundled errors, or an empty slice when this is not a bundle.
    pub fn collected_errors(&self) -> &[Error] {
        match self.kind() {
            super::ErrorKind::BuildErrors(bundle) => &bundle.errors,
            _ => &[],
        }
    }

    pub fn is_collected(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::BuildErrors(_))
    }
}
