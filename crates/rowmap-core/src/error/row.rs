use super::Error;

/// Marks the zero-based position of the row whose mapping failed.
#[derive(Debug)]
pub(super) struct RowError {
    position: usize,
}

impl std::error::Error for RowError {}

impl core::fmt::Display for RowError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "row {}", self.position)
    }
}

impl Error {
    /// Wraps `cause` with the position of the failing row.
    pub fn row(position: usize, cause: Error) -> Error {
        cause.context(Error::from(super::ErrorKind::Row(RowError { position })))
    }

    /// Position of the failing row, if this error carries one.
    pub fn row_position(&self) -> Option<usize> {
        self.chain().find_map(|err| match err.kind() {
            super::ErrorKind::Row(row) => Some(row.position),
            _ => None,
        })
    }
}
