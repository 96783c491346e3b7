//! CSV support for rowmap: rows of string cells in, lines of text out.
//!
//! The scanner that splits text into cells is not part of this crate. It
//! drives a [`CellConsumer`], which turns cells into rows for a
//! [`RowHandler`]. A [`MappingHandler`] maps those rows, taking column
//! names from the first one.

mod consumer;
pub use consumer::{CellConsumer, RowHandler, StringArrayConsumer};

mod getter;
pub use getter::CsvGetterFactory;

mod writer;
pub use writer::{write_all, write_header, CsvCellSetterFactory, CsvFormat, CsvLine};

use rowmap::{schema::ModelId, MapperFactory, MappingSession};
use rowmap_core::{FieldKey, Result, ValueRecord};

/// Keys for a header row, indexed by position.
pub fn header_keys(header: &[String]) -> Vec<FieldKey> {
    FieldKey::sequence(header.iter().map(|name| name.trim()))
}

/// Maps CSV rows into records of one model.
///
/// The first row is the header. Rows without any cell are skipped.
#[derive(Debug)]
pub struct MappingHandler {
    factory: MapperFactory<Vec<String>>,
    model: ModelId,
    keys: Vec<FieldKey>,
    session: Option<MappingSession<Vec<String>>>,
}

impl MappingHandler {
    pub fn new(factory: MapperFactory<Vec<String>>, model: ModelId) -> MappingHandler {
        MappingHandler {
            factory,
            model,
            keys: vec![],
            session: None,
        }
    }

    /// Column keys read from the header. Empty until the header is seen.
    pub fn keys(&self) -> &[FieldKey] {
        &self.keys
    }

    pub fn finish(self) -> Result<Vec<ValueRecord>> {
        match self.session {
            Some(session) => session.finish(),
            None => Ok(vec![]),
        }
    }
}

impl RowHandler for MappingHandler {
    fn handle(&mut self, row: Vec<String>) -> Result<()> {
        if let Some(session) = self.session.as_mut() {
            if !row.is_empty() {
                session.push(&row)?;
            }
            return Ok(());
        }

        self.keys = header_keys(&row);
        log::debug!("csv header: {:?}", self.keys);
        let mapper = self.factory.mapper(self.model, &self.keys)?;
        self.session = Some(mapper.session());
        Ok(())
    }
}
