use crate::{MappingSession, SourceFieldMapper};
use rowmap_core::{err, MappingContextFactory, Result, ValueRecord};
use std::{fmt, sync::Arc};

/// A type that can be built from a mapped record.
pub trait Load: Sized {
    /// Load an instance, populating fields from the given record.
    fn load(record: ValueRecord) -> Result<Self>;
}

/// A type that can be written out by a [`Writer`](crate::Writer).
pub trait Store {
    fn store(&self) -> ValueRecord;
}

/// A compiled mapping from rows of `S` to records of one model.
///
/// Cheap to clone and safe to share between threads; every mapping run
/// gets its own [`MappingSession`].
pub struct Mapper<S> {
    pub(crate) plan: Arc<SourceFieldMapper<S>>,
    pub(crate) contexts: MappingContextFactory,
}

impl<S> Mapper<S> {
    pub fn new(plan: SourceFieldMapper<S>, contexts: MappingContextFactory) -> Mapper<S> {
        Mapper {
            plan: Arc::new(plan),
            contexts,
        }
    }

    pub fn plan(&self) -> &SourceFieldMapper<S> {
        &self.plan
    }

    pub fn contexts(&self) -> &MappingContextFactory {
        &self.contexts
    }

    /// Starts a run over a sequence of rows.
    pub fn session(&self) -> MappingSession<S> {
        MappingSession::new(self)
    }

    /// Maps a single row on its own.
    pub fn map_row(&self, row: &S) -> Result<ValueRecord> {
        let mut session = self.session();
        session.push(row)?;
        session
            .finish()?
            .into_iter()
            .next()
            .ok_or_else(|| err!("row produced no object"))
    }

    /// Maps every row, merging rows that describe the same objects.
    pub fn map_all<'a, I>(&self, rows: I) -> Result<Vec<ValueRecord>>
    where
        I: IntoIterator<Item = &'a S>,
        S: 'a,
    {
        let mut session = self.session();
        for row in rows {
            session.push(row)?;
        }
        session.finish()
    }

    /// [`map_all`](Self::map_all), then loads every record as `T`.
    pub fn load_all<'a, T, I>(&self, rows: I) -> Result<Vec<T>>
    where
        T: Load,
        I: IntoIterator<Item = &'a S>,
        S: 'a,
    {
        self.map_all(rows)?.into_iter().map(T::load).collect()
    }
}

impl<S> Clone for Mapper<S> {
    fn clone(&self) -> Self {
        Mapper {
            plan: self.plan.clone(),
            contexts: self.contexts.clone(),
        }
    }
}

impl<S> fmt::Debug for Mapper<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("plan", &self.plan)
            .field("contexts", &self.contexts)
            .finish()
    }
}
