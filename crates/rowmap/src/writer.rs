//! Writes records out column by column, the reverse of a [`Mapper`].
//!
//! [`Mapper`]: crate::Mapper

use crate::{BuildErrorHandler, Rethrow, Store};
use rowmap_core::{
    err,
    schema::{CaseSensitivity, FinderOptions, ModelId, PropertyFinder, PropertyMeta, Step},
    setter::{PropertyMapping, SetterFactoryChain},
    ColumnDefinition, Error, FieldKey, Result, Schema, Setter, SetterFactory, Value, ValueRecord,
};
use std::{collections::HashMap, fmt, sync::Arc};

/// Builds a [`Writer`] for records of one model into sinks of type `W`.
pub struct WriterBuilder<W> {
    schema: Arc<Schema>,
    model: ModelId,
    setters: SetterFactoryChain<W>,
    options: FinderOptions,
    error_handler: Arc<dyn BuildErrorHandler>,

    /// One finder per model a column path passes through
    finders: HashMap<ModelId, PropertyFinder>,

    steps: Vec<WriteStep<W>>,
}

/// Writes the columns of a record, in the order they were added.
pub struct Writer<W> {
    steps: Arc<[WriteStep<W>]>,
}

struct WriteStep<W> {
    key: FieldKey,

    /// Path of the value from the root record
    path: Vec<Step>,

    setter: Setter<W>,
}

impl<W: 'static> WriterBuilder<W> {
    pub fn new(schema: Arc<Schema>, model: ModelId) -> WriterBuilder<W> {
        WriterBuilder {
            schema,
            model,
            setters: SetterFactoryChain::new(),
            options: FinderOptions::default(),
            error_handler: Arc::new(Rethrow),
            finders: HashMap::new(),
            steps: vec![],
        }
    }

    pub fn setter_factory(&mut self, factory: impl SetterFactory<W> + 'static) -> &mut Self {
        self.setters.push(Arc::new(factory));
        self
    }

    pub fn case_sensitive(&mut self, sensitive: bool) -> &mut Self {
        self.options.case = if sensitive {
            CaseSensitivity::Sensitive
        } else {
            CaseSensitivity::Insensitive
        };
        self
    }

    pub fn error_handler(&mut self, handler: Arc<dyn BuildErrorHandler>) -> &mut Self {
        handler.begin();
        self.error_handler = handler;
        self
    }

    /// Appends a column. Its value is read from the property the column
    /// name resolves to.
    pub fn add_column(
        &mut self,
        key: FieldKey,
        definition: ColumnDefinition<W>,
    ) -> Result<&mut Self> {
        if definition.is_ignored() {
            return Ok(self);
        }

        if let Err(err) = self.try_add(key, &definition) {
            self.error_handler.handle(err)?;
        }
        Ok(self)
    }

    /// Appends every key with no column definition of its own.
    pub fn columns(&mut self, keys: impl IntoIterator<Item = FieldKey>) -> Result<&mut Self> {
        for key in keys {
            self.add_column(key, ColumnDefinition::identity())?;
        }
        Ok(self)
    }

    pub fn keys(&self) -> Vec<FieldKey> {
        self.steps.iter().map(|step| step.key.clone()).collect()
    }

    pub fn writer(self) -> Result<Writer<W>> {
        self.error_handler.finish()?;
        Ok(Writer {
            steps: self.steps.into(),
        })
    }

    fn try_add(&mut self, key: FieldKey, definition: &ColumnDefinition<W>) -> Result<()> {
        let name = definition.renamed().unwrap_or(key.name()).to_string();
        let (path, property) = self.resolve(&name)?;

        let setter = match definition.appender() {
            Some(setter) => setter.clone(),
            None => {
                let mapping = PropertyMapping {
                    key: key.clone(),
                    property: property.clone(),
                };
                self.setters.new_setter(&mapping).ok_or_else(|| {
                    Error::accessor_not_found(format!(
                        "no appender for column `{key}` of type {}",
                        property.ty
                    ))
                })?
            }
        };

        self.steps.push(WriteStep { key, path, setter });
        Ok(())
    }

    /// Resolves `name` through as many nested models as it takes, returning
    /// the full path from the root record.
    fn resolve(&mut self, name: &str) -> Result<(Vec<Step>, Arc<PropertyMeta>)> {
        let mut model = self.model;
        let mut name = name.to_string();
        let mut path = vec![];

        loop {
            let finder = self.finders.entry(model).or_insert_with(|| {
                PropertyFinder::new(self.schema.clone(), model, self.options.clone())
            });
            let resolved = finder.find(&name)?;

            if resolved.property.has_element() {
                return Err(Error::accessor_not_found(format!(
                    "cannot write `{}`: list elements have no fixed column",
                    resolved.property.path
                )));
            }
            path.extend(resolved.property.steps());

            match (resolved.rest, resolved.property.ty.as_model()) {
                (None, _) => return Ok((path, resolved.property)),
                (Some(rest), Some(nested)) => {
                    model = nested;
                    name = rest;
                }
                (Some(rest), None) => {
                    return Err(Error::property_not_found(
                        self.schema.model(model).name.as_str(),
                        rest,
                    ))
                }
            }
        }
    }
}

impl<W> Writer<W> {
    /// Writes every column of `record` to `out`. Values missing from the
    /// record are written as null.
    pub fn write(&self, record: &ValueRecord, out: &mut W) -> Result<()> {
        let null = Value::Null;

        for step in self.steps.iter() {
            let value = record.entry(&step.path).unwrap_or(&null);
            step.setter
                .set(out, value)
                .map_err(|e| e.context(err!("column `{}`", step.key)))?;
        }

        Ok(())
    }

    pub fn write_value<T: Store>(&self, value: &T, out: &mut W) -> Result<()> {
        self.write(&value.store(), out)
    }

    pub fn keys(&self) -> Vec<FieldKey> {
        self.steps.iter().map(|step| step.key.clone()).collect()
    }
}

impl<W> Clone for Writer<W> {
    fn clone(&self) -> Self {
        Writer {
            steps: self.steps.clone(),
        }
    }
}

impl<W> fmt::Debug for Writer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("columns", &self.keys())
            .finish()
    }
}

impl<W: 'static> fmt::Debug for WriterBuilder<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterBuilder")
            .field("columns", &self.keys())
            .finish()
    }
}
