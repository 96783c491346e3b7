mod builder;
pub use builder::Builder;

use crate::{BuildErrorHandler, Mapper, MapperBuilder, MapperConfig, SourceMapperBuilder};
use rowmap_core::{schema::ModelId, ColumnDefinition, FieldKey, Result, Schema};
use std::sync::Arc;

/// Entry point for building mappers from rows of `S`.
///
/// Holds the configuration shared by every mapper it builds: getter
/// factories, conversions, column definitions and discriminators.
///
/// ```
/// # use rowmap::{MapperFactory, FieldKey, ValueRow, Value};
/// # use rowmap_core::{schema::Schema, source::ValueRowGetterFactory, Type};
/// let mut schema = Schema::builder();
/// let person = schema.declare("Person");
/// schema.model(person).field("id", Type::I64).field("name", Type::String);
/// let schema = schema.build().unwrap();
///
/// let factory = MapperFactory::<ValueRow>::builder(schema)
///     .getter_factory(ValueRowGetterFactory)
///     .build()
///     .unwrap();
///
/// let keys = FieldKey::sequence(["id", "name"]);
/// let mapper = factory.mapper(person, &keys).unwrap();
///
/// let row = ValueRow::new(keys.into(), vec![Value::I64(1), "Ann".into()]);
/// let record = mapper.map_row(&row).unwrap();
/// assert_eq!(record[1], Value::from("Ann"));
/// ```
pub struct MapperFactory<S> {
    config: Arc<MapperConfig<S>>,
}

impl<S: 'static> MapperFactory<S> {
    pub fn builder(schema: Arc<Schema>) -> Builder<S> {
        Builder::new(schema)
    }

    pub fn config(&self) -> &Arc<MapperConfig<S>> {
        &self.config
    }

    /// A builder for mapping rows onto `model`.
    pub fn new_builder(&self, model: ModelId) -> MapperBuilder<S> {
        MapperBuilder::new(self.config.clone(), model)
    }

    /// The same factory reporting build errors to `handler`.
    pub fn with_error_handler(&self, handler: Arc<dyn BuildErrorHandler>) -> MapperFactory<S> {
        MapperFactory {
            config: Arc::new(self.config.with_error_handler(handler)),
        }
    }

    /// Builds a mapper for `keys`, each column resolved by name.
    pub fn mapper(&self, model: ModelId, keys: &[FieldKey]) -> Result<Mapper<S>> {
        let mut builder = self.new_builder(model);
        for key in keys {
            builder.add_mapping(key.clone(), ColumnDefinition::identity())?;
        }
        builder.mapper()
    }
}

impl<S> Clone for MapperFactory<S> {
    fn clone(&self) -> Self {
        MapperFactory {
            config: self.config.clone(),
        }
    }
}

impl<S> std::fmt::Debug for MapperFactory<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperFactory")
            .field("config", &self.config)
            .finish()
    }
}
