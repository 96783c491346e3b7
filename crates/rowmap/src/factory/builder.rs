use super::MapperFactory;
use crate::{
    config::{ColumnMatcher, ColumnRule},
    BuildErrorHandler, DiscriminatorCase, MapperConfig,
};
use rowmap_core::{
    schema::{CaseSensitivity, ModelId},
    ColumnDefinition, Converter, Error, FieldKey, GetterFactory, Result, Schema, Type,
};
use std::sync::Arc;

/// Configures a [`MapperFactory`].
pub struct Builder<S> {
    config: MapperConfig<S>,
}

impl<S: 'static> Builder<S> {
    pub(crate) fn new(schema: Arc<Schema>) -> Builder<S> {
        Builder {
            config: MapperConfig::new(schema),
        }
    }

    /// Adds a getter factory. Factories are asked in the order they were
    /// added.
    pub fn getter_factory(&mut self, factory: impl GetterFactory<S> + 'static) -> &mut Self {
        self.config.getters.push(Arc::new(factory));
        self
    }

    /// Registers a conversion, preferred over the built-in ones.
    pub fn converter(
        &mut self,
        from: Type,
        to: Type,
        converter: impl Converter + 'static,
    ) -> &mut Self {
        self.config.converters.register(from, to, Arc::new(converter));
        self
    }

    /// Applies `definition` to every column named `name`.
    pub fn column(
        &mut self,
        name: impl Into<String>,
        definition: ColumnDefinition<S>,
    ) -> &mut Self {
        self.config.columns.push(ColumnRule {
            matcher: ColumnMatcher::Name(name.into()),
            definition,
        });
        self
    }

    /// Applies `definition` to every column matching `predicate`.
    pub fn column_matching(
        &mut self,
        predicate: impl Fn(&FieldKey) -> bool + Send + Sync + 'static,
        definition: ColumnDefinition<S>,
    ) -> &mut Self {
        self.config.columns.push(ColumnRule {
            matcher: ColumnMatcher::Predicate(Arc::new(predicate)),
            definition,
        });
        self
    }

    /// Picks the model of `base` per row, wherever `base` is built. Cases
    /// are tried in order.
    pub fn discriminator(
        &mut self,
        base: ModelId,
        cases: impl IntoIterator<Item = DiscriminatorCase<S>>,
    ) -> &mut Self {
        self.config
            .discriminators
            .entry(base)
            .or_default()
            .extend(cases);
        self
    }

    pub fn case_sensitive(&mut self, sensitive: bool) -> &mut Self {
        self.config.case = if sensitive {
            CaseSensitivity::Sensitive
        } else {
            CaseSensitivity::Insensitive
        };
        self
    }

    /// Longest property path a column may resolve to.
    pub fn max_depth(&mut self, depth: usize) -> &mut Self {
        self.config.max_depth = depth;
        self
    }

    /// Largest list position a column such as `tags[4]` may address.
    pub fn max_index(&mut self, index: usize) -> &mut Self {
        self.config.max_index = index;
        self
    }

    pub fn error_handler(&mut self, handler: Arc<dyn BuildErrorHandler>) -> &mut Self {
        self.config.error_handler = handler;
        self
    }

    pub fn build(&mut self) -> Result<MapperFactory<S>> {
        let config = self.config.clone();
        verify_discriminators(&config)?;

        Ok(MapperFactory {
            config: Arc::new(config),
        })
    }
}

fn verify_discriminators<S>(config: &MapperConfig<S>) -> Result<()> {
    let schema = &config.schema;

    for (base, cases) in &config.discriminators {
        let base_model = schema.model(*base);

        if cases.is_empty() {
            return Err(Error::invalid_schema(format!(
                "discriminator of `{}` has no cases",
                base_model.name
            )));
        }

        for case in cases {
            if !schema.is_assignable(case.model, *base) {
                return Err(Error::invalid_schema(format!(
                    "discriminator case `{}` is not a subtype of `{}`",
                    schema.model(case.model).name,
                    base_model.name
                )));
            }
        }
    }

    Ok(())
}
