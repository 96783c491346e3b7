use crate::error_handler::{BuildErrorHandler, Rethrow};
use indexmap::IndexMap;
use rowmap_core::{
    getter::GetterFactoryChain,
    schema::{CaseSensitivity, FinderOptions, ModelId},
    ColumnDefinition, Converters, FieldKey, Schema,
};
use std::{fmt, sync::Arc};

type Predicate<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// Selects `model` for rows matching the predicate.
pub struct DiscriminatorCase<S> {
    pub model: ModelId,
    predicate: Predicate<S>,
}

/// Everything a mapper build needs besides the columns themselves.
///
/// Created by [`MapperFactory::builder`](crate::MapperFactory::builder) and
/// immutable afterwards.
pub struct MapperConfig<S> {
    pub(crate) schema: Arc<Schema>,
    pub(crate) getters: GetterFactoryChain<S>,
    pub(crate) converters: Converters,
    pub(crate) columns: Vec<ColumnRule<S>>,
    pub(crate) discriminators: IndexMap<ModelId, Vec<DiscriminatorCase<S>>>,
    pub(crate) case: CaseSensitivity,
    pub(crate) max_depth: usize,
    pub(crate) max_index: usize,
    pub(crate) error_handler: Arc<dyn BuildErrorHandler>,
}

pub(crate) struct ColumnRule<S> {
    pub(crate) matcher: ColumnMatcher,
    pub(crate) definition: ColumnDefinition<S>,
}

#[derive(Clone)]
pub(crate) enum ColumnMatcher {
    Name(String),
    Predicate(Arc<dyn Fn(&FieldKey) -> bool + Send + Sync>),
}

impl<S> DiscriminatorCase<S> {
    pub fn new(
        model: ModelId,
        predicate: impl Fn(&S) -> bool + Send + Sync + 'static,
    ) -> DiscriminatorCase<S> {
        DiscriminatorCase {
            model,
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, row: &S) -> bool {
        (self.predicate)(row)
    }
}

impl<S> MapperConfig<S> {
    pub(crate) fn new(schema: Arc<Schema>) -> MapperConfig<S> {
        MapperConfig {
            schema,
            getters: GetterFactoryChain::new(),
            converters: Converters::new(),
            columns: vec![],
            discriminators: IndexMap::new(),
            case: CaseSensitivity::default(),
            max_depth: FinderOptions::default().max_depth,
            max_index: FinderOptions::default().max_index,
            error_handler: Arc::new(Rethrow),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn case(&self) -> CaseSensitivity {
        self.case
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_index(&self) -> usize {
        self.max_index
    }

    pub fn error_handler(&self) -> &Arc<dyn BuildErrorHandler> {
        &self.error_handler
    }

    /// Discriminator cases configured for `model`, in declaration order.
    pub fn discriminator(&self, model: ModelId) -> Option<&[DiscriminatorCase<S>]> {
        self.discriminators.get(&model).map(Vec::as_slice)
    }

    /// The same configuration with a different error handler.
    pub fn with_error_handler(&self, handler: Arc<dyn BuildErrorHandler>) -> MapperConfig<S> {
        MapperConfig {
            error_handler: handler,
            ..self.clone()
        }
    }

    /// Every configured definition that applies to `key`, composed in
    /// registration order.
    pub fn column_definition(&self, key: &FieldKey) -> ColumnDefinition<S> {
        self.columns
            .iter()
            .filter(|rule| rule.matcher.matches(key, self.case))
            .fold(ColumnDefinition::identity(), |acc, rule| {
                acc.compose(&rule.definition)
            })
    }

    pub(crate) fn finder_options(&self) -> FinderOptions {
        FinderOptions {
            case: self.case,
            max_depth: self.max_depth,
            max_index: self.max_index,
            variants: self
                .discriminators
                .iter()
                .map(|(base, cases)| (*base, cases.iter().map(|case| case.model).collect()))
                .collect(),
        }
    }
}

impl ColumnMatcher {
    fn matches(&self, key: &FieldKey, case: CaseSensitivity) -> bool {
        match self {
            ColumnMatcher::Name(name) => match case {
                CaseSensitivity::Sensitive => key.name() == name,
                CaseSensitivity::Insensitive => key.name().eq_ignore_ascii_case(name),
            },
            ColumnMatcher::Predicate(predicate) => predicate(key),
        }
    }
}

impl<S> Clone for DiscriminatorCase<S> {
    fn clone(&self) -> Self {
        DiscriminatorCase {
            model: self.model,
            predicate: self.predicate.clone(),
        }
    }
}

impl<S> Clone for ColumnRule<S> {
    fn clone(&self) -> Self {
        ColumnRule {
            matcher: self.matcher.clone(),
            definition: self.definition.clone(),
        }
    }
}

impl<S> Clone for MapperConfig<S> {
    fn clone(&self) -> Self {
        MapperConfig {
            schema: self.schema.clone(),
            getters: self.getters.clone(),
            converters: self.converters.clone(),
            columns: self.columns.clone(),
            discriminators: self.discriminators.clone(),
            case: self.case,
            max_depth: self.max_depth,
            max_index: self.max_index,
            error_handler: self.error_handler.clone(),
        }
    }
}

impl<S> fmt::Debug for DiscriminatorCase<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscriminatorCase")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl<S> fmt::Debug for MapperConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperConfig")
            .field("case", &self.case)
            .field("max_depth", &self.max_depth)
            .field("max_index", &self.max_index)
            .field("columns", &self.columns.len())
            .field("discriminators", &self.discriminators)
            .finish_non_exhaustive()
    }
}
