//! Compiles column mappings into a [`SourceFieldMapper`].
//!
//! A [`MapperBuilder`] owns a tree of node builders, one per object the plan
//! will construct. Columns are resolved against the root model; a column
//! whose path continues into a sub-object is handed to that sub-object's
//! builder with the remainder of its name. Models with discriminator cases
//! get one builder per case.

mod default;
pub(crate) use default::DefaultMapperBuilder;

mod discriminator;
pub(crate) use discriminator::DiscriminatorMapperBuilder;

use crate::{
    plan::{FieldMapperFn, FieldReader, IdentityPlan, NodeSpec},
    Mapper, MapperConfig, SourceFieldMapper,
};
use rowmap_core::{
    context::SharedContextFactoryBuilder,
    schema::{ModelId, PropertyMeta, Step},
    ColumnDefinition, FieldKey, MappingContextFactoryBuilder, Result,
};
use std::sync::Arc;

/// Incrementally describes how the columns of a source map onto a model.
pub trait SourceMapperBuilder<S> {
    /// Maps the column `key`, resolving its name against the model.
    ///
    /// Errors are passed to the configured
    /// [`BuildErrorHandler`](crate::BuildErrorHandler); the call only fails
    /// when the handler does.
    fn add_mapping(&mut self, key: FieldKey, definition: ColumnDefinition<S>) -> Result<&mut Self>;

    /// Maps the column `key` onto an already resolved property.
    fn add_property_mapping(
        &mut self,
        key: FieldKey,
        definition: ColumnDefinition<S>,
        property: Arc<PropertyMeta>,
    ) -> Result<&mut Self>;

    /// Adds a step that runs on every newly built root object after the
    /// column mappings.
    fn add_mapper(&mut self, mapper: FieldMapperFn<S>) -> &mut Self;

    /// Columns mapped so far, in the order they were added.
    fn keys(&self) -> Vec<FieldKey>;

    /// Freezes the plan.
    fn source_field_mapper(self) -> Result<SourceFieldMapper<S>>
    where
        Self: Sized;

    /// Freezes the plan together with the identity keys it needs.
    fn mapper(self) -> Result<Mapper<S>>
    where
        Self: Sized;
}

/// Builds a [`Mapper`] for one model and one kind of source row.
pub struct MapperBuilder<S> {
    config: Arc<MapperConfig<S>>,
    contexts: SharedContextFactoryBuilder,
    root: Node<S>,
}

/// What a node contributes to its identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// Deduplicated across the session by its declared key columns
    Root,

    /// Deduplicated within its parent, by its declared key columns or else
    /// by all of its columns
    Element,

    /// Built once per parent, never looked up
    Inline,
}

pub(crate) enum Node<S> {
    Default(Box<DefaultMapperBuilder<S>>),
    Discriminator(DiscriminatorMapperBuilder<S>),
}

impl<S: 'static> MapperBuilder<S> {
    pub fn new(config: Arc<MapperConfig<S>>, model: ModelId) -> MapperBuilder<S> {
        config.error_handler.begin();
        let contexts = MappingContextFactoryBuilder::shared();
        let root = Node::new(config.clone(), model, String::new(), Role::Root, contexts.clone());

        MapperBuilder {
            config,
            contexts,
            root,
        }
    }

    pub fn model(&self) -> ModelId {
        self.root.model()
    }

    pub fn config(&self) -> &Arc<MapperConfig<S>> {
        &self.config
    }

    /// Chaining form of [`add_mapping`](SourceMapperBuilder::add_mapping)
    /// for a column with no definition of its own.
    pub fn column(&mut self, key: FieldKey) -> Result<&mut Self> {
        self.add_mapping(key, ColumnDefinition::identity())
    }

    /// Maps every key, in order.
    pub fn columns(&mut self, keys: impl IntoIterator<Item = FieldKey>) -> Result<&mut Self> {
        for key in keys {
            self.column(key)?;
        }
        Ok(self)
    }

    fn definition(&self, key: &FieldKey, definition: &ColumnDefinition<S>) -> ColumnDefinition<S> {
        self.config.column_definition(key).compose(definition)
    }
}

impl<S: 'static> SourceMapperBuilder<S> for MapperBuilder<S> {
    fn add_mapping(&mut self, key: FieldKey, definition: ColumnDefinition<S>) -> Result<&mut Self> {
        let definition = self.definition(&key, &definition);
        if definition.is_ignored() {
            return Ok(self);
        }

        let name = definition.renamed().unwrap_or(key.name()).to_string();
        if let Err(err) = self.root.try_add(&key, &name, &definition) {
            self.config.error_handler.handle(err)?;
        }
        Ok(self)
    }

    fn add_property_mapping(
        &mut self,
        key: FieldKey,
        definition: ColumnDefinition<S>,
        property: Arc<PropertyMeta>,
    ) -> Result<&mut Self> {
        let definition = self.definition(&key, &definition);
        if definition.is_ignored() {
            return Ok(self);
        }

        if let Err(err) = self.root.try_add_property(&key, &definition, &property) {
            self.config.error_handler.handle(err)?;
        }
        Ok(self)
    }

    fn add_mapper(&mut self, mapper: FieldMapperFn<S>) -> &mut Self {
        self.root.push_mapper(mapper);
        self
    }

    fn keys(&self) -> Vec<FieldKey> {
        self.root.keys()
    }

    fn source_field_mapper(self) -> Result<SourceFieldMapper<S>> {
        let root = self.root.compile()?;
        self.config.error_handler.finish()?;
        Ok(SourceFieldMapper { root })
    }

    fn mapper(self) -> Result<Mapper<S>> {
        let contexts = self.contexts.clone();
        let plan = self.source_field_mapper()?;
        let factory = contexts.borrow().build();
        Ok(Mapper::new(plan, factory))
    }
}

impl<S: 'static> Node<S> {
    pub(crate) fn new(
        config: Arc<MapperConfig<S>>,
        model: ModelId,
        path: String,
        role: Role,
        contexts: SharedContextFactoryBuilder,
    ) -> Node<S> {
        match config.discriminator(model) {
            Some(cases) => {
                let cases = cases.to_vec();
                Node::Discriminator(DiscriminatorMapperBuilder::new(
                    config, model, cases, path, role, contexts,
                ))
            }
            None => Node::Default(Box::new(DefaultMapperBuilder::new(
                config, model, path, role, contexts,
            ))),
        }
    }

    pub(crate) fn model(&self) -> ModelId {
        match self {
            Node::Default(builder) => builder.model(),
            Node::Discriminator(builder) => builder.model(),
        }
    }

    pub(crate) fn try_add(
        &mut self,
        key: &FieldKey,
        name: &str,
        definition: &ColumnDefinition<S>,
    ) -> Result<()> {
        match self {
            Node::Default(builder) => builder.try_add(key, name, definition),
            Node::Discriminator(builder) => builder.try_add(key, name, definition),
        }
    }

    pub(crate) fn try_add_property(
        &mut self,
        key: &FieldKey,
        definition: &ColumnDefinition<S>,
        property: &PropertyMeta,
    ) -> Result<()> {
        match self {
            Node::Default(builder) => builder.try_add_property(key, definition, property),
            Node::Discriminator(builder) => builder.try_add_property(key, definition, property),
        }
    }

    pub(crate) fn add_steps(
        &mut self,
        key: &FieldKey,
        definition: &ColumnDefinition<S>,
        steps: &[Step],
    ) -> Result<()> {
        match self {
            Node::Default(builder) => builder.add_steps(key, definition, steps),
            Node::Discriminator(builder) => builder.add_steps(key, definition, steps),
        }
    }

    pub(crate) fn push_mapper(&mut self, mapper: FieldMapperFn<S>) {
        match self {
            Node::Default(builder) => builder.push_mapper(mapper),
            Node::Discriminator(builder) => builder.push_mapper(mapper),
        }
    }

    pub(crate) fn keys(&self) -> Vec<FieldKey> {
        match self {
            Node::Default(builder) => builder.keys(),
            Node::Discriminator(builder) => builder.keys(),
        }
    }

    pub(crate) fn compile(self) -> Result<NodeSpec<S>> {
        match self {
            Node::Default(builder) => builder.compile(),
            Node::Discriminator(builder) => builder.compile(),
        }
    }
}

pub(crate) type KeyColumns<S> = Vec<(FieldKey, FieldReader<S>)>;

/// Picks the columns identifying a node.
pub(crate) fn identity_plan<S>(
    role: Role,
    declared: KeyColumns<S>,
    columns: KeyColumns<S>,
) -> Option<IdentityPlan<S>> {
    let columns = match role {
        Role::Inline => return None,
        Role::Root => declared,
        Role::Element if declared.is_empty() => columns,
        Role::Element => declared,
    };

    if columns.is_empty() {
        None
    } else {
        Some(IdentityPlan { columns })
    }
}

/// Appends `key` unless an equal key is already present.
pub(crate) fn push_key(keys: &mut Vec<FieldKey>, key: &FieldKey) {
    if !keys.contains(key) {
        keys.push(key.clone());
    }
}

/// Property path of a node nested under `parent`.
pub(crate) fn child_path(parent: &str, property: &PropertyMeta) -> String {
    if parent.is_empty() {
        property.path.clone()
    } else {
        format!("{parent}.{}", property.path)
    }
}
