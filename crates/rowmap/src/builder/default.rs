use super::{child_path, identity_plan, push_key, KeyColumns, Node, Role};
use crate::{
    plan::{
        ChildKind, ChildPlan, FieldMapper, FieldMapperFn, FieldReader, Instantiation, NodePlan,
        NodeSpec, ObjectPlan, Param,
    },
    MapperConfig,
};
use by_address::ByAddress;
use indexmap::{map::Entry, IndexMap};
use rowmap_core::{
    context::{KeyDefinitionId, SharedContextFactoryBuilder},
    schema::{ModelId, PropertyFinder, PropertyMeta, Step},
    setter::PropertySetter,
    ColumnDefinition, Error, FieldKey, GetterFactory, Result, Value,
};
use std::sync::Arc;

/// Builds the plan of one object node of a single, known model.
pub(crate) struct DefaultMapperBuilder<S> {
    config: Arc<MapperConfig<S>>,
    model: ModelId,

    /// Property path from the root of the plan
    path: String,

    role: Role,
    finder: PropertyFinder,
    contexts: SharedContextFactoryBuilder,
    key_definition: KeyDefinitionId,

    /// Leaf mappings, in the order they were added
    fields: Vec<FieldMapping<S>>,

    /// Sub-object builders, by the property they populate
    children: IndexMap<ByAddress<Arc<PropertyMeta>>, Node<S>>,

    extra: Vec<FieldMapperFn<S>>,
    keys: Vec<FieldKey>,
}

struct FieldMapping<S> {
    key: FieldKey,
    property: Arc<PropertyMeta>,
    reader: FieldReader<S>,
    setter: Option<PropertySetter>,
    default: Option<Value>,
    is_key: bool,
}

/// An object plan before identity columns are chosen.
pub(crate) struct CompiledObject<S> {
    pub(crate) plan: Arc<ObjectPlan<S>>,

    /// Columns flagged as keys
    pub(crate) declared: KeyColumns<S>,

    /// Every leaf column
    pub(crate) columns: KeyColumns<S>,
}

impl<S: 'static> DefaultMapperBuilder<S> {
    pub(crate) fn new(
        config: Arc<MapperConfig<S>>,
        model: ModelId,
        path: String,
        role: Role,
        contexts: SharedContextFactoryBuilder,
    ) -> DefaultMapperBuilder<S> {
        let finder = PropertyFinder::new(config.schema.clone(), model, config.finder_options());
        let key_definition = contexts.borrow_mut().key_definition(&path);

        DefaultMapperBuilder {
            config,
            model,
            path,
            role,
            finder,
            contexts,
            key_definition,
            fields: vec![],
            children: IndexMap::new(),
            extra: vec![],
            keys: vec![],
        }
    }

    pub(crate) fn model(&self) -> ModelId {
        self.model
    }

    pub(crate) fn keys(&self) -> Vec<FieldKey> {
        self.keys.clone()
    }

    pub(crate) fn push_mapper(&mut self, mapper: FieldMapperFn<S>) {
        self.extra.push(mapper);
    }

    pub(crate) fn try_add(
        &mut self,
        key: &FieldKey,
        name: &str,
        definition: &ColumnDefinition<S>,
    ) -> Result<()> {
        let resolved = self.finder.find(name)?;

        match resolved.rest {
            Some(rest) => self.nested(key, resolved.property, |child| {
                child.try_add(key, &rest, definition)
            }),
            None => self.leaf(key, definition, resolved.property),
        }
    }

    pub(crate) fn try_add_property(
        &mut self,
        key: &FieldKey,
        definition: &ColumnDefinition<S>,
        property: &PropertyMeta,
    ) -> Result<()> {
        let schema = &self.config.schema;
        if !schema.is_assignable(self.model, property.owner) {
            return Err(Error::no_compatible_builder(
                schema.model(self.model).name.as_str(),
                key.name(),
            ));
        }

        self.add_steps(key, definition, &property.steps())
    }

    /// Maps `key` onto the property at `steps`, handing the part below the
    /// first sub-object to that sub-object's builder.
    pub(crate) fn add_steps(
        &mut self,
        key: &FieldKey,
        definition: &ColumnDefinition<S>,
        steps: &[Step],
    ) -> Result<()> {
        for split in 1..steps.len() {
            let node = self.finder.intern(&steps[..split])?;
            if node.is_object() {
                return self.nested(key, node, |child| {
                    child.add_steps(key, definition, &steps[split..])
                });
            }
        }

        let property = self.finder.intern(steps)?;
        self.leaf(key, definition, property)
    }

    /// Runs `f` against the builder of the sub-object at `property`,
    /// creating it on first use. A builder created for a mapping that then
    /// fails is discarded.
    fn nested(
        &mut self,
        key: &FieldKey,
        property: Arc<PropertyMeta>,
        f: impl FnOnce(&mut Node<S>) -> Result<()>,
    ) -> Result<()> {
        let Some(model) = property.ty.as_model() else {
            return Err(Error::property_not_found(
                self.config.schema.model(self.model).name.as_str(),
                key.name(),
            ));
        };

        let slot = ByAddress(property.clone());
        let mut created = false;
        let child = match self.children.entry(slot.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                created = true;
                let role = if property.is_element() {
                    Role::Element
                } else {
                    Role::Inline
                };
                entry.insert(Node::new(
                    self.config.clone(),
                    model,
                    child_path(&self.path, &property),
                    role,
                    self.contexts.clone(),
                ))
            }
        };

        let result = f(child);

        match result {
            Ok(()) => {
                self.finder.mark_mapped(&property);
                push_key(&mut self.keys, key);
                Ok(())
            }
            Err(err) => {
                if created {
                    self.children.shift_remove(&slot);
                }
                Err(err)
            }
        }
    }

    fn leaf(
        &mut self,
        key: &FieldKey,
        definition: &ColumnDefinition<S>,
        property: Arc<PropertyMeta>,
    ) -> Result<()> {
        let reader = self.reader(key, definition, &property)?;

        self.finder.mark_mapped(&property);
        push_key(&mut self.keys, key);
        self.fields.push(FieldMapping {
            key: key.clone(),
            property,
            reader,
            setter: definition.custom_setter().cloned(),
            default: definition.default_value().cloned(),
            is_key: definition.is_key(),
        });
        Ok(())
    }

    /// Picks the getter for `key` and, when its type differs from the
    /// property's, the conversion between the two.
    fn reader(
        &self,
        key: &FieldKey,
        definition: &ColumnDefinition<S>,
        property: &PropertyMeta,
    ) -> Result<FieldReader<S>> {
        let getter = match definition.custom_getter() {
            Some(getter) => getter.clone(),
            None => self
                .config
                .getters
                .new_getter(&property.ty, key)
                .ok_or_else(|| {
                    Error::accessor_not_found(format!(
                        "no getter for column `{key}` of type {}",
                        property.ty
                    ))
                })?,
        };

        let converter = match definition.converter() {
            Some(converter) => Some(converter.clone()),
            None if getter.ty() == &property.ty || property.ty.is_any() => None,
            None => Some(
                self.config
                    .converters
                    .find(getter.ty(), &property.ty)
                    .ok_or_else(|| {
                        Error::accessor_not_found(format!(
                            "no conversion from {} to {} for column `{key}`",
                            getter.ty(),
                            property.ty
                        ))
                    })?,
            ),
        };

        Ok(FieldReader { getter, converter })
    }

    pub(crate) fn compile(self) -> Result<NodeSpec<S>> {
        let model = self.model;
        let name = self.config.schema.model(model).name.to_string();
        let path = self.path.clone();
        let role = self.role;
        let key_definition = self.key_definition;
        let contexts = self.contexts.clone();

        let compiled = self.compile_object()?;
        let identity = identity_plan(role, compiled.declared, compiled.columns);

        if let Some(identity) = &identity {
            let keys: Vec<FieldKey> = identity.columns.iter().map(|(key, _)| key.clone()).collect();
            contexts.borrow_mut().add_keys(key_definition, &keys);
        }

        Ok(NodeSpec {
            model,
            name,
            path,
            key_definition,
            identity,
            plan: NodePlan::Object(compiled.plan),
        })
    }

    pub(crate) fn compile_object(self) -> Result<CompiledObject<S>> {
        let schema = self.config.schema.clone();
        let model = schema.model(self.model);

        for param in self.finder.missing_constructor_params() {
            self.config
                .error_handler
                .handle(Error::missing_constructor_argument(model.name.as_str(), param))?;
        }

        let instantiation = if model.has_constructor() {
            Instantiation::Deferred {
                params: model
                    .constructor
                    .iter()
                    .map(|&field| Param {
                        field,
                        name: model.fields[field].name.to_string(),
                        nullable: model.fields[field].nullable,
                    })
                    .collect(),
            }
        } else {
            Instantiation::Direct
        };

        let mut declared = vec![];
        let mut columns = vec![];
        let mut fields = Vec::with_capacity(self.fields.len());

        for mapping in self.fields {
            if mapping.is_key {
                declared.push((mapping.key.clone(), mapping.reader.clone()));
            }
            columns.push((mapping.key.clone(), mapping.reader.clone()));

            fields.push(FieldMapper {
                key: mapping.key,
                path: mapping.property.path.clone(),
                reader: mapping.reader,
                slot: mapping.property.steps(),
                setter: mapping.setter,
                nullable: mapping.property.nullable,
                default: mapping.default,
            });
        }

        let mut children = Vec::with_capacity(self.children.len());
        for (ByAddress(property), child) in self.children {
            let mut slot = property.steps();
            let kind = if property.is_element() {
                slot.pop();
                ChildKind::Element
            } else {
                ChildKind::Inline {
                    nullable: property.nullable,
                }
            };

            children.push(ChildPlan {
                slot,
                kind,
                spec: child.compile()?,
            });
        }

        log::debug!(
            "compiled `{}` at `{}`: {} field mapper(s), {} child node(s)",
            model.name,
            if self.path.is_empty() { "<root>" } else { &self.path },
            fields.len(),
            children.len()
        );

        Ok(CompiledObject {
            plan: Arc::new(ObjectPlan {
                model: self.model,
                name: model.name.to_string(),
                len: model.fields.len(),
                instantiation,
                fields,
                children,
                extra: self.extra,
            }),
            declared,
            columns,
        })
    }
}
