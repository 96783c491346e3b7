use super::{default::DefaultMapperBuilder, identity_plan, push_key, KeyColumns, Role};
use crate::{
    error_handler::CaptureErrors,
    plan::{FieldMapperFn, NodePlan, NodeSpec},
    DiscriminatorCase, MapperConfig,
};
use rowmap_core::{
    context::{KeyDefinitionId, SharedContextFactoryBuilder},
    schema::{ModelId, PropertyMeta, Step},
    ColumnDefinition, Error, FieldKey, Result,
};
use std::sync::Arc;

/// Builds a node whose model is chosen per row.
///
/// Every column is offered to the builder of each case. A column only has
/// to fit one of them: the cases that cannot map it leave it unmapped.
pub(crate) struct DiscriminatorMapperBuilder<S> {
    config: Arc<MapperConfig<S>>,
    model: ModelId,
    path: String,
    role: Role,
    contexts: SharedContextFactoryBuilder,
    key_definition: KeyDefinitionId,
    variants: Vec<(DiscriminatorCase<S>, DefaultMapperBuilder<S>)>,
    keys: Vec<FieldKey>,
}

impl<S: 'static> DiscriminatorMapperBuilder<S> {
    pub(crate) fn new(
        config: Arc<MapperConfig<S>>,
        model: ModelId,
        cases: Vec<DiscriminatorCase<S>>,
        path: String,
        role: Role,
        contexts: SharedContextFactoryBuilder,
    ) -> DiscriminatorMapperBuilder<S> {
        let key_definition = contexts.borrow_mut().key_definition(&path);
        let variants = cases
            .into_iter()
            .map(|case| {
                let builder = DefaultMapperBuilder::new(
                    config.clone(),
                    case.model,
                    path.clone(),
                    role,
                    contexts.clone(),
                );
                (case, builder)
            })
            .collect();

        DiscriminatorMapperBuilder {
            config,
            model,
            path,
            role,
            contexts,
            key_definition,
            variants,
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
        for (_, variant) in &mut self.variants {
            variant.push_mapper(mapper.clone());
        }
    }

    pub(crate) fn try_add(
        &mut self,
        key: &FieldKey,
        name: &str,
        definition: &ColumnDefinition<S>,
    ) -> Result<()> {
        self.broadcast(key, |variant| variant.try_add(key, name, definition))
    }

    pub(crate) fn add_steps(
        &mut self,
        key: &FieldKey,
        definition: &ColumnDefinition<S>,
        steps: &[Step],
    ) -> Result<()> {
        self.broadcast(key, |variant| variant.add_steps(key, definition, steps))
    }

    /// Forwards to the cases whose model can hold `property`.
    pub(crate) fn try_add_property(
        &mut self,
        key: &FieldKey,
        definition: &ColumnDefinition<S>,
        property: &PropertyMeta,
    ) -> Result<()> {
        let schema = self.config.schema.clone();
        self.broadcast(key, |variant| {
            if schema.is_assignable(variant.model(), property.owner) {
                variant.try_add_property(key, definition, property).map(Some)
            } else {
                Ok(None)
            }
        })
    }

    /// Offers a mapping to every case. Succeeds when at least one case took
    /// it; otherwise fails with the first case's reason.
    fn broadcast<R: Accepted>(
        &mut self,
        key: &FieldKey,
        mut f: impl FnMut(&mut DefaultMapperBuilder<S>) -> Result<R>,
    ) -> Result<()> {
        let mut captured = CaptureErrors::default();
        let mut accepted = false;

        for (_, variant) in &mut self.variants {
            match f(variant) {
                Ok(outcome) => accepted |= outcome.accepted(),
                Err(err) => captured.capture(err),
            }
        }

        if accepted {
            push_key(&mut self.keys, key);
            return Ok(());
        }

        let err = Error::no_compatible_builder(
            self.config.schema.model(self.model).name.as_str(),
            key.name(),
        );
        Err(match captured.into_first() {
            Some(cause) => cause.context(err),
            None => err,
        })
    }

    pub(crate) fn compile(self) -> Result<NodeSpec<S>> {
        let mut cases = Vec::with_capacity(self.variants.len());
        let mut declared: KeyColumns<S> = vec![];
        let mut columns: KeyColumns<S> = vec![];

        for (case, variant) in self.variants {
            let compiled = variant.compile_object()?;
            merge_columns(&mut declared, compiled.declared);
            merge_columns(&mut columns, compiled.columns);
            cases.push((case, compiled.plan));
        }

        let identity = identity_plan(self.role, declared, columns);
        if let Some(identity) = &identity {
            let keys: Vec<FieldKey> = identity.columns.iter().map(|(key, _)| key.clone()).collect();
            self.contexts.borrow_mut().add_keys(self.key_definition, &keys);
        }

        let name = self.config.schema.model(self.model).name.to_string();
        log::debug!("compiled discriminated `{name}` with {} case(s)", cases.len());

        Ok(NodeSpec {
            model: self.model,
            name,
            path: self.path,
            key_definition: self.key_definition,
            identity,
            plan: NodePlan::Discriminated(cases),
        })
    }
}

/// Outcome of offering a mapping to one case.
trait Accepted {
    fn accepted(&self) -> bool;
}

impl Accepted for () {
    fn accepted(&self) -> bool {
        true
    }
}

/// `None` when the case was skipped without being asked.
impl Accepted for Option<()> {
    fn accepted(&self) -> bool {
        self.is_some()
    }
}

/// Appends the columns whose key is not yet present. The first case to map
/// a key provides its reader.
fn merge_columns<S>(into: &mut KeyColumns<S>, columns: KeyColumns<S>) {
    for (key, reader) in columns {
        if !into.iter().any(|(existing, _)| *existing == key) {
            into.push((key, reader));
        }
    }
}
