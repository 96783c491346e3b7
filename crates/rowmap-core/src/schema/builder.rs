use super::{verify, Field, Model, ModelId, Name, Schema};
use crate::{Error, Result, Type};
use indexmap::IndexMap;
use std::sync::Arc;

/// Assembles a [`Schema`].
///
/// Models are declared first so fields can refer to models defined later:
///
/// ```
/// # use rowmap_core::{Schema, Type};
/// let mut builder = Schema::builder();
/// let person = builder.declare("Person");
/// let address = builder.declare("Address");
///
/// builder
///     .model(person)
///     .field("id", Type::I64)
///     .field("address", address)
///     .constructor(&["id"]);
/// builder.model(address).field("city", Type::String);
///
/// let schema = builder.build().unwrap();
/// assert!(schema.model(person).has_constructor());
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    models: IndexMap<ModelId, ModelBuilder>,
}

#[derive(Debug)]
pub struct ModelBuilder {
    id: ModelId,
    name: String,
    fields: Vec<(String, Type, bool)>,
    constructor: Vec<String>,
    parent: Option<ModelId>,
}

impl Builder {
    /// Reserves an id for the model named `name`. Declaring the same name
    /// twice returns the same id.
    pub fn declare(&mut self, name: &str) -> ModelId {
        if let Some(existing) = self.models.values().find(|model| model.name == name) {
            return existing.id;
        }

        let id = ModelId(self.models.len());
        self.models.insert(
            id,
            ModelBuilder {
                id,
                name: name.to_string(),
                fields: vec![],
                constructor: vec![],
                parent: None,
            },
        );
        id
    }

    /// The definition of a declared model.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by [`Builder::declare`].
    pub fn model(&mut self, id: ModelId) -> &mut ModelBuilder {
        self.models.get_mut(&id).expect("model not declared")
    }

    pub fn build(&self) -> Result<Arc<Schema>> {
        let mut schema = Schema::default();

        for def in self.models.values() {
            let fields: Vec<Field> = def
                .fields
                .iter()
                .enumerate()
                .map(|(index, (name, ty, nullable))| Field {
                    id: def.id.field(index),
                    name: Name::new(name),
                    ty: ty.clone(),
                    nullable: *nullable,
                })
                .collect();

            let mut constructor = Vec::with_capacity(def.constructor.len());
            for param in &def.constructor {
                let index = fields
                    .iter()
                    .position(|field| field.name.as_str() == param)
                    .ok_or_else(|| {
                        Error::invalid_schema(format!(
                            "constructor of `{}` names unknown field `{}`",
                            def.name, param
                        ))
                    })?;

                if constructor.contains(&index) {
                    return Err(Error::invalid_schema(format!(
                        "constructor of `{}` lists `{}` twice",
                        def.name, param
                    )));
                }
                constructor.push(index);
            }

            schema.models.insert(
                def.id,
                Model {
                    id: def.id,
                    name: Name::new(&def.name),
                    fields,
                    constructor,
                    parent: def.parent,
                },
            );
        }

        verify::verify(&schema)?;

        Ok(Arc::new(schema))
    }
}

impl ModelBuilder {
    /// Adds a non-nullable field.
    pub fn field(&mut self, name: &str, ty: impl Into<Type>) -> &mut Self {
        self.fields.push((name.to_string(), ty.into(), false));
        self
    }

    pub fn nullable_field(&mut self, name: &str, ty: impl Into<Type>) -> &mut Self {
        self.fields.push((name.to_string(), ty.into(), true));
        self
    }

    /// Sets the constructor parameters, by field name, in parameter order.
    pub fn constructor(&mut self, params: &[&str]) -> &mut Self {
        self.constructor = params.iter().map(|param| param.to_string()).collect();
        self
    }

    /// Declares this model as a subtype of `parent`.
    pub fn extends(&mut self, parent: ModelId) -> &mut Self {
        self.parent = Some(parent);
        self
    }
}
