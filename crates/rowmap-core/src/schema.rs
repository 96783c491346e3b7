mod builder;
pub use builder::{Builder, ModelBuilder};

mod field;
pub use field::{Field, FieldId};

mod finder;
pub use finder::{CaseSensitivity, FinderOptions, PropertyFinder, Resolved};

mod model;
pub use model::{Model, ModelId};

mod name;
pub use name::Name;

mod property;
pub use property::{Injection, PropertyMeta, Step};

mod verify;

use indexmap::IndexMap;

/// The set of models that rows are mapped onto.
#[derive(Debug, Default)]
pub struct Schema {
    pub models: IndexMap<ModelId, Model>,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Get a model by ID
    pub fn model(&self, id: impl Into<ModelId>) -> &Model {
        let id = id.into();
        self.models.get(&id).expect("invalid model ID")
    }

    pub fn model_by_name(&self, name: &str) -> Option<&Model> {
        self.models.values().find(|model| model.name.as_str() == name)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// Returns `true` if `sub` is `base` or inherits from it.
    pub fn is_assignable(&self, sub: ModelId, base: ModelId) -> bool {
        let mut current = Some(sub);

        // Inheritance is acyclic once the schema is built, the bound is a
        // guard against hand-assembled schemas.
        for _ in 0..=self.models.len() {
            match current {
                Some(id) if id == base => return true,
                Some(id) => current = self.models.get(&id).and_then(|model| model.parent),
                None => return false,
            }
        }

        false
    }

    /// Models assignable to `base`, excluding `base` itself, in declaration
    /// order.
    pub fn sub_models(&self, base: ModelId) -> Vec<ModelId> {
        self.models
            .keys()
            .copied()
            .filter(|id| *id != base && self.is_assignable(*id, base))
            .collect()
    }
}
