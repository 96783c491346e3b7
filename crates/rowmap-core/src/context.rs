use crate::{value::IdentityValues, FieldKey};
use indexmap::IndexMap;
use std::{cell::RefCell, collections::HashMap, rc::Rc, sync::Arc};

/// Index of a node in a mapping session's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Identifies the identity key of one property path within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyDefinitionId(pub usize);

/// Key under which a built node is remembered.
///
/// Child identities are scoped to their parent node, so two parents with a
/// child carrying the same key values each get their own child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub definition: KeyDefinitionId,
    pub parent: Option<NodeId>,
    pub values: IdentityValues,
}

/// Identity cache of one mapping session.
#[derive(Debug, Default)]
pub struct MappingContext {
    identities: HashMap<IdentityKey, NodeId>,

    /// Position of the row being mapped
    row: usize,
}

#[derive(Debug, Clone)]
pub struct KeyDefinition {
    pub id: KeyDefinitionId,

    /// Property path the definition belongs to; empty for the root
    pub path: String,

    /// Columns making up the key
    pub keys: Vec<FieldKey>,
}

/// Hands out key definitions while a plan is compiled.
///
/// One builder is shared by every sub-builder of a plan, discriminator
/// variants included, so a path gets the same id whichever variant asks
/// for it.
#[derive(Debug, Default)]
pub struct MappingContextFactoryBuilder {
    definitions: IndexMap<String, KeyDefinition>,
}

pub type SharedContextFactoryBuilder = Rc<RefCell<MappingContextFactoryBuilder>>;

/// Creates one [`MappingContext`] per session.
#[derive(Debug, Clone)]
pub struct MappingContextFactory {
    definitions: Arc<[KeyDefinition]>,
}

impl MappingContext {
    pub fn new() -> MappingContext {
        MappingContext::default()
    }

    pub fn get(&self, key: &IdentityKey) -> Option<NodeId> {
        self.identities.get(key).copied()
    }

    pub fn insert(&mut self, key: IdentityKey, node: NodeId) {
        self.identities.insert(key, node);
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn set_row(&mut self, row: usize) {
        self.row = row;
    }

    /// Forgets every identity.
    pub fn clear(&mut self) {
        self.identities.clear();
        self.row = 0;
    }
}

impl MappingContextFactoryBuilder {
    pub fn new() -> MappingContextFactoryBuilder {
        MappingContextFactoryBuilder::default()
    }

    pub fn shared() -> SharedContextFactoryBuilder {
        Rc::new(RefCell::new(MappingContextFactoryBuilder::new()))
    }

    /// The key definition for `path`, created on first request.
    pub fn key_definition(&mut self, path: &str) -> KeyDefinitionId {
        let next = KeyDefinitionId(self.definitions.len());
        self.definitions
            .entry(path.to_string())
            .or_insert_with(|| KeyDefinition {
                id: next,
                path: path.to_string(),
                keys: vec![],
            })
            .id
    }

    /// Adds key columns to a definition, skipping ones already present.
    pub fn add_keys(&mut self, id: KeyDefinitionId, keys: &[FieldKey]) {
        if let Some((_, definition)) = self.definitions.get_index_mut(id.0) {
            for key in keys {
                if !definition.keys.contains(key) {
                    definition.keys.push(key.clone());
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn build(&self) -> MappingContextFactory {
        MappingContextFactory {
            definitions: self.definitions.values().cloned().collect(),
        }
    }
}

impl MappingContextFactory {
    pub fn new_context(&self) -> MappingContext {
        MappingContext::with_capacity(self.definitions.len())
    }

    pub fn definition(&self, id: KeyDefinitionId) -> Option<&KeyDefinition> {
        self.definitions.get(id.0)
    }

    pub fn definitions(&self) -> &[KeyDefinition] {
        &self.definitions
    }
}

impl MappingContext {
    fn with_capacity(capacity: usize) -> MappingContext {
        MappingContext {
            identities: HashMap::with_capacity(capacity),
            row: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::IdentityValue;

    #[test]
    fn same_path_same_id() {
        let shared = MappingContextFactoryBuilder::shared();
        let a = shared.borrow_mut().key_definition("orders[]");
        let b = shared.clone().borrow_mut().key_definition("orders[]");
        let root = shared.borrow_mut().key_definition("");

        assert_eq!(a, b);
        assert_ne!(a, root);
        assert_eq!(shared.borrow().len(), 2);
    }

    #[test]
    fn contexts_are_independent() {
        let mut builder = MappingContextFactoryBuilder::new();
        let id = builder.key_definition("");
        builder.add_keys(id, &[FieldKey::new("id", 0)]);
        let factory = builder.build();

        assert_eq!(factory.definition(id).unwrap().keys.len(), 1);

        let key = IdentityKey {
            definition: id,
            parent: None,
            values: vec![IdentityValue::I64(1)],
        };

        let mut first = factory.new_context();
        first.insert(key.clone(), NodeId(0));

        let second = factory.new_context();
        assert_eq!(first.get(&key), Some(NodeId(0)));
        assert_eq!(second.get(&key), None);
    }
}
