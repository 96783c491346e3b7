//! Compiled mapping plans.
//!
//! A plan is a tree of [`NodeSpec`]s, one per object the mapping builds:
//! the root, every embedded sub-object and every appended list element. A
//! node carries the steps that populate its record and, when it can be
//! shared across rows, the columns that identify it.

mod instantiator;
pub(crate) use instantiator::{GenericBuilder, Instantiation, Param};

use crate::config::DiscriminatorCase;
use rowmap_core::{
    context::KeyDefinitionId,
    convert::Converter,
    schema::{ModelId, Step},
    setter::PropertySetter,
    value::{IdentityValue, IdentityValues},
    ContextualGetter, Error, FieldKey, MappingContext, Result, Value, ValueRecord,
};
use std::{fmt, sync::Arc};

/// A user supplied step, run on a newly built record after the generated
/// field mappers.
pub type FieldMapperFn<S> =
    Arc<dyn Fn(&S, &mut ValueRecord, &MappingContext) -> Result<()> + Send + Sync>;

/// An immutable mapping plan for one (source, model) pair.
pub struct SourceFieldMapper<S> {
    pub(crate) root: NodeSpec<S>,
}

pub(crate) struct NodeSpec<S> {
    /// Model this node builds; the base model when discriminated
    pub(crate) model: ModelId,
    pub(crate) name: String,

    pub(crate) path: String,

    pub(crate) key_definition: KeyDefinitionId,

    /// Columns identifying the node across rows
    pub(crate) identity: Option<IdentityPlan<S>>,

    pub(crate) plan: NodePlan<S>,
}

pub(crate) enum NodePlan<S> {
    Object(Arc<ObjectPlan<S>>),

    /// Cases are tried in order, the first match builds the node
    Discriminated(Vec<(DiscriminatorCase<S>, Arc<ObjectPlan<S>>)>),
}

pub(crate) struct ObjectPlan<S> {
    pub(crate) model: ModelId,
    pub(crate) name: String,

    /// Number of fields in the model's record
    pub(crate) len: usize,

    pub(crate) instantiation: Instantiation,

    /// Leaf mappings, in the order their columns were added
    pub(crate) fields: Vec<FieldMapper<S>>,

    /// Sub-objects, in order of first appearance
    pub(crate) children: Vec<ChildPlan<S>>,

    pub(crate) extra: Vec<FieldMapperFn<S>>,
}

/// Read a column, convert it if needed, store it in the record.
pub(crate) struct FieldMapper<S> {
    pub(crate) key: FieldKey,
    pub(crate) path: String,
    pub(crate) reader: FieldReader<S>,

    /// Where the value goes, relative to the node's record
    pub(crate) slot: Vec<Step>,

    /// Replaces the assignment to `slot`
    pub(crate) setter: Option<PropertySetter>,

    pub(crate) nullable: bool,

    /// Used when the column reads as null
    pub(crate) default: Option<Value>,
}

pub(crate) struct FieldReader<S> {
    pub(crate) getter: ContextualGetter<S>,
    pub(crate) converter: Option<Arc<dyn Converter>>,
}

pub(crate) struct ChildPlan<S> {
    /// For elements, the list the element is appended to
    pub(crate) slot: Vec<Step>,

    pub(crate) kind: ChildKind,

    pub(crate) spec: NodeSpec<S>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChildKind {
    /// Built with its parent, at most once per parent
    Inline { nullable: bool },

    /// Appended to a list, once per distinct identity
    Element,
}

pub(crate) struct IdentityPlan<S> {
    pub(crate) columns: Vec<(FieldKey, FieldReader<S>)>,
}

impl<S> SourceFieldMapper<S> {
    /// Model of the objects the plan produces.
    pub fn model(&self) -> ModelId {
        self.root.model
    }

    /// Whether rows pick the root model through a discriminator.
    pub fn is_discriminated(&self) -> bool {
        matches!(self.root.plan, NodePlan::Discriminated(_))
    }
}

impl<S> NodePlan<S> {
    pub(crate) fn variant(&self, index: usize) -> &Arc<ObjectPlan<S>> {
        match self {
            NodePlan::Object(plan) => plan,
            NodePlan::Discriminated(cases) => &cases[index].1,
        }
    }

    /// Index of the variant that builds `row`.
    pub(crate) fn select(&self, row: &S, model_name: &str) -> Result<usize> {
        match self {
            NodePlan::Object(_) => Ok(0),
            NodePlan::Discriminated(cases) => cases
                .iter()
                .position(|(case, _)| case.matches(row))
                .ok_or_else(|| Error::discriminator_mismatch(model_name)),
        }
    }
}

impl<S> FieldReader<S> {
    pub(crate) fn read(&self, row: &S, cx: &MappingContext) -> Result<Value> {
        let value = self.getter.get(row, cx)?;
        match &self.converter {
            Some(converter) => converter.convert(value, cx),
            None => Ok(value),
        }
    }
}

impl<S> IdentityPlan<S> {
    /// The identity tuple of `row`, or `None` when every column is null.
    pub(crate) fn read(&self, row: &S, cx: &MappingContext) -> Result<Option<IdentityValues>> {
        let mut values = Vec::with_capacity(self.columns.len());
        for (key, reader) in &self.columns {
            let value = reader
                .read(row, cx)
                .map_err(|err| err.context(rowmap_core::err!("identity column `{key}`")))?;
            values.push(IdentityValue::from(&value));
        }

        if values.iter().all(IdentityValue::is_null) {
            Ok(None)
        } else {
            Ok(Some(values))
        }
    }
}

impl<S> Clone for FieldReader<S> {
    fn clone(&self) -> Self {
        FieldReader {
            getter: self.getter.clone(),
            converter: self.converter.clone(),
        }
    }
}

impl<S> fmt::Debug for SourceFieldMapper<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFieldMapper")
            .field("root", &self.root)
            .finish()
    }
}

impl<S> fmt::Debug for NodeSpec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identity: Option<Vec<&FieldKey>> = self
            .identity
            .as_ref()
            .map(|identity| identity.columns.iter().map(|(key, _)| key).collect());

        let mut s = f.debug_struct("NodeSpec");
        s.field("path", &self.path).field("identity", &identity);
        match &self.plan {
            NodePlan::Object(plan) => s.field("object", plan),
            NodePlan::Discriminated(cases) => s.field(
                "cases",
                &cases.iter().map(|(_, plan)| plan).collect::<Vec<_>>(),
            ),
        };
        s.finish()
    }
}

impl<S> fmt::Debug for ObjectPlan<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPlan")
            .field("model", &self.name)
            .field("instantiation", &self.instantiation)
            .field(
                "fields",
                &self
                    .fields
                    .iter()
                    .map(|field| (&field.key, &field.path))
                    .collect::<Vec<_>>(),
            )
            .field(
                "children",
                &self
                    .children
                    .iter()
                    .map(|child| (child.kind, &child.spec))
                    .collect::<Vec<_>>(),
            )
            .field("extra", &self.extra.len())
            .finish()
    }
}
