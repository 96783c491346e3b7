use super::ModelId;
use crate::Type;
use std::{fmt, sync::Arc};

/// One navigation step from a value to a nested value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Field of a record, by index
    Field(usize),

    /// A new element appended to a list, one per distinct child identity
    Element,

    /// Fixed list position
    Index(usize),

    /// Map entry
    Key(String),
}

/// How a property reaches its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    /// Passed to the owner's constructor at this parameter position
    Constructor(usize),

    /// Assigned after the owner is constructed
    Setter,
}

/// A node of a model's property tree.
///
/// Nodes are created by a [`PropertyFinder`](super::PropertyFinder) and
/// shared: resolving the same path twice yields the same `Arc`.
#[derive(Debug)]
pub struct PropertyMeta {
    /// Step from the parent node (or the owner record) to this node
    pub step: Step,

    /// Type of the value at this node
    pub ty: Type,

    /// Whether the node accepts null
    pub nullable: bool,

    /// Model whose record the path starts from
    pub owner: ModelId,

    pub injection: Injection,

    pub parent: Option<Arc<PropertyMeta>>,

    /// Display path, e.g. `orders[].lines[2]`
    pub path: String,
}

impl PropertyMeta {
    /// Steps from the owner record to this node.
    pub fn steps(&self) -> Vec<Step> {
        let mut steps = vec![self.step.clone()];
        let mut current = self.parent.as_deref();

        while let Some(node) = current {
            steps.push(node.step.clone());
            current = node.parent.as_deref();
        }

        steps.reverse();
        steps
    }

    /// The owner field the path starts at.
    pub fn root_field(&self) -> usize {
        let mut node = self;
        while let Some(parent) = node.parent.as_deref() {
            node = parent;
        }
        match node.step {
            Step::Field(index) => index,
            // Paths always start at a field; the finder never creates others.
            _ => unreachable!("property path must start at a field"),
        }
    }

    /// True when this node is a sub-object: a record built by its own node
    /// of the mapping plan.
    pub fn is_object(&self) -> bool {
        self.ty.as_model().is_some()
    }

    pub fn is_element(&self) -> bool {
        matches!(self.step, Step::Element)
    }

    /// True when the path appends list elements somewhere along it.
    pub fn has_element(&self) -> bool {
        self.is_element() || self.parent.as_ref().is_some_and(|parent| parent.has_element())
    }
}

impl fmt::Display for PropertyMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
