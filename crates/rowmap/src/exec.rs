use crate::{
    plan::{ChildKind, GenericBuilder, NodeSpec, ObjectPlan, SourceFieldMapper},
    Mapper,
};
use rowmap_core::{
    context::{IdentityKey, KeyDefinitionId, NodeId},
    err,
    value::IdentityValues,
    Error, MappingContext, Result, Value, ValueRecord,
};
use std::{fmt, sync::Arc};

/// Maps a sequence of rows, merging the rows that describe the same
/// objects.
///
/// Each row is processed in two passes. The first reads every column,
/// evaluates discriminators and looks up identities without touching the
/// session. The second registers the new objects. A row that fails in the
/// first pass leaves the session as it was.
///
/// Objects are kept in an arena until [`finish`](Self::finish) assembles
/// them into records.
pub struct MappingSession<S> {
    plan: Arc<SourceFieldMapper<S>>,
    cx: MappingContext,
    nodes: Vec<Node<S>>,

    /// Root objects, in order of first appearance
    roots: Vec<NodeId>,

    /// Position of the next row
    position: usize,
}

struct Node<S> {
    /// Plan of the variant that built the node
    plan: Arc<ObjectPlan<S>>,
    record: ValueRecord,

    /// One entry per child of the plan
    children: Vec<ChildState>,
}

#[derive(Debug)]
enum ChildState {
    Absent,
    Inline(NodeId),
    List(Vec<NodeId>),
}

/// The effect of one row on one node, computed before anything is stored.
enum Pending<S> {
    Existing {
        id: NodeId,
        children: Vec<Option<Pending<S>>>,
    },
    New {
        definition: KeyDefinitionId,
        key: Option<IdentityValues>,
        plan: Arc<ObjectPlan<S>>,
        record: ValueRecord,
        children: Vec<Option<Pending<S>>>,
    },
}

/// Where the node being evaluated hangs.
#[derive(Debug, Clone, Copy)]
enum Parent {
    Root,
    Existing(NodeId),

    /// Created by the current row; its children cannot have been seen yet
    New,
}

impl<S> MappingSession<S> {
    pub(crate) fn new(mapper: &Mapper<S>) -> MappingSession<S> {
        MappingSession {
            plan: mapper.plan.clone(),
            cx: mapper.contexts.new_context(),
            nodes: vec![],
            roots: vec![],
            position: 0,
        }
    }

    /// Maps one row.
    ///
    /// Errors are wrapped with the position of the row; the position
    /// advances whether or not the row succeeded.
    pub fn push(&mut self, row: &S) -> Result<()> {
        let position = self.position;
        self.position += 1;
        self.cx.set_row(position);

        let plan = self.plan.clone();
        let pending = self
            .evaluate(&plan.root, row, Parent::Root, None)
            .map_err(|err| Error::row(position, err))?;

        if let Some(pending) = pending {
            let (id, created) = self.commit(pending, None);
            if created {
                self.roots.push(id);
            }
        }

        Ok(())
    }

    /// Number of root objects so far.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of rows pushed so far, failed ones included.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn context(&self) -> &MappingContext {
        &self.cx
    }

    /// Assembles the root objects.
    pub fn finish(self) -> Result<Vec<ValueRecord>> {
        let MappingSession {
            mut nodes, roots, ..
        } = self;

        roots
            .into_iter()
            .map(|id| materialize(&mut nodes, id))
            .collect()
    }

    fn evaluate(
        &self,
        spec: &NodeSpec<S>,
        row: &S,
        parent: Parent,
        kind: Option<ChildKind>,
    ) -> Result<Option<Pending<S>>> {
        let key = match &spec.identity {
            Some(identity) => match identity.read(row, &self.cx)? {
                Some(values) => Some(values),
                // Outer join without a match.
                None if kind == Some(ChildKind::Element) => return Ok(None),
                None => None,
            },
            None => None,
        };

        if let Some(values) = &key {
            let scope = match parent {
                Parent::Root => Some(None),
                Parent::Existing(id) => Some(Some(id)),
                Parent::New => None,
            };

            if let Some(scope) = scope {
                let identity = IdentityKey {
                    definition: spec.key_definition,
                    parent: scope,
                    values: values.clone(),
                };

                if let Some(id) = self.cx.get(&identity) {
                    log::trace!(
                        "row {}: reusing `{}` node {} at `{}`",
                        self.cx.row(),
                        spec.name,
                        id.0,
                        spec.path
                    );
                    return self.existing(id, row).map(Some);
                }
            }
        }

        let variant = spec.plan.select(row, &spec.name)?;
        let plan = spec.plan.variant(variant).clone();

        let mut values = Vec::with_capacity(plan.fields.len());
        for field in &plan.fields {
            let value = field
                .reader
                .read(row, &self.cx)
                .map_err(|err| err.context(err!("column `{}`", field.key)))?;
            values.push(value);
        }

        let children = plan
            .children
            .iter()
            .map(|child| self.evaluate(&child.spec, row, Parent::New, Some(child.kind)))
            .collect::<Result<Vec<_>>>()?;

        if kind == Some(ChildKind::Inline { nullable: true })
            && values.iter().all(Value::is_null)
            && children.iter().all(Option::is_none)
        {
            return Ok(None);
        }

        let record = self.instantiate(&plan, row, values)?;

        Ok(Some(Pending::New {
            definition: spec.key_definition,
            key,
            plan,
            record,
            children,
        }))
    }

    /// Evaluates the children of an already built node. Its own fields are
    /// left as they are.
    fn existing(&self, id: NodeId, row: &S) -> Result<Pending<S>> {
        let node = &self.nodes[id.0];
        let mut children = Vec::with_capacity(node.children.len());

        for (child, state) in node.plan.children.iter().zip(&node.children) {
            let pending = match state {
                ChildState::Inline(child_id) => Some(self.existing(*child_id, row)?),
                ChildState::Absent => None,
                ChildState::List(_) => {
                    self.evaluate(&child.spec, row, Parent::Existing(id), Some(child.kind))?
                }
            };
            children.push(pending);
        }

        Ok(Pending::Existing { id, children })
    }

    fn instantiate(
        &self,
        plan: &ObjectPlan<S>,
        row: &S,
        values: Vec<Value>,
    ) -> Result<ValueRecord> {
        let mut builder =
            GenericBuilder::new(plan.model, &plan.name, plan.len, &plan.instantiation);

        for (field, value) in plan.fields.iter().zip(values) {
            let value = match (value, &field.default) {
                (Value::Null, Some(default)) => default.clone(),
                (value, _) => value,
            };

            if value.is_null() && !field.nullable {
                return Err(
                    Error::type_conversion(&value, format!("non-nullable `{}`", field.path))
                        .context(err!("column `{}`", field.key)),
                );
            }

            match &field.setter {
                Some(setter) => builder.deliver_with(&field.slot, setter, value)?,
                None => builder.deliver(&field.slot, value)?,
            }
        }

        // Children are attached when the session finishes; until then their
        // slots hold placeholders.
        for child in &plan.children {
            let placeholder = match child.kind {
                ChildKind::Element => Value::List(vec![]),
                ChildKind::Inline { .. } => Value::Null,
            };
            builder.deliver(&child.slot, placeholder)?;
        }

        let mut record = builder.build()?;
        for mapper in &plan.extra {
            mapper(row, &mut record, &self.cx)?;
        }

        Ok(record)
    }

    fn commit(&mut self, pending: Pending<S>, parent: Option<NodeId>) -> (NodeId, bool) {
        match pending {
            Pending::Existing { id, children } => {
                self.commit_children(id, children);
                (id, false)
            }
            Pending::New {
                definition,
                key,
                plan,
                record,
                children,
            } => {
                let id = NodeId(self.nodes.len());
                let states = plan
                    .children
                    .iter()
                    .map(|child| match child.kind {
                        ChildKind::Element => ChildState::List(vec![]),
                        ChildKind::Inline { .. } => ChildState::Absent,
                    })
                    .collect();

                self.nodes.push(Node {
                    plan,
                    record,
                    children: states,
                });

                if let Some(values) = key {
                    let identity = IdentityKey {
                        definition,
                        parent,
                        values,
                    };
                    self.cx.insert(identity, id);
                }

                self.commit_children(id, children);
                (id, true)
            }
        }
    }

    fn commit_children(&mut self, id: NodeId, children: Vec<Option<Pending<S>>>) {
        for (index, child) in children.into_iter().enumerate() {
            let Some(child) = child else { continue };
            let (child_id, created) = self.commit(child, Some(id));

            match &mut self.nodes[id.0].children[index] {
                ChildState::List(items) => {
                    if created {
                        items.push(child_id);
                    }
                }
                state => *state = ChildState::Inline(child_id),
            }
        }
    }
}

impl<S> fmt::Debug for MappingSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingSession")
            .field("objects", &self.nodes.len())
            .field("roots", &self.roots.len())
            .field("position", &self.position)
            .finish()
    }
}

/// Moves the record of `id` out of the arena with its children attached.
fn materialize<S>(nodes: &mut [Node<S>], id: NodeId) -> Result<ValueRecord> {
    let node = &mut nodes[id.0];
    let plan = node.plan.clone();
    let children = std::mem::take(&mut node.children);
    let mut record = std::mem::replace(&mut node.record, ValueRecord::new(plan.model, 0));

    for (child, state) in plan.children.iter().zip(children) {
        match state {
            ChildState::Absent => {}
            ChildState::Inline(child_id) => {
                let value = Value::Record(materialize(nodes, child_id)?);
                record.assign(&child.slot, value)?;
            }
            ChildState::List(ids) => {
                let items = ids
                    .into_iter()
                    .map(|child_id| materialize(nodes, child_id).map(Value::Record))
                    .collect::<Result<Vec<_>>>()?;
                record.assign(&child.slot, Value::List(items))?;
            }
        }
    }

    Ok(record)
}
