use crate::{schema::PropertyMeta, FieldKey, Result, Value, ValueRecord};
use std::{fmt, sync::Arc};

type SetterFn<W> = dyn Fn(&mut W, &Value) -> Result<()> + Send + Sync;
type PropertySetterFn = dyn Fn(&mut ValueRecord, Value) -> Result<()> + Send + Sync;

/// Writes one value into a sink, such as an output line.
pub struct Setter<W> {
    f: Arc<SetterFn<W>>,
}

/// Stores a mapped value into the record of the object that owns the
/// property, replacing the default assignment.
#[derive(Clone)]
pub struct PropertySetter {
    f: Arc<PropertySetterFn>,
}

/// A resolved column handed to a [`SetterFactory`].
#[derive(Debug, Clone)]
pub struct PropertyMapping {
    pub key: FieldKey,
    pub property: Arc<PropertyMeta>,
}

/// Produces setters for the write direction.
pub trait SetterFactory<W>: Send + Sync {
    fn new_setter(&self, mapping: &PropertyMapping) -> Option<Setter<W>>;
}

/// Asks each factory in turn. The first setter returned wins.
pub struct SetterFactoryChain<W> {
    factories: Vec<Arc<dyn SetterFactory<W>>>,
}

impl<W> Setter<W> {
    pub fn new(f: impl Fn(&mut W, &Value) -> Result<()> + Send + Sync + 'static) -> Setter<W> {
        Setter { f: Arc::new(f) }
    }

    pub fn set(&self, target: &mut W, value: &Value) -> Result<()> {
        (self.f)(target, value)
    }
}

impl<W> Clone for Setter<W> {
    fn clone(&self) -> Self {
        Setter { f: self.f.clone() }
    }
}

impl<W> fmt::Debug for Setter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter").finish_non_exhaustive()
    }
}

impl PropertySetter {
    pub fn new(
        f: impl Fn(&mut ValueRecord, Value) -> Result<()> + Send + Sync + 'static,
    ) -> PropertySetter {
        PropertySetter { f: Arc::new(f) }
    }

    pub fn set(&self, owner: &mut ValueRecord, value: Value) -> Result<()> {
        (self.f)(owner, value)
    }
}

impl fmt::Debug for PropertySetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySetter").finish_non_exhaustive()
    }
}

impl<W, F> SetterFactory<W> for F
where
    F: Fn(&PropertyMapping) -> Option<Setter<W>> + Send + Sync,
{
    fn new_setter(&self, mapping: &PropertyMapping) -> Option<Setter<W>> {
        self(mapping)
    }
}

impl<W> SetterFactoryChain<W> {
    pub fn new() -> SetterFactoryChain<W> {
        SetterFactoryChain { factories: vec![] }
    }

    pub fn push(&mut self, factory: Arc<dyn SetterFactory<W>>) {
        self.factories.push(factory);
    }
}

impl<W> Default for SetterFactoryChain<W> {
    fn default() -> Self {
        SetterFactoryChain::new()
    }
}

impl<W> Clone for SetterFactoryChain<W> {
    fn clone(&self) -> Self {
        SetterFactoryChain {
            factories: self.factories.clone(),
        }
    }
}

impl<W> SetterFactory<W> for SetterFactoryChain<W> {
    fn new_setter(&self, mapping: &PropertyMapping) -> Option<Setter<W>> {
        self.factories
            .iter()
            .find_map(|factory| factory.new_setter(mapping))
    }
}
