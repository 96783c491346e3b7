use crate::{FieldKey, MappingContext, Result, Type, Value};
use std::{fmt, sync::Arc};

type ContextualFn<S> = dyn Fn(&S, &MappingContext) -> Result<Value> + Send + Sync;
type GetterFn<S> = dyn Fn(&S) -> Result<Value> + Send + Sync;

/// Reads one value from a source row, with access to the mapping context.
pub struct ContextualGetter<S> {
    ty: Type,
    f: Arc<ContextualFn<S>>,
}

/// Reads one value from a source row.
pub struct Getter<S> {
    ty: Type,
    f: Arc<GetterFn<S>>,
}

/// Produces getters for a (type, key) pair.
///
/// Returning `None` means the factory does not handle the pair; the next
/// factory in a [`GetterFactoryChain`] is asked.
pub trait GetterFactory<S>: Send + Sync {
    fn new_getter(&self, ty: &Type, key: &FieldKey) -> Option<ContextualGetter<S>>;
}

/// Asks each factory in turn. The first getter returned wins.
pub struct GetterFactoryChain<S> {
    factories: Vec<Arc<dyn GetterFactory<S>>>,
}

/// A factory that answers for exactly one type and reads by column index.
pub struct GetterProperty<S> {
    ty: Type,
    read: Arc<dyn Fn(&S, usize) -> Result<Value> + Send + Sync>,
}

impl<S> ContextualGetter<S> {
    pub fn new(
        ty: Type,
        f: impl Fn(&S, &MappingContext) -> Result<Value> + Send + Sync + 'static,
    ) -> ContextualGetter<S> {
        ContextualGetter { ty, f: Arc::new(f) }
    }

    /// Type of the values this getter produces.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn get(&self, source: &S, cx: &MappingContext) -> Result<Value> {
        (self.f)(source, cx)
    }
}

impl<S: 'static> ContextualGetter<S> {
    /// Lifts a context-free getter. The context is ignored.
    pub fn from_getter(getter: Getter<S>) -> ContextualGetter<S> {
        let Getter { ty, f } = getter;
        ContextualGetter::new(ty, move |source, _| f(source))
    }

    /// Drops the context parameter. Each call sees an empty context.
    pub fn into_getter(self) -> Getter<S> {
        let ContextualGetter { ty, f } = self;
        Getter::new(ty, move |source| f(source, &MappingContext::default()))
    }
}

impl<S> Getter<S> {
    pub fn new(ty: Type, f: impl Fn(&S) -> Result<Value> + Send + Sync + 'static) -> Getter<S> {
        Getter { ty, f: Arc::new(f) }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn get(&self, source: &S) -> Result<Value> {
        (self.f)(source)
    }
}

impl<S> Clone for ContextualGetter<S> {
    fn clone(&self) -> Self {
        ContextualGetter {
            ty: self.ty.clone(),
            f: self.f.clone(),
        }
    }
}

impl<S> Clone for Getter<S> {
    fn clone(&self) -> Self {
        Getter {
            ty: self.ty.clone(),
            f: self.f.clone(),
        }
    }
}

impl<S> fmt::Debug for ContextualGetter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextualGetter")
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

impl<S> fmt::Debug for Getter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Getter")
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

impl<S, F> GetterFactory<S> for F
where
    F: Fn(&Type, &FieldKey) -> Option<ContextualGetter<S>> + Send + Sync,
{
    fn new_getter(&self, ty: &Type, key: &FieldKey) -> Option<ContextualGetter<S>> {
        self(ty, key)
    }
}

impl<S> GetterFactoryChain<S> {
    pub fn new() -> GetterFactoryChain<S> {
        GetterFactoryChain { factories: vec![] }
    }

    /// Appends a factory; earlier factories take precedence.
    pub fn push(&mut self, factory: Arc<dyn GetterFactory<S>>) {
        self.factories.push(factory);
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<S> Default for GetterFactoryChain<S> {
    fn default() -> Self {
        GetterFactoryChain::new()
    }
}

impl<S> Clone for GetterFactoryChain<S> {
    fn clone(&self) -> Self {
        GetterFactoryChain {
            factories: self.factories.clone(),
        }
    }
}

impl<S> GetterFactory<S> for GetterFactoryChain<S> {
    fn new_getter(&self, ty: &Type, key: &FieldKey) -> Option<ContextualGetter<S>> {
        self.factories
            .iter()
            .find_map(|factory| factory.new_getter(ty, key))
    }
}

impl<S> GetterProperty<S> {
    pub fn indexed(
        ty: Type,
        read: impl Fn(&S, usize) -> Result<Value> + Send + Sync + 'static,
    ) -> GetterProperty<S> {
        GetterProperty {
            ty,
            read: Arc::new(read),
        }
    }
}

impl<S: 'static> GetterFactory<S> for GetterProperty<S> {
    fn new_getter(&self, ty: &Type, key: &FieldKey) -> Option<ContextualGetter<S>> {
        if *ty != self.ty {
            return None;
        }

        let index = key.index()?;
        let read = self.read.clone();
        Some(ContextualGetter::new(ty.clone(), move |source, _| {
            read(source, index)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_property_matches_exact_type() {
        let factory = GetterProperty::indexed(Type::I64, |row: &Vec<i64>, index| {
            Ok(Value::I64(row[index]))
        });

        let key = FieldKey::new("b", 1);
        assert!(factory.new_getter(&Type::I32, &key).is_none());
        assert!(factory.new_getter(&Type::I64, &FieldKey::named("b")).is_none());

        let getter = factory.new_getter(&Type::I64, &key).unwrap();
        let cx = MappingContext::default();
        assert_eq!(getter.get(&vec![7, 8], &cx).unwrap(), Value::I64(8));
    }

    #[test]
    fn chain_first_match_wins() {
        let mut chain: GetterFactoryChain<Vec<i64>> = GetterFactoryChain::new();
        chain.push(Arc::new(|ty: &Type, _: &FieldKey| {
            ty.is_string().then(|| {
                ContextualGetter::<Vec<i64>>::new(Type::String, |_, _| Ok(Value::from("first")))
            })
        }));
        chain.push(Arc::new(|_: &Type, _: &FieldKey| {
            Some(ContextualGetter::<Vec<i64>>::new(Type::Any, |_, _| Ok(Value::from("second"))))
        }));

        let key = FieldKey::new("a", 0);
        let cx = MappingContext::default();
        let string = chain.new_getter(&Type::String, &key).unwrap();
        let other = chain.new_getter(&Type::I64, &key).unwrap();

        assert_eq!(string.get(&vec![], &cx).unwrap(), Value::from("first"));
        assert_eq!(other.get(&vec![], &cx).unwrap(), Value::from("second"));
        assert_eq!(other.ty(), &Type::Any);
    }

    #[test]
    fn getter_adapters_round_trip() {
        let getter = Getter::new(Type::I32, |row: &Vec<i32>| Ok(Value::I32(row[0])));
        let contextual = ContextualGetter::from_getter(getter);
        let plain = contextual.into_getter();
        assert_eq!(plain.get(&vec![5]).unwrap(), Value::I32(5));
        assert_eq!(plain.ty(), &Type::I32);
    }
}
