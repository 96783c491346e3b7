use crate::{setter::PropertySetter, Converter, ContextualGetter, Setter, Value};
use std::{fmt, sync::Arc};

/// One piece of per-column configuration.
pub enum ColumnProperty<S> {
    /// Resolve the column under this name instead of its own
    Rename(String),

    /// Leave the column unmapped
    Ignore,

    /// The column is part of the identity of the object it maps into
    Key,

    /// Read the column with this getter instead of asking the factories
    Getter(ContextualGetter<S>),

    /// Store the value with this setter instead of assigning the property
    Setter(PropertySetter),

    /// Convert values with this converter
    Converter(Arc<dyn Converter>),

    /// Value to use when the column reads as null
    DefaultValue(Value),

    /// Append the value to the output with this setter when writing
    Appender(Setter<S>),
}

/// Ordered bag of [`ColumnProperty`] values.
///
/// Definitions compose by appending. Lookups of single valued properties
/// return the last one added.
pub struct ColumnDefinition<S> {
    properties: Vec<ColumnProperty<S>>,
}

impl<S> ColumnDefinition<S> {
    /// A definition with no properties.
    pub fn identity() -> ColumnDefinition<S> {
        ColumnDefinition { properties: vec![] }
    }

    pub fn key() -> ColumnDefinition<S> {
        ColumnDefinition::identity().add(ColumnProperty::Key)
    }

    pub fn ignore() -> ColumnDefinition<S> {
        ColumnDefinition::identity().add(ColumnProperty::Ignore)
    }

    pub fn rename(name: impl Into<String>) -> ColumnDefinition<S> {
        ColumnDefinition::identity().add(ColumnProperty::Rename(name.into()))
    }

    pub fn add(mut self, property: ColumnProperty<S>) -> ColumnDefinition<S> {
        self.properties.push(property);
        self
    }

    pub fn with_getter(self, getter: ContextualGetter<S>) -> ColumnDefinition<S> {
        self.add(ColumnProperty::Getter(getter))
    }

    pub fn with_setter(self, setter: PropertySetter) -> ColumnDefinition<S> {
        self.add(ColumnProperty::Setter(setter))
    }

    pub fn with_converter(self, converter: Arc<dyn Converter>) -> ColumnDefinition<S> {
        self.add(ColumnProperty::Converter(converter))
    }

    pub fn with_default(self, value: impl Into<Value>) -> ColumnDefinition<S> {
        self.add(ColumnProperty::DefaultValue(value.into()))
    }

    pub fn with_appender(self, setter: Setter<S>) -> ColumnDefinition<S> {
        self.add(ColumnProperty::Appender(setter))
    }

    /// `self` followed by the properties of `other`.
    pub fn compose(&self, other: &ColumnDefinition<S>) -> ColumnDefinition<S> {
        ColumnDefinition {
            properties: self
                .properties
                .iter()
                .chain(&other.properties)
                .cloned()
                .collect(),
        }
    }

    pub fn properties(&self) -> &[ColumnProperty<S>] {
        &self.properties
    }

    pub fn is_key(&self) -> bool {
        self.properties
            .iter()
            .any(|property| matches!(property, ColumnProperty::Key))
    }

    pub fn is_ignored(&self) -> bool {
        self.properties
            .iter()
            .any(|property| matches!(property, ColumnProperty::Ignore))
    }

    pub fn renamed(&self) -> Option<&str> {
        self.last(|property| match property {
            ColumnProperty::Rename(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn custom_getter(&self) -> Option<&ContextualGetter<S>> {
        self.last(|property| match property {
            ColumnProperty::Getter(getter) => Some(getter),
            _ => None,
        })
    }

    pub fn custom_setter(&self) -> Option<&PropertySetter> {
        self.last(|property| match property {
            ColumnProperty::Setter(setter) => Some(setter),
            _ => None,
        })
    }

    pub fn converter(&self) -> Option<&Arc<dyn Converter>> {
        self.last(|property| match property {
            ColumnProperty::Converter(converter) => Some(converter),
            _ => None,
        })
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.last(|property| match property {
            ColumnProperty::DefaultValue(value) => Some(value),
            _ => None,
        })
    }

    pub fn appender(&self) -> Option<&Setter<S>> {
        self.last(|property| match property {
            ColumnProperty::Appender(setter) => Some(setter),
            _ => None,
        })
    }

    fn last<'a, T: ?Sized>(
        &'a self,
        f: impl Fn(&'a ColumnProperty<S>) -> Option<&'a T>,
    ) -> Option<&'a T> {
        self.properties.iter().rev().find_map(f)
    }
}

impl<S> Default for ColumnDefinition<S> {
    fn default() -> Self {
        ColumnDefinition::identity()
    }
}

impl<S> Clone for ColumnDefinition<S> {
    fn clone(&self) -> Self {
        ColumnDefinition {
            properties: self.properties.clone(),
        }
    }
}

impl<S> Clone for ColumnProperty<S> {
    fn clone(&self) -> Self {
        match self {
            ColumnProperty::Rename(name) => ColumnProperty::Rename(name.clone()),
            ColumnProperty::Ignore => ColumnProperty::Ignore,
            ColumnProperty::Key => ColumnProperty::Key,
            ColumnProperty::Getter(getter) => ColumnProperty::Getter(getter.clone()),
            ColumnProperty::Setter(setter) => ColumnProperty::Setter(setter.clone()),
            ColumnProperty::Converter(converter) => ColumnProperty::Converter(converter.clone()),
            ColumnProperty::DefaultValue(value) => ColumnProperty::DefaultValue(value.clone()),
            ColumnProperty::Appender(setter) => ColumnProperty::Appender(setter.clone()),
        }
    }
}

impl<S> fmt::Debug for ColumnProperty<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnProperty::Rename(name) => f.debug_tuple("Rename").field(name).finish(),
            ColumnProperty::Ignore => f.write_str("Ignore"),
            ColumnProperty::Key => f.write_str("Key"),
            ColumnProperty::Getter(getter) => f.debug_tuple("Getter").field(getter).finish(),
            ColumnProperty::Setter(_) => f.write_str("Setter(..)"),
            ColumnProperty::Converter(_) => f.write_str("Converter(..)"),
            ColumnProperty::DefaultValue(value) => {
                f.debug_tuple("DefaultValue").field(value).finish()
            }
            ColumnProperty::Appender(_) => f.write_str("Appender(..)"),
        }
    }
}

impl<S> fmt::Debug for ColumnDefinition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.properties).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_keeps_order_and_last_wins() {
        let base: ColumnDefinition<()> = ColumnDefinition::rename("first").add(ColumnProperty::Key);
        let more = ColumnDefinition::rename("second").with_default(0i64);
        let composed = base.compose(&more);

        assert_eq!(composed.properties().len(), 4);
        assert_eq!(composed.renamed(), Some("second"));
        assert!(composed.is_key());
        assert!(!composed.is_ignored());
        assert_eq!(composed.default_value(), Some(&Value::I64(0)));
    }
}
