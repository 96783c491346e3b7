use std::fmt;

/// Identity of one source column.
///
/// The index is 0-based and fixed for the life of a compiled plan. `None`
/// marks a column whose position is not known to the source, in which case
/// getters fall back to the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldKey {
    name: String,
    index: Option<usize>,
}

impl FieldKey {
    pub fn new(name: impl Into<String>, index: usize) -> FieldKey {
        FieldKey {
            name: name.into(),
            index: Some(index),
        }
    }

    /// A key addressed by name only.
    pub fn named(name: impl Into<String>) -> FieldKey {
        FieldKey {
            name: name.into(),
            index: None,
        }
    }

    /// Builds one key per name, indexed by position.
    pub fn sequence<I, N>(names: I) -> Vec<FieldKey>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        names
            .into_iter()
            .enumerate()
            .map(|(index, name)| FieldKey::new(name, index))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Same position, different name. Used when a column is renamed.
    pub fn with_name(&self, name: impl Into<String>) -> FieldKey {
        FieldKey {
            name: name.into(),
            index: self.index,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}#{}", self.name, index),
            None => f.write_str(&self.name),
        }
    }
}
