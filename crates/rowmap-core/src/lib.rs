mod error;
pub use error::{Error, IntoError};

pub mod column;
pub use column::{ColumnDefinition, ColumnProperty};

pub mod context;
pub use context::{MappingContext, MappingContextFactory, MappingContextFactoryBuilder};

pub mod convert;
pub use convert::{Converter, Converters};

pub mod getter;
pub use getter::{ContextualGetter, Getter, GetterFactory};

mod key;
pub use key::FieldKey;

pub mod schema;
pub use schema::Schema;

pub mod setter;
pub use setter::{Setter, SetterFactory};

pub mod source;
pub use source::ValueRow;

mod ty;
pub use ty::Type;

pub mod value;
pub use value::{Value, ValueRecord};

/// A Result type alias that uses rowmap's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
