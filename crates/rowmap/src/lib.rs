pub mod builder;
pub use builder::{MapperBuilder, SourceMapperBuilder};

mod config;
pub use config::{DiscriminatorCase, MapperConfig};

pub mod error_handler;
pub use error_handler::{BuildErrorHandler, CollectErrors, IgnoreErrors, Rethrow};

mod exec;
pub use exec::MappingSession;

mod factory;
pub use factory::{Builder, MapperFactory};

mod mapper;
pub use mapper::{Load, Mapper, Store};

pub mod plan;
pub use plan::{FieldMapperFn, SourceFieldMapper};

pub mod writer;
pub use writer::{Writer, WriterBuilder};

pub use rowmap_core::{
    schema, ColumnDefinition, ColumnProperty, Error, FieldKey, Result, Schema, Type, Value,
    ValueRecord, ValueRow,
};
