pub mod builder;
pub mod schema_model;

pub use builder::{Schema, SchemaError, build_block, load_schema, parse_schema, schema_fingerprint};
pub use schema_model::{BlockSpec, ChildSpec, SchemaDocument};
