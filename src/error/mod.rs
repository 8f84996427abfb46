pub mod aggregate;
pub mod validation;

pub use aggregate::{BlockError, BlockErrors, DecodeFailure, ErrorAggregate, ErrorKey, FlatError};
pub use validation::ValidationError;
