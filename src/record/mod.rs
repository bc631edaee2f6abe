//! Schema and record model: typed, nested, immutable.

mod convert;
mod datatype;
pub mod error;
mod row;
mod schema;
mod value;

pub use convert::LOGICAL_TYPE_KEY;
pub use datatype::*;
pub use error::{RecordError, SchemaError};
pub use row::*;
pub use schema::*;
pub use value::*;
