//! Schema-aware transformations over nested, typed records.
//!
//! A [`record::Schema`] describes an ordered list of typed fields which may nest
//! records and arrays of records. On top of it the crate provides:
//!
//! - [`projection`]: reduce a schema and its records to a set of dotted field
//!   paths such as `address.city`, recursing through records and arrays of
//!   records;
//! - [`flatten`]: denormalize one nested array of records into one flat record
//!   per element (per element combination for multi-level paths);
//! - [`record::merge`]: rebuild a record with some values overridden;
//! - [`coerce`]: lenient timestamp and bytes extraction from record fields.
//!
//! Schemas convert to and from Arrow schemas, see [`record::Schema::to_arrow`].
//!
//! ```
//! use std::sync::Arc;
//!
//! use nestrow::{
//!     flatten::Flattener,
//!     option::FlattenOption,
//!     record::{DataType, Record, Value},
//!     schema,
//! };
//!
//! let item = Arc::new(schema!(("sku", DataType::String, false)));
//! let order = Arc::new(schema!(
//!     ("id", DataType::Int64, false),
//!     ("items", DataType::array(DataType::record(item.clone())), true),
//! ));
//! let record = Record::try_new(
//!     order.clone(),
//!     vec![
//!         Value::Int64(1),
//!         Value::Array(vec![
//!             Value::Record(Record::new(item.clone(), vec![Value::from("a")])),
//!             Value::Record(Record::new(item, vec![Value::from("b")])),
//!         ]),
//!     ],
//! )
//! .unwrap();
//!
//! let flattener = Flattener::new(&order, "items", &FlattenOption::default()).unwrap();
//! let rows = flattener.flatten(&record).unwrap();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[1].get_string("items_sku"), Some("b"));
//! ```

mod logging;

pub mod coerce;
pub mod flatten;
pub mod option;
pub mod path;
pub mod projection;
pub mod record;

pub use arrow;

pub use crate::{
    coerce::{get_bytes, get_timestamp, CoerceError},
    flatten::{flatten_record, flatten_schema, FlattenError, Flattener},
    option::FlattenOption,
    path::{FieldPath, PathError},
    projection::{project, select_fields, Projection},
    record::{add_fields, merge, remove_fields, Record, Schema, SchemaRef},
};
