//! Denormalization of one nested array of records into flat records.
//!
//! Flattening `children.grandchildren` lifts the fields of every `children`
//! element and of every `grandchildren` element of it to the top level, producing
//! one output record per (child, grandchild) pair. Fields not on the path are
//! copied into every output record.

mod plan;

use std::sync::Arc;

use thiserror::Error;

use self::plan::FlattenPlan;
use crate::{
    option::FlattenOption,
    path::{FieldPath, PathError},
    record::{Record, Schema, SchemaRef},
};

#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("invalid flatten path: {0}")]
    Path(#[from] PathError),
    #[error("field {field} of path {path} is neither a record nor an array of records")]
    NotNested { path: String, field: String },
    #[error("last field {field} of path {path} is not an array of records")]
    NotArrayOfRecord { path: String, field: String },
    #[error("flattened field name {0} is used more than once")]
    NameCollision(String),
    #[error("schema does not match path {path}: expected fields {expected:?}, got {actual:?}")]
    SchemaMismatch {
        path: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

/// A flatten of one path, prepared against a source schema and applied to any
/// number of records of that schema.
#[derive(Debug, Clone)]
pub struct Flattener {
    plan: FlattenPlan,
    path: FieldPath,
    source: SchemaRef,
    schema: SchemaRef,
}

impl Flattener {
    /// Plans the flatten of `path` over records of `schema`.
    ///
    /// # Errors
    ///
    /// Fails if `path` does not parse, crosses a field that is neither a record nor
    /// an array of records, ends on a field that is not an array of records, or if
    /// two output fields end up with the same name.
    pub fn new(schema: &Schema, path: &str, option: &FlattenOption) -> Result<Self, FlattenError> {
        let path = FieldPath::parse(path)?;
        let (plan, flat) = FlattenPlan::build(schema, &path, option)?;
        Ok(Self {
            plan,
            path,
            source: Arc::new(schema.clone()),
            schema: Arc::new(flat),
        })
    }

    /// The flat output schema.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Expands one record of the source schema into at least one flat record.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::SchemaMismatch`] if `record` is not of the schema
    /// this flattener was built for.
    pub fn flatten(&self, record: &Record) -> Result<Vec<Record>, FlattenError> {
        let schema = record.schema();
        if !Arc::ptr_eq(schema, &self.source) && schema != &self.source {
            return Err(FlattenError::SchemaMismatch {
                path: self.path.to_string(),
                expected: self.source.field_names().map(str::to_string).collect(),
                actual: schema.field_names().map(str::to_string).collect(),
            });
        }
        Ok(self
            .plan
            .expand(record)
            .into_iter()
            .map(|values| Record::new(Arc::clone(&self.schema), values))
            .collect())
    }
}

/// Returns the flat schema produced by flattening `path` of `schema`.
pub fn flatten_schema(
    schema: &Schema,
    path: &str,
    option: &FlattenOption,
) -> Result<Schema, FlattenError> {
    let path = FieldPath::parse(path)?;
    FlattenPlan::build(schema, &path, option).map(|(_, schema)| schema)
}

/// Flattens `record` along `path` into records of `flat_schema`, which must have
/// the fields [`flatten_schema`] returns for the record's schema and the same path
/// and option.
pub fn flatten_record(
    flat_schema: &SchemaRef,
    record: &Record,
    path: &str,
    option: &FlattenOption,
) -> Result<Vec<Record>, FlattenError> {
    let parsed = FieldPath::parse(path)?;
    let (plan, expected) = FlattenPlan::build(record.schema(), &parsed, option)?;
    if expected.fields() != flat_schema.fields() {
        return Err(FlattenError::SchemaMismatch {
            path: path.to_string(),
            expected: expected.field_names().map(str::to_string).collect(),
            actual: flat_schema.field_names().map(str::to_string).collect(),
        });
    }
    Ok(plan
        .expand(record)
        .into_iter()
        .map(|values| Record::new(Arc::clone(flat_schema), values))
        .collect())
}
