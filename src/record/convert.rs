//! Conversions between [`Schema`] and [`arrow::datatypes::Schema`].
//!
//! Records map to `Struct`, arrays to `List`, maps to `Map` and instants to
//! microsecond `Timestamp`s in UTC. Logical types are carried in the field
//! metadata under [`LOGICAL_TYPE_KEY`]; options become string metadata.

use std::{collections::HashMap, sync::Arc};

use arrow::datatypes::{
    DataType as ArrowDataType, Field as ArrowField, Fields, Schema as ArrowSchema, TimeUnit,
};

use super::{error::SchemaError, DataType, Field, LogicalType, Options, Schema, Value};

/// Field metadata key holding the identifier of a logical type.
pub const LOGICAL_TYPE_KEY: &str = "nestrow.logical_type";

impl Schema {
    /// Returns the equivalent [`arrow::datatypes::Schema`].
    pub fn to_arrow(&self) -> ArrowSchema {
        ArrowSchema::new_with_metadata(
            self.fields().iter().map(arrow_field).collect::<Vec<_>>(),
            options_to_metadata(self.options()),
        )
    }
}

impl TryFrom<&ArrowSchema> for Schema {
    type Error = SchemaError;

    fn try_from(schema: &ArrowSchema) -> Result<Self, Self::Error> {
        let fields = schema
            .fields()
            .iter()
            .map(|field| field_from_arrow(field))
            .collect::<Result<Vec<_>, _>>()?;
        Schema::try_new(fields, metadata_to_options(schema.metadata().clone()))
    }
}

fn arrow_field(field: &Field) -> ArrowField {
    let mut metadata = options_to_metadata(field.options());
    if let DataType::Logical(logical) = field.data_type() {
        metadata.insert(
            LOGICAL_TYPE_KEY.to_string(),
            logical.identifier().to_string(),
        );
    }
    ArrowField::new(
        field.name(),
        arrow_data_type(field.data_type()),
        field.is_nullable(),
    )
    .with_metadata(metadata)
}

fn arrow_data_type(data_type: &DataType) -> ArrowDataType {
    match data_type {
        DataType::Boolean => ArrowDataType::Boolean,
        DataType::Int8 => ArrowDataType::Int8,
        DataType::Int16 => ArrowDataType::Int16,
        DataType::Int32 => ArrowDataType::Int32,
        DataType::Int64 => ArrowDataType::Int64,
        DataType::Float32 => ArrowDataType::Float32,
        DataType::Float64 => ArrowDataType::Float64,
        DataType::String => ArrowDataType::Utf8,
        DataType::Bytes => ArrowDataType::Binary,
        DataType::DateTime => ArrowDataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        DataType::Record(schema) => {
            ArrowDataType::Struct(schema.fields().iter().map(arrow_field).collect::<Fields>())
        }
        DataType::Array(element) => ArrowDataType::List(Arc::new(arrow_field(element))),
        DataType::Map(key, value) => {
            let entries = ArrowDataType::Struct(Fields::from(vec![
                arrow_field(key),
                arrow_field(value),
            ]));
            ArrowDataType::Map(Arc::new(ArrowField::new("entries", entries, false)), false)
        }
        DataType::Logical(logical) => match logical.base_type() {
            DataType::Int32 if logical.is_date() => ArrowDataType::Date32,
            DataType::Int64 if logical.is_time() => ArrowDataType::Time64(TimeUnit::Nanosecond),
            base => arrow_data_type(base),
        },
    }
}

fn field_from_arrow(field: &ArrowField) -> Result<Field, SchemaError> {
    let mut metadata = field.metadata().clone();
    let logical = metadata.remove(LOGICAL_TYPE_KEY);
    let data_type = data_type_from_arrow(field.name(), field.data_type())?;
    let data_type = match (logical, data_type) {
        (Some(identifier), DataType::Logical(derived)) => {
            DataType::Logical(LogicalType::new(identifier, derived.base_type().clone()))
        }
        (Some(identifier), base) => DataType::Logical(LogicalType::new(identifier, base)),
        (None, data_type) => data_type,
    };
    Ok(
        Field::new(field.name().clone(), data_type, field.is_nullable())
            .with_options(metadata_to_options(metadata)),
    )
}

fn data_type_from_arrow(name: &str, data_type: &ArrowDataType) -> Result<DataType, SchemaError> {
    let data_type = match data_type {
        ArrowDataType::Boolean => DataType::Boolean,
        ArrowDataType::Int8 => DataType::Int8,
        ArrowDataType::Int16 => DataType::Int16,
        ArrowDataType::Int32 => DataType::Int32,
        ArrowDataType::Int64 => DataType::Int64,
        ArrowDataType::Float32 => DataType::Float32,
        ArrowDataType::Float64 => DataType::Float64,
        ArrowDataType::Utf8 | ArrowDataType::LargeUtf8 => DataType::String,
        ArrowDataType::Binary | ArrowDataType::LargeBinary => DataType::Bytes,
        ArrowDataType::Timestamp(_, _) => DataType::DateTime,
        ArrowDataType::Date32 => DataType::Logical(LogicalType::date()),
        ArrowDataType::Time64(TimeUnit::Nanosecond) => DataType::Logical(LogicalType::time()),
        ArrowDataType::Struct(fields) => {
            let fields = fields
                .iter()
                .map(|field| field_from_arrow(field))
                .collect::<Result<Vec<_>, _>>()?;
            DataType::Record(Arc::new(Schema::try_new(fields, Options::default())?))
        }
        ArrowDataType::List(element) | ArrowDataType::LargeList(element) => {
            DataType::Array(Arc::new(field_from_arrow(element)?))
        }
        ArrowDataType::Map(entries, _) => match entries.data_type() {
            ArrowDataType::Struct(fields) if fields.len() == 2 => DataType::Map(
                Arc::new(field_from_arrow(&fields[0])?),
                Arc::new(field_from_arrow(&fields[1])?),
            ),
            _ => return Err(unsupported(name, data_type)),
        },
        _ => return Err(unsupported(name, data_type)),
    };
    Ok(data_type)
}

fn unsupported(name: &str, data_type: &ArrowDataType) -> SchemaError {
    SchemaError::UnsupportedArrowType {
        field: name.to_string(),
        data_type: data_type.clone(),
    }
}

fn options_to_metadata(options: &Options) -> HashMap<String, String> {
    options
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn metadata_to_options(metadata: HashMap<String, String>) -> Options {
    metadata
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect()
}
