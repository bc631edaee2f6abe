use std::{fmt, sync::Arc};

use super::{Field, Schema, SchemaRef};

/// Identifier of the built-in date logical type.
pub const DATE: &str = "nestrow:logical_type:date:v1";
/// Legacy SQL identifier that is also recognized as a date.
pub const SQL_DATE: &str = "SqlDateType";
/// Identifier of the built-in time-of-day logical type.
pub const TIME: &str = "nestrow:logical_type:time:v1";
/// Legacy SQL identifier that is also recognized as a time of day.
pub const SQL_TIME: &str = "SqlTimeType";
/// Identifier of the built-in timestamp logical type.
pub const TIMESTAMP: &str = "nestrow:logical_type:timestamp:v1";
/// Legacy SQL identifier that is also recognized as a timestamp.
pub const SQL_TIMESTAMP: &str = "SqlTimestampWithLocalTzType";

/// Declared type of a [`Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Bytes,
    /// An instant on the UTC time line.
    DateTime,
    /// A nested record with its own schema.
    Record(SchemaRef),
    /// An ordered sequence. The element field carries the element type and whether
    /// elements may be null; its name is not significant.
    Array(Arc<Field>),
    /// Key/value pairs, in insertion order.
    Map(Arc<Field>, Arc<Field>),
    Logical(LogicalType),
}

/// A named semantic refinement of a base type.
///
/// Logical types are compared by identifier, two logical types with the same
/// identifier are the same type regardless of how they were constructed.
#[derive(Debug, Clone)]
pub struct LogicalType {
    identifier: Arc<str>,
    base: Box<DataType>,
    argument: Option<Box<DataType>>,
}

/// Structural view of a [`DataType`] used to dispatch the recursive schema walks.
#[derive(Debug, Clone, Copy)]
pub enum Kind<'a> {
    /// Anything that is not entered by a path: primitives, maps, logical types.
    Scalar,
    Record(&'a SchemaRef),
    ArrayOfRecord(&'a Field, &'a SchemaRef),
    ArrayOfScalar(&'a Field),
}

impl DataType {
    pub fn record(schema: impl Into<SchemaRef>) -> Self {
        DataType::Record(schema.into())
    }

    /// An array whose elements are of `element` type and never null.
    pub fn array(element: DataType) -> Self {
        DataType::Array(Arc::new(Field::new("item", element, false)))
    }

    /// An array whose elements are of `element` type and may be null.
    pub fn nullable_array(element: DataType) -> Self {
        DataType::Array(Arc::new(Field::new("item", element, true)))
    }

    pub fn map(key: DataType, value: DataType) -> Self {
        DataType::Map(
            Arc::new(Field::new("key", key, false)),
            Arc::new(Field::new("value", value, true)),
        )
    }

    pub fn kind(&self) -> Kind<'_> {
        match self {
            DataType::Record(schema) => Kind::Record(schema),
            DataType::Array(element) => match element.data_type() {
                DataType::Record(schema) => Kind::ArrayOfRecord(element, schema),
                _ => Kind::ArrayOfScalar(element),
            },
            _ => Kind::Scalar,
        }
    }

    /// Returns the nested schema of a record or of an array of records.
    pub fn nested_schema(&self) -> Option<&SchemaRef> {
        match self.kind() {
            Kind::Record(schema) | Kind::ArrayOfRecord(_, schema) => Some(schema),
            _ => None,
        }
    }

    pub fn logical_type(&self) -> Option<&LogicalType> {
        match self {
            DataType::Logical(logical) => Some(logical),
            _ => None,
        }
    }

    /// Short upper-case name of the type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int8 => "BYTE",
            DataType::Int16 => "INT16",
            DataType::Int32 => "INT32",
            DataType::Int64 => "INT64",
            DataType::Float32 => "FLOAT",
            DataType::Float64 => "DOUBLE",
            DataType::String => "STRING",
            DataType::Bytes => "BYTES",
            DataType::DateTime => "DATETIME",
            DataType::Record(_) => "RECORD",
            DataType::Array(_) => "ARRAY",
            DataType::Map(_, _) => "MAP",
            DataType::Logical(_) => "LOGICAL_TYPE",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Record(schema) => {
                write!(f, "RECORD<")?;
                for (i, field) in schema.fields().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name(), field.data_type())?;
                }
                write!(f, ">")
            }
            DataType::Array(element) => write!(f, "ARRAY<{}>", element.data_type()),
            DataType::Map(key, value) => {
                write!(f, "MAP<{}, {}>", key.data_type(), value.data_type())
            }
            DataType::Logical(logical) => write!(f, "LOGICAL<{}>", logical.identifier()),
            other => f.write_str(other.type_name()),
        }
    }
}

impl From<Schema> for DataType {
    fn from(schema: Schema) -> Self {
        DataType::Record(Arc::new(schema))
    }
}

impl LogicalType {
    pub fn new(identifier: impl Into<Arc<str>>, base: DataType) -> Self {
        Self {
            identifier: identifier.into(),
            base: Box::new(base),
            argument: None,
        }
    }

    pub fn with_argument(self, argument: DataType) -> Self {
        LogicalType {
            argument: Some(Box::new(argument)),
            ..self
        }
    }

    /// Calendar date. Values are [`super::Value::Date`], stored as days since the epoch.
    pub fn date() -> Self {
        Self::new(DATE, DataType::Int32)
    }

    /// Time of day. Values are [`super::Value::Time`], stored as nanoseconds of the day.
    pub fn time() -> Self {
        Self::new(TIME, DataType::Int64)
    }

    /// Instant. Values are [`super::Value::DateTime`].
    pub fn timestamp() -> Self {
        Self::new(TIMESTAMP, DataType::DateTime)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn base_type(&self) -> &DataType {
        &self.base
    }

    pub fn argument_type(&self) -> Option<&DataType> {
        self.argument.as_deref()
    }

    pub fn is_date(&self) -> bool {
        matches!(self.identifier(), DATE | SQL_DATE)
    }

    pub fn is_time(&self) -> bool {
        matches!(self.identifier(), TIME | SQL_TIME)
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self.identifier(), TIMESTAMP | SQL_TIMESTAMP)
    }
}

impl PartialEq for LogicalType {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}
