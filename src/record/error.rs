use arrow::datatypes::DataType as ArrowDataType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("duplicate field name: {0}")]
    DuplicateField(String),
    #[error("field name can not be empty")]
    EmptyFieldName,
    #[error("unsupported arrow data type for field {field}: {data_type:?}")]
    UnsupportedArrowType {
        field: String,
        data_type: ArrowDataType,
    },
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record has {actual} values but schema has {expected} fields")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Null value not allowed: {0}")]
    NullNotAllowed(String),
    #[error("Type mismatch for field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },
    #[error("no such field in schema: {0}")]
    NoSuchField(String),
}
