use std::{collections::HashMap, fmt, sync::Arc};

use super::{error::RecordError, SchemaRef, Value};

/// One value per field of a conforming [`super::Schema`], in field order.
#[derive(Debug, Clone)]
pub struct Record {
    schema: SchemaRef,
    values: Vec<Value>,
}

/// Builds a [`Record`] by field name. Unset fields are null.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    schema: SchemaRef,
    values: Vec<Value>,
    unknown: Vec<String>,
}

impl Record {
    /// Create a new Record without validation.
    pub fn new(schema: SchemaRef, values: Vec<Value>) -> Self {
        Self { schema, values }
    }

    /// Create a new Record with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of values differs from the number of fields,
    /// a non-nullable field holds a null, or a value does not have its field's type.
    pub fn try_new(schema: SchemaRef, values: Vec<Value>) -> Result<Self, RecordError> {
        if values.len() != schema.len() {
            return Err(RecordError::LengthMismatch {
                expected: schema.len(),
                actual: values.len(),
            });
        }
        for (field, value) in schema.fields().iter().zip(values.iter()) {
            if value.is_null() {
                if !field.is_nullable() {
                    return Err(RecordError::NullNotAllowed(field.name().to_string()));
                }
            } else if !value.conforms_to(field.data_type()) {
                return Err(RecordError::TypeMismatch {
                    field: field.name().to_string(),
                    expected: field.data_type().to_string(),
                    actual: value.type_name().to_string(),
                });
            }
        }
        Ok(Self { schema, values })
    }

    pub fn builder(schema: SchemaRef) -> RecordBuilder {
        let values = vec![Value::Null; schema.len()];
        RecordBuilder {
            schema,
            values,
            unknown: Vec::new(),
        }
    }

    /// Returns a builder pre-filled with the values of this record.
    pub fn to_builder(&self) -> RecordBuilder {
        RecordBuilder {
            schema: Arc::clone(&self.schema),
            values: self.values.clone(),
            unknown: Vec::new(),
        }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the value of the named field, `None` if the schema has no such field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .index_of(name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Returns the nested record of the named field, `None` if absent or null.
    pub fn get_record(&self, name: &str) -> Option<&Record> {
        self.get(name).and_then(Value::as_record_opt)
    }

    /// Returns the elements of the named array field, `None` if absent or null.
    pub fn get_array(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_array_opt)
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_string_opt)
    }

    /// Same schema, with each field found in `overrides` replaced.
    pub fn merge(&self, overrides: &HashMap<String, Value>) -> Record {
        merge(&self.schema, self, overrides)
    }
}

/// Builds a record over `schema` taking each field from `overrides` when present and
/// from `record` (by name) otherwise.
///
/// Override values are not type checked; fields that are neither overridden nor
/// present in `record` are null.
pub fn merge(schema: &SchemaRef, record: &Record, overrides: &HashMap<String, Value>) -> Record {
    let values = schema
        .fields()
        .iter()
        .map(|field| {
            overrides
                .get(field.name())
                .or_else(|| record.get(field.name()))
                .cloned()
                .unwrap_or(Value::Null)
        })
        .collect();
    Record::new(Arc::clone(schema), values)
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.schema, &other.schema) || self.schema == other.schema)
            && self.values == other.values
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (field, value)) in self
            .schema
            .fields()
            .iter()
            .zip(self.values.iter())
            .enumerate()
        {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field.name(), value)?;
        }
        write!(f, "}}")
    }
}

impl RecordBuilder {
    pub fn with_field_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        match self.schema.index_of(name) {
            Some(idx) => self.values[idx] = value.into(),
            None => self.unknown.push(name.to_string()),
        }
        self
    }

    /// Validates and builds the record.
    ///
    /// # Errors
    ///
    /// Fails on a field name unknown to the schema and on every error of
    /// [`Record::try_new`].
    pub fn build(self) -> Result<Record, RecordError> {
        if let Some(name) = self.unknown.into_iter().next() {
            return Err(RecordError::NoSuchField(name));
        }
        Record::try_new(self.schema, self.values)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use super::{merge, Record};
    use crate::{
        record::{error::RecordError, DataType, Value},
        schema,
    };

    fn test_schema() -> Arc<crate::record::Schema> {
        Arc::new(schema!(
            ("id", DataType::Int64, false),
            ("name", DataType::String, true),
            ("tags", DataType::array(DataType::String), true),
        ))
    }

    #[test]
    fn test_create_record() {
        let record = Record::try_new(
            test_schema(),
            vec![
                Value::Int64(1),
                Value::String("nestrow".into()),
                Value::Array(vec![Value::String("a".into())]),
            ],
        )
        .unwrap();
        assert_eq!(record.get("id"), Some(&Value::Int64(1)));
        assert_eq!(record.get_string("name"), Some("nestrow"));
        assert_eq!(record.get_array("tags").map(<[Value]>::len), Some(1));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_create_record_err() {
        let res = Record::try_new(test_schema(), vec![Value::Int64(1)]);
        assert!(matches!(res, Err(RecordError::LengthMismatch { .. })));

        let res = Record::try_new(test_schema(), vec![Value::Null, Value::Null, Value::Null]);
        assert!(matches!(res, Err(RecordError::NullNotAllowed(name)) if name == "id"));

        let res = Record::try_new(
            test_schema(),
            vec![Value::Int32(1), Value::Null, Value::Null],
        );
        assert!(matches!(res, Err(RecordError::TypeMismatch { .. })));
    }

    #[test]
    fn test_builder() {
        let record = Record::builder(test_schema())
            .with_field_value("id", 7_i64)
            .with_field_value("name", "seven")
            .build()
            .unwrap();
        assert_eq!(record.values()[2], Value::Null);

        let copy = record.to_builder().build().unwrap();
        assert_eq!(copy, record);

        let err = Record::builder(test_schema())
            .with_field_value("id", 7_i64)
            .with_field_value("nope", 1_i32)
            .build();
        assert!(matches!(err, Err(RecordError::NoSuchField(name)) if name == "nope"));
    }

    #[test]
    fn test_merge() {
        let schema = test_schema();
        let record = Record::builder(schema.clone())
            .with_field_value("id", 1_i64)
            .with_field_value("name", "before")
            .build()
            .unwrap();

        let mut overrides = HashMap::new();
        overrides.insert("name".to_string(), Value::String("after".into()));
        overrides.insert("unknown".to_string(), Value::Int32(0));

        let merged = record.merge(&overrides);
        assert_eq!(merged.get_string("name"), Some("after"));
        assert_eq!(merged.get("id"), Some(&Value::Int64(1)));
        assert_eq!(merged.len(), 3);
        assert_eq!(record.get_string("name"), Some("before"));

        let wider = Arc::new(schema!(
            ("id", DataType::Int64, false),
            ("extra", DataType::Boolean, true),
        ));
        let merged = merge(&wider, &record, &HashMap::new());
        assert_eq!(merged.values(), &[Value::Int64(1), Value::Null]);
    }
}
