use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use super::{error::SchemaError, DataType, Kind, Value};

pub type SchemaRef = Arc<Schema>;

/// Named, typed metadata attached to a [`Schema`] or a [`Field`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options(BTreeMap<String, Value>);

/// One named, typed column of a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    data_type: DataType,
    nullable: bool,
    options: Options,
}

/// Ordered list of uniquely named fields plus schema-level options.
///
/// Field order is significant: records store their values in the same order,
/// and every transformation in this crate keeps the relative order of the
/// fields it retains.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
    options: Options,
    index: HashMap<String, usize>,
}

/// Builder for a validated [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: Vec<Field>,
    options: Options,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Options
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Options(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
            options: Options::default(),
        }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            ..self
        }
    }

    pub fn with_nullable(self, nullable: bool) -> Self {
        Field { nullable, ..self }
    }

    pub fn with_data_type(self, data_type: DataType) -> Self {
        Field { data_type, ..self }
    }

    pub fn with_options(self, options: Options) -> Self {
        Field { options, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn kind(&self) -> Kind<'_> {
        self.data_type.kind()
    }
}

impl Schema {
    /// Creates a schema without validating field names.
    ///
    /// If two fields share a name, lookups by name resolve to the first one. Use
    /// [`Schema::builder`] to reject duplicates.
    pub fn new(fields: Vec<Field>) -> Self {
        Self::new_with_options(fields, Options::default())
    }

    pub fn new_with_options(fields: Vec<Field>, options: Options) -> Self {
        let mut index = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            index.entry(field.name.clone()).or_insert(idx);
        }
        Self {
            fields,
            options,
            index,
        }
    }

    /// Creates a schema, rejecting empty and duplicate field names.
    pub fn try_new(fields: Vec<Field>, options: Options) -> Result<Self, SchemaError> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in fields.iter() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self::new_with_options(fields, options))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index_of(name).map(|idx| &self.fields[idx])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(Field::name)
    }

    pub fn with_options(self, options: Options) -> Self {
        Schema { options, ..self }
    }

    pub fn into_parts(self) -> (Vec<Field>, Options) {
        (self.fields, self.options)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields && self.options == other.options
    }
}

impl SchemaBuilder {
    pub fn add_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn add_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn field(self, name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        self.add_field(Field::new(name, data_type, nullable))
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name, value);
        self
    }

    pub fn options(self, options: Options) -> Self {
        SchemaBuilder { options, ..self }
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        Schema::try_new(self.fields, self.options)
    }
}

/// Appends `new_fields` after the fields of `schema`, keeping its options.
///
/// # Errors
///
/// Returns [`SchemaError::DuplicateField`] if a new field reuses an existing name.
pub fn add_fields(
    schema: &Schema,
    new_fields: impl IntoIterator<Item = Field>,
) -> Result<Schema, SchemaError> {
    let fields = schema
        .fields
        .iter()
        .cloned()
        .chain(new_fields)
        .collect::<Vec<_>>();
    Schema::try_new(fields, schema.options.clone())
}

/// Returns `schema` without the named fields. Schema options are kept.
///
/// An empty exclusion set returns the same shared schema.
pub fn remove_fields<I, S>(schema: &SchemaRef, exclude: I) -> SchemaRef
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let exclude = exclude
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .collect::<HashSet<_>>();
    if exclude.is_empty() {
        return Arc::clone(schema);
    }
    let fields = schema
        .fields
        .iter()
        .filter(|field| !exclude.contains(&field.name))
        .cloned()
        .collect();
    Arc::new(Schema::new_with_options(fields, schema.options.clone()))
}

/// Creates a [`Schema`] from literal `(name, type, nullable)` tuples, suitable for
/// rapid testing and development.
///
/// ## Example:
///
/// ```
/// use nestrow::{record::DataType, schema};
///
/// let schema = schema!(
///     ("id", DataType::Int64, false),
///     ("name", DataType::String, true),
/// );
/// assert_eq!(schema.len(), 2);
/// ```
#[macro_export]
macro_rules! schema {
    ($(($name: expr, $type: expr, $nullable: expr)),* $(,)?) => {
        {
            $crate::record::Schema::new(
                vec![
                    $(
                        $crate::record::Field::new($name, $type, $nullable),
                    )*
                ],
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{add_fields, remove_fields, Field, Options, Schema};
    use crate::record::{error::SchemaError, DataType, Value};

    fn sample() -> Schema {
        Schema::builder()
            .field("id", DataType::Int64, false)
            .field("name", DataType::String, true)
            .field("score", DataType::Float64, true)
            .option("source", "orders")
            .option("version", 3_i64)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_rejects_duplicates() {
        let err = Schema::builder()
            .field("id", DataType::Int64, false)
            .field("id", DataType::String, false)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField(name) if name == "id"));

        let err = Schema::builder()
            .field("", DataType::Int64, false)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::EmptyFieldName));
    }

    #[test]
    fn lookup_by_name() {
        let schema = sample();
        assert_eq!(schema.index_of("name"), Some(1));
        assert!(schema.has_field("score"));
        assert!(!schema.has_field("missing"));
        assert_eq!(
            schema.field("score").map(Field::data_type),
            Some(&DataType::Float64)
        );
    }

    #[test]
    fn add_fields_appends_and_keeps_options() {
        let schema = sample();
        let added = add_fields(&schema, vec![Field::new("tag", DataType::String, true)]).unwrap();
        assert_eq!(
            added.field_names().collect::<Vec<_>>(),
            vec!["id", "name", "score", "tag"]
        );
        assert_eq!(added.options(), schema.options());

        let err = add_fields(&schema, vec![Field::new("id", DataType::String, true)]);
        assert!(matches!(err, Err(SchemaError::DuplicateField(_))));
    }

    #[test]
    fn remove_fields_keeps_options() {
        let schema = Arc::new(sample());
        let removed = remove_fields(&schema, ["name", "missing"]);
        assert_eq!(removed.field_names().collect::<Vec<_>>(), vec!["id", "score"]);
        assert_eq!(
            removed.options().get("source"),
            Some(&Value::String("orders".into()))
        );
        assert_eq!(removed.options().get("version"), Some(&Value::Int64(3)));
        assert_eq!(removed.index_of("score"), Some(1));
    }

    #[test]
    fn remove_nothing_shares_schema() {
        let schema = Arc::new(sample());
        let removed = remove_fields(&schema, Vec::<String>::new());
        assert!(Arc::ptr_eq(&schema, &removed));
    }

    #[test]
    fn options_from_iter() {
        let options = [("a", 1_i64), ("b", 2_i64)]
            .into_iter()
            .collect::<Options>();
        assert_eq!(options.len(), 2);
        assert_eq!(options.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn schema_macro_builds_in_order() {
        let schema = crate::schema!(
            ("a", DataType::Int32, false),
            ("b", DataType::String, true),
        );
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(schema.fields()[1].is_nullable());
    }
}
