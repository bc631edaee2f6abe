//! Reduction of a schema, and of records conforming to it, to a set of nested
//! field paths.

use std::sync::Arc;

use crate::{
    logging::nestrow_log,
    path::PathTree,
    record::{DataType, Field, Kind, Record, Schema, SchemaRef, Value},
};

/// Returns the part of `schema` reachable through `paths`.
///
/// A path ending on a field keeps that field whole. A path continuing below a
/// record or an array of records keeps the field with its nested schema reduced
/// to the remainder paths. Selected fields keep their source order and fields
/// whose reduction selects nothing are dropped. Paths naming missing fields, or
/// not parsing at all, are ignored.
pub fn select_fields<I, S>(schema: &Schema, paths: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    select(schema, &PathTree::from_paths(paths))
}

fn select(schema: &Schema, tree: &PathTree) -> Schema {
    if tree.is_empty() {
        return Schema::new_with_options(Vec::new(), schema.options().clone());
    }
    for name in tree.names().filter(|name| !schema.has_field(name)) {
        nestrow_log!(
            log::Level::Trace,
            "projection_path_ignored",
            "field={} reason=missing",
            name
        );
    }
    let fields = schema
        .fields()
        .iter()
        .filter_map(|field| {
            let node = tree.get(field.name())?;
            if node.is_terminal() {
                Some(field.clone())
            } else {
                reduce(field, node.children())
            }
        })
        .collect();
    Schema::new_with_options(fields, schema.options().clone())
}

fn reduce(field: &Field, tree: &PathTree) -> Option<Field> {
    let data_type = match field.kind() {
        Kind::Record(nested) => DataType::record(select_non_empty(nested, tree)?),
        Kind::ArrayOfRecord(element, nested) => {
            let reduced = select_non_empty(nested, tree)?;
            DataType::Array(Arc::new(
                element.clone().with_data_type(DataType::record(reduced)),
            ))
        }
        Kind::Scalar | Kind::ArrayOfScalar(_) => return None,
    };
    Some(field.clone().with_data_type(data_type))
}

fn select_non_empty(schema: &Schema, tree: &PathTree) -> Option<Schema> {
    let reduced = select(schema, tree);
    (!reduced.is_empty()).then_some(reduced)
}

/// Rebuilds `record` against `schema`, normally the result of [`select_fields`]
/// on the record's schema.
///
/// Values are matched by field name. Nested records and arrays of records are
/// rebuilt against the nested reduced schemas while null records and null arrays
/// stay null. A field the record does not have becomes null.
pub fn project(schema: &SchemaRef, record: &Record) -> Record {
    if Arc::ptr_eq(schema, record.schema()) {
        return record.clone();
    }
    let values = schema
        .fields()
        .iter()
        .map(|field| match record.get(field.name()) {
            Some(value) => project_value(field.data_type(), value),
            None => Value::Null,
        })
        .collect();
    Record::new(Arc::clone(schema), values)
}

fn project_value(data_type: &DataType, value: &Value) -> Value {
    match (data_type.kind(), value) {
        (Kind::Record(schema), Value::Record(nested)) => Value::Record(project(schema, nested)),
        (Kind::ArrayOfRecord(_, schema), Value::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Record(nested) => Value::Record(project(schema, nested)),
                    other => other.clone(),
                })
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// A reduced schema computed once and applied to many records of the source
/// schema.
#[derive(Debug, Clone)]
pub struct Projection {
    schema: SchemaRef,
}

impl Projection {
    pub fn new<I, S>(schema: &Schema, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            schema: Arc::new(select_fields(schema, paths)),
        }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn apply(&self, record: &Record) -> Record {
        project(&self.schema, record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{project, select_fields, Projection};
    use crate::{
        record::{DataType, Options, Record, Schema, Value},
        schema,
    };

    fn person_schema() -> Schema {
        let address = schema!(
            ("street", DataType::String, true),
            ("city", DataType::String, true),
        );
        let phone = schema!(
            ("kind", DataType::String, false),
            ("number", DataType::String, false),
        );
        Schema::new_with_options(
            schema!(
                ("id", DataType::Int64, false),
                ("name", DataType::String, true),
                ("address", DataType::record(address), true),
                ("phones", DataType::array(DataType::record(phone)), true),
                ("tags", DataType::array(DataType::String), true),
            )
            .into_parts()
            .0,
            Options::new().with_option("source", "people"),
        )
    }

    fn person(schema: &Arc<Schema>, with_address: bool, phones: Option<usize>) -> Record {
        let address_schema = schema.fields()[2].data_type().nested_schema().unwrap();
        let phone_schema = schema.fields()[3].data_type().nested_schema().unwrap();
        let address = with_address.then(|| {
            Record::new(
                address_schema.clone(),
                vec![Value::from("Main St"), Value::from("Springfield")],
            )
        });
        let phones = phones.map(|count| {
            (0..count)
                .map(|idx| {
                    Value::Record(Record::new(
                        phone_schema.clone(),
                        vec![Value::from("home"), Value::String(format!("555-{idx}"))],
                    ))
                })
                .collect::<Vec<_>>()
        });
        Record::try_new(
            schema.clone(),
            vec![
                Value::Int64(1),
                Value::from("Ada"),
                Value::from(address),
                Value::from(phones),
                Value::Array(vec![Value::from("a")]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn select_keeps_source_order() {
        let schema = person_schema();
        let reduced = select_fields(&schema, ["tags", "address.city", "id"]);
        assert_eq!(
            reduced.field_names().collect::<Vec<_>>(),
            vec!["id", "address", "tags"]
        );
        let address = reduced.field("address").unwrap().data_type().nested_schema().unwrap();
        assert_eq!(address.field_names().collect::<Vec<_>>(), vec!["city"]);
        assert_eq!(reduced.options().get("source"), Some(&Value::from("people")));
    }

    #[test]
    fn select_into_array_of_records() {
        let schema = person_schema();
        let reduced = select_fields(&schema, ["phones.number"]);
        let phones = reduced.field("phones").unwrap();
        assert!(phones.is_nullable());
        match phones.data_type() {
            DataType::Array(element) => {
                assert!(!element.is_nullable());
                let nested = element.data_type().nested_schema().unwrap();
                assert_eq!(nested.field_names().collect::<Vec<_>>(), vec!["number"]);
            }
            other => panic!("unexpected type {other}"),
        }
    }

    #[test]
    fn select_edge_cases() {
        let schema = person_schema();
        let none = select_fields(&schema, Vec::<String>::new());
        assert!(none.is_empty());
        assert_eq!(none.options(), schema.options());

        let whole = select_fields(&schema, ["address"]);
        assert_eq!(whole.fields()[0], schema.fields()[2]);

        let terminal_wins = select_fields(&schema, ["address.city", "address"]);
        assert_eq!(terminal_wins.fields()[0], schema.fields()[2]);

        let ignored = select_fields(
            &schema,
            ["missing", "address.missing", "name.length", "tags.x", "a..b", ""],
        );
        assert!(ignored.is_empty());
    }

    #[test]
    fn select_every_top_level_field_is_identity() {
        let schema = person_schema();
        let reduced = select_fields(&schema, schema.field_names());
        assert_eq!(reduced, schema);
    }

    #[test]
    fn project_nested_values() {
        let schema = Arc::new(person_schema());
        let record = person(&schema, true, Some(2));
        let projection = Projection::new(&schema, ["name", "address.city", "phones.number"]);

        let projected = projection.apply(&record);
        assert!(Record::try_new(projected.schema().clone(), projected.values().to_vec()).is_ok());
        assert_eq!(projected.get_string("name"), Some("Ada"));
        assert_eq!(
            projected.get_record("address").unwrap().values(),
            &[Value::from("Springfield")]
        );
        let phones = projected.get_array("phones").unwrap();
        assert_eq!(phones.len(), 2);
        assert_eq!(
            phones[1].as_record_opt().unwrap().get_string("number"),
            Some("555-1")
        );
    }

    #[test]
    fn project_propagates_nulls() {
        let schema = Arc::new(person_schema());
        let projection = Projection::new(&schema, ["address.city", "phones.number"]);

        let projected = projection.apply(&person(&schema, false, None));
        assert_eq!(projected.values(), &[Value::Null, Value::Null]);

        let projected = projection.apply(&person(&schema, true, Some(0)));
        assert_eq!(projected.get_array("phones"), Some(&[] as &[Value]));
    }

    #[test]
    fn project_shares_untouched_subtrees() {
        let schema = Arc::new(person_schema());
        let record = person(&schema, true, Some(1));
        let reduced = Arc::new(select_fields(&schema, ["address"]));

        let projected = project(&reduced, &record);
        assert!(Arc::ptr_eq(
            projected.get_record("address").unwrap().schema(),
            record.get_record("address").unwrap().schema()
        ));
        assert_eq!(project(&schema, &record), record);
    }

    #[test]
    fn project_fills_missing_fields_with_null() {
        let source = Arc::new(schema!(("a", DataType::Int32, true)));
        let target = Arc::new(schema!(
            ("a", DataType::Int32, true),
            ("b", DataType::String, true),
        ));
        let record = Record::new(source, vec![Value::Int32(1)]);
        let projected = project(&target, &record);
        assert_eq!(projected.values(), &[Value::Int32(1), Value::Null]);
    }
}
