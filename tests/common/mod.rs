//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use nestrow::{
    record::{DataType, Record, SchemaRef, Value},
    schema,
};

pub const STRING_VALUE: &str = "stringValue";
pub const CSTRING_VALUE: &str = "cstringValue";
pub const GCSTRING_VALUE: &str = "gcstringValue";

pub fn grandchild_schema() -> SchemaRef {
    Arc::new(schema!(("gcstringField", DataType::String, true)))
}

/// `{cstringField, grandchild: {gcstringField}, grandchildren: [{gcstringField}]}`
pub fn child_schema() -> SchemaRef {
    let grandchild = grandchild_schema();
    Arc::new(schema!(
        ("cstringField", DataType::String, true),
        ("grandchild", DataType::record(grandchild.clone()), true),
        (
            "grandchildren",
            DataType::array(DataType::record(grandchild)),
            true
        ),
    ))
}

/// `{stringField, children: [child]}`
pub fn parent_schema() -> SchemaRef {
    Arc::new(schema!(
        ("stringField", DataType::String, true),
        ("children", DataType::array(DataType::record(child_schema())), true),
    ))
}

pub fn grandchild() -> Value {
    Value::Record(Record::new(
        grandchild_schema(),
        vec![Value::from(GCSTRING_VALUE)],
    ))
}

/// A child holding `grandchildren` grandchildren, or a null array for `None`.
pub fn child(grandchildren: Option<usize>) -> Value {
    let grandchildren =
        grandchildren.map(|count| (0..count).map(|_| grandchild()).collect::<Vec<_>>());
    Value::Record(Record::new(
        child_schema(),
        vec![
            Value::from(CSTRING_VALUE),
            grandchild(),
            Value::from(grandchildren),
        ],
    ))
}

/// A parent record whose `children` array holds one child per entry of
/// `children`, each with the given number of grandchildren.
pub fn parent(children: Option<Vec<Option<usize>>>) -> Record {
    let children = children.map(|children| children.into_iter().map(child).collect::<Vec<_>>());
    Record::try_new(
        parent_schema(),
        vec![Value::from(STRING_VALUE), Value::from(children)],
    )
    .unwrap()
}

/// Two children with two grandchildren each.
pub fn scenario_record() -> Record {
    parent(Some(vec![Some(2), Some(2)]))
}

/// A child carrying `name` whose grandchildren carry the given names, or a null
/// array for `None`.
pub fn named_child(name: &str, grandchildren: Option<&[&str]>) -> Value {
    let grandchildren = grandchildren.map(|names| {
        names
            .iter()
            .map(|gc| Value::Record(Record::new(grandchild_schema(), vec![Value::from(*gc)])))
            .collect::<Vec<_>>()
    });
    Value::Record(Record::new(
        child_schema(),
        vec![Value::from(name), grandchild(), Value::from(grandchildren)],
    ))
}

pub fn named_parent(children: Vec<Value>) -> Record {
    Record::try_new(
        parent_schema(),
        vec![Value::from(STRING_VALUE), Value::Array(children)],
    )
    .unwrap()
}
