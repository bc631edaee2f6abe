use std::collections::HashSet;

use super::FlattenError;
use crate::{
    logging::nestrow_log,
    option::FlattenOption,
    path::FieldPath,
    record::{Field, Kind, Record, Schema, Value},
};

/// Shape of a flatten: which fields each traversed level contributes and which
/// field leads to the next level.
///
/// Output rows are the concatenation of every level's kept fields, outermost level
/// first, so the flat schema and the expanded rows share one layout.
#[derive(Debug, Clone)]
pub(crate) struct FlattenPlan {
    levels: Vec<Level>,
}

#[derive(Debug, Clone)]
struct Level {
    /// Indices, in the level's schema, of the fields copied into the output.
    keep: Vec<usize>,
    descend: Option<Descend>,
}

#[derive(Debug, Clone, Copy)]
struct Descend {
    index: usize,
    container: Container,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Record,
    Array,
}

impl FlattenPlan {
    /// Walks `path` through `schema`, returning the plan and the flat schema it
    /// produces.
    pub(crate) fn build(
        schema: &Schema,
        path: &FieldPath,
        option: &FlattenOption,
    ) -> Result<(Self, Schema), FlattenError> {
        let segments = path.segments();
        let mut levels = Vec::with_capacity(segments.len() + 1);
        let mut fields = Vec::new();
        let mut names = HashSet::new();
        let mut current = schema;

        for depth in 0..=segments.len() {
            let next = match segments.get(depth) {
                Some(segment) => match current.index_of(segment) {
                    Some(index) => {
                        let terminal = depth + 1 == segments.len();
                        Some(Self::descend(current, index, terminal, path)?)
                    }
                    None => {
                        nestrow_log!(
                            log::Level::Debug,
                            "flatten_path_truncated",
                            "path={} missing={} depth={}",
                            path,
                            segment,
                            depth
                        );
                        None
                    }
                },
                None => None,
            };

            let descend_index = next.as_ref().map(|(descend, _)| descend.index);
            let keep = (0..current.len())
                .filter(|idx| Some(*idx) != descend_index)
                .collect::<Vec<_>>();
            for &idx in keep.iter() {
                let field = lift(&current.fields()[idx], &segments[..depth], option);
                if !names.insert(field.name().to_string()) {
                    return Err(FlattenError::NameCollision(field.name().to_string()));
                }
                fields.push(field);
            }

            match next {
                Some((descend, nested)) => {
                    levels.push(Level {
                        keep,
                        descend: Some(descend),
                    });
                    current = nested;
                }
                None => {
                    levels.push(Level {
                        keep,
                        descend: None,
                    });
                    break;
                }
            }
        }

        let plan = FlattenPlan { levels };
        nestrow_log!(
            log::Level::Debug,
            "flatten_plan",
            "path={} levels={} width={}",
            path,
            plan.levels.len(),
            plan.width()
        );
        Ok((
            plan,
            Schema::new_with_options(fields, schema.options().clone()),
        ))
    }

    fn descend<'s>(
        schema: &'s Schema,
        index: usize,
        terminal: bool,
        path: &FieldPath,
    ) -> Result<(Descend, &'s Schema), FlattenError> {
        let field = &schema.fields()[index];
        let (container, nested) = match field.kind() {
            Kind::ArrayOfRecord(_, nested) => (Container::Array, nested),
            Kind::Record(nested) if !terminal => (Container::Record, nested),
            Kind::Record(_) | Kind::Scalar | Kind::ArrayOfScalar(_) if terminal => {
                return Err(FlattenError::NotArrayOfRecord {
                    path: path.to_string(),
                    field: field.name().to_string(),
                })
            }
            _ => {
                return Err(FlattenError::NotNested {
                    path: path.to_string(),
                    field: field.name().to_string(),
                })
            }
        };
        Ok((Descend { index, container }, nested.as_ref()))
    }

    /// Number of fields of the flat schema.
    pub(crate) fn width(&self) -> usize {
        self.levels.iter().map(|level| level.keep.len()).sum()
    }

    /// Expands `record` into flat rows, one per combination of array elements along
    /// the path, in row-major order.
    pub(crate) fn expand(&self, record: &Record) -> Vec<Vec<Value>> {
        let mut rows = Vec::new();
        self.expand_level(0, Some(record), Vec::with_capacity(self.width()), &mut rows);
        rows
    }

    fn expand_level(
        &self,
        depth: usize,
        record: Option<&Record>,
        mut row: Vec<Value>,
        rows: &mut Vec<Vec<Value>>,
    ) {
        let Some(level) = self.levels.get(depth) else {
            rows.push(row);
            return;
        };
        let Some(record) = record else {
            // absent branch: every field below this point is null
            let remaining = self.levels[depth..]
                .iter()
                .map(|level| level.keep.len())
                .sum::<usize>();
            row.resize(row.len() + remaining, Value::Null);
            rows.push(row);
            return;
        };

        row.extend(
            level
                .keep
                .iter()
                .map(|&idx| record.value(idx).cloned().unwrap_or(Value::Null)),
        );
        let Some(descend) = level.descend else {
            rows.push(row);
            return;
        };

        match (descend.container, record.value(descend.index)) {
            (Container::Record, Some(Value::Record(nested))) => {
                self.expand_level(depth + 1, Some(nested), row, rows)
            }
            (Container::Array, Some(Value::Array(items))) if !items.is_empty() => {
                for item in items {
                    self.expand_level(depth + 1, item.as_record_opt(), row.clone(), rows);
                }
            }
            _ => {
                nestrow_log!(
                    log::Level::Trace,
                    "flatten_null_collapse",
                    "depth={} field_index={}",
                    depth,
                    descend.index
                );
                self.expand_level(depth + 1, None, row, rows)
            }
        }
    }
}

/// Renames a field reached through `segments` and makes it nullable when it lives
/// below the top level, since an absent container fills it with null.
fn lift(field: &Field, segments: &[String], option: &FlattenOption) -> Field {
    if segments.is_empty() {
        return field.clone();
    }
    Field::new(
        option.lifted_name(segments, field.name()),
        field.data_type().clone(),
        true,
    )
    .with_options(field.options().clone())
}
