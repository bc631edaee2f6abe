//! Dot-separated field paths and their grouping by leading segment.
//!
//! Array boundaries never appear in a path: `children.name` addresses the
//! `name` field of every element of the `children` array of records.

use std::{collections::HashMap, fmt, str::FromStr};

use thiserror::Error;

use crate::{
    logging::nestrow_log,
    record::{Field, Kind, Schema},
};

/// Separator between the segments of a [`FieldPath`].
pub const PATH_SEPARATOR: char = '.';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("field path is empty")]
    Empty,
    #[error("field path {path:?} has an empty segment")]
    EmptySegment { path: String },
}

/// A parsed, non-empty sequence of field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let segments = path
            .split(PATH_SEPARATOR)
            .map(str::to_string)
            .collect::<Vec<_>>();
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment {
                path: path.to_string(),
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false, a parsed path has at least one segment.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walks the path through `schema`, entering records and arrays of records.
    ///
    /// Returns the field named by every segment, outermost first, or `None` if a
    /// segment does not exist or a non-terminal segment names a field that can not
    /// be entered.
    pub fn resolve<'s>(&self, schema: &'s Schema) -> Option<Vec<&'s Field>> {
        let mut resolved = Vec::with_capacity(self.segments.len());
        let mut current = schema;
        for (depth, segment) in self.segments.iter().enumerate() {
            let field = current.field(segment)?;
            resolved.push(field);
            if depth + 1 == self.segments.len() {
                break;
            }
            current = match field.kind() {
                Kind::Record(nested) | Kind::ArrayOfRecord(_, nested) => nested,
                Kind::Scalar | Kind::ArrayOfScalar(_) => return None,
            };
        }
        Some(resolved)
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Paths grouped by first segment, recursively.
#[derive(Debug, Clone, Default)]
pub(crate) struct PathTree {
    children: HashMap<String, PathNode>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PathNode {
    /// Some path ends at this node.
    terminal: bool,
    children: PathTree,
}

impl PathTree {
    /// Builds the tree, skipping strings that do not parse as a [`FieldPath`].
    pub(crate) fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = PathTree::default();
        for path in paths {
            match FieldPath::parse(path.as_ref()) {
                Ok(path) => tree.insert(path.segments()),
                Err(err) => {
                    nestrow_log!(
                        log::Level::Trace,
                        "projection_path_ignored",
                        "path={:?} reason={}",
                        path.as_ref(),
                        err
                    );
                }
            }
        }
        tree
    }

    fn insert(&mut self, segments: &[String]) {
        let Some((head, rest)) = segments.split_first() else {
            return;
        };
        let node = self.children.entry(head.clone()).or_default();
        if rest.is_empty() {
            node.terminal = true;
        } else {
            node.children.insert(rest);
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&PathNode> {
        self.children.get(name)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }
}

impl PathNode {
    pub(crate) fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub(crate) fn children(&self) -> &PathTree {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldPath, PathError, PathTree};
    use crate::{record::DataType, schema};

    #[test]
    fn parse_paths() {
        let path = FieldPath::parse("a.b.c").unwrap();
        assert_eq!(path.segments(), &["a", "b", "c"]);
        assert_eq!(path.first(), "a");
        assert_eq!(path.to_string(), "a.b.c");
        assert_eq!("x".parse::<FieldPath>().unwrap().len(), 1);

        assert_eq!(FieldPath::parse(""), Err(PathError::Empty));
        assert!(matches!(
            FieldPath::parse("a..b"),
            Err(PathError::EmptySegment { .. })
        ));
        assert!(matches!(
            FieldPath::parse("a."),
            Err(PathError::EmptySegment { .. })
        ));
    }

    #[test]
    fn resolve_through_records_and_arrays() {
        let leaf = schema!(("id", DataType::Int64, false));
        let child = schema!(
            ("leaf", DataType::record(leaf.clone()), true),
            ("leaves", DataType::array(DataType::record(leaf)), true),
            ("tags", DataType::array(DataType::String), true),
        );
        let root = schema!(
            ("child", DataType::record(child), true),
            ("name", DataType::String, true),
        );

        let resolved = FieldPath::parse("child.leaves.id")
            .unwrap()
            .resolve(&root)
            .unwrap();
        assert_eq!(
            resolved.iter().map(|f| f.name()).collect::<Vec<_>>(),
            vec!["child", "leaves", "id"]
        );
        assert!(FieldPath::parse("child.leaf.id")
            .unwrap()
            .resolve(&root)
            .is_some());
        assert!(FieldPath::parse("child.missing")
            .unwrap()
            .resolve(&root)
            .is_none());
        assert!(FieldPath::parse("name.length")
            .unwrap()
            .resolve(&root)
            .is_none());
        assert!(FieldPath::parse("child.tags.x")
            .unwrap()
            .resolve(&root)
            .is_none());
    }

    #[test]
    fn tree_groups_by_first_segment() {
        let tree = PathTree::from_paths(["a.b", "a.c.d", "a", "e", "bad..path", ""]);
        let mut names = tree.names().collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, vec!["a", "e"]);

        let a = tree.get("a").unwrap();
        assert!(a.is_terminal());
        assert!(a.children().get("b").unwrap().is_terminal());
        let c = a.children().get("c").unwrap();
        assert!(!c.is_terminal());
        assert!(c.children().get("d").unwrap().is_terminal());
        assert!(tree.get("e").unwrap().children().is_empty());
    }
}
