/// Configuration of the flattening engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOption {
    /// Name lifted fields after the path segments they were reached through.
    pub(crate) use_prefix: bool,
    pub(crate) separator: String,
}

impl Default for FlattenOption {
    fn default() -> Self {
        FlattenOption {
            use_prefix: true,
            separator: "_".to_string(),
        }
    }
}

impl From<bool> for FlattenOption {
    fn from(use_prefix: bool) -> Self {
        FlattenOption::default().use_prefix(use_prefix)
    }
}

impl FlattenOption {
    pub fn use_prefix(self, use_prefix: bool) -> Self {
        FlattenOption { use_prefix, ..self }
    }

    pub fn separator(self, separator: impl Into<String>) -> Self {
        FlattenOption {
            separator: separator.into(),
            ..self
        }
    }
}

impl FlattenOption {
    /// Name of a field lifted from below the top level, reached through `segments`.
    pub(crate) fn lifted_name(&self, segments: &[String], name: &str) -> String {
        if !self.use_prefix || segments.is_empty() {
            return name.to_string();
        }
        let mut lifted = segments.join(&self.separator);
        lifted.push_str(&self.separator);
        lifted.push_str(name);
        lifted
    }
}

#[cfg(test)]
mod tests {
    use super::FlattenOption;

    #[test]
    fn lifted_names() {
        let segments = vec!["children".to_string(), "grandchildren".to_string()];
        let option = FlattenOption::default();
        assert_eq!(
            option.lifted_name(&segments, "gcstringField"),
            "children_grandchildren_gcstringField"
        );
        assert_eq!(option.lifted_name(&[], "stringField"), "stringField");

        let bare = FlattenOption::from(false);
        assert_eq!(bare.lifted_name(&segments, "gcstringField"), "gcstringField");

        let custom = FlattenOption::default().separator("__");
        assert_eq!(custom.lifted_name(&segments[..1], "x"), "children__x");
    }
}
