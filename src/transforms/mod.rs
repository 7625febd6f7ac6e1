//! Transform chain.
//!
//! # Data Flow
//! ```text
//! template `${name(...)}` / `${name:...}`
//!     → Transform resolved by name at load time
//!     → apply(expanded input) → substituted output
//! ```
//!
//! # Design Decisions
//! - Transforms are pure `&str -> String` functions with no failure mode
//! - Closed set of built-ins; custom transforms come only from the registry
//! - Name collisions: the last declaration wins

pub mod builtin;
pub mod mapping;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use mapping::StaticMapping;

/// A transform supplied by the host through the registry.
///
/// Implementations must be pure: the same input always yields the same output.
pub trait RewriteTransform: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn apply(&self, input: &str) -> String;
}

/// A named string transform.
#[derive(Debug, Clone)]
pub enum Transform {
    Upper,
    Lower,
    UrlEncode,
    UrlDecode,
    Base64,
    Base64Decode,
    StaticMapping(StaticMapping),
    Custom(Arc<dyn RewriteTransform>),
}

impl Transform {
    /// Every built-in transform, in registration order.
    pub fn builtins() -> Vec<Transform> {
        vec![
            Transform::Upper,
            Transform::Lower,
            Transform::UrlEncode,
            Transform::UrlDecode,
            Transform::Base64,
            Transform::Base64Decode,
        ]
    }

    pub fn name(&self) -> &str {
        match self {
            Transform::Upper => "upper",
            Transform::Lower => "lower",
            Transform::UrlEncode => "encode",
            Transform::UrlDecode => "decode",
            Transform::Base64 => "base64",
            Transform::Base64Decode => "base64decode",
            Transform::StaticMapping(mapping) => mapping.name(),
            Transform::Custom(custom) => custom.name(),
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            Transform::Upper => builtin::upper(input),
            Transform::Lower => builtin::lower(input),
            Transform::UrlEncode => builtin::url_encode(input),
            Transform::UrlDecode => builtin::url_decode(input),
            Transform::Base64 => builtin::base64_encode(input),
            Transform::Base64Decode => builtin::base64_decode(input),
            Transform::StaticMapping(mapping) => mapping.apply(input),
            Transform::Custom(custom) => custom.apply(input),
        }
    }
}

impl From<StaticMapping> for Transform {
    fn from(mapping: StaticMapping) -> Self {
        Transform::StaticMapping(mapping)
    }
}

/// Transforms by name.
#[derive(Debug, Clone, Default)]
pub struct TransformTable {
    entries: HashMap<String, Transform>,
}

impl TransformTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the transform's own name, returning any replaced entry.
    pub fn insert(&mut self, transform: Transform) -> Option<Transform> {
        self.entries.insert(transform.name().to_string(), transform)
    }

    pub fn get(&self, name: &str) -> Option<&Transform> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Apply the named transform. `None` only when no such transform exists.
    pub fn apply(&self, name: &str, input: &str) -> Option<String> {
        self.get(name).map(|t| t.apply(input))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Reverse;

    impl RewriteTransform for Reverse {
        fn name(&self) -> &str {
            "reverse"
        }

        fn apply(&self, input: &str) -> String {
            input.chars().rev().collect()
        }
    }

    fn table() -> TransformTable {
        let mut table = TransformTable::new();
        for t in Transform::builtins() {
            table.insert(t);
        }
        table
    }

    #[test]
    fn test_builtin_names() {
        let table = table();
        assert_eq!(table.apply("upper", "abc").as_deref(), Some("ABC"));
        assert_eq!(table.apply("lower", "ABC").as_deref(), Some("abc"));
        assert_eq!(table.apply("encode", "a b").as_deref(), Some("a%20b"));
        assert_eq!(table.apply("base64decode", "YQ==").as_deref(), Some("a"));
        assert_eq!(table.apply("missing", "abc"), None);
    }

    #[test]
    fn test_mapping_scenario() {
        let mut table = table();
        table.insert(StaticMapping::from_pairs("m", [("a", "b")]).into());

        assert_eq!(table.apply("m", "a").as_deref(), Some("b"));
        assert_eq!(table.apply("m", "z").as_deref(), Some("z"));
    }

    #[test]
    fn test_last_declaration_wins() {
        let mut table = TransformTable::new();
        assert!(table
            .insert(StaticMapping::from_pairs("m", [("a", "first")]).into())
            .is_none());
        let replaced = table.insert(StaticMapping::from_pairs("m", [("a", "second")]).into());

        assert!(replaced.is_some());
        assert_eq!(table.len(), 1);
        assert_eq!(table.apply("m", "a").as_deref(), Some("second"));
    }

    #[test]
    fn test_custom_transform() {
        let mut table = TransformTable::new();
        table.insert(Transform::Custom(Arc::new(Reverse)));
        assert_eq!(table.apply("reverse", "abc").as_deref(), Some("cba"));
        // Pure: repeated application yields identical output.
        assert_eq!(table.apply("reverse", "abc"), table.apply("reverse", "abc"));
    }
}
