//! Static lookup tables declared with `<mapping>`.

use std::collections::BTreeMap;
use std::sync::Arc;

/// An immutable `from -> to` table. Unknown input passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMapping {
    name: String,
    table: Arc<BTreeMap<String, String>>,
}

impl StaticMapping {
    pub fn new(name: impl Into<String>, table: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            table: Arc::new(table),
        }
    }

    /// Build from ordered pairs; a repeated `from` key keeps the last value.
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(name, table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, input: &str) -> String {
        self.table
            .get(input)
            .cloned()
            .unwrap_or_else(|| input.to_string())
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_and_pass_through() {
        let mapping = StaticMapping::from_pairs("m", [("a", "b"), ("north", "n")]);

        assert_eq!(mapping.apply("a"), "b");
        assert_eq!(mapping.apply("north"), "n");
        assert_eq!(mapping.apply("z"), "z");
        assert_eq!(mapping.apply(""), "");
    }

    #[test]
    fn test_duplicate_from_last_wins() {
        let mapping = StaticMapping::from_pairs("m", [("a", "first"), ("a", "second")]);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.apply("a"), "second");
    }
}
