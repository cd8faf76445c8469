use std::collections::HashMap;
use std::fmt;

use crate::config::DuplicatePolicy;
use crate::parse::split_after;
use crate::table::RecordSet;
use crate::{Error, Result, CLASS_MARKER, SUBCLASS_MARKER, TREE_COLUMN};

/// `class:subclass` pair cut out of a category page URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryKey {
    pub class: String,
    pub subclass: String,
}

impl CategoryKey {
    /// Class is whatever follows `synapt=`; subclass is what follows `Function=` up to the next `&`.
    pub fn from_url(url: &str) -> Result<Self> {
        let class = split_after(url, CLASS_MARKER).ok_or_else(|| Error::MissingMarker {
            marker: CLASS_MARKER,
            url: url.to_string(),
        })?;
        let subclass = split_after(url, SUBCLASS_MARKER)
            .and_then(|rest| rest.split('&').next())
            .ok_or_else(|| Error::MissingMarker {
                marker: SUBCLASS_MARKER,
                url: url.to_string(),
            })?;

        Ok(Self {
            class: class.to_string(),
            subclass: subclass.to_string(),
        })
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class, self.subclass)
    }
}

/// Category key to identifier tokens, in the order keys were first seen.
#[derive(Debug, Default)]
pub struct ProteinTree {
    entries: Vec<(CategoryKey, Vec<String>)>,
    positions: HashMap<CategoryKey, usize>,
}

impl ProteinTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one page's tokens. A key seen before is resolved with `policy`;
    /// it keeps the position it was first inserted at.
    pub fn insert(
        &mut self,
        key: CategoryKey,
        tokens: Vec<String>,
        policy: DuplicatePolicy,
    ) -> Result<()> {
        let Some(&pos) = self.positions.get(&key) else {
            self.positions.insert(key.clone(), self.entries.len());
            self.entries.push((key, tokens));
            return Ok(());
        };

        let existing = &mut self.entries[pos].1;
        match policy {
            DuplicatePolicy::Error => return Err(Error::DuplicateKey(key.to_string())),
            DuplicatePolicy::LastWins => *existing = tokens,
            DuplicatePolicy::Merge => {
                for token in tokens {
                    if !existing.contains(&token) {
                        existing.push(token);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &CategoryKey) -> Option<&[String]> {
        self.positions
            .get(key)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    /// One row per key, the tokens comma-joined into the single data column.
    pub fn into_record_set(self) -> RecordSet {
        let entries = self
            .entries
            .into_iter()
            .map(|(key, tokens)| (key.to_string(), tokens.join(",")))
            .collect();
        RecordSet::keyed(TREE_COLUMN, entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(class: &str, subclass: &str) -> CategoryKey {
        CategoryKey {
            class: class.into(),
            subclass: subclass.into(),
        }
    }

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn key_from_url() {
        let url = "http://host/synsys/index.php?site=search&Function=SubY&synapt=ClassX";
        let k = CategoryKey::from_url(url).unwrap();
        assert_eq!(k, key("ClassX", "SubY"));
        assert_eq!(k.to_string(), "ClassX:SubY");
    }

    #[test]
    fn class_runs_to_the_end_of_the_url() {
        let url = "index.php?site=search&synapt=Pre&x=1&Function=Vesicle";
        let k = CategoryKey::from_url(url).unwrap();
        assert_eq!(k.class, "Pre&x=1&Function=Vesicle");
        assert_eq!(k.subclass, "Vesicle");
    }

    #[test]
    fn missing_markers_fail() {
        let err = CategoryKey::from_url("index.php?site=search&Function=SubY").unwrap_err();
        assert!(matches!(err, Error::MissingMarker { marker: "synapt=", .. }));

        let err = CategoryKey::from_url("index.php?site=search&synapt=ClassX").unwrap_err();
        assert!(matches!(err, Error::MissingMarker { marker: "Function=", .. }));
    }

    #[test]
    fn last_wins_keeps_first_position() {
        let mut tree = ProteinTree::new();
        let policy = DuplicatePolicy::LastWins;
        tree.insert(key("A", "1"), tokens(&["P1"]), policy).unwrap();
        tree.insert(key("B", "2"), tokens(&["P2"]), policy).unwrap();
        tree.insert(key("A", "1"), tokens(&["P3"]), policy).unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(&key("A", "1")).unwrap(), ["P3"]);

        let records = tree.into_record_set();
        assert_eq!(records.index(), ["A:1", "B:2"]);
        assert_eq!(records.rows()[0], ["P3"]);
    }

    #[test]
    fn duplicate_as_error() {
        let mut tree = ProteinTree::new();
        let policy = DuplicatePolicy::Error;
        tree.insert(key("A", "1"), tokens(&["P1"]), policy).unwrap();
        let err = tree
            .insert(key("A", "1"), tokens(&["P2"]), policy)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(k) if k == "A:1"));
        assert_eq!(tree.get(&key("A", "1")).unwrap(), ["P1"]);
    }

    #[test]
    fn merge_appends_new_tokens() {
        let mut tree = ProteinTree::new();
        let policy = DuplicatePolicy::Merge;
        tree.insert(key("A", "1"), tokens(&["P1", "P2"]), policy).unwrap();
        tree.insert(key("A", "1"), tokens(&["P2", "P3"]), policy).unwrap();
        assert_eq!(tree.get(&key("A", "1")).unwrap(), ["P1", "P2", "P3"]);
    }

    #[test]
    fn tokens_are_comma_joined() {
        let mut tree = ProteinTree::new();
        tree.insert(
            key("ClassX", "SubY"),
            tokens(&["P12345", "Q67890"]),
            DuplicatePolicy::default(),
        )
        .unwrap();
        tree.insert(key("ClassX", "Empty"), Vec::new(), DuplicatePolicy::default())
            .unwrap();

        let records = tree.into_record_set();
        assert_eq!(records.columns(), [TREE_COLUMN]);
        assert_eq!(records.rows()[0], ["P12345,Q67890"]);
        assert_eq!(records.rows()[1], [""]);
    }
}
