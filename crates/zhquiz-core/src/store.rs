//! In-memory dictionary store.

use std::collections::BTreeMap;

use crate::model::{DictionaryItem, DictionaryKind};

/// The three item collections, each keyed by identifier.
///
/// Read-only once loaded; the session borrows it for its whole lifetime.
#[derive(Debug, Clone, Default)]
pub struct DictionaryStore {
    words: BTreeMap<String, DictionaryItem>,
    characters: BTreeMap<String, DictionaryItem>,
    grammar: BTreeMap<String, DictionaryItem>,
}

impl DictionaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the collection for its kind.
    ///
    /// Returns `false` and leaves the existing item in place if the identifier
    /// is already taken.
    pub fn insert(&mut self, item: DictionaryItem) -> bool {
        let collection = self.collection_mut(item.kind);
        if collection.contains_key(&item.id) {
            return false;
        }
        collection.insert(item.id.clone(), item);
        true
    }

    pub fn get(&self, kind: DictionaryKind, id: &str) -> Option<&DictionaryItem> {
        self.collection(kind).get(id)
    }

    /// Items of one kind, ordered by identifier.
    pub fn items(&self, kind: DictionaryKind) -> impl Iterator<Item = &DictionaryItem> {
        self.collection(kind).values()
    }

    pub fn len(&self, kind: DictionaryKind) -> usize {
        self.collection(kind).len()
    }

    pub fn total_len(&self) -> usize {
        self.words.len() + self.characters.len() + self.grammar.len()
    }

    fn collection(&self, kind: DictionaryKind) -> &BTreeMap<String, DictionaryItem> {
        match kind {
            DictionaryKind::Word => &self.words,
            DictionaryKind::Character => &self.characters,
            DictionaryKind::Grammar => &self.grammar,
        }
    }

    fn collection_mut(&mut self, kind: DictionaryKind) -> &mut BTreeMap<String, DictionaryItem> {
        match kind {
            DictionaryKind::Word => &mut self.words,
            DictionaryKind::Character => &mut self.characters,
            DictionaryKind::Grammar => &mut self.grammar,
        }
    }
}

impl Extend<DictionaryItem> for DictionaryStore {
    fn extend<T: IntoIterator<Item = DictionaryItem>>(&mut self, iter: T) {
        for item in iter {
            let (kind, id) = (item.kind, item.id.clone());
            if !self.insert(item) {
                tracing::debug!(%kind, %id, "duplicate dictionary item ignored");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AcceptedForm;

    fn item(kind: DictionaryKind, id: &str, english: &str) -> DictionaryItem {
        DictionaryItem {
            id: id.into(),
            kind,
            chinese: vec![AcceptedForm::Literal("字".into())],
            english: vec![AcceptedForm::Literal(english.into())],
            note: None,
        }
    }

    #[test]
    fn items_are_keyed_per_kind() {
        let mut store = DictionaryStore::new();
        assert!(store.insert(item(DictionaryKind::Word, "a1", "one")));
        assert!(store.insert(item(DictionaryKind::Character, "a1", "char")));
        assert_eq!(store.len(DictionaryKind::Word), 1);
        assert_eq!(store.len(DictionaryKind::Character), 1);
        assert_eq!(store.len(DictionaryKind::Grammar), 0);
        assert_eq!(store.total_len(), 2);
    }

    #[test]
    fn duplicate_id_keeps_first() {
        let mut store = DictionaryStore::new();
        assert!(store.insert(item(DictionaryKind::Word, "w1", "first")));
        assert!(!store.insert(item(DictionaryKind::Word, "w1", "second")));
        let kept = store.get(DictionaryKind::Word, "w1").unwrap();
        assert_eq!(kept.literals(crate::model::Script::English), vec!["first"]);
    }

    #[test]
    fn items_iterate_in_id_order() {
        let mut store = DictionaryStore::new();
        store.extend([
            item(DictionaryKind::Word, "w3", "c"),
            item(DictionaryKind::Word, "w1", "a"),
            item(DictionaryKind::Word, "w2", "b"),
        ]);
        let ids: Vec<_> = store
            .items(DictionaryKind::Word)
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["w1", "w2", "w3"]);
    }
}
