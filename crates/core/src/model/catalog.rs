use std::collections::{BTreeSet, HashSet};

use crate::model::item::Item;

/// Pool of items eligible for a round.
///
/// Items are kept sorted by id with duplicates removed, so a seeded random
/// source always sees the same ordering regardless of how the catalog was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        let set: BTreeSet<Item> = items.into_iter().collect();
        Self {
            items: set.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, item: &Item) -> bool {
        self.items.binary_search(item).is_ok()
    }

    /// Number of distinct names; two regions may list the same name.
    #[must_use]
    pub fn distinct_names(&self) -> usize {
        self.items
            .iter()
            .map(Item::name)
            .collect::<HashSet<_>>()
            .len()
    }
}

impl FromIterator<Item> for Catalog {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> Item {
        Item::parse_id(id).unwrap()
    }

    #[test]
    fn deduplicates_and_sorts() {
        let catalog = Catalog::new(vec![
            item("Europe-Spain"),
            item("Asia-Japan"),
            item("Europe-Spain"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[0], item("Asia-Japan"));
        assert!(catalog.contains(&item("Europe-Spain")));
    }

    #[test]
    fn counts_distinct_names_across_regions() {
        let catalog: Catalog = vec![item("Europe-Georgia"), item("North_America-Georgia")]
            .into_iter()
            .collect();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.distinct_names(), 1);
    }
}
