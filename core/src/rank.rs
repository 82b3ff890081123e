use serde::{Deserialize, Serialize};

/// How many best times are kept per level.
pub const RANK_CAPACITY: usize = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankItem {
    /// Unix epoch milliseconds when the game was won.
    pub timestamp_millis: u64,
    pub elapsed_millis: u64,
}

/// Best times for a single level, fastest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RankItem>", into = "Vec<RankItem>")]
pub struct RankTable {
    items: Vec<RankItem>,
}

impl From<Vec<RankItem>> for RankTable {
    fn from(items: Vec<RankItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<RankTable> for Vec<RankItem> {
    fn from(table: RankTable) -> Self {
        table.items
    }
}

impl RankTable {
    /// Builds a table from stored items, re-sorting and truncating in case the stored list was edited.
    pub fn from_items(mut items: Vec<RankItem>) -> Self {
        items.sort_by_key(|item| item.elapsed_millis);
        items.truncate(RANK_CAPACITY);
        Self { items }
    }

    pub fn items(&self) -> &[RankItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inserts `item` and returns its 0-based position, `None` when it did not make the cut.
    ///
    /// A new time equal to an existing record ranks ahead of it.
    pub fn insert(&mut self, item: RankItem) -> Option<usize> {
        let position = self
            .items
            .partition_point(|existing| existing.elapsed_millis < item.elapsed_millis);
        if position >= RANK_CAPACITY {
            return None;
        }
        self.items.insert(position, item);
        self.items.truncate(RANK_CAPACITY);
        Some(position)
    }
}
