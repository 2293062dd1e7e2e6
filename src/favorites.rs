use std::collections::BTreeSet;

use crate::catalog::ItemId;
use crate::storage::{keys, LocalStore, StoreError};

/// The set of favorited items, persisted as a JSON array of ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    ids: BTreeSet<ItemId>,
}

impl Favorites {
    /// Load favorites from the store. Entries that are not valid ids are dropped.
    pub async fn load(store: &LocalStore) -> Result<Self, StoreError> {
        let raw: Vec<String> = store.get_json(keys::FAVORITES).await?.unwrap_or_default();
        let ids = raw
            .iter()
            .filter_map(|s| match s.parse::<ItemId>() {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping invalid favorite");
                    None
                }
            })
            .collect();
        Ok(Self { ids })
    }

    /// Persist the set. An empty set removes the key altogether.
    pub async fn save(&self, store: &LocalStore) -> Result<(), StoreError> {
        if self.ids.is_empty() {
            store.remove_item(keys::FAVORITES).await?;
            return Ok(());
        }
        let raw: Vec<String> = self.ids.iter().map(ToString::to_string).collect();
        store.set_json(keys::FAVORITES, &raw).await
    }

    /// Flip membership of `id`. Returns true if it is now a favorite.
    pub fn toggle(&mut self, id: ItemId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
