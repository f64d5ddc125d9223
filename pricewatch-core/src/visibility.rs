//! Legend-driven series visibility.
//!
//! Clicking a store in the legend isolates it; clicking it again (or
//! resetting) shows everything. Visibility is a filter over outputs and never
//! touches series or indexes.

use crate::domain::StoreId;
use crate::tooltip::{RankedEntry, TooltipEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Every store is drawn.
    #[default]
    AllVisible,
    /// Only this store is drawn; the rest are isolated out.
    IsolatedOn(StoreId),
}

impl Visibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a store. Selecting the already-isolated store shows all again.
    pub fn toggle(&mut self, store: &StoreId) {
        *self = match self {
            Self::IsolatedOn(current) if current == store => Self::AllVisible,
            _ => Self::IsolatedOn(store.clone()),
        };
    }

    pub fn show_all(&mut self) {
        *self = Self::AllVisible;
    }

    pub fn is_visible(&self, store: &StoreId) -> bool {
        match self {
            Self::AllVisible => true,
            Self::IsolatedOn(current) => current == store,
        }
    }

    pub fn isolated(&self) -> Option<&StoreId> {
        match self {
            Self::AllVisible => None,
            Self::IsolatedOn(store) => Some(store),
        }
    }

    pub fn filter_entries<'a>(&self, entries: &'a [TooltipEntry]) -> Vec<&'a TooltipEntry> {
        entries
            .iter()
            .filter(|e| self.is_visible(&e.store_id))
            .collect()
    }

    /// Drop hidden stores from a ranking, keeping its order and deltas.
    pub fn filter_ranked(&self, ranked: Vec<RankedEntry>) -> Vec<RankedEntry> {
        ranked
            .into_iter()
            .filter(|r| self.is_visible(&r.entry.store_id))
            .collect()
    }
}
