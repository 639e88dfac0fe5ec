//! In-memory backing store.
//!
//! # Data Flow
//! ```text
//! facade operation
//!     → Store<R> (mode dispatch)
//!     → Table<R> (stateful: concurrent map keyed by id)
//!     → R::seed() (stateless: dataset regenerated per call)
//! ```
//!
//! # Design Decisions
//! - One table per entity kind; mutations on one record serialize through
//!   the map's entry lock, so concurrent updates never lose writes
//! - Ids come from a per-table atomic allocator that starts above the seed
//! - Stateless mode reproduces the simulator: reads see the seed, writes
//!   are synthesized and dropped

pub mod table;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::model::{Deleted, Record};

pub use table::Table;

/// Whether writes persist across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// Creates, updates and deletes are visible to later reads.
    #[default]
    Stateful,
    /// Every call works against a freshly generated seed.
    Stateless,
}

/// Entity storage with mode-dependent write semantics.
pub struct Store<R: Record> {
    mode: StoreMode,
    table: Table<R>,
}

impl<R: Record> Store<R> {
    /// Create a store holding the entity's seed data.
    pub fn new(mode: StoreMode) -> Self {
        Self {
            mode,
            table: Table::from_records(R::seed()),
        }
    }

    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    /// All records, ordered by id.
    pub fn list(&self) -> Vec<R> {
        match self.mode {
            StoreMode::Stateful => self.table.list(),
            StoreMode::Stateless => R::seed(),
        }
    }

    pub fn get(&self, id: u64) -> Option<R> {
        match self.mode {
            StoreMode::Stateful => self.table.get(id),
            StoreMode::Stateless => R::seed().into_iter().find(|r| r.id() == id),
        }
    }

    /// Build a record from a draft with a fresh id and insert it.
    pub fn create(&self, draft: R::Draft) -> R {
        let id = self.table.allocate_id();
        let record = R::from_draft(id, draft, Utc::now());
        if self.mode == StoreMode::Stateful {
            self.table.insert(record.clone());
        }
        record
    }

    /// Merge a patch over an existing record. `None` if the id is unknown.
    pub fn update(&self, id: u64, patch: R::Patch) -> Option<R> {
        let merge = |record: &mut R| {
            record.apply_patch(patch);
            record.touch(Utc::now());
        };
        match self.mode {
            StoreMode::Stateful => self.table.modify(id, merge),
            StoreMode::Stateless => {
                let mut record = self.get(id)?;
                merge(&mut record);
                Some(record)
            }
        }
    }

    pub fn delete(&self, id: u64) -> Option<Deleted> {
        let removed = match self.mode {
            StoreMode::Stateful => self.table.remove(id).is_some(),
            StoreMode::Stateless => self.get(id).is_some(),
        };
        removed.then_some(Deleted { id })
    }

    pub fn len(&self) -> usize {
        match self.mode {
            StoreMode::Stateful => self.table.len(),
            StoreMode::Stateless => R::seed().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
