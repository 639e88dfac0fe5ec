//! Concurrent id-keyed table.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::model::Record;

/// A thread-safe table of records keyed by id.
pub struct Table<R: Record> {
    rows: DashMap<u64, R>,
    next_id: AtomicU64,
}

impl<R: Record> Table<R> {
    /// Build a table from existing records. New ids start above the highest one.
    pub fn from_records(records: Vec<R>) -> Self {
        let next_id = records.iter().map(|r| r.id()).max().unwrap_or(0) + 1;
        let rows = DashMap::with_capacity(records.len());
        for record in records {
            rows.insert(record.id(), record);
        }
        Self {
            rows,
            next_id: AtomicU64::new(next_id),
        }
    }

    /// Reserve a fresh id. Never returns the same id twice.
    pub fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Snapshot of every row, ordered by id.
    pub fn list(&self) -> Vec<R> {
        let mut rows: Vec<R> = self.rows.iter().map(|r| r.value().clone()).collect();
        rows.sort_by_key(|r| r.id());
        rows
    }

    pub fn get(&self, id: u64) -> Option<R> {
        self.rows.get(&id).map(|r| r.value().clone())
    }

    pub fn insert(&self, record: R) {
        self.rows.insert(record.id(), record);
    }

    /// Mutate a row in place while holding its entry lock.
    pub fn modify<F>(&self, id: u64, f: F) -> Option<R>
    where
        F: FnOnce(&mut R),
    {
        let mut entry = self.rows.get_mut(&id)?;
        f(entry.value_mut());
        Some(entry.value().clone())
    }

    pub fn remove(&self, id: u64) -> Option<R> {
        self.rows.remove(&id).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Product, Record};
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_list_is_ordered() {
        let mut seed = Product::seed();
        seed.reverse();
        let table = Table::from_records(seed);
        let ids: Vec<_> = table.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_concurrent_modify_loses_nothing() {
        let table = Arc::new(Table::from_records(Product::seed()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = table.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        table.modify(1, |p| p.stock += 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(table.get(1).unwrap().stock, 10 + 8 * 250);
    }

    #[test]
    fn test_allocated_ids_unique() {
        let table = Arc::new(Table::from_records(Product::seed()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let table = table.clone();
                std::thread::spawn(move || (0..500).map(|_| table.allocate_id()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(id > 3);
                assert!(seen.insert(id));
            }
        }
    }
}
