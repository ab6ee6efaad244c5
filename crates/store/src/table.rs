// Path: crates/store/src/table.rs
//! The generic table primitive: a by-id `BTreeMap` of rows plus optional
//! ordered secondary indices kept in sync on every mutation.

use meridian_types::ids::ObjectId;
use meridian_types::StoreError;
use std::collections::BTreeMap;

/// A row stored in a [`Table`].
pub trait Row: Clone {
    /// The typed id addressing this row.
    type Id: ObjectId + std::fmt::Debug;
    /// A short name for error messages.
    const NAME: &'static str;
    /// This row's id.
    fn id(&self) -> Self::Id;
}

/// Secondary indices of a table. Implementations mirror every insert and
/// removal; [`Table::modify`] expresses an update as remove + reinsert so
/// composite keys stay consistent.
pub trait TableIndex<T>: Default {
    /// Mirrors a row insertion.
    fn on_insert(&mut self, row: &T);
    /// Mirrors a row removal.
    fn on_remove(&mut self, row: &T);
}

/// The empty index set.
#[derive(Debug, Default)]
pub struct NoIndex;

impl<T> TableIndex<T> for NoIndex {
    fn on_insert(&mut self, _row: &T) {}
    fn on_remove(&mut self, _row: &T) {}
}

/// A typed table: by-id primary map, dense instance allocator, and secondary
/// indices.
#[derive(Debug)]
pub struct Table<T: Row, Ix: TableIndex<T> = NoIndex> {
    rows: BTreeMap<T::Id, T>,
    index: Ix,
    next_instance: u32,
}

impl<T: Row, Ix: TableIndex<T>> Default for Table<T, Ix> {
    fn default() -> Self {
        Table {
            rows: BTreeMap::new(),
            index: Ix::default(),
            next_instance: 0,
        }
    }
}

impl<T: Row, Ix: TableIndex<T>> Table<T, Ix> {
    /// Creates a row under the next dense instance. The builder receives the
    /// assigned id; it must store that id in the row unchanged.
    pub fn create(&mut self, build: impl FnOnce(T::Id) -> T) -> T::Id {
        let id = T::Id::from_instance(self.next_instance);
        self.next_instance += 1;
        let row = build(id);
        debug_assert!(row.id() == id, "builder must keep the assigned id");
        self.index.on_insert(&row);
        self.rows.insert(id, row);
        id
    }

    /// Inserts a row under its own id, e.g. when seeding genesis state with
    /// well-known instances. Fails if the id is taken.
    pub fn insert(&mut self, row: T) -> Result<(), StoreError> {
        let id = row.id();
        if self.rows.contains_key(&id) {
            return Err(StoreError::DuplicateKey(T::NAME));
        }
        self.next_instance = self.next_instance.max(id.instance() + 1);
        self.index.on_insert(&row);
        self.rows.insert(id, row);
        Ok(())
    }

    /// Looks a row up by id.
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.rows.get(&id)
    }

    /// Looks a row up by id, failing with a typed error when absent.
    pub fn try_get(&self, id: T::Id) -> Result<&T, StoreError> {
        self.rows.get(&id).ok_or(StoreError::NotFound(T::NAME))
    }

    /// Applies `mutate` to the row under `id`, keeping secondary indices
    /// consistent. The mutation must not change the row's id.
    pub fn modify(
        &mut self,
        id: T::Id,
        mutate: impl FnOnce(&mut T),
    ) -> Result<(), StoreError> {
        let row = self.rows.get_mut(&id).ok_or(StoreError::NotFound(T::NAME))?;
        self.index.on_remove(row);
        mutate(row);
        debug_assert!(row.id() == id, "mutation must not change the row id");
        self.index.on_insert(row);
        Ok(())
    }

    /// Removes and returns the row under `id`.
    pub fn remove(&mut self, id: T::Id) -> Result<T, StoreError> {
        let row = self.rows.remove(&id).ok_or(StoreError::NotFound(T::NAME))?;
        self.index.on_remove(&row);
        Ok(row)
    }

    /// Whether a row exists under `id`.
    pub fn contains(&self, id: T::Id) -> bool {
        self.rows.contains_key(&id)
    }

    /// Iterates rows in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    /// All row ids in ascending order. Convenient when a sweep needs to
    /// mutate rows while iterating.
    pub fn ids(&self) -> Vec<T::Id> {
        self.rows.keys().copied().collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Read access to the secondary indices.
    pub fn index(&self) -> &Ix {
        &self.index
    }
}
