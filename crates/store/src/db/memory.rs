use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::StoreConfig;
use crate::db::{Column, Database};

type ColumnMap = BTreeMap<Box<[u8]>, Box<[u8]>>;

#[derive(Debug, Default)]
pub struct InMemoryDB {
    columns: RwLock<BTreeMap<Column, ColumnMap>>,
}

impl InMemoryDB {
    fn read(&self) -> eyre::Result<RwLockReadGuard<'_, BTreeMap<Column, ColumnMap>>> {
        self.columns
            .read()
            .map_err(|_| eyre::eyre!("failed to acquire read lock on columns"))
    }

    fn write(&self) -> eyre::Result<RwLockWriteGuard<'_, BTreeMap<Column, ColumnMap>>> {
        self.columns
            .write()
            .map_err(|_| eyre::eyre!("failed to acquire write lock on columns"))
    }
}

impl Database for InMemoryDB {
    fn open(_config: &StoreConfig) -> eyre::Result<Self> {
        Ok(Self::default())
    }

    fn has(&self, col: Column, key: &[u8]) -> eyre::Result<bool> {
        Ok(self
            .read()?
            .get(&col)
            .is_some_and(|column| column.contains_key(key)))
    }

    fn get(&self, col: Column, key: &[u8]) -> eyre::Result<Option<Box<[u8]>>> {
        Ok(self
            .read()?
            .get(&col)
            .and_then(|column| column.get(key).cloned()))
    }

    fn put(&self, col: Column, key: &[u8], value: &[u8]) -> eyre::Result<()> {
        let _ignored = self
            .write()?
            .entry(col)
            .or_default()
            .insert(key.into(), value.into());

        Ok(())
    }

    fn delete(&self, col: Column, key: &[u8]) -> eyre::Result<()> {
        if let Some(column) = self.write()?.get_mut(&col) {
            let _ignored = column.remove(key);
        }

        Ok(())
    }

    fn scan_prefix(
        &self,
        col: Column,
        prefix: &[u8],
    ) -> eyre::Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let columns = self.read()?;

        let Some(column) = columns.get(&col) else {
            return Ok(vec![]);
        };

        let entries = column
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(entries)
    }
}
