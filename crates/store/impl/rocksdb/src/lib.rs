//! RocksDB-backed [`Database`] implementation for server deployments.
//!
//! RocksDB manages its own resources internally: the `DB` object is
//! thread-safe, file handles sit behind an internal LRU cache bounded by
//! `max_open_files`, and only one instance can be open per path per process.
//! The higher-level `Store` wrapper adds `Arc`-based sharing, so no external
//! pooling is needed.

#[cfg(test)]
mod tests;

use eyre::{bail, Result as EyreResult};
use rocksdb::{ColumnFamily, Options, DB};
use strum::IntoEnumIterator;
use versemark_store::config::StoreConfig;
use versemark_store::db::{Column, Database};

/// Limits file descriptor usage; RocksDB closes least-recently-used files
/// once the limit is reached.
const DEFAULT_MAX_OPEN_FILES: i32 = 256;

/// LRU block cache size in bytes (128MB).
const DEFAULT_BLOCK_CACHE_SIZE: usize = 128 * 1024 * 1024;

#[derive(Debug)]
pub struct RocksDB {
    db: DB,
}

impl RocksDB {
    fn cf_handle(&self, column: Column) -> Option<&ColumnFamily> {
        self.db.cf_handle(column.as_ref())
    }

    fn try_cf_handle(&self, column: Column) -> EyreResult<&ColumnFamily> {
        let Some(cf_handle) = self.cf_handle(column) else {
            bail!("unknown column family: {:?}", column);
        };

        Ok(cf_handle)
    }
}

impl Database for RocksDB {
    fn open(config: &StoreConfig) -> EyreResult<Self> {
        let mut options = Options::default();

        options.create_if_missing(true);
        options.create_missing_column_families(true);
        options.set_max_open_files(DEFAULT_MAX_OPEN_FILES);

        let cache = rocksdb::Cache::new_lru_cache(DEFAULT_BLOCK_CACHE_SIZE);
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_block_cache(&cache);
        options.set_block_based_table_factory(&block_opts);

        Ok(Self {
            db: DB::open_cf(
                &options,
                &config.path,
                Column::iter().map(|col| col.as_ref().to_owned()),
            )?,
        })
    }

    fn has(&self, col: Column, key: &[u8]) -> EyreResult<bool> {
        let cf_handle = self.try_cf_handle(col)?;

        let exists = self.db.key_may_exist_cf(cf_handle, key)
            && self.get(col, key).map(|value| value.is_some())?;

        Ok(exists)
    }

    fn get(&self, col: Column, key: &[u8]) -> EyreResult<Option<Box<[u8]>>> {
        let cf_handle = self.try_cf_handle(col)?;

        let value = self.db.get_pinned_cf(cf_handle, key)?;

        Ok(value.map(|pinned| Box::from(&*pinned)))
    }

    fn put(&self, col: Column, key: &[u8], value: &[u8]) -> EyreResult<()> {
        let cf_handle = self.try_cf_handle(col)?;

        self.db.put_cf(cf_handle, key, value)?;

        Ok(())
    }

    fn delete(&self, col: Column, key: &[u8]) -> EyreResult<()> {
        let cf_handle = self.try_cf_handle(col)?;

        self.db.delete_cf(cf_handle, key)?;

        Ok(())
    }

    fn scan_prefix(&self, col: Column, prefix: &[u8]) -> EyreResult<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let cf_handle = self.try_cf_handle(col)?;

        let mut iter = self.db.raw_iterator_cf(cf_handle);
        iter.seek(prefix);

        let mut entries = Vec::new();

        while let (Some(key), Some(value)) = (iter.key(), iter.value()) {
            if !key.starts_with(prefix) {
                break;
            }

            entries.push((Box::from(key), Box::from(value)));
            iter.next();
        }

        iter.status()?;

        Ok(entries)
    }
}
