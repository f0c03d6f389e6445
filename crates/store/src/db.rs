use strum::{AsRefStr, EnumIter};

use crate::config::StoreConfig;

mod memory;

pub use memory::InMemoryDB;

/// Column families, one per resource family plus bookkeeping.
#[derive(Eq, Ord, Copy, Clone, Debug, PartialEq, PartialOrd, EnumIter, AsRefStr)]
pub enum Column {
    Markings,
    Notes,
    Palette,
    WordMemory,
    Preferences,
    Devices,
    Backups,
    Meta,
}

pub trait Database: Send + Sync + 'static {
    fn open(config: &StoreConfig) -> eyre::Result<Self>
    where
        Self: Sized;

    fn has(&self, col: Column, key: &[u8]) -> eyre::Result<bool>;
    fn get(&self, col: Column, key: &[u8]) -> eyre::Result<Option<Box<[u8]>>>;
    fn put(&self, col: Column, key: &[u8], value: &[u8]) -> eyre::Result<()>;
    fn delete(&self, col: Column, key: &[u8]) -> eyre::Result<()>;
    fn scan_prefix(&self, col: Column, prefix: &[u8])
        -> eyre::Result<Vec<(Box<[u8]>, Box<[u8]>)>>;
}
