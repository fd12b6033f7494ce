//! Persistent module-graph cache built on `hoard-codec`.
//!
//! [`GraphCache`] freezes every module of a build in its own session, hands the
//! records to a [`Serializer`], and on the next run thaws them back. A failure
//! anywhere in a load is reported as a cache miss.

mod atomic_write;
mod config;
mod file;
mod graph_cache;
mod serializer;

pub use atomic_write::{
    AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy, atomic_write, recover_bak_file,
};
pub use config::{CacheConfig, ConfigError, HoardConfig, config_path};
pub use file::{CACHE_FILE_NAME, JsonFileSerializer};
pub use graph_cache::{GraphCache, ModuleSnapshot};
pub use serializer::{MemorySerializer, Serializer, StoredValue, WriteOp};
