use lazy_static::lazy_static;
use std::path::PathBuf;

lazy_static! {
  pub static ref DEFAULT_DIR_PATH: PathBuf = std::env::temp_dir().join("minicask");
}

#[derive(Debug, Clone)]
pub struct Options {
  pub dir_path: PathBuf,

  /// fsync the data file after every append.
  pub sync_writes: bool,

  /// fsync once this many bytes were appended since the last sync, 0 disables.
  pub bytes_per_sync: usize,

  pub index_type: IndexType,

  /// Replay the log through a read-only memory map at open.
  pub mmap_at_startup: bool,

  pub put_policy: PutPolicy,

  /// Return `Errors::KeyIsEmpty` instead of silently ignoring empty keys.
  pub reject_empty_keys: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexType {
  BTree,

  SkipList,
}

/// What `put` does when the key is already live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutPolicy {
  /// A later put always supersedes the earlier one.
  Overwrite,

  /// A put on a live key is a no-op and writes nothing.
  InsertIfAbsent,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      dir_path: DEFAULT_DIR_PATH.clone(),
      sync_writes: false,
      bytes_per_sync: 0,
      index_type: IndexType::BTree,
      mmap_at_startup: true,
      put_policy: PutPolicy::Overwrite,
      reject_empty_keys: false,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IOManagerType {
  StandardFileIO,

  MemoryMap,
}
