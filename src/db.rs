use std::fs;

use bytes::Bytes;
use log::{debug, error, info, warn};
use parking_lot::RwLock;

use crate::{
  data::{
    data_file::{get_merge_file_name, DataFile},
    log_record::{LogRecord, LogRecordPos, LogRecordType, ReadLogRecord},
  },
  errors::{Errors, Result},
  index::{new_indexer, Indexer},
  option::{IOManagerType, Options, PutPolicy},
};

/// Bitcask storage engine over a single append-only data file.
///
/// The data file and the index live behind one reader/writer lock. Writes
/// (`put`, `delete`, `merge`) take it exclusively, `get` shares it. A
/// `None` state means the engine was closed.
pub struct Engine {
  pub(crate) options: Options,
  pub(crate) state: RwLock<Option<EngineState>>,
}

pub(crate) struct EngineState {
  pub(crate) active_file: DataFile,
  pub(crate) index: Box<dyn Indexer>,
  /// Bytes held by superseded puts and tombstones.
  pub(crate) reclaim_size: u64,
  /// Bytes appended since the last sync.
  pub(crate) bytes_write: usize,
}

/// Statistics about the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
  /// Number of live keys.
  pub key_num: usize,
  /// Bytes a merge would give back.
  pub reclaimable_size: u64,
  /// Size of the data file.
  pub disk_size: u64,
}

impl Engine {
  /// Opens the engine in `opts.dir_path`, creating the directory and data file
  /// when absent, and rebuilds the index by replaying the log.
  pub fn open(opts: Options) -> Result<Self> {
    check_options(&opts)?;

    let dir_path = opts.dir_path.clone();
    if !dir_path.is_dir() {
      if let Err(e) = fs::create_dir_all(&dir_path) {
        error!("failed to create database directory error: {}", e);
        return Err(Errors::FailedToCreateDatabaseDir);
      }
    }

    remove_stale_merge_file(&dir_path)?;

    let io_type = if opts.mmap_at_startup {
      IOManagerType::MemoryMap
    } else {
      IOManagerType::StandardFileIO
    };
    let mut active_file = DataFile::new(&dir_path, io_type)?;
    let mut index = new_indexer(&opts.index_type);

    let (valid_len, reclaim_size) = load_index_from_data_file(&active_file, index.as_mut())?;

    if opts.mmap_at_startup {
      active_file.set_io_manager(&dir_path, IOManagerType::StandardFileIO)?;
    }

    if valid_len < active_file.get_write_off() {
      warn!(
        "data file has {} trailing bytes that do not form a record, truncating to {}",
        active_file.get_write_off() - valid_len,
        valid_len
      );
      active_file.truncate(valid_len)?;
    }

    info!(
      "opened database at {:?}, {} live keys, {} bytes of log",
      dir_path,
      index.len(),
      active_file.get_write_off()
    );

    Ok(Engine {
      options: opts,
      state: RwLock::new(Some(EngineState {
        active_file,
        index,
        reclaim_size,
        bytes_write: 0,
      })),
    })
  }

  /// Stores `value` under `key`.
  ///
  /// With `PutPolicy::InsertIfAbsent` a put on a live key writes nothing.
  pub fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
    let mut guard = self.state.write();
    let state = guard.as_mut().ok_or(Errors::InvalidHandle)?;
    if !self.check_key(&key)? {
      return Ok(());
    }

    if self.options.put_policy == PutPolicy::InsertIfAbsent && state.index.get(&key).is_some() {
      debug!("key {:?} is already live, skipping put", key);
      return Ok(());
    }

    let log_record = LogRecord::normal(key.to_vec(), value.to_vec());
    let pos = state.append_log_record(&log_record, &self.options)?;

    if let Some(old_pos) = state.index.put(key.to_vec(), pos) {
      state.reclaim_size += old_pos.size;
    }
    Ok(())
  }

  /// Returns the value stored under `key`, or `KeyNotFound`.
  pub fn get(&self, key: Bytes) -> Result<Bytes> {
    let guard = self.state.read();
    let state = guard.as_ref().ok_or(Errors::InvalidHandle)?;
    if !self.check_key(&key)? {
      return Ok(Bytes::new());
    }

    let pos = state.index.get(&key).ok_or(Errors::KeyNotFound)?;
    let ReadLogRecord { record, .. } = match state.active_file.read_log_record(pos.offset) {
      Ok(read) => read,
      // the index only ever points at complete records
      Err(Errors::ReadDataFileEOF) => return Err(Errors::TruncatedRecord),
      Err(e) => return Err(e),
    };

    if record.rec_type == LogRecordType::Deleted {
      error!("index entry for key {:?} points at a tombstone", key);
      return Err(Errors::CorruptedIndex);
    }
    Ok(record.value.into())
  }

  /// Deletes `key`. Deleting an absent key is a no-op.
  pub fn delete(&self, key: Bytes) -> Result<()> {
    let mut guard = self.state.write();
    let state = guard.as_mut().ok_or(Errors::InvalidHandle)?;
    if !self.check_key(&key)? {
      return Ok(());
    }

    if state.index.get(&key).is_none() {
      debug!("key {:?} is not live, nothing to delete", key);
      return Ok(());
    }

    // the tombstone keeps replay from resurrecting the key
    let log_record = LogRecord::deleted(key.to_vec());
    let pos = state.append_log_record(&log_record, &self.options)?;
    state.reclaim_size += pos.size;

    if let Some(old_pos) = state.index.delete(&key) {
      state.reclaim_size += old_pos.size;
    }
    Ok(())
  }

  /// All live keys, order unspecified.
  pub fn list_keys(&self) -> Result<Vec<Bytes>> {
    let guard = self.state.read();
    let state = guard.as_ref().ok_or(Errors::InvalidHandle)?;
    Ok(state.index.list_keys())
  }

  pub fn stat(&self) -> Result<Stat> {
    let guard = self.state.read();
    let state = guard.as_ref().ok_or(Errors::InvalidHandle)?;
    Ok(Stat {
      key_num: state.index.len(),
      reclaimable_size: state.reclaim_size,
      disk_size: state.active_file.get_write_off(),
    })
  }

  /// Flushes the data file to disk.
  pub fn sync(&self) -> Result<()> {
    let mut guard = self.state.write();
    let state = guard.as_mut().ok_or(Errors::InvalidHandle)?;
    state.active_file.sync()?;
    state.bytes_write = 0;
    Ok(())
  }

  /// Syncs and releases the data file. Every later call fails with `InvalidHandle`.
  pub fn close(&self) -> Result<()> {
    let mut guard = self.state.write();
    let state = guard.as_ref().ok_or(Errors::InvalidHandle)?;
    state.active_file.sync()?;
    *guard = None;
    Ok(())
  }

  /// Returns `Ok(false)` when the call should be a silent no-op.
  fn check_key(&self, key: &[u8]) -> Result<bool> {
    if !key.is_empty() {
      return Ok(true);
    }
    if self.options.reject_empty_keys {
      return Err(Errors::KeyIsEmpty);
    }
    debug!("empty key, ignoring call");
    Ok(false)
  }
}

impl EngineState {
  /// Appends to the active file and applies the configured sync policy.
  pub(crate) fn append_log_record(
    &mut self,
    log_record: &LogRecord,
    options: &Options,
  ) -> Result<LogRecordPos> {
    let offset = self.active_file.write_log_record(log_record)?;
    let size = log_record.size();

    self.bytes_write += size as usize;
    let need_sync = options.sync_writes
      || (options.bytes_per_sync > 0 && self.bytes_write >= options.bytes_per_sync);
    if need_sync {
      self.active_file.sync()?;
      self.bytes_write = 0;
    }

    Ok(LogRecordPos { offset, size })
  }
}

impl Drop for Engine {
  fn drop(&mut self) {
    if let Some(state) = self.state.get_mut().as_ref() {
      if let Err(e) = state.active_file.sync() {
        error!("failed to sync data file on drop: {}", e);
      }
    }
  }
}

fn check_options(opts: &Options) -> Result<()> {
  if opts.dir_path.as_os_str().is_empty() {
    return Err(Errors::DirPathIsEmpty);
  }
  Ok(())
}

/// A merge file only survives a crash before the merge committed, the data
/// file is still authoritative.
fn remove_stale_merge_file(dir_path: &std::path::Path) -> Result<()> {
  let merge_file_name = get_merge_file_name(dir_path);
  if !merge_file_name.is_file() {
    return Ok(());
  }

  warn!("removing merge file left by an unfinished merge");
  if let Err(e) = fs::remove_file(&merge_file_name) {
    error!("failed to remove stale merge file error: {}", e);
    return Err(Errors::FailedToRemoveMergeFile);
  }
  Ok(())
}

/// Replays the data file from offset 0 into `index`.
///
/// Returns the length of the valid prefix of the file and the number of
/// reclaimable bytes found on the way. Replay stops at the first record
/// that is incomplete or malformed.
pub(crate) fn load_index_from_data_file(
  data_file: &DataFile,
  index: &mut dyn Indexer,
) -> Result<(u64, u64)> {
  let mut offset = 0;
  let mut reclaim_size = 0;
  loop {
    let (log_record, size) = match data_file.read_log_record(offset) {
      Ok(result) => (result.record, result.size),
      Err(Errors::ReadDataFileEOF) => break,
      Err(e @ (Errors::TruncatedRecord | Errors::InvalidRecordMark(_))) => {
        warn!("stop replay at offset {}: {}", offset, e);
        break;
      }
      Err(e) => return Err(e),
    };

    let pos = LogRecordPos { offset, size };
    match log_record.rec_type {
      LogRecordType::Normal => {
        if let Some(old_pos) = index.put(log_record.key, pos) {
          reclaim_size += old_pos.size;
        }
      }
      LogRecordType::Deleted => {
        reclaim_size += size;
        if let Some(old_pos) = index.delete(&log_record.key) {
          reclaim_size += old_pos.size;
        }
      }
    }

    offset += size;
  }

  Ok((offset, reclaim_size))
}
