use std::fs;

use log::{debug, error, info, warn};

use crate::{
  data::{
    data_file::{get_data_file_name, get_merge_file_name, DataFile},
    log_record::{LogRecordPos, LogRecordType},
  },
  db::{Engine, EngineState},
  errors::{Errors, Result},
  option::IOManagerType,
};

impl Engine {
  /// Rewrites only the live records into a fresh data file, dropping
  /// superseded puts and tombstones.
  ///
  /// The rename of the merge file over the data file is the commit point.
  /// Until then the data file and the index are untouched, so a failed
  /// merge can simply be retried.
  pub fn merge(&self) -> Result<()> {
    let mut guard = self.state.write();
    let state = guard.as_mut().ok_or(Errors::InvalidHandle)?;

    let old_size = state.active_file.get_write_off();
    if old_size == 0 {
      debug!("data file is empty, nothing to merge");
      return Ok(());
    }

    let dir_path = &self.options.dir_path;
    let staged = match rewrite_live_records(state, dir_path) {
      Ok(staged) => staged,
      Err(e) => {
        remove_merge_file(dir_path);
        return Err(e);
      }
    };

    let merge_file_name = get_merge_file_name(dir_path);
    if let Err(e) = fs::rename(&merge_file_name, get_data_file_name(dir_path)) {
      error!("failed to rename merge file error: {}", e);
      remove_merge_file(dir_path);
      return Err(Errors::FailedToRenameMergeFile);
    }

    // the merged file is canonical from here on
    let new_active_file = match DataFile::new(dir_path, IOManagerType::StandardFileIO) {
      Ok(data_file) => data_file,
      Err(e) => {
        error!("merge committed but the new data file can not be opened, closing engine");
        *guard = None;
        return Err(e);
      }
    };
    state.active_file = new_active_file;
    for (key, pos) in staged {
      state.index.put(key, pos);
    }
    state.reclaim_size = 0;
    state.bytes_write = 0;

    info!(
      "merge finished, data file went from {} to {} bytes",
      old_size,
      state.active_file.get_write_off()
    );
    Ok(())
  }
}

/// Copies every record the index still points at into the merge file, in
/// log order, and returns the positions they got there.
fn rewrite_live_records(
  state: &EngineState,
  dir_path: &std::path::Path,
) -> Result<Vec<(Vec<u8>, LogRecordPos)>> {
  let mut merge_file = DataFile::new_merge_file(dir_path)?;
  let mut staged = Vec::with_capacity(state.index.len());

  let mut offset = 0;
  loop {
    let (log_record, size) = match state.active_file.read_log_record(offset) {
      Ok(result) => (result.record, result.size),
      Err(Errors::ReadDataFileEOF) => break,
      Err(e) => return Err(e),
    };

    let is_live = log_record.rec_type == LogRecordType::Normal
      && state
        .index
        .get(&log_record.key)
        .is_some_and(|pos| pos.offset == offset);
    if is_live {
      let new_offset = merge_file.write_log_record(&log_record)?;
      let pos = LogRecordPos {
        offset: new_offset,
        size,
      };
      staged.push((log_record.key, pos));
    }

    offset += size;
  }

  merge_file.sync()?;
  Ok(staged)
}

/// Best-effort cleanup of an uncommitted merge file.
fn remove_merge_file(dir_path: &std::path::Path) {
  if let Err(e) = fs::remove_file(get_merge_file_name(dir_path)) {
    warn!("failed to clean up merge file: {}", e);
  }
}
