use std::result;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Errors {
  #[error("database dir path can not be empty")]
  DirPathIsEmpty,

  #[error("failed to create the database directory")]
  FailedToCreateDatabaseDir,

  #[error("failed to open data file")]
  FailedToOpenDataFile,

  #[error("failed to read from data file")]
  FailedToReadFromDataFile,

  #[error("failed to write to data file")]
  FailedToWriteToDataFile,

  #[error("failed to sync data file")]
  FailedToSyncDataFile,

  #[error("failed to truncate data file")]
  FailedToTruncateDataFile,

  #[error("failed to rename merge file over the data file")]
  FailedToRenameMergeFile,

  #[error("failed to remove merge file")]
  FailedToRemoveMergeFile,

  #[error("io manager is read only")]
  IOManagerReadOnly,

  #[error("the key is empty")]
  KeyIsEmpty,

  #[error("key is not found in database")]
  KeyNotFound,

  #[error("engine handle is closed or was never opened")]
  InvalidHandle,

  #[error("log record header is too short")]
  InvalidRecordHeader,

  #[error("log record mark {0} is unknown")]
  InvalidRecordMark(u16),

  #[error("log record is truncated")]
  TruncatedRecord,

  #[error("read data file eof")]
  ReadDataFileEOF,

  #[error("index points at a record that is not a live put")]
  CorruptedIndex,
}

impl Errors {
  /// Whether the error came from the underlying filesystem.
  pub fn is_io_error(&self) -> bool {
    matches!(
      self,
      Errors::FailedToCreateDatabaseDir
        | Errors::FailedToOpenDataFile
        | Errors::FailedToReadFromDataFile
        | Errors::FailedToWriteToDataFile
        | Errors::FailedToSyncDataFile
        | Errors::FailedToTruncateDataFile
        | Errors::FailedToRenameMergeFile
        | Errors::FailedToRemoveMergeFile
        | Errors::IOManagerReadOnly
        | Errors::TruncatedRecord
    )
  }
}

pub type Result<T> = result::Result<T, Errors>;
