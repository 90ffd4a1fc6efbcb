use std::path::{Path, PathBuf};

use crate::{
  errors::{Errors, Result},
  fio::{new_io_manager, IOManager},
  option::IOManagerType,
};

use super::log_record::{
  decode_log_record, decode_log_record_header, LogRecord, ReadLogRecord, LOG_RECORD_HEADER_SIZE,
};

pub const DATA_FILE_NAME: &str = "minicask.data";
pub const MERGE_FILE_NAME: &str = "minicask.data.merge";

/// Append-only data file with an explicit write cursor.
pub struct DataFile {
  write_off: u64,
  io_manager: Box<dyn IOManager>,
}

impl DataFile {
  /// Opens (or creates) the canonical data file in `dir_path`.
  pub fn new<P>(dir_path: P, io_type: IOManagerType) -> Result<DataFile>
  where
    P: AsRef<Path>,
  {
    Self::open(get_data_file_name(dir_path), io_type)
  }

  /// Opens the merge file in `dir_path`, discarding anything a previous
  /// aborted merge left behind.
  pub fn new_merge_file<P>(dir_path: P) -> Result<DataFile>
  where
    P: AsRef<Path>,
  {
    let file_name = get_merge_file_name(dir_path);
    let mut merge_file = Self::open(file_name, IOManagerType::StandardFileIO)?;
    if merge_file.write_off > 0 {
      merge_file.truncate(0)?;
    }
    Ok(merge_file)
  }

  fn open(file_name: PathBuf, io_type: IOManagerType) -> Result<DataFile> {
    let io_manager = new_io_manager(file_name, io_type)?;
    let write_off = io_manager.size()?;
    Ok(DataFile {
      write_off,
      io_manager,
    })
  }

  pub fn get_write_off(&self) -> u64 {
    self.write_off
  }

  /// Reads the record starting at `offset`.
  ///
  /// Returns `ReadDataFileEOF` when not even a full header is left, and
  /// `TruncatedRecord` when a header promises more bytes than the file holds.
  pub fn read_log_record(&self, offset: u64) -> Result<ReadLogRecord> {
    if offset + LOG_RECORD_HEADER_SIZE as u64 > self.write_off {
      return Err(Errors::ReadDataFileEOF);
    }

    let mut header_buf = [0u8; LOG_RECORD_HEADER_SIZE];
    let n = self.io_manager.read(&mut header_buf, offset)?;
    if n < LOG_RECORD_HEADER_SIZE {
      return Err(Errors::ReadDataFileEOF);
    }
    let header = decode_log_record_header(&header_buf)?;

    // check against the cursor before allocating, a garbage header can claim gigabytes
    let size = LOG_RECORD_HEADER_SIZE as u64 + header.body_size();
    if offset + size > self.write_off {
      return Err(Errors::TruncatedRecord);
    }

    let mut buf = vec![0u8; size as usize];
    buf[..LOG_RECORD_HEADER_SIZE].copy_from_slice(&header_buf);
    let body_len = buf.len() - LOG_RECORD_HEADER_SIZE;
    let n = self.io_manager.read(
      &mut buf[LOG_RECORD_HEADER_SIZE..],
      offset + LOG_RECORD_HEADER_SIZE as u64,
    )?;
    if n < body_len {
      return Err(Errors::TruncatedRecord);
    }

    decode_log_record(&buf)
  }

  /// Appends `log_record` at the write cursor and returns the offset it was written at.
  pub fn write_log_record(&mut self, log_record: &LogRecord) -> Result<u64> {
    let enc_record = log_record.encode();
    let offset = self.write_off;
    let n_bytes = self.io_manager.write(&enc_record, offset)?;
    self.write_off += n_bytes as u64;
    Ok(offset)
  }

  pub fn sync(&self) -> Result<()> {
    self.io_manager.sync()
  }

  /// Cuts the file to `len` bytes and moves the write cursor there.
  pub fn truncate(&mut self, len: u64) -> Result<()> {
    self.io_manager.truncate(len)?;
    self.write_off = len;
    Ok(())
  }

  /// Reopens the canonical data file in `dir_path` with another io manager.
  pub fn set_io_manager<P>(&mut self, dir_path: P, io_type: IOManagerType) -> Result<()>
  where
    P: AsRef<Path>,
  {
    self.io_manager = new_io_manager(get_data_file_name(dir_path), io_type)?;
    Ok(())
  }
}

pub fn get_data_file_name<P>(dir_path: P) -> PathBuf
where
  P: AsRef<Path>,
{
  dir_path.as_ref().join(DATA_FILE_NAME)
}

pub fn get_merge_file_name<P>(dir_path: P) -> PathBuf
where
  P: AsRef<Path>,
{
  dir_path.as_ref().join(MERGE_FILE_NAME)
}

#[cfg(test)]
mod tests {
  use std::{fs::OpenOptions, io::Write};

  use super::*;
  use crate::data::log_record::LogRecordType;

  fn open_data_file(dir: &Path) -> DataFile {
    DataFile::new(dir, IOManagerType::StandardFileIO).unwrap()
  }

  #[test]
  fn test_new_data_file() {
    let dir = tempfile::tempdir().unwrap();

    let data_file1 = open_data_file(dir.path());
    assert_eq!(data_file1.get_write_off(), 0);
    assert!(get_data_file_name(dir.path()).is_file());

    let data_file2 = DataFile::new(dir.path(), IOManagerType::MemoryMap).unwrap();
    assert_eq!(data_file2.get_write_off(), 0);
  }

  #[test]
  fn test_data_file_write_advances_offset() {
    let dir = tempfile::tempdir().unwrap();
    let mut data_file = open_data_file(dir.path());

    let rec1 = LogRecord::normal(b"aa".to_vec(), b"bbb".to_vec());
    let rec2 = LogRecord::deleted(b"aa".to_vec());
    assert_eq!(data_file.write_log_record(&rec1), Ok(0));
    assert_eq!(data_file.write_log_record(&rec2), Ok(rec1.size()));
    assert_eq!(data_file.get_write_off(), rec1.size() + rec2.size());
  }

  #[test]
  fn test_data_file_read_log_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut data_file = open_data_file(dir.path());

    let rec1 = LogRecord::normal(b"name".to_vec(), b"minicask".to_vec());
    let rec2 = LogRecord::normal(b"name".to_vec(), Vec::new());
    let rec3 = LogRecord::deleted(b"name".to_vec());
    let off1 = data_file.write_log_record(&rec1).unwrap();
    let off2 = data_file.write_log_record(&rec2).unwrap();
    let off3 = data_file.write_log_record(&rec3).unwrap();

    let read1 = data_file.read_log_record(off1).unwrap();
    assert_eq!(read1.record, rec1);
    assert_eq!(read1.size, rec1.size());

    let read2 = data_file.read_log_record(off2).unwrap();
    assert_eq!(read2.record, rec2);

    let read3 = data_file.read_log_record(off3).unwrap();
    assert_eq!(read3.record.rec_type, LogRecordType::Deleted);

    let end = off3 + read3.size;
    assert_eq!(
      data_file.read_log_record(end).err(),
      Some(Errors::ReadDataFileEOF)
    );
  }

  #[test]
  fn test_data_file_reopen_resumes_after_existing_data() {
    let dir = tempfile::tempdir().unwrap();
    let rec = LogRecord::normal(b"k".to_vec(), b"v".to_vec());
    {
      let mut data_file = open_data_file(dir.path());
      data_file.write_log_record(&rec).unwrap();
    }

    let mut data_file = open_data_file(dir.path());
    assert_eq!(data_file.get_write_off(), rec.size());
    assert_eq!(data_file.write_log_record(&rec), Ok(rec.size()));
  }

  fn write_with_tail(dir: &Path, tail: &[u8]) -> u64 {
    let rec = LogRecord::normal(b"key".to_vec(), b"value".to_vec());
    {
      let mut data_file = open_data_file(dir);
      data_file.write_log_record(&rec).unwrap();
    }
    let mut file = OpenOptions::new()
      .append(true)
      .open(get_data_file_name(dir))
      .unwrap();
    file.write_all(tail).unwrap();
    rec.size()
  }

  #[test]
  fn test_data_file_partial_header_tail() {
    let dir = tempfile::tempdir().unwrap();
    let tail_off = write_with_tail(dir.path(), &[0, 0, 0]);

    let data_file = open_data_file(dir.path());
    assert!(data_file.read_log_record(0).is_ok());
    assert_eq!(
      data_file.read_log_record(tail_off).err(),
      Some(Errors::ReadDataFileEOF)
    );
  }

  #[test]
  fn test_data_file_partial_body_tail() {
    let dir = tempfile::tempdir().unwrap();
    // header promises a 1 byte key and 4 byte value, only 2 bytes follow
    let tail = [0, 0, 0, 1, 0, 0, 0, 4, 0, 1, b'k', b'v'];
    let tail_off = write_with_tail(dir.path(), &tail);

    let data_file = open_data_file(dir.path());
    assert_eq!(
      data_file.read_log_record(tail_off).err(),
      Some(Errors::TruncatedRecord)
    );
  }

  #[test]
  fn test_data_file_garbage_header_tail() {
    let dir = tempfile::tempdir().unwrap();
    let tail_off = write_with_tail(dir.path(), &[0xff; 16]);

    let data_file = open_data_file(dir.path());
    assert_eq!(
      data_file.read_log_record(tail_off).err(),
      Some(Errors::InvalidRecordMark(0xffff))
    );
  }

  #[test]
  fn test_data_file_truncated_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut data_file = open_data_file(dir.path());
    let rec = LogRecord::normal(b"key".to_vec(), b"value".to_vec());
    data_file.write_log_record(&rec).unwrap();
    data_file.truncate(rec.size() - 2).unwrap();

    assert_eq!(
      data_file.read_log_record(0).err(),
      Some(Errors::TruncatedRecord)
    );
  }

  #[test]
  fn test_new_merge_file_discards_stale_content() {
    let dir = tempfile::tempdir().unwrap();
    {
      let mut merge_file = DataFile::new_merge_file(dir.path()).unwrap();
      merge_file
        .write_log_record(&LogRecord::normal(b"k".to_vec(), b"v".to_vec()))
        .unwrap();
    }

    let merge_file = DataFile::new_merge_file(dir.path()).unwrap();
    assert_eq!(merge_file.get_write_off(), 0);
    assert!(get_merge_file_name(dir.path()).is_file());
  }

  #[test]
  fn test_set_io_manager() {
    let dir = tempfile::tempdir().unwrap();
    let mut data_file = DataFile::new(dir.path(), IOManagerType::MemoryMap).unwrap();
    let rec = LogRecord::normal(b"k".to_vec(), b"v".to_vec());
    assert_eq!(
      data_file.write_log_record(&rec),
      Err(Errors::IOManagerReadOnly)
    );

    data_file
      .set_io_manager(dir.path(), IOManagerType::StandardFileIO)
      .unwrap();
    assert_eq!(data_file.write_log_record(&rec), Ok(0));
    assert_eq!(data_file.read_log_record(0).unwrap().record, rec);
  }
}
