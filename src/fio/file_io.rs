use std::{
  fs::{File, OpenOptions},
  io::{self, ErrorKind},
  path::Path,
  sync::Arc,
};

use log::error;
use parking_lot::RwLock;

use crate::errors::{Errors, Result};

use super::IOManager;

/// Standard positional file I/O.
pub struct FileIO {
  fd: Arc<RwLock<File>>,
}

impl FileIO {
  pub fn new<P>(file_name: P) -> Result<Self>
  where
    P: AsRef<Path>,
  {
    match OpenOptions::new()
      .create(true)
      .read(true)
      .write(true)
      .truncate(false)
      .open(file_name)
    {
      Ok(file) => Ok(FileIO {
        fd: Arc::new(RwLock::new(file)),
      }),
      Err(e) => {
        error!("failed to open data file error: {}", e);
        Err(Errors::FailedToOpenDataFile)
      }
    }
  }
}

impl IOManager for FileIO {
  fn read(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
    let read_guard = self.fd.read();
    let mut read = 0;
    while read < buf.len() {
      match read_at(&read_guard, &mut buf[read..], offset + read as u64) {
        Ok(0) => break,
        Ok(n) => read += n,
        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
        Err(e) => {
          error!("read from data file error: {}", e);
          return Err(Errors::FailedToReadFromDataFile);
        }
      }
    }
    Ok(read)
  }

  fn write(&self, buf: &[u8], offset: u64) -> Result<usize> {
    let write_guard = self.fd.write();
    let mut written = 0;
    while written < buf.len() {
      match write_at(&write_guard, &buf[written..], offset + written as u64) {
        Ok(0) => {
          error!("write to data file error: wrote zero bytes");
          return Err(Errors::FailedToWriteToDataFile);
        }
        Ok(n) => written += n,
        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
        Err(e) => {
          error!("write to data file error: {}", e);
          return Err(Errors::FailedToWriteToDataFile);
        }
      }
    }
    Ok(written)
  }

  fn sync(&self) -> Result<()> {
    let read_guard = self.fd.read();
    if let Err(e) = read_guard.sync_all() {
      error!("failed to sync data file: {}", e);
      return Err(Errors::FailedToSyncDataFile);
    }
    Ok(())
  }

  fn size(&self) -> Result<u64> {
    let read_guard = self.fd.read();
    match read_guard.metadata() {
      Ok(meta) => Ok(meta.len()),
      Err(e) => {
        error!("failed to stat data file: {}", e);
        Err(Errors::FailedToReadFromDataFile)
      }
    }
  }

  fn truncate(&self, len: u64) -> Result<()> {
    let write_guard = self.fd.write();
    if let Err(e) = write_guard.set_len(len) {
      error!("failed to truncate data file to {} bytes: {}", len, e);
      return Err(Errors::FailedToTruncateDataFile);
    }
    Ok(())
  }
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
  use std::os::unix::fs::FileExt;
  file.read_at(buf, offset)
}

#[cfg(unix)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
  use std::os::unix::fs::FileExt;
  file.write_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
  use std::os::windows::fs::FileExt;
  file.seek_read(buf, offset)
}

#[cfg(windows)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
  use std::os::windows::fs::FileExt;
  file.seek_write(buf, offset)
}
