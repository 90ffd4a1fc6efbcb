pub mod file_io;
pub mod mmap;

use std::path::Path;

use crate::{errors::Result, option::IOManagerType};

use self::{file_io::FileIO, mmap::MMapIO};

/// Abstract positional I/O over a single data file.
pub trait IOManager: Sync + Send {
  /// Reads up to `buf.len()` bytes starting at `offset`.
  /// Returns fewer bytes only when the end of the file is reached.
  fn read(&self, buf: &mut [u8], offset: u64) -> Result<usize>;

  /// Writes all of `buf` at `offset`.
  fn write(&self, buf: &[u8], offset: u64) -> Result<usize>;

  fn sync(&self) -> Result<()>;

  fn size(&self) -> Result<u64>;

  fn truncate(&self, len: u64) -> Result<()>;
}

pub fn new_io_manager<P>(filename: P, io_type: IOManagerType) -> Result<Box<dyn IOManager>>
where
  P: AsRef<Path>,
{
  match io_type {
    IOManagerType::StandardFileIO => Ok(Box::new(FileIO::new(filename)?)),
    IOManagerType::MemoryMap => Ok(Box::new(MMapIO::new(filename)?)),
  }
}
