use std::{fs::OpenOptions, path::Path, sync::Arc};

use log::error;
use memmap2::Mmap;
use parking_lot::Mutex;

use crate::errors::{Errors, Result};

use super::IOManager;

/// Read-only memory map, used to speed up replay at startup.
pub struct MMapIO {
  map: Arc<Mutex<Mmap>>,
}

impl MMapIO {
  pub fn new<P>(file_name: P) -> Result<Self>
  where
    P: AsRef<Path>,
  {
    let file = match OpenOptions::new()
      .create(true)
      .read(true)
      .append(true)
      .open(file_name)
    {
      Ok(file) => file,
      Err(e) => {
        error!("failed to open data file error: {}", e);
        return Err(Errors::FailedToOpenDataFile);
      }
    };

    // SAFETY: the map is only read during replay at open, before the engine
    // hands out any handle that could write to the file.
    match unsafe { Mmap::map(&file) } {
      Ok(map) => Ok(MMapIO {
        map: Arc::new(Mutex::new(map)),
      }),
      Err(e) => {
        error!("failed to map data file error: {}", e);
        Err(Errors::FailedToOpenDataFile)
      }
    }
  }
}

impl IOManager for MMapIO {
  fn read(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
    let map_arr = self.map.lock();
    let len = map_arr.len() as u64;
    if offset >= len {
      return Ok(0);
    }

    let end = (offset + buf.len() as u64).min(len);
    let val = &map_arr[offset as usize..end as usize];
    buf[..val.len()].copy_from_slice(val);
    Ok(val.len())
  }

  fn write(&self, _buf: &[u8], _offset: u64) -> Result<usize> {
    Err(Errors::IOManagerReadOnly)
  }

  fn sync(&self) -> Result<()> {
    Ok(())
  }

  fn size(&self) -> Result<u64> {
    let map_arr = self.map.lock();
    Ok(map_arr.len() as u64)
  }

  fn truncate(&self, _len: u64) -> Result<()> {
    Err(Errors::IOManagerReadOnly)
  }
}
