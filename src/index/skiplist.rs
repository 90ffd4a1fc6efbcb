use bytes::Bytes;
use crossbeam_skiplist::SkipMap;

use crate::data::log_record::LogRecordPos;

use super::Indexer;

pub struct SkipList {
  skl: SkipMap<Vec<u8>, LogRecordPos>,
}

impl SkipList {
  pub fn new() -> Self {
    Self {
      skl: SkipMap::new(),
    }
  }
}

impl Indexer for SkipList {
  fn put(&mut self, key: Vec<u8>, pos: LogRecordPos) -> Option<LogRecordPos> {
    let old = self.get(&key);
    self.skl.insert(key, pos);
    old
  }

  fn get(&self, key: &[u8]) -> Option<LogRecordPos> {
    self.skl.get(key).map(|entry| *entry.value())
  }

  fn delete(&mut self, key: &[u8]) -> Option<LogRecordPos> {
    self.skl.remove(key).map(|entry| *entry.value())
  }

  fn list_keys(&self) -> Vec<Bytes> {
    self
      .skl
      .iter()
      .map(|entry| Bytes::copy_from_slice(entry.key()))
      .collect()
  }

  fn len(&self) -> usize {
    self.skl.len()
  }
}
