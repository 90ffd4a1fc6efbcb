pub mod btree;
pub mod skiplist;

use bytes::Bytes;

use crate::{data::log_record::LogRecordPos, option::IndexType};

/// In-memory key directory: maps every live key to the position of its latest PUT.
///
/// Implementations carry no locking of their own, the engine guards the
/// index and the data file with one lock.
pub trait Indexer: Sync + Send {
  /// Maps `key` to `pos`, returning the position it replaced.
  fn put(&mut self, key: Vec<u8>, pos: LogRecordPos) -> Option<LogRecordPos>;

  /// Retrieves a key's position from the index.
  fn get(&self, key: &[u8]) -> Option<LogRecordPos>;

  /// Deletes a key's position from the index.
  fn delete(&mut self, key: &[u8]) -> Option<LogRecordPos>;

  /// All live keys, order unspecified.
  fn list_keys(&self) -> Vec<Bytes>;

  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Creates a new indexer based on the specified index type.
pub fn new_indexer(index_type: &IndexType) -> Box<dyn Indexer> {
  match *index_type {
    IndexType::BTree => Box::new(btree::BTree::new()),
    IndexType::SkipList => Box::new(skiplist::SkipList::new()),
  }
}
