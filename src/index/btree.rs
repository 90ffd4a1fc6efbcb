use std::collections::BTreeMap;

use bytes::Bytes;

use crate::data::log_record::LogRecordPos;

use super::Indexer;

pub struct BTree {
  tree: BTreeMap<Vec<u8>, LogRecordPos>,
}

impl BTree {
  pub fn new() -> Self {
    Self {
      tree: BTreeMap::new(),
    }
  }
}

impl Indexer for BTree {
  fn put(&mut self, key: Vec<u8>, pos: LogRecordPos) -> Option<LogRecordPos> {
    self.tree.insert(key, pos)
  }

  fn get(&self, key: &[u8]) -> Option<LogRecordPos> {
    self.tree.get(key).copied()
  }

  fn delete(&mut self, key: &[u8]) -> Option<LogRecordPos> {
    self.tree.remove(key)
  }

  fn list_keys(&self) -> Vec<Bytes> {
    self
      .tree
      .keys()
      .map(|k| Bytes::copy_from_slice(k))
      .collect()
  }

  fn len(&self) -> usize {
    self.tree.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pos(offset: u64) -> LogRecordPos {
    LogRecordPos { offset, size: 13 }
  }

  #[test]
  fn test_btree_list_keys_sorted() {
    let mut bt = BTree::new();
    bt.put(b"ccc".to_vec(), pos(0));
    bt.put(b"aaa".to_vec(), pos(13));
    bt.put(b"bbb".to_vec(), pos(26));

    let keys = bt.list_keys();
    assert_eq!(
      keys,
      vec![Bytes::from("aaa"), Bytes::from("bbb"), Bytes::from("ccc")]
    );
  }
}
