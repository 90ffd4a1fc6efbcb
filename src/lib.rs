//! minicask: a minimal key-value storage engine following the Bitcask model.
//!
//! All data lives in one append-only log file. An in-memory index maps each
//! live key to the offset of its latest record and is rebuilt by replaying
//! the log at open, so the log alone is enough to recover after a crash.
//! Superseded records and tombstones are reclaimed by [`db::Engine::merge`],
//! which rewrites the live records into a fresh file and commits it with an
//! atomic rename.
//!
//! # Basic Usage
//!
//! ```
//! use bytes::Bytes;
//! use minicask::{db::Engine, option::Options};
//!
//! let dir = tempfile::tempdir().expect("failed to create temp dir");
//! let mut opts = Options::default();
//! opts.dir_path = dir.path().to_path_buf();
//! let engine = Engine::open(opts).expect("failed to open minicask engine");
//!
//! // Store a key-value pair
//! let key = Bytes::from("dbname");
//! engine.put(key.clone(), Bytes::from("minicask")).expect("failed to put");
//!
//! // Retrieve the value
//! assert_eq!(engine.get(key.clone()).expect("failed to get"), Bytes::from("minicask"));
//!
//! // Delete the key and reclaim the space
//! engine.delete(key).expect("failed to delete");
//! engine.merge().expect("failed to merge");
//! engine.close().expect("failed to close");
//! ```

mod data;

mod fio;
mod index;

pub mod db;
pub mod errors;
pub mod merge;
pub mod option;
pub mod util;
