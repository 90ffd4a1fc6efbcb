use bytes::Bytes;
use minicask::{db::Engine, option::Options};

fn main() {
  env_logger::init();

  let mut opts = Options::default();
  opts.dir_path = std::env::temp_dir().join("minicask-basic");
  let engine = Engine::open(opts).expect("failed to open minicask engine");

  let key = Bytes::from("dbname");
  let value = Bytes::from("minidb");

  engine
    .put(key.clone(), value.clone())
    .expect("failed to put");
  println!("1. put kv successfully, key: {:?}, value: {:?}", key, value);

  let cur = engine.get(key.clone()).expect("failed to get");
  println!("2. get value of key {:?}: {:?}", key, cur);

  engine.delete(key.clone()).expect("failed to delete");
  println!("3. delete key {:?}", key);

  engine.merge().expect("failed to merge");
  println!("4. compact data to new data file");

  engine.close().expect("failed to close");
  println!("5. close minicask");
}
