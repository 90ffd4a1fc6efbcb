use bytes::Bytes;
use rand::{distr::Alphanumeric, Rng};

pub fn get_test_key(i: usize) -> Bytes {
  Bytes::from(std::format!("minicask-key-{:09}", i))
}

pub fn get_test_value(i: usize) -> Bytes {
  Bytes::from(std::format!(
    "minicask-value-value-value-value-value-value-value-value-value-{:09}",
    i
  ))
}

/// Random alphanumeric value of `len` bytes.
pub fn get_rand_value(len: usize) -> Bytes {
  let value: Vec<u8> = rand::rng()
    .sample_iter(Alphanumeric)
    .take(len)
    .collect();
  Bytes::from(value)
}
