use bytes::{Buf, BufMut, BytesMut};

use crate::errors::{Errors, Result};

/// key_len (u32) + value_len (u32) + mark (u16), big-endian.
pub const LOG_RECORD_HEADER_SIZE: usize = 4 + 4 + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRecordType {
  /// PUT
  Normal = 1,

  /// DEL tombstone
  Deleted = 2,
}

impl LogRecordType {
  pub fn from_u16(v: u16) -> Result<Self> {
    match v {
      1 => Ok(LogRecordType::Normal),
      2 => Ok(LogRecordType::Deleted),
      _ => Err(Errors::InvalidRecordMark(v)),
    }
  }
}

/// A single record of the append-only log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
  pub key: Vec<u8>,
  pub value: Vec<u8>,
  pub rec_type: LogRecordType,
}

/// Decoded fixed-size header of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecordHeader {
  pub key_size: u32,
  pub value_size: u32,
  pub rec_type: LogRecordType,
}

/// Where a live record sits in the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecordPos {
  pub offset: u64,
  pub size: u64,
}

/// A record read back from disk together with its on-disk size.
#[derive(Debug)]
pub struct ReadLogRecord {
  pub record: LogRecord,
  pub size: u64,
}

impl LogRecord {
  pub fn normal(key: Vec<u8>, value: Vec<u8>) -> Self {
    LogRecord {
      key,
      value,
      rec_type: LogRecordType::Normal,
    }
  }

  /// Tombstones never carry a value.
  pub fn deleted(key: Vec<u8>) -> Self {
    LogRecord {
      key,
      value: Vec::new(),
      rec_type: LogRecordType::Deleted,
    }
  }

  //  +-----------+-------------+--------+-------+---------+
  //  |  key_len  |  value_len  |  mark  |  key  |  value  |
  //  +-----------+-------------+--------+-------+---------+
  //     4 bytes     4 bytes     2 bytes
  pub fn encode(&self) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(self.size() as usize);
    buf.put_u32(self.key.len() as u32);
    buf.put_u32(self.value.len() as u32);
    buf.put_u16(self.rec_type as u16);
    buf.extend_from_slice(&self.key);
    buf.extend_from_slice(&self.value);
    buf.to_vec()
  }

  pub fn size(&self) -> u64 {
    (LOG_RECORD_HEADER_SIZE + self.key.len() + self.value.len()) as u64
  }
}

impl LogRecordHeader {
  /// Bytes of key and value that follow the header.
  pub fn body_size(&self) -> u64 {
    self.key_size as u64 + self.value_size as u64
  }
}

pub fn decode_log_record_header(mut buf: &[u8]) -> Result<LogRecordHeader> {
  if buf.len() < LOG_RECORD_HEADER_SIZE {
    return Err(Errors::InvalidRecordHeader);
  }

  let key_size = buf.get_u32();
  let value_size = buf.get_u32();
  let rec_type = LogRecordType::from_u16(buf.get_u16())?;
  Ok(LogRecordHeader {
    key_size,
    value_size,
    rec_type,
  })
}

/// Decodes one whole record from the front of `buf`.
pub fn decode_log_record(buf: &[u8]) -> Result<ReadLogRecord> {
  let header = decode_log_record_header(buf)?;
  let size = LOG_RECORD_HEADER_SIZE as u64 + header.body_size();
  if (buf.len() as u64) < size {
    return Err(Errors::TruncatedRecord);
  }

  let key_end = LOG_RECORD_HEADER_SIZE + header.key_size as usize;
  let record = LogRecord {
    key: buf[LOG_RECORD_HEADER_SIZE..key_end].to_vec(),
    value: buf[key_end..size as usize].to_vec(),
    rec_type: header.rec_type,
  };
  Ok(ReadLogRecord { record, size })
}
