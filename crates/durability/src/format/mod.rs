//! On-disk formats

pub mod chunk_record;

pub use chunk_record::{
    decode_record, encode_record, ChunkRecordError, MAX_RECORD_PAYLOAD, RECORD_CRC_SIZE,
    RECORD_LENGTH_SIZE, RECORD_OVERHEAD,
};
