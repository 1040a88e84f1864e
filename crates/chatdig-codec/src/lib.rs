//! Unframed compressed block decoder for chatdig.
//!
//! Values in the chat client's store are written as single compressed
//! blocks: a varint uncompressed length followed by a stream of literal and
//! back-reference instructions, with no frame header or checksum.

pub mod block;
pub mod decompressor;
pub mod error;

pub use block::{decompress, decompress_len};
pub use decompressor::{BlockDecompressor, Decompressor, Passthrough};
pub use error::DecodeError;
