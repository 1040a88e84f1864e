//! Decompressor trait injected into record stores.

use crate::error::DecodeError;

/// Turns a stored value blob back into its raw bytes.
///
/// Stores receive an implementation at construction time instead of
/// looking one up globally.
pub trait Decompressor: Send + Sync {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// Decode one stored blob.
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, DecodeError>;
}

/// Unframed compressed block decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockDecompressor;

impl Decompressor for BlockDecompressor {
    fn name(&self) -> &'static str {
        "block"
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, DecodeError> {
        crate::block::decompress(input)
    }
}

/// Identity decoder for stores whose values were never compressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Decompressor for Passthrough {
    fn name(&self) -> &'static str {
        "none"
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, DecodeError> {
        Ok(input.to_vec())
    }
}
