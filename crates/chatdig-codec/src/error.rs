//! Decode error types.

use thiserror::Error;

/// Structural failures while decoding a compressed block.
///
/// A mismatch between the declared and the produced length is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of data while reading length header")]
    TruncatedLength,

    #[error("length header does not fit in 64 bits")]
    LengthOverflow,

    #[error("unexpected end of data in literal length at byte {pos}")]
    TruncatedLiteralLength { pos: usize },

    #[error("literal of {len} bytes at byte {pos} exceeds input ({available} bytes left)")]
    TruncatedLiteral {
        pos: usize,
        len: usize,
        available: usize,
    },

    #[error("copy tag {tag:#04x} at byte {pos} is missing its offset")]
    TruncatedOffset { tag: u8, pos: usize },

    #[error("copy at byte {pos} has zero offset")]
    ZeroOffset { pos: usize },

    #[error("copy at byte {pos} reaches {offset} bytes back but only {produced} produced")]
    OffsetBeyondOutput {
        pos: usize,
        offset: usize,
        produced: usize,
    },
}
