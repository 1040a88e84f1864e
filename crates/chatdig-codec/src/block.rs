//! Block decoding.
//!
//! Tag byte layout, low two bits select the instruction:
//!
//! | bits 0-1 | instruction        | length               | offset                     |
//! |----------|--------------------|----------------------|----------------------------|
//! | `00`     | literal            | bits 2-7 + 1, or 1-4 trailing LE bytes + 1 | n/a  |
//! | `01`     | copy, 1-byte offset| bits 2-4 + 4         | bits 5-7 << 8 \| next byte |
//! | `10`     | copy, 2-byte offset| bits 2-7 + 1         | next 2 bytes LE            |
//! | `11`     | copy, 4-byte offset| bits 2-7 + 1         | next 4 bytes LE            |

use crate::error::DecodeError;

const TAG_LITERAL: u8 = 0;
const TAG_COPY_1: u8 = 1;
const TAG_COPY_2: u8 = 2;

/// Literal lengths below this are stored inline in the tag.
const INLINE_LITERAL_MAX: usize = 60;

/// Upper bound on the up-front allocation taken from the length header.
const MAX_PREALLOC: u64 = 1 << 24;

/// Decode the varint length header.
///
/// Returns the declared uncompressed length and the number of header bytes.
pub fn decompress_len(input: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut value: u64 = 0;
    for (i, &byte) in input.iter().enumerate() {
        let shift = 7 * i as u32;
        if shift >= 64 {
            return Err(DecodeError::LengthOverflow);
        }
        let bits = u64::from(byte & 0x7f);
        if shift > 0 && bits >> (64 - shift) != 0 {
            return Err(DecodeError::LengthOverflow);
        }
        value |= bits << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(DecodeError::TruncatedLength)
}

/// Decode one unframed compressed block.
///
/// The declared length only sizes the initial allocation. Output that ends up
/// shorter or longer than declared is returned as produced.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let (declared, mut pos) = decompress_len(input)?;
    let mut out = Vec::with_capacity(declared.min(MAX_PREALLOC) as usize);

    while pos < input.len() {
        let tag_pos = pos;
        let tag = input[pos];
        pos += 1;

        let (len, offset) = match tag & 0x03 {
            TAG_LITERAL => {
                let mut len = usize::from(tag >> 2);
                if len >= INLINE_LITERAL_MAX {
                    let extra = len - (INLINE_LITERAL_MAX - 1);
                    let bytes = input
                        .get(pos..pos + extra)
                        .ok_or(DecodeError::TruncatedLiteralLength { pos: tag_pos })?;
                    len = read_le(bytes);
                    pos += extra;
                }
                let len = len + 1;
                let available = input.len() - pos;
                if len > available {
                    return Err(DecodeError::TruncatedLiteral {
                        pos: tag_pos,
                        len,
                        available,
                    });
                }
                out.extend_from_slice(&input[pos..pos + len]);
                pos += len;
                continue;
            }
            TAG_COPY_1 => {
                let low = *input
                    .get(pos)
                    .ok_or(DecodeError::TruncatedOffset { tag, pos: tag_pos })?;
                pos += 1;
                let len = usize::from((tag >> 2) & 0x07) + 4;
                let offset = (usize::from(tag >> 5) << 8) | usize::from(low);
                (len, offset)
            }
            tag_type => {
                let width = if tag_type == TAG_COPY_2 { 2 } else { 4 };
                let bytes = input
                    .get(pos..pos + width)
                    .ok_or(DecodeError::TruncatedOffset { tag, pos: tag_pos })?;
                pos += width;
                (usize::from(tag >> 2) + 1, read_le(bytes))
            }
        };

        copy_back(&mut out, offset, len, tag_pos)?;
    }

    if out.len() as u64 != declared {
        tracing::debug!(
            "block length mismatch: declared {declared}, produced {}",
            out.len()
        );
    }
    Ok(out)
}

/// Append `len` bytes starting `offset` bytes back from the end of `out`.
///
/// The source may overlap the bytes being written, so a short pattern
/// repeats to fill the run.
fn copy_back(out: &mut Vec<u8>, offset: usize, len: usize, pos: usize) -> Result<(), DecodeError> {
    if offset == 0 {
        return Err(DecodeError::ZeroOffset { pos });
    }
    if offset > out.len() {
        return Err(DecodeError::OffsetBeyondOutput {
            pos,
            offset,
            produced: out.len(),
        });
    }
    let start = out.len() - offset;
    if offset >= len {
        out.extend_from_within(start..start + len);
    } else {
        out.reserve(len);
        for i in start..start + len {
            let byte = out[i];
            out.push(byte);
        }
    }
    Ok(())
}

fn read_le(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .rev()
        .fold(0usize, |acc, &b| (acc << 8) | usize::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_only() {
        let block = [0x03, 0x08, b'a', b'b', b'c'];
        assert_eq!(decompress(&block).unwrap(), b"abc");
    }

    #[test]
    fn overlapping_copy_repeats_previous_byte() {
        // literal "a", then copy len 5 offset 1
        let block = [0x06, 0x00, b'a', 0x05, 0x01];
        assert_eq!(decompress(&block).unwrap(), b"aaaaaa");
    }

    #[test]
    fn two_byte_offset_copy() {
        // literal "ab", then copy len 4 offset 2
        let block = [0x06, 0x04, b'a', b'b', 0x0e, 0x02, 0x00];
        assert_eq!(decompress(&block).unwrap(), b"ababab");
    }

    #[test]
    fn four_byte_offset_copy() {
        let block = [0x06, 0x04, b'x', b'y', 0x0f, 0x02, 0x00, 0x00, 0x00];
        assert_eq!(decompress(&block).unwrap(), b"xyxyxy");
    }

    #[test]
    fn one_byte_offset_uses_high_tag_bits() {
        let mut block = vec![0x84, 0x02, 0xf0, 0xff];
        block.extend(0..=255u8);
        // copy len 4, offset (1 << 8) | 0 = 256
        block.extend([0x21, 0x00]);
        let out = decompress(&block).unwrap();
        assert_eq!(out.len(), 260);
        assert_eq!(&out[256..], &[0, 1, 2, 3]);
    }

    #[test]
    fn long_literal_with_trailing_length_byte() {
        let mut block = vec![0x64, 0xf0, 99];
        block.extend(std::iter::repeat_n(b'z', 100));
        assert_eq!(decompress(&block).unwrap(), vec![b'z'; 100]);
    }

    #[test]
    fn long_literal_with_two_length_bytes() {
        // len - 1 = 299 = 0x012b, little-endian
        let mut block = vec![0xac, 0x02, 0xf4, 0x2b, 0x01];
        block.extend(std::iter::repeat_n(b'q', 300));
        assert_eq!(decompress(&block).unwrap().len(), 300);
    }

    #[test]
    fn empty_payload() {
        assert!(decompress(&[0x00]).unwrap().is_empty());
    }

    #[test]
    fn declared_length_mismatch_is_tolerated() {
        let block = [0x0a, 0x08, b'a', b'b', b'c'];
        assert_eq!(decompress(&block).unwrap(), b"abc");
        let block = [0x01, 0x08, b'a', b'b', b'c'];
        assert_eq!(decompress(&block).unwrap(), b"abc");
    }

    #[test]
    fn multi_byte_length_header() {
        assert_eq!(decompress_len(&[0x80, 0x01]).unwrap(), (128, 2));
        assert_eq!(decompress_len(&[0x7f, 0xff]).unwrap(), (127, 1));
    }

    #[test]
    fn empty_input_is_truncated_length() {
        assert_eq!(decompress(&[]), Err(DecodeError::TruncatedLength));
        assert_eq!(decompress(&[0x80]), Err(DecodeError::TruncatedLength));
    }

    #[test]
    fn oversized_length_header() {
        let header = [0xff; 11];
        assert_eq!(decompress_len(&header), Err(DecodeError::LengthOverflow));
    }

    #[test]
    fn truncated_literal_length() {
        assert_eq!(
            decompress(&[0x05, 0xf0]),
            Err(DecodeError::TruncatedLiteralLength { pos: 1 })
        );
    }

    #[test]
    fn truncated_literal_payload() {
        assert_eq!(
            decompress(&[0x03, 0x08, b'a']),
            Err(DecodeError::TruncatedLiteral {
                pos: 1,
                len: 3,
                available: 1
            })
        );
    }

    #[test]
    fn truncated_offsets() {
        assert!(matches!(
            decompress(&[0x06, 0x00, b'a', 0x05]),
            Err(DecodeError::TruncatedOffset { tag: 0x05, pos: 3 })
        ));
        assert!(matches!(
            decompress(&[0x06, 0x00, b'a', 0x0e, 0x01]),
            Err(DecodeError::TruncatedOffset { .. })
        ));
        assert!(matches!(
            decompress(&[0x06, 0x00, b'a', 0x0f, 0x01, 0x00, 0x00]),
            Err(DecodeError::TruncatedOffset { .. })
        ));
    }

    #[test]
    fn zero_offset() {
        assert_eq!(
            decompress(&[0x06, 0x00, b'a', 0x05, 0x00]),
            Err(DecodeError::ZeroOffset { pos: 3 })
        );
    }

    #[test]
    fn offset_before_start_of_output() {
        assert_eq!(
            decompress(&[0x06, 0x00, b'a', 0x05, 0x02]),
            Err(DecodeError::OffsetBeyondOutput {
                pos: 3,
                offset: 2,
                produced: 1
            })
        );
    }
}
