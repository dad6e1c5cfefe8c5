//! Decoding from UTF-32 (either byte order) to utf8.
//!
//! Code units are scalar values already, so there is no surrogate
//! pairing: whatever is below `MAX_CODE_POINT` is re-encoded as-is.
//! Units above it are dropped, as is a partial unit at the end of the
//! input.

use crate::utf8::append_utf8;
use crate::utils::Endian;
use crate::{DecodeWarning, MAX_CODE_POINT};

/// Decodes `input` (with the BOM already stripped) and appends the utf8
/// to `output`.
///
/// `base` is the offset of `input` within the full buffer, used for
/// warning offsets.
pub(crate) fn decode_to_utf8(
    input: &[u8],
    endian: Endian,
    base: usize,
    output: &mut Vec<u8>,
    warnings: &mut Vec<DecodeWarning>,
) {
    // Loop through the input, getting 4 bytes at a time.
    let mut itr = input.chunks_exact(4);
    for (i, bytes) in itr.by_ref().enumerate() {
        let code = endian.read_u32([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if code > MAX_CODE_POINT {
            warnings.push(DecodeWarning::InvalidCodePoint {
                offset: base + i * 4,
                value: code,
            });
            continue;
        }
        if (code & 0xFFFFF800) == 0xD800 {
            // Not a scalar value, but passed through like a lone utf16
            // low surrogate.
            warnings.push(DecodeWarning::UnpairedSurrogate {
                offset: base + i * 4,
                unit: code as u16,
            });
        }
        append_utf8(output, code);
    }

    let remainder = itr.remainder();
    if !remainder.is_empty() {
        warnings.push(DecodeWarning::TruncatedSequence {
            offset: base + input.len() - remainder.len(),
            len: remainder.len(),
        });
    }
}
