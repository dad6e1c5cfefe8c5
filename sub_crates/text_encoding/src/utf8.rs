//! Utf8 production, plus the verbatim copy used for input that is
//! (supposedly) utf8 already.

use crate::{DecodeWarning, MAX_CODE_POINT};

/// Appends the shortest utf8 encoding of `code` to `output`.
///
/// This is the only place utf8 gets produced.  Surrogate values are
/// encoded like any other value below 0x10000 (they only reach here as
/// pass-through from lenient utf16 decoding).  Values above
/// `MAX_CODE_POINT` have no utf8 encoding and nothing is appended.
#[inline]
pub fn append_utf8(output: &mut Vec<u8>, code: u32) {
    if code <= 0x7F {
        // 1-byte case
        output.push(code as u8);
    } else if code <= 0x7FF {
        // 2-byte case
        output.extend_from_slice(&[
            0b11000000 | (code >> 6) as u8,
            0b10000000 | (code & 0b00111111) as u8,
        ]);
    } else if code <= 0xFFFF {
        // 3-byte case
        output.extend_from_slice(&[
            0b11100000 | (code >> 12) as u8,
            0b10000000 | ((code >> 6) & 0b00111111) as u8,
            0b10000000 | (code & 0b00111111) as u8,
        ]);
    } else if code <= MAX_CODE_POINT {
        // 4-byte case
        output.extend_from_slice(&[
            0b11110000 | (code >> 18) as u8,
            0b10000000 | ((code >> 12) & 0b00111111) as u8,
            0b10000000 | ((code >> 6) & 0b00111111) as u8,
            0b10000000 | (code & 0b00111111) as u8,
        ]);
    }
}

/// Copies `input` to `output` unchanged, noting where it stops being
/// valid utf8 (if it does).
///
/// `base` is the offset of `input` within the full buffer.
pub(crate) fn copy_verbatim(
    input: &[u8],
    base: usize,
    output: &mut Vec<u8>,
    warnings: &mut Vec<DecodeWarning>,
) {
    output.extend_from_slice(input);

    if let Err(e) = std::str::from_utf8(input) {
        warnings.push(DecodeWarning::InvalidUtf8 {
            offset: base + e.valid_up_to(),
        });
    }
}
