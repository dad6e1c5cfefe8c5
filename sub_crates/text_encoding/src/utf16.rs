//! Decoding from UTF-16 (either byte order) to utf8.
//!
//! Decoding is lenient.  A high surrogate that isn't followed by a low
//! surrogate is dropped, and decoding resumes at the unit after it.  A
//! low surrogate on its own is passed through as if it were a scalar
//! value.  A code unit (or surrogate pair) cut off by the end of the
//! input is dropped.

use crate::utf8::append_utf8;
use crate::utils::Endian;
use crate::DecodeWarning;

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
    let mut input_i = 0;

    // Loop through the input, getting 2 bytes at a time.
    while (input_i + 1) < input.len() {
        let code_1 = endian.read_u16([input[input_i], input[input_i + 1]]);

        if (code_1 & 0xFC00) == 0xD800 {
            // First half of a surrogate pair.

            // Get the second code unit, if possible.
            if (input_i + 3) >= input.len() {
                warnings.push(DecodeWarning::TruncatedSequence {
                    offset: base + input_i,
                    len: input.len() - input_i,
                });
                return;
            }
            let code_2 = endian.read_u16([input[input_i + 2], input[input_i + 3]]);

            if (code_2 & 0xFC00) != 0xDC00 {
                // Drop the orphaned first half, and decode the unit after
                // it on its own.
                warnings.push(DecodeWarning::UnpairedSurrogate {
                    offset: base + input_i,
                    unit: code_1,
                });
                input_i += 2;
                continue;
            }

            let code = 0x10000 + (((code_1 as u32 - 0xD800) << 10) | (code_2 as u32 - 0xDC00));
            append_utf8(output, code);
            input_i += 4;
        } else {
            if (code_1 & 0xFC00) == 0xDC00 {
                // Orphaned second half.  Passed through anyway.
                warnings.push(DecodeWarning::UnpairedSurrogate {
                    offset: base + input_i,
                    unit: code_1,
                });
            }
            append_utf8(output, code_1 as u32);
            input_i += 2;
        }
    }

    if input_i < input.len() {
        warnings.push(DecodeWarning::TruncatedSequence {
            offset: base + input_i,
            len: input.len() - input_i,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8], endian: Endian) -> (Vec<u8>, Vec<DecodeWarning>) {
        let mut output = Vec::new();
        let mut warnings = Vec::new();
        decode_to_utf8(input, endian, 0, &mut output, &mut warnings);
        (output, warnings)
    }

    #[test]
    fn decode_le_01() {
        let data = [
            0x53, 0x30, 0x93, 0x30, 0x6B, 0x30, 0x61, 0x30, 0x6F, 0x30, 0x01, 0xFF,
        ]; // "こんにちは！"
        let (decoded, warnings) = decode(&data, Endian::Little);
        assert_eq!(decoded, "こんにちは！".as_bytes());
        assert!(warnings.is_empty());
    }

    #[test]
    fn decode_le_02() {
        let data = [0x3D, 0xD8, 0x00, 0xDE]; // "😀"
        let (decoded, warnings) = decode(&data, Endian::Little);
        assert_eq!(decoded, &[0xF0, 0x9F, 0x98, 0x80]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn decode_le_03() {
        let data = [0x41, 0x00, 0xE9, 0x00, 0x1F, 0x04]; // "AéП"
        let (decoded, _) = decode(&data, Endian::Little);
        assert_eq!(decoded, "AéП".as_bytes());
    }

    #[test]
    fn decode_be_01() {
        let data = [
            0x30, 0x53, 0x30, 0x93, 0x30, 0x6B, 0x30, 0x61, 0x30, 0x6F, 0xFF, 0x01,
        ]; // "こんにちは！"
        let (decoded, warnings) = decode(&data, Endian::Big);
        assert_eq!(decoded, "こんにちは！".as_bytes());
        assert!(warnings.is_empty());
    }

    #[test]
    fn decode_be_02() {
        let data = [0xD8, 0x3D, 0xDE, 0x3A, 0xD8, 0x3D, 0xDE, 0x3C]; // "😺😼"
        let (decoded, warnings) = decode(&data, Endian::Big);
        assert_eq!(decoded, "😺😼".as_bytes());
        assert!(warnings.is_empty());
    }

    #[test]
    fn decode_truncated_01() {
        // Odd number of bytes: the last one is dropped.
        let data = [0x41, 0x00, 0x42];
        let (decoded, warnings) = decode(&data, Endian::Little);
        assert_eq!(decoded, b"A");
        assert_eq!(
            warnings,
            vec![DecodeWarning::TruncatedSequence { offset: 2, len: 1 }]
        );
    }

    #[test]
    fn decode_truncated_02() {
        // High surrogate as the very last unit.
        let data = [0x41, 0x00, 0x3D, 0xD8];
        let (decoded, warnings) = decode(&data, Endian::Little);
        assert_eq!(decoded, b"A");
        assert_eq!(
            warnings,
            vec![DecodeWarning::TruncatedSequence { offset: 2, len: 2 }]
        );
    }

    #[test]
    fn decode_truncated_03() {
        // High surrogate followed by half a low surrogate.
        let data = [0x41, 0x00, 0x3D, 0xD8, 0x00];
        let (decoded, warnings) = decode(&data, Endian::Little);
        assert_eq!(decoded, b"A");
        assert_eq!(
            warnings,
            vec![DecodeWarning::TruncatedSequence { offset: 2, len: 3 }]
        );
    }

    #[test]
    fn decode_unpaired_high() {
        // High surrogate followed by a normal unit: the surrogate is
        // dropped and the normal unit survives.
        let data = [0x3D, 0xD8, 0x41, 0x00, 0x42, 0x00];
        let (decoded, warnings) = decode(&data, Endian::Little);
        assert_eq!(decoded, b"AB");
        assert_eq!(
            warnings,
            vec![DecodeWarning::UnpairedSurrogate {
                offset: 0,
                unit: 0xD83D,
            }]
        );
    }

    #[test]
    fn decode_unpaired_high_twice() {
        // Two high surrogates then a low one: only the second pairs up.
        let data = [0xD8, 0x3D, 0xD8, 0x3D, 0xDE, 0x00];
        let (decoded, warnings) = decode(&data, Endian::Big);
        assert_eq!(decoded, &[0xF0, 0x9F, 0x98, 0x80]);
        assert_eq!(
            warnings,
            vec![DecodeWarning::UnpairedSurrogate {
                offset: 0,
                unit: 0xD83D,
            }]
        );
    }

    #[test]
    fn decode_unpaired_low() {
        // Lone low surrogate is passed through.
        let data = [0x00, 0xDC, 0x41, 0x00];
        let (decoded, warnings) = decode(&data, Endian::Little);
        assert_eq!(decoded, &[0xED, 0xB0, 0x80, 0x41]);
        assert_eq!(
            warnings,
            vec![DecodeWarning::UnpairedSurrogate {
                offset: 0,
                unit: 0xDC00,
            }]
        );
    }

    #[test]
    fn decode_base_offset() {
        let mut output = Vec::new();
        let mut warnings = Vec::new();
        decode_to_utf8(&[0x41], Endian::Big, 2, &mut output, &mut warnings);
        assert!(output.is_empty());
        assert_eq!(
            warnings,
            vec![DecodeWarning::TruncatedSequence { offset: 2, len: 1 }]
        );
    }

    #[test]
    fn decode_empty() {
        let (decoded, warnings) = decode(&[], Endian::Little);
        assert!(decoded.is_empty());
        assert!(warnings.is_empty());
    }
}
