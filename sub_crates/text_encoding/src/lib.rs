//! A library for detecting the text encoding of a byte buffer from its
//! byte-order mark and transcoding it to utf8.
//!
//! Everything here is pure: bytes in, bytes out.  Decoding is lossy but
//! safe.  Malformed input (truncated trailing code units, unpaired
//! surrogates, out-of-range scalar values) is dropped rather than causing
//! the whole conversion to fail.  The `_with_warnings` variants report
//! what was dropped without changing the output.

mod bom;
mod utf16;
mod utf32;
mod utf8;
mod utils;

use std::fmt;

use thiserror::Error;

use crate::utils::Endian;

pub use crate::bom::{detect, UTF16_BE_BOM, UTF16_LE_BOM, UTF32_BE_BOM, UTF32_LE_BOM, UTF8_BOM};
pub use crate::utf8::append_utf8;

/// The largest unicode scalar value.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// The encoding of a buffer, as identified by its byte-order mark.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8Bom, // utf8 with a leading BOM
    Utf16LE, // Little endian
    Utf16BE, // Big endian
    Utf32LE, // Little endian
    Utf32BE, // Big endian
    Unknown, // No BOM: utf8 or some single-byte encoding
}

impl Encoding {
    /// The byte-order mark that identifies this encoding.
    ///
    /// Empty for `Unknown`.
    pub fn bom(self) -> &'static [u8] {
        match self {
            Encoding::Utf8Bom => &UTF8_BOM,
            Encoding::Utf16LE => &UTF16_LE_BOM,
            Encoding::Utf16BE => &UTF16_BE_BOM,
            Encoding::Utf32LE => &UTF32_LE_BOM,
            Encoding::Utf32BE => &UTF32_BE_BOM,
            Encoding::Unknown => &[],
        }
    }

    /// Number of leading bytes the transcoder skips for this encoding.
    pub fn bom_len(self) -> usize {
        self.bom().len()
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8Bom => "UTF-8 (BOM)",
            Encoding::Utf16LE => "UTF-16LE",
            Encoding::Utf16BE => "UTF-16BE",
            Encoding::Utf32LE => "UTF-32LE",
            Encoding::Utf32BE => "UTF-32BE",
            Encoding::Unknown => "no BOM",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A non-fatal problem found in the input while transcoding.
///
/// Offsets are byte indices into the full input buffer, BOM included.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum DecodeWarning {
    /// Fewer bytes remained at the end of the input than a code unit (or
    /// surrogate pair) needs.  The trailing `len` bytes were dropped.
    #[error("truncated code unit at byte {offset}: {len} trailing byte(s) dropped")]
    TruncatedSequence { offset: usize, len: usize },

    /// A surrogate without its partner.  Utf16 high surrogates are
    /// dropped.  Utf16 low surrogates and any surrogate value in utf32
    /// are passed through as-is.
    #[error("unpaired surrogate {unit:#06X} at byte {offset}")]
    UnpairedSurrogate { offset: usize, unit: u16 },

    /// A utf32 code unit above `MAX_CODE_POINT`.  Dropped.
    #[error("code unit {value:#010X} at byte {offset} is outside the unicode range")]
    InvalidCodePoint { offset: usize, value: u32 },

    /// Bytes copied verbatim that are not valid utf8, starting at
    /// `offset`.  Nothing is dropped.
    #[error("invalid utf8 starting at byte {offset}")]
    InvalidUtf8 { offset: usize },
}

impl DecodeWarning {
    /// Whether the output differs from a faithful decode of the input.
    pub fn is_lossy(&self) -> bool {
        !matches!(self, DecodeWarning::InvalidUtf8 { .. })
    }

    /// Byte offset into the input where the problem starts.
    pub fn offset(&self) -> usize {
        match *self {
            DecodeWarning::TruncatedSequence { offset, .. }
            | DecodeWarning::UnpairedSurrogate { offset, .. }
            | DecodeWarning::InvalidCodePoint { offset, .. }
            | DecodeWarning::InvalidUtf8 { offset } => offset,
        }
    }
}

/// Transcodes `input` from `encoding` to utf8.
///
/// The BOM (if the encoding has one) is skipped without being checked, so
/// `encoding` should normally come from `detect()` on the same buffer.
/// Never fails: malformed data is dropped.
pub fn transcode(input: &[u8], encoding: Encoding) -> Vec<u8> {
    transcode_with_warnings(input, encoding).0
}

/// Same as `transcode()`, but also returns every malformed-input
/// condition that was encountered, in input order.
pub fn transcode_with_warnings(input: &[u8], encoding: Encoding) -> (Vec<u8>, Vec<DecodeWarning>) {
    let start = encoding.bom_len().min(input.len());
    let body = &input[start..];
    let mut warnings = Vec::new();

    let output = match encoding {
        Encoding::Utf8Bom | Encoding::Unknown => {
            let mut output = Vec::with_capacity(body.len());
            utf8::copy_verbatim(body, start, &mut output, &mut warnings);
            output
        }
        Encoding::Utf16LE | Encoding::Utf16BE => {
            // Worst case is 3 utf8 bytes per 2-byte code unit.
            let mut output = Vec::with_capacity(body.len() / 2 * 3);
            let endian = if encoding == Encoding::Utf16LE {
                Endian::Little
            } else {
                Endian::Big
            };
            utf16::decode_to_utf8(body, endian, start, &mut output, &mut warnings);
            output
        }
        Encoding::Utf32LE | Encoding::Utf32BE => {
            let mut output = Vec::with_capacity(body.len());
            let endian = if encoding == Encoding::Utf32LE {
                Endian::Little
            } else {
                Endian::Big
            };
            utf32::decode_to_utf8(body, endian, start, &mut output, &mut warnings);
            output
        }
    };

    (output, warnings)
}

/// The result of converting a whole buffer with `convert()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub encoding: Encoding,
    pub output: Vec<u8>,
    pub warnings: Vec<DecodeWarning>,
}

impl Conversion {
    /// True if nothing from the input was dropped or mangled.
    pub fn is_lossless(&self) -> bool {
        self.warnings.iter().all(|w| !w.is_lossy())
    }
}

/// Detects the encoding of `input` and transcodes it to utf8.
///
/// An empty buffer has nothing to convert: no detection is attempted and
/// the result is empty with `Encoding::Unknown`.
pub fn convert(input: &[u8]) -> Conversion {
    if input.is_empty() {
        return Conversion {
            encoding: Encoding::Unknown,
            output: Vec::new(),
            warnings: Vec::new(),
        };
    }

    let encoding = detect(input);
    let (output, warnings) = transcode_with_warnings(input, encoding);
    Conversion {
        encoding,
        output,
        warnings,
    }
}
