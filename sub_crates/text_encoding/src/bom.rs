//! Byte-order mark detection.

use crate::Encoding;

pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
pub const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
pub const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];
pub const UTF32_LE_BOM: [u8; 4] = [0xFF, 0xFE, 0x00, 0x00];
pub const UTF32_BE_BOM: [u8; 4] = [0x00, 0x00, 0xFE, 0xFF];

/// Signatures in match order.  First match wins.
///
/// The utf32 little endian BOM starts with the utf16 little endian BOM,
/// so it has to come before it.
const SIGNATURES: [(&[u8], Encoding); 5] = [
    (&UTF8_BOM, Encoding::Utf8Bom),
    (&UTF32_LE_BOM, Encoding::Utf32LE),
    (&UTF16_LE_BOM, Encoding::Utf16LE),
    (&UTF32_BE_BOM, Encoding::Utf32BE),
    (&UTF16_BE_BOM, Encoding::Utf16BE),
];

/// Identifies the encoding of `input` from its first (up to four) bytes.
///
/// Returns `Encoding::Unknown` when no BOM is present.
pub fn detect(input: &[u8]) -> Encoding {
    SIGNATURES
        .iter()
        .find(|(signature, _)| input.starts_with(signature))
        .map(|&(_, encoding)| encoding)
        .unwrap_or(Encoding::Unknown)
}
