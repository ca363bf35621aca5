//! Intel HEX encoding and decoding for images in a 16-bit address space.
//!
//! Only data records (type `00`) and the end-of-file record (type `01`) are supported. Every
//! record line has the form `:LLAAAATT<data>CC` where `CC` is the two's complement of the sum of
//! all preceding bytes in the record.

use std::fmt::Write;
use thiserror::Error;

/// Maximum number of data bytes written per record.
pub const RECORD_DATA_LEN: usize = 16;

pub const EOF_RECORD: &str = ":00000001FF";

const ADDRESS_SPACE_LEN: usize = 0x10000;

// Byte count + 2 address bytes + record type
const RECORD_HEADER_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordType {
    Data = 0x00,
    EndOfFile = 0x01,
}

impl RecordType {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Data),
            0x01 => Some(Self::EndOfFile),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntelHexError {
    #[error("{len}-byte image at ${base_address:04X} does not fit in a 16-bit address space")]
    ImageTooLarge { base_address: u16, len: usize },
    #[error("line {line}: malformed record: {reason}")]
    MalformedRecord { line: usize, reason: &'static str },
    #[error("line {line}: checksum mismatch, expected {expected:02X} but record has {actual:02X}")]
    ChecksumMismatch { line: usize, expected: u8, actual: u8 },
    #[error("line {line}: unsupported record type {record_type:02X}")]
    UnsupportedRecordType { line: usize, record_type: u8 },
    #[error("missing end-of-file record")]
    MissingEndOfFile,
    #[error("line {line}: record at ${address:04X} does not continue the image at ${expected:04X}")]
    NonContiguous { line: usize, address: u16, expected: usize },
}

/// Contiguous image recovered from Intel HEX text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexImage {
    pub base_address: u16,
    pub data: Vec<u8>,
}

/// Two's complement of the byte sum, i.e. the value that makes the sum of the record zero.
#[inline]
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0_u8, |sum, &byte| sum.wrapping_add(byte)).wrapping_neg()
}

fn write_record(out: &mut String, address: u16, record_type: RecordType, data: &[u8]) {
    let [address_hi, address_lo] = address.to_be_bytes();

    let mut record = Vec::with_capacity(RECORD_HEADER_LEN + data.len());
    record.extend([data.len() as u8, address_hi, address_lo, record_type as u8]);
    record.extend_from_slice(data);

    out.push(':');
    for byte in &record {
        write!(out, "{byte:02X}").ok();
    }
    writeln!(out, "{:02X}", checksum(&record)).ok();
}

/// Encode `data` as Intel HEX, starting at `base_address`.
///
/// Each line, including the final end-of-file record, is terminated by `\n`.
///
/// # Errors
///
/// Returns [`IntelHexError::ImageTooLarge`] if the image extends past address `$FFFF`.
pub fn encode(data: &[u8], base_address: u16) -> Result<String, IntelHexError> {
    if usize::from(base_address) + data.len() > ADDRESS_SPACE_LEN {
        return Err(IntelHexError::ImageTooLarge { base_address, len: data.len() });
    }

    // 1 colon + 2 hex digits per byte + checksum + newline
    let line_len = 1 + 2 * (RECORD_HEADER_LEN + RECORD_DATA_LEN + 1) + 1;
    let mut out = String::with_capacity(line_len * (data.len().div_ceil(RECORD_DATA_LEN) + 1));

    let mut address = base_address;
    for chunk in data.chunks(RECORD_DATA_LEN) {
        write_record(&mut out, address, RecordType::Data, chunk);
        address = address.wrapping_add(chunk.len() as u16);
    }

    out.push_str(EOF_RECORD);
    out.push('\n');

    log::debug!(
        "Encoded {} bytes at ${base_address:04X} into {} data records",
        data.len(),
        data.len().div_ceil(RECORD_DATA_LEN)
    );

    Ok(out)
}

fn parse_record(line: usize, text: &str) -> Result<Vec<u8>, IntelHexError> {
    let malformed = |reason| IntelHexError::MalformedRecord { line, reason };

    let hex = text.strip_prefix(':').ok_or(malformed("record does not start with ':'"))?;
    if !hex.is_ascii() || hex.len() % 2 != 0 {
        return Err(malformed("record is not a sequence of hex byte pairs"));
    }

    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| malformed("invalid hex digit"))?;

    if bytes.len() < RECORD_HEADER_LEN + 1 {
        return Err(malformed("record is too short"));
    }

    if bytes.len() != RECORD_HEADER_LEN + usize::from(bytes[0]) + 1 {
        return Err(malformed("byte count does not match record length"));
    }

    let (body, &[actual]) = bytes.split_at(bytes.len() - 1) else {
        return Err(malformed("record is too short"));
    };
    let expected = checksum(body);
    if expected != actual {
        return Err(IntelHexError::ChecksumMismatch { line, expected, actual });
    }

    Ok(body.to_vec())
}

/// Decode Intel HEX text into a single contiguous image.
///
/// Blank lines are ignored. Anything after the end-of-file record is ignored.
///
/// # Errors
///
/// Returns an error if any record is malformed or has a bad checksum, if the data records do not
/// form one contiguous block, or if there is no end-of-file record.
pub fn decode(text: &str) -> Result<HexImage, IntelHexError> {
    let mut image: Option<HexImage> = None;

    for (i, record_text) in text.lines().enumerate() {
        let line = i + 1;
        let record_text = record_text.trim();
        if record_text.is_empty() {
            continue;
        }

        let record = parse_record(line, record_text)?;
        let address = u16::from_be_bytes([record[1], record[2]]);
        let data = &record[RECORD_HEADER_LEN..];

        match RecordType::from_byte(record[3]) {
            Some(RecordType::Data) => {
                let end = usize::from(address) + data.len();
                if end > ADDRESS_SPACE_LEN {
                    let base_address = image.as_ref().map_or(address, |image| image.base_address);
                    let len = end - usize::from(base_address);
                    return Err(IntelHexError::ImageTooLarge { base_address, len });
                }

                let current = image
                    .get_or_insert_with(|| HexImage { base_address: address, data: Vec::new() });
                let expected = usize::from(current.base_address) + current.data.len();
                if usize::from(address) != expected {
                    return Err(IntelHexError::NonContiguous { line, address, expected });
                }
                current.data.extend_from_slice(data);
            }
            Some(RecordType::EndOfFile) => {
                let image = image.unwrap_or_default();
                log::debug!(
                    "Decoded {} bytes at ${:04X} from Intel HEX",
                    image.data.len(),
                    image.base_address
                );
                return Ok(image);
            }
            None => {
                let record_type = record[3];
                return Err(IntelHexError::UnsupportedRecordType { line, record_type });
            }
        }
    }

    Err(IntelHexError::MissingEndOfFile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn known_record() {
        let data = [
            0x21, 0x46, 0x01, 0x36, 0x01, 0x21, 0x47, 0x01, 0x36, 0x00, 0x7E, 0xFE, 0x09, 0xD2,
            0x19, 0x01,
        ];
        let text = encode(&data, 0x0100).unwrap();
        assert_eq!(text, ":10010000214601360121470136007EFE09D2190140\n:00000001FF\n");
    }

    #[test]
    fn short_final_record() {
        let data: Vec<u8> = (0..18).collect();
        let text = encode(&data, 0x8000).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(":10800000"));
        assert_eq!(lines[1], ":0280100010114D");
        assert_eq!(lines[2], EOF_RECORD);
    }

    #[test]
    fn empty_image_is_just_eof() {
        assert_eq!(encode(&[], 0x1234).unwrap(), ":00000001FF\n");
        assert_eq!(decode(":00000001FF").unwrap(), HexImage::default());
    }

    #[test]
    fn every_record_checksums_to_zero() {
        let data: Vec<u8> = (0..=255).cycle().take(1000).collect();
        let text = encode(&data, 0x0400).unwrap();

        for line in text.lines() {
            let bytes: Vec<u8> = (1..line.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&line[i..i + 2], 16).unwrap())
                .collect();
            let sum = bytes.iter().fold(0_u8, |sum, &byte| sum.wrapping_add(byte));
            assert_eq!(sum, 0, "{line}");
        }
    }

    #[test]
    fn encode_then_decode() {
        let data: Vec<u8> = (0..100).map(|i: u8| i.wrapping_mul(37)).collect();
        let image = decode(&encode(&data, 0xC000).unwrap()).unwrap();
        assert_eq!(image, HexImage { base_address: 0xC000, data });
    }

    #[test]
    fn image_must_fit() {
        assert_eq!(
            encode(&[0; 2], 0xFFFF),
            Err(IntelHexError::ImageTooLarge { base_address: 0xFFFF, len: 2 })
        );
        assert!(encode(&[0; 1], 0xFFFF).is_ok());
        assert!(encode(&vec![0; ADDRESS_SPACE_LEN], 0x0000).is_ok());
    }

    #[test]
    fn decoded_image_must_fit() {
        let mut text = String::new();
        write_record(&mut text, 0xFFFF, RecordType::Data, &[0x01, 0x02]);
        text.push_str(EOF_RECORD);
        assert_eq!(
            decode(&text),
            Err(IntelHexError::ImageTooLarge { base_address: 0xFFFF, len: 2 })
        );

        let mut text = String::new();
        write_record(&mut text, 0xFFF0, RecordType::Data, &[0xAA; 16]);
        write_record(&mut text, 0x0000, RecordType::Data, &[0xBB]);
        text.push_str(EOF_RECORD);
        assert!(matches!(decode(&text), Err(IntelHexError::NonContiguous { line: 2, .. })));

        let mut text = String::new();
        write_record(&mut text, 0xFFFF, RecordType::Data, &[0x01]);
        text.push_str(EOF_RECORD);
        assert_eq!(decode(&text), Ok(HexImage { base_address: 0xFFFF, data: vec![0x01] }));
    }

    #[test]
    fn decode_errors() {
        assert_eq!(
            decode(":020000000102FC\n:00000001FF"),
            Err(IntelHexError::ChecksumMismatch { line: 1, expected: 0xFB, actual: 0xFC })
        );
        assert_eq!(decode(":020000000102FB\n"), Err(IntelHexError::MissingEndOfFile));
        assert!(matches!(
            decode("020000000102FB\n:00000001FF"),
            Err(IntelHexError::MalformedRecord { line: 1, .. })
        ));
        assert!(matches!(
            decode(":030000000102FB\n:00000001FF"),
            Err(IntelHexError::MalformedRecord { line: 1, .. })
        ));
        assert!(matches!(
            decode(":02000000010ZFB\n:00000001FF"),
            Err(IntelHexError::MalformedRecord { line: 1, .. })
        ));
        assert_eq!(
            decode(":020000040000FA\n:00000001FF"),
            Err(IntelHexError::UnsupportedRecordType { line: 1, record_type: 0x04 })
        );
        assert_eq!(
            decode(":020000000102FB\n\n:020004000304F3\n:00000001FF"),
            Err(IntelHexError::NonContiguous { line: 3, address: 0x0004, expected: 0x0002 })
        );
    }
}
