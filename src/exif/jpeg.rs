//! JPEG APP1 segment injection.
//!
//! A JPEG stream is the two-byte SOI marker followed by marker segments.
//! EXIF rides in an APP1 segment whose contents start with the `Exif\0\0`
//! identifier; the two-byte length field counts itself, so a segment can
//! carry at most 0xFFFF − 2 bytes of content. The injector splices a fresh
//! APP1 directly after SOI and leaves everything else untouched.

use super::tiff;
use super::EmbedError;

/// Start-Of-Image marker opening every JPEG stream.
pub(crate) const SOI: [u8; 2] = [0xFF, 0xD8];

const APP1: [u8; 2] = [0xFF, 0xE1];
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;

// RST0–RST7, plus SOI/EOI: markers with no length field.
const RST0: u8 = 0xD0;
const RST7: u8 = 0xD7;

/// EXIF identifier prefixing the TIFF body of an EXIF APP1 segment.
const EXIF_IDENTIFIER: &[u8; 6] = b"Exif\0\0";

/// Maximum value of the 16-bit segment length field.
const MAX_SEGMENT_LEN: usize = 0xFFFF;

/// Inject `text` as an EXIF APP1 segment immediately after SOI.
///
/// Existing segments are preserved untouched behind the new one. A payload
/// that cannot fit the 16-bit length field is refused rather than split
/// across multiple segments.
pub fn embed_description(data: &[u8], text: &str) -> Result<Vec<u8>, EmbedError> {
    if data.len() < 4 || data[0..2] != SOI {
        return Err(EmbedError::UnsupportedSignature);
    }

    let tiff = tiff::build_image_description(text);
    let mut payload = Vec::with_capacity(EXIF_IDENTIFIER.len() + tiff.len());
    payload.extend_from_slice(EXIF_IDENTIFIER);
    payload.extend_from_slice(&tiff);

    // The length field counts itself.
    let segment_len = payload.len() + 2;
    if segment_len > MAX_SEGMENT_LEN {
        return Err(EmbedError::OversizeSegment { len: segment_len });
    }

    let mut out = Vec::with_capacity(data.len() + 4 + segment_len);
    out.extend_from_slice(&SOI);
    out.extend_from_slice(&APP1);
    out.extend_from_slice(&(segment_len as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&data[2..]);
    Ok(out)
}

/// Find the TIFF body of the first `Exif\0\0` APP1 segment.
///
/// Walks marker segments from SOI, skipping standalone markers, and stops at
/// SOS — entropy-coded data follows and no APPn can appear past it.
pub(crate) fn find_exif_segment(data: &[u8]) -> Option<&[u8]> {
    if data.len() < 4 || data[0..2] != SOI {
        return None;
    }

    let mut pos = 2;
    while pos + 2 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        match marker {
            SOS => return None,
            EOI => return None,
            0xFF => {
                // fill byte
                pos += 1;
                continue;
            }
            RST0..=RST7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let length_bytes = data.get(pos + 2..pos + 4)?;
        let length = u16::from_be_bytes([length_bytes[0], length_bytes[1]]) as usize;
        if length < 2 {
            return None;
        }
        let contents = data.get(pos + 4..pos + 2 + length)?;

        if marker == APP1[1] && contents.starts_with(EXIF_IDENTIFIER) {
            return Some(&contents[EXIF_IDENTIFIER.len()..]);
        }
        pos += 2 + length;
    }

    None
}

/// Pull the embedded description back out of a JPEG buffer, if any.
pub(crate) fn read_description(data: &[u8]) -> Option<String> {
    find_exif_segment(data).and_then(tiff::read_image_description)
}

/// A minimal baseline JPEG skeleton: SOI, a JFIF APP0 segment, EOI.
#[cfg(test)]
pub(crate) fn minimal_jpeg() -> Vec<u8> {
    let mut jpeg = SOI.to_vec();
    jpeg.extend_from_slice(&[0xFF, 0xE0]); // APP0
    jpeg.extend_from_slice(&16u16.to_be_bytes());
    jpeg.extend_from_slice(b"JFIF\0");
    jpeg.extend_from_slice(&[0x01, 0x01]); // version 1.1
    jpeg.extend_from_slice(&[0x00]); // aspect-ratio units
    jpeg.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]); // density 1×1
    jpeg.extend_from_slice(&[0x00, 0x00]); // no thumbnail
    jpeg.extend_from_slice(&[0xFF, EOI]);
    jpeg
}
