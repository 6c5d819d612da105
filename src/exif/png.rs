//! PNG chunk codec.
//!
//! A PNG is an 8-byte signature followed by chunks, each serialized as a
//! big-endian u32 length, a 4-byte ASCII type, the data, and a CRC-32 over
//! `type ++ data`. EXIF metadata lives in the `eXIf` ancillary chunk. The
//! codec never touches pixel data — chunks are carried through verbatim and
//! only their CRCs are recomputed on write.

use super::crc32::crc32;
use super::tiff;
use super::EmbedError;

/// PNG signature bytes.
pub(crate) const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

const EXIF: [u8; 4] = *b"eXIf";
const IDAT: [u8; 4] = *b"IDAT";
const IEND: [u8; 4] = *b"IEND";

/// A parsed PNG chunk. Owns its data so re-serialization never aliases the
/// input buffer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Chunk {
    pub kind: [u8; 4],
    pub data: Vec<u8>,
}

impl Chunk {
    /// CRC covers the chunk type and data, not the length field.
    fn crc(&self) -> u32 {
        let mut checksummed = Vec::with_capacity(4 + self.data.len());
        checksummed.extend_from_slice(&self.kind);
        checksummed.extend_from_slice(&self.data);
        crc32(&checksummed)
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.kind);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&self.crc().to_be_bytes());
    }
}

/// Parse the chunk list of a signature-verified PNG buffer.
///
/// Stored CRCs are skipped, not validated — they are recomputed on write.
/// The scan stops after `IEND`; a chunk whose declared length runs past the
/// end of the buffer aborts the parse.
pub(crate) fn parse_chunks(data: &[u8]) -> Result<Vec<Chunk>, EmbedError> {
    let mut chunks = Vec::new();
    let mut pos = PNG_SIGNATURE.len();

    while pos < data.len() {
        if pos + 8 > data.len() {
            return Err(EmbedError::TruncatedChunk { offset: pos });
        }
        let length =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        let kind = [data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]];

        let data_start = pos + 8;
        let data_end = data_start
            .checked_add(length)
            .filter(|end| end.checked_add(4).is_some_and(|crc_end| crc_end <= data.len()))
            .ok_or(EmbedError::TruncatedChunk { offset: pos })?;

        chunks.push(Chunk {
            kind,
            data: data[data_start..data_end].to_vec(),
        });
        pos = data_end + 4; // skip the stored CRC

        if kind == IEND {
            break;
        }
    }

    Ok(chunks)
}

/// Inject `text` as an `eXIf` chunk, replacing any existing one.
///
/// The chunk is placed before the first `IDAT` so metadata stays ahead of
/// pixel data; without an `IDAT` it is appended. The insertion index is
/// clamped so the leading header chunk always remains first.
pub fn embed_description(data: &[u8], text: &str) -> Result<Vec<u8>, EmbedError> {
    if !data.starts_with(&PNG_SIGNATURE) {
        return Err(EmbedError::UnsupportedSignature);
    }

    let mut chunks = parse_chunks(data)?;
    chunks.retain(|chunk| chunk.kind != EXIF);

    let exif = Chunk {
        kind: EXIF,
        data: tiff::build_image_description(text),
    };
    let index = chunks
        .iter()
        .position(|chunk| chunk.kind == IDAT)
        .unwrap_or(chunks.len())
        .max(1)
        .min(chunks.len());
    chunks.insert(index, exif);

    let mut out = Vec::with_capacity(data.len() + 12 + text.len() + 64);
    out.extend_from_slice(&PNG_SIGNATURE);
    for chunk in &chunks {
        chunk.write_to(&mut out);
    }
    Ok(out)
}

/// Pull the embedded description back out of a PNG buffer, if any.
pub(crate) fn read_description(data: &[u8]) -> Option<String> {
    if !data.starts_with(&PNG_SIGNATURE) {
        return None;
    }
    let chunks = parse_chunks(data).ok()?;
    chunks
        .iter()
        .find(|chunk| chunk.kind == EXIF)
        .and_then(|chunk| tiff::read_image_description(&chunk.data))
}

/// A structurally valid 1×1 grayscale PNG built chunk by chunk.
#[cfg(test)]
pub(crate) fn minimal_png() -> Vec<u8> {
    let ihdr = Chunk {
        kind: *b"IHDR",
        data: vec![
            0x00, 0x00, 0x00, 0x01, // width 1
            0x00, 0x00, 0x00, 0x01, // height 1
            0x08, 0x00, // 8-bit grayscale
            0x00, 0x00, 0x00, // deflate, adaptive, no interlace
        ],
    };
    let idat = Chunk {
        kind: *b"IDAT",
        data: vec![0x78, 0x9C, 0x62, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01],
    };
    let iend = Chunk {
        kind: *b"IEND",
        data: Vec::new(),
    };

    let mut png = PNG_SIGNATURE.to_vec();
    ihdr.write_to(&mut png);
    idat.write_to(&mut png);
    iend.write_to(&mut png);
    png
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(chunks: &[Chunk]) -> Vec<&[u8; 4]> {
        chunks.iter().map(|c| &c.kind).collect()
    }

    // ── embedding ────────────────────────────────────────────────────

    #[test]
    fn exif_chunk_lands_before_idat() {
        let out = embed_description(&minimal_png(), "sunset city cover").unwrap();
        let chunks = parse_chunks(&out).unwrap();
        assert_eq!(kinds(&chunks), [b"IHDR", b"eXIf", b"IDAT", b"IEND"]);
    }

    #[test]
    fn output_keeps_signature_and_iend() {
        let out = embed_description(&minimal_png(), "sunset city cover").unwrap();
        assert!(out.starts_with(&PNG_SIGNATURE));
        let chunks = parse_chunks(&out).unwrap();
        assert_eq!(chunks.last().unwrap().kind, *b"IEND");
    }

    #[test]
    fn every_stored_crc_matches_type_and_data() {
        let out = embed_description(&minimal_png(), "sunset city cover").unwrap();
        let mut pos = PNG_SIGNATURE.len();
        while pos < out.len() {
            let length =
                u32::from_be_bytes([out[pos], out[pos + 1], out[pos + 2], out[pos + 3]]) as usize;
            let stored = u32::from_be_bytes([
                out[pos + 8 + length],
                out[pos + 9 + length],
                out[pos + 10 + length],
                out[pos + 11 + length],
            ]);
            assert_eq!(stored, crc32(&out[pos + 4..pos + 8 + length]));
            pos += 12 + length;
        }
    }

    #[test]
    fn embedded_text_is_readable() {
        let out = embed_description(&minimal_png(), "sunset city cover").unwrap();
        assert_eq!(read_description(&out).as_deref(), Some("sunset city cover"));
    }

    #[test]
    fn removing_exif_restores_original_chunk_list() {
        let original = parse_chunks(&minimal_png()).unwrap();
        let out = embed_description(&minimal_png(), "sunset city cover").unwrap();
        let mut chunks = parse_chunks(&out).unwrap();
        chunks.retain(|c| c.kind != EXIF);
        assert_eq!(chunks, original);
    }

    #[test]
    fn reembedding_replaces_instead_of_duplicating() {
        let once = embed_description(&minimal_png(), "first prompt").unwrap();
        let twice = embed_description(&once, "second prompt").unwrap();
        let exif_count = parse_chunks(&twice)
            .unwrap()
            .iter()
            .filter(|c| c.kind == EXIF)
            .count();
        assert_eq!(exif_count, 1);
        assert_eq!(read_description(&twice).as_deref(), Some("second prompt"));
    }

    #[test]
    fn no_idat_appends_at_end() {
        let ihdr = Chunk {
            kind: *b"IHDR",
            data: vec![0; 13],
        };
        let mut png = PNG_SIGNATURE.to_vec();
        ihdr.write_to(&mut png);

        let out = embed_description(&png, "prompt").unwrap();
        let chunks = parse_chunks(&out).unwrap();
        assert_eq!(kinds(&chunks), [b"IHDR", b"eXIf"]);
    }

    #[test]
    fn header_chunk_stays_first_even_when_idat_leads() {
        // Malformed ordering with IDAT as the first chunk — the insertion
        // index clamps to 1 instead of pushing the first chunk down.
        let idat = Chunk {
            kind: *b"IDAT",
            data: vec![0x00],
        };
        let mut png = PNG_SIGNATURE.to_vec();
        idat.write_to(&mut png);

        let out = embed_description(&png, "prompt").unwrap();
        let chunks = parse_chunks(&out).unwrap();
        assert_eq!(kinds(&chunks), [b"IDAT", b"eXIf"]);
    }

    // ── parse failures ───────────────────────────────────────────────

    #[test]
    fn wrong_signature_is_rejected() {
        let err = embed_description(&[0u8; 32], "prompt").unwrap_err();
        assert!(matches!(err, EmbedError::UnsupportedSignature));
    }

    #[test]
    fn overlong_declared_length_is_rejected() {
        let mut png = minimal_png();
        // Inflate the IHDR length field far past the buffer end.
        png[8..12].copy_from_slice(&0x00FF_FFFFu32.to_be_bytes());
        let err = embed_description(&png, "prompt").unwrap_err();
        assert!(matches!(err, EmbedError::TruncatedChunk { .. }));
    }

    #[test]
    fn truncated_chunk_header_is_rejected() {
        let mut png = minimal_png();
        png.truncate(PNG_SIGNATURE.len() + 5);
        let err = embed_description(&png, "prompt").unwrap_err();
        assert!(matches!(err, EmbedError::TruncatedChunk { .. }));
    }

    #[test]
    fn trailing_garbage_after_iend_is_dropped() {
        let mut png = minimal_png();
        png.extend_from_slice(b"garbage");
        let out = embed_description(&png, "prompt").unwrap();
        let chunks = parse_chunks(&out).unwrap();
        assert_eq!(chunks.last().unwrap().kind, *b"IEND");
    }
}
