//! EXIF `ImageDescription` embedding for PNG and JPEG byte buffers.
//!
//! This module is the embedding engine: [`attach_prompt_metadata`] takes
//! already-encoded image bytes, a MIME type, and a free-text prompt, and
//! returns a new buffer with the prompt injected as standards-conformant
//! EXIF metadata — an `eXIf` chunk for PNG, an `Exif\0\0` APP1 segment for
//! JPEG. Pixels are never decoded or re-encoded.
//!
//! Embedding is strictly best-effort: on an empty prompt, an unsupported
//! MIME type, or any structural problem with the input, the caller gets the
//! original bytes back. The function never fails and never panics — metadata
//! must not stand between the caller and its image.
//!
//! [`read_prompt`] is the inverse surface: it sniffs the container and
//! extracts whatever description is currently embedded.

mod crc32;
mod jpeg;
mod png;
mod reader;
mod tiff;

pub use reader::read_prompt;

/// In-memory 1×1 image fixtures shared by the crate's test modules.
#[cfg(test)]
pub(crate) mod test_fixtures {
    pub(crate) use super::jpeg::minimal_jpeg;
    pub(crate) use super::png::minimal_png;
}

use thiserror::Error;

/// Longest prompt, in characters, that will be embedded.
const MAX_PROMPT_CHARS: usize = 2000;

/// Structural reasons an embed attempt can be abandoned.
///
/// These never escape [`attach_prompt_metadata`] — the orchestrator resolves
/// every one of them into "return the original bytes". They exist as a typed
/// enum so the codecs stay testable in isolation.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The buffer does not open with the expected container magic.
    #[error("buffer does not start with a recognized image signature")]
    UnsupportedSignature,

    /// A PNG chunk's declared length runs past the end of the buffer.
    #[error("PNG chunk at offset {offset} runs past the end of the buffer")]
    TruncatedChunk { offset: usize },

    /// The EXIF payload does not fit a single JPEG segment.
    #[error("EXIF segment of {len} bytes exceeds the 16-bit JPEG segment limit")]
    OversizeSegment { len: usize },
}

/// Normalize a prompt for embedding: trim, collapse internal whitespace runs
/// to single spaces, and cap the length at 2000 characters.
pub fn normalize_prompt(prompt: &str) -> String {
    let collapsed = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_PROMPT_CHARS {
        collapsed
    } else {
        collapsed.chars().take(MAX_PROMPT_CHARS).collect()
    }
}

/// Embed `prompt` as EXIF `ImageDescription` metadata in `bytes`.
///
/// Dispatches on the (case-insensitive) MIME type: `image/png` gets an
/// `eXIf` chunk ahead of the first `IDAT`, `image/jpeg`/`image/jpg` gets an
/// APP1 segment right after SOI. Any prior embedded description is replaced,
/// never duplicated.
///
/// This call never fails. An empty normalized prompt, an unrecognized MIME
/// type, or a structurally unsound input all yield a byte-identical copy of
/// the input.
///
/// # Example
///
/// ```rust
/// use prompt_exif::exif::{attach_prompt_metadata, read_prompt};
///
/// # fn example(png_bytes: &[u8]) {
/// let tagged = attach_prompt_metadata(png_bytes, "image/png", "sunset city cover");
/// assert_eq!(read_prompt(&tagged).as_deref(), Some("sunset city cover"));
/// # }
/// ```
pub fn attach_prompt_metadata(bytes: &[u8], mime_type: &str, prompt: &str) -> Vec<u8> {
    let normalized = normalize_prompt(prompt);
    if normalized.is_empty() {
        log::debug!("empty prompt after normalization, skipping embed");
        return bytes.to_vec();
    }

    let result = match mime_type.to_ascii_lowercase().as_str() {
        "image/png" => png::embed_description(bytes, &normalized),
        "image/jpeg" | "image/jpg" => jpeg::embed_description(bytes, &normalized),
        other => {
            log::debug!("unsupported MIME type {other:?}, leaving image untouched");
            return bytes.to_vec();
        }
    };

    match result {
        Ok(tagged) => tagged,
        Err(e) => {
            log::warn!("metadata embed failed ({e}), returning original image");
            bytes.to_vec()
        }
    }
}
