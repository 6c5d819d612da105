//! Read-back of embedded descriptions.

use super::{jpeg, png};

/// Extract the embedded EXIF `ImageDescription` from an image buffer.
///
/// The container is sniffed from the leading magic bytes — no MIME type is
/// needed on the read side. Returns `None` for unrecognized containers and
/// for images that simply carry no description.
///
/// # Example
///
/// ```rust,no_run
/// use prompt_exif::exif::read_prompt;
///
/// let bytes = std::fs::read("cover.png").unwrap();
/// match read_prompt(&bytes) {
///     Some(prompt) => println!("generated from: {prompt}"),
///     None => println!("no embedded prompt"),
/// }
/// ```
pub fn read_prompt(bytes: &[u8]) -> Option<String> {
    if bytes.starts_with(&png::PNG_SIGNATURE) {
        png::read_description(bytes)
    } else if bytes.len() >= 2 && bytes[0..2] == jpeg::SOI {
        jpeg::read_description(bytes)
    } else {
        log::debug!("buffer is neither PNG nor JPEG, nothing to read");
        None
    }
}
