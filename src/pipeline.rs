use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::exif::{attach_prompt_metadata, normalize_prompt, read_prompt};

/// Supported image extensions.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// The embedding target for a given image file, determined by its format.
///
/// Only the two containers with native EXIF embedding support are handled;
/// everything else is filtered out before processing.
///
/// # Example
///
/// ```rust
/// use prompt_exif::pipeline::ImageKind;
/// use std::path::Path;
///
/// let kind = ImageKind::from_path(Path::new("cover.PNG"));
/// assert_eq!(kind, Some(ImageKind::Png));
/// assert_eq!(ImageKind::from_path(Path::new("photo.webp")), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ImageKind {
    /// PNG — EXIF in an `eXIf` chunk
    Png,
    /// JPEG — EXIF in an APP1 segment
    Jpeg,
}

impl ImageKind {
    /// Determine the image kind from a file path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// The MIME type the embedding engine dispatches on.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Options controlling how [`process_image`] writes its result.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Report what would change without touching any file.
    pub dry_run: bool,
    /// Copy the original to `<name>.<ext>.bak` before overwriting.
    pub backup: bool,
    /// Write the tagged image here instead of overwriting in place.
    pub output_dir: Option<PathBuf>,
}

/// The result of embedding a prompt into a single image file.
///
/// Per-file failures are reported in `error` rather than aborting a batch,
/// so one unreadable file never stops the rest.
#[derive(Debug, Serialize)]
pub struct ProcessResult {
    pub path: PathBuf,
    /// The normalized prompt that was embedded, if embedding happened.
    pub embedded_prompt: Option<String>,
    /// Where the tagged bytes were written (absent on dry runs and skips).
    pub output_path: Option<PathBuf>,
    /// Why the file was left untouched, when it was.
    pub skipped: Option<String>,
    pub error: Option<String>,
    pub image_kind: Option<ImageKind>,
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks); only `.png`/`.jpg`/`.jpeg` files are
/// kept.
///
/// # Example
///
/// ```rust,no_run
/// use prompt_exif::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[
///     PathBuf::from("cover.png"),   // single file
///     PathBuf::from("./renders/"),  // entire directory
/// ]);
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Create a backup of the original file.
fn backup_file(path: &Path) -> Result<PathBuf> {
    let backup_path = path.with_extension(format!(
        "{}.bak",
        path.extension().unwrap_or_default().to_string_lossy()
    ));

    if !backup_path.exists() {
        std::fs::copy(path, &backup_path).context("Failed to create backup")?;
        log::debug!("Backup created: {}", backup_path.display());
    }

    Ok(backup_path)
}

/// Embed `prompt` into the image at `path`.
///
/// The full flow: detect the format from the extension, read the bytes, run
/// the embedding engine, and write the result — in place, or under
/// `output_dir` when one is set. The engine's fail-safe contract carries
/// through: a structurally unsound image is reported as skipped, never as a
/// corrupted output.
///
/// # Example
///
/// ```rust,no_run
/// use prompt_exif::pipeline::{process_image, ProcessOptions};
/// use std::path::Path;
///
/// let result = process_image(
///     Path::new("cover.png"),
///     "sunset city cover",
///     &ProcessOptions::default(),
/// );
/// if let Some(ref embedded) = result.embedded_prompt {
///     println!("tagged with: {embedded}");
/// }
/// ```
pub fn process_image(path: &Path, prompt: &str, options: &ProcessOptions) -> ProcessResult {
    let kind = ImageKind::from_path(path);

    let mut result = ProcessResult {
        path: path.to_path_buf(),
        embedded_prompt: None,
        output_path: None,
        skipped: None,
        error: None,
        image_kind: kind,
    };

    let Some(kind) = kind else {
        result.skipped = Some("unsupported file extension".to_string());
        return result;
    };

    let bytes = match std::fs::read(path).context("Failed to read image file") {
        Ok(bytes) => bytes,
        Err(e) => {
            result.error = Some(format!("{e:#}"));
            return result;
        }
    };

    let tagged = attach_prompt_metadata(&bytes, kind.mime_type(), prompt);
    if tagged == bytes {
        // The engine fell back — empty prompt or unsound container.
        result.skipped = Some("embedding skipped, image left unchanged".to_string());
        return result;
    }
    result.embedded_prompt = Some(normalize_prompt(prompt));

    let output_path = match &options.output_dir {
        Some(dir) => match path.file_name() {
            Some(name) => dir.join(name),
            None => {
                result.error = Some(format!("No file name in path: {}", path.display()));
                return result;
            }
        },
        None => path.to_path_buf(),
    };

    if options.dry_run {
        log::info!("DRY RUN — would write {}", output_path.display());
        return result;
    }

    if options.backup && output_path == path {
        if let Err(e) = backup_file(path) {
            log::warn!("Failed to backup {}: {e}", path.display());
        }
    }

    if let Err(e) = std::fs::write(&output_path, &tagged).context("Failed to write tagged image") {
        result.error = Some(format!("{e:#}"));
        return result;
    }

    log::debug!(
        "Embedded {} chars into {}",
        result.embedded_prompt.as_deref().unwrap_or_default().len(),
        output_path.display()
    );
    result.output_path = Some(output_path);
    result
}

/// Read the embedded prompt back out of the image at `path`.
pub fn show_prompt(path: &Path) -> Result<Option<String>> {
    let bytes = std::fs::read(path).context("Failed to read image file")?;
    Ok(read_prompt(&bytes))
}
