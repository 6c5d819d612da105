//! # prompt-exif
//!
//! Embed image-generation prompts as EXIF `ImageDescription` metadata
//! directly into PNG and JPEG bytes — no pixel decode, no re-encode.
//!
//! Generated images lose their provenance the moment they leave the tool
//! that made them. This crate injects the generation prompt into the image
//! container itself, where any standard EXIF reader can recover it: PNG gets
//! an `eXIf` chunk (CRCs recomputed), JPEG gets an `Exif\0\0` APP1 segment
//! right after SOI. The existing structure is carried through byte for byte.
//!
//! ## Quick Start
//!
//! The embedding engine is a pure function over byte buffers:
//!
//! ```rust,no_run
//! use prompt_exif::exif::{attach_prompt_metadata, read_prompt};
//!
//! let bytes = std::fs::read("cover.png")?;
//!
//! // Never fails: on any structural problem the original bytes come back.
//! let tagged = attach_prompt_metadata(&bytes, "image/png", "sunset city cover");
//! std::fs::write("cover.png", &tagged)?;
//!
//! // Read it back.
//! assert_eq!(read_prompt(&tagged).as_deref(), Some("sunset city cover"));
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! For file-based workflows, the pipeline module wraps the engine with
//! format detection, directory collection, and backups:
//!
//! ```rust,no_run
//! use prompt_exif::pipeline::{collect_images, process_image, ProcessOptions};
//! use std::path::PathBuf;
//!
//! let images = collect_images(&[PathBuf::from("./renders")]);
//! for path in &images {
//!     let result = process_image(path, "sunset city cover", &ProcessOptions::default());
//!     if let Some(ref err) = result.error {
//!         eprintln!("Error processing {}: {err}", path.display());
//!     }
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Strategy |
//! |--------|----------|
//! | PNG (`.png`) | `eXIf` chunk before the first `IDAT`, CRCs recomputed |
//! | JPEG (`.jpg`, `.jpeg`) | `Exif\0\0` APP1 segment directly after SOI |
//!
//! Anything else passes through unchanged — embedding is best-effort by
//! contract and never blocks delivery of the image.
//!
//! ## Modules
//!
//! - [`exif`] — the embedding engine: prompt normalization, TIFF/IFD
//!   construction, PNG chunk codec, JPEG segment injection, read-back
//! - [`pipeline`] — file-level processing: format detection, image
//!   collection, backups

pub mod exif;
pub mod pipeline;
