//! Validation and preparation of uploaded media
//!
//! Image helpers turn raw uploads and annotator output into the description,
//! product candidates, and storage keyword of an image-analysis record. Audio
//! helpers stage an upload on disk and hand the recognizer bytes plus an
//! encoding it accepts.

pub mod audio;
pub mod image;

pub use self::audio::{guess_encoding, prepare_audio, PreparedAudio};
pub use self::image::{
    decode_base64_image, describe_annotation, detect_storage, potential_products, sniff_image,
    validate_image_bytes, ImageSummary,
};

/// Human-readable size limit used in validation messages
pub fn size_limit_label(max_bytes: usize) -> String {
    format!("{}MB", max_bytes / (1024 * 1024))
}
