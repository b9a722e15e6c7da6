//! Video frame decoding: image data URL → RGB8 pixel buffer.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbImage;
use thiserror::Error;

/// Malformed image input. The frame is skipped; the session continues.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("not a data URL (missing \"data:\" prefix or ',' separator)")]
    NotDataUrl,

    #[error("data URL is not base64-encoded (header {header:?})")]
    NotBase64 { header: String },

    #[error("empty image payload")]
    Empty,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("undecodable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Split a data URL into its header (`data:image/jpeg;base64`) and the
/// base64-decoded payload bytes.
pub fn data_url_bytes(url: &str) -> Result<Vec<u8>, FrameError> {
    let (header, data) = url.split_once(',').ok_or(FrameError::NotDataUrl)?;
    if !header.starts_with("data:") {
        return Err(FrameError::NotDataUrl);
    }
    if !header.ends_with(";base64") {
        return Err(FrameError::NotBase64 { header: header.to_owned() });
    }
    let bytes = STANDARD.decode(data.trim())?;
    if bytes.is_empty() {
        return Err(FrameError::Empty);
    }
    Ok(bytes)
}

/// Decode an image data URL into an RGB8 buffer.
///
/// The container format is sniffed from the bytes, not trusted from the
/// MIME type in the header.
pub fn decode_data_url(url: &str) -> Result<RgbImage, FrameError> {
    let bytes = data_url_bytes(url)?;
    Ok(image::load_from_memory(&bytes)?.to_rgb8())
}
