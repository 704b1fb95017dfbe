//! Loading targets and saving results.
//!
//! Thin wrappers over the `image` crate. Nothing in the evolution loop calls
//! into this module.

use crate::canvas::{CHANNELS, Canvas};
use crate::error::{Error, InputError, Result};
use image::RgbImage;
use std::path::Path;

/// Decodes `path` into a canvas with channels normalized to `[0, 1]`.
///
/// Only 3-channel (RGB) images are accepted. Grayscale or images with an
/// alpha channel are rejected rather than converted, since the renderer
/// always produces opaque RGB.
pub fn load_target(path: impl AsRef<Path>) -> Result<Canvas> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(InputError::NotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    let img = image::open(path).map_err(|source| InputError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let channels = img.color().channel_count() as usize;
    if channels != CHANNELS {
        return Err(InputError::ChannelMismatch {
            expected: CHANNELS,
            found: channels,
        }
        .into());
    }

    let rgb = img.to_rgb32f();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(InputError::EmptyImage.into());
    }
    log::info!("loaded target {} ({}x{})", path.display(), width, height);
    Ok(Canvas::from_raw(width, height, CHANNELS, rgb.into_raw())?)
}

/// Encodes `canvas` as 8-bit RGB; the format follows the file extension.
pub fn save_canvas(canvas: &Canvas, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let (width, height) = canvas.dimensions();
    let img = RgbImage::from_raw(width, height, canvas.to_rgb8()).ok_or(
        InputError::BufferLength {
            expected: width as usize * height as usize * CHANNELS,
            found: canvas.as_slice().len(),
        },
    )?;
    img.save(path).map_err(|source| Error::Output {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("saved {}", path.display());
    Ok(())
}
