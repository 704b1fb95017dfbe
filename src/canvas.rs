//! Float RGB pixel buffers.

use crate::error::InputError;

/// Channels per pixel. The renderer only ever produces RGB.
pub const CHANNELS: usize = 3;

/// A row-major `width x height x 3` buffer of linear channel values.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Canvas {
    /// Opaque black canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize * CHANNELS],
        }
    }

    /// Canvas filled with a single color.
    pub fn filled(width: u32, height: u32, rgb: [f32; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wraps an already-normalized interleaved buffer.
    ///
    /// Rejects anything that is not 3-channel, so an RGBA or grayscale source
    /// can never be compared against rendered output channel by channel.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, InputError> {
        if channels != CHANNELS {
            return Err(InputError::ChannelMismatch {
                expected: CHANNELS,
                found: channels,
            });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(InputError::BufferLength {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// RGB at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Denormalizes to 8 bits per channel, rounding to nearest.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }
}
