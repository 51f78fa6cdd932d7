// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Decoded video frames: 8-bit, 3 channels, row-major HWC.

use std::path::Path;

use image::RgbImage;

use crate::error::{FrameDbError, Result};

pub const CHANNELS: usize = 3;

/// One decoded image held as a flat pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub height: u32,
    pub width: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Decode the image at `path`. Gray and alpha images are expanded or
    /// flattened to three channels; the result is in RGB order.
    pub fn decode(path: &Path) -> Result<Self> {
        let rgb = image::open(path)?.into_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Self { height, width, data: rgb.into_raw() })
    }

    /// Wrap a raw buffer, checking it holds exactly `height * width * 3` bytes.
    pub fn from_raw(height: u32, width: u32, data: Vec<u8>) -> Result<Self> {
        let expected = byte_len(height, width);
        if data.len() != expected {
            return Err(FrameDbError::ShapeMismatch {
                key: format!("{height}x{width}"),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { height, width, data })
    }

    pub fn nbytes(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reverse the channel order of every pixel (RGB <-> BGR).
    pub fn reverse_channels(&mut self) {
        for px in self.data.chunks_exact_mut(CHANNELS) {
            px.reverse();
        }
    }

    /// Write the frame as an RGB image; the format follows the extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let img = RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| FrameDbError::Store(format!("frame buffer too small for {path:?}")))?;
        img.save(path)?;
        Ok(())
    }
}

/// Bytes occupied by an `height x width` frame.
pub fn byte_len(height: u32, width: u32) -> usize {
    height as usize * width as usize * CHANNELS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(height: u32, width: u32) -> Frame {
        let data = (0..byte_len(height, width)).map(|i| (i % 251) as u8).collect();
        Frame::from_raw(height, width, data).unwrap()
    }

    #[test]
    fn from_raw_checks_length() {
        let err = Frame::from_raw(2, 2, vec![0u8; 11]).unwrap_err();
        assert!(matches!(err, FrameDbError::ShapeMismatch { expected: 12, actual: 11, .. }));
    }

    #[test]
    fn reverse_channels_swaps_and_is_involution() {
        let mut f = Frame::from_raw(1, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        f.reverse_channels();
        assert_eq!(f.as_bytes(), &[3, 2, 1, 6, 5, 4]);

        let original = gradient(7, 5);
        let mut twice = original.clone();
        twice.reverse_channels();
        assert_ne!(twice, original);
        twice.reverse_channels();
        assert_eq!(twice, original);
    }

    #[test]
    fn png_save_then_decode_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.png");
        let original = gradient(9, 13);
        original.save(&path).unwrap();

        let decoded = Frame::decode(&path).unwrap();
        assert_eq!(decoded.height, 9);
        assert_eq!(decoded.width, 13);
        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_missing_file_errors() {
        assert!(Frame::decode(Path::new("/nonexistent/0000.png")).is_err());
    }
}
