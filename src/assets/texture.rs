use std::path::Path;

use image::DynamicImage;

use crate::error::LoadError;
use crate::gpu::PixelFormat;

/// Decoded image, kept as tightly packed 8-bit RGB or RGBA rows, top row
/// first.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
}

impl Texture {
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Result<Self, LoadError> {
        if channels != 3 && channels != 4 {
            return Err(LoadError::InvalidTexture(format!(
                "{channels} channels, expected 3 or 4"
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(LoadError::InvalidTexture(format!(
                "{width}x{height}x{channels} needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Load a texture from an image file (PNG, JPG, etc.)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| LoadError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let texture = Self::from_image(image);
        log::debug!(
            "Decoded {} ({}x{}, {} channels)",
            path.display(),
            texture.width,
            texture.height,
            texture.channels
        );
        Ok(texture)
    }

    /// RGB images stay RGB; anything else (grey, alpha, 16-bit) becomes RGBA8.
    pub fn from_image(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageRgb8(rgb) => {
                let (width, height) = rgb.dimensions();
                Self {
                    width,
                    height,
                    channels: 3,
                    pixels: rgb.into_raw(),
                }
            }
            other => {
                let rgba = other.to_rgba8();
                let (width, height) = rgba.dimensions();
                Self {
                    width,
                    height,
                    channels: 4,
                    pixels: rgba.into_raw(),
                }
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Source format for the upload.
    pub fn format(&self) -> PixelFormat {
        PixelFormat::from_channels(self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage};

    #[test]
    fn rgb_images_keep_three_channels() {
        let texture = Texture::from_image(DynamicImage::ImageRgb8(RgbImage::new(4, 2)));
        assert_eq!(texture.channels(), 3);
        assert_eq!(texture.format(), PixelFormat::Rgb);
        assert_eq!(texture.pixels().len(), 4 * 2 * 3);
    }

    #[test]
    fn other_images_become_rgba() {
        let texture = Texture::from_image(DynamicImage::ImageLuma8(GrayImage::new(3, 3)));
        assert_eq!(texture.channels(), 4);
        assert_eq!(texture.format(), PixelFormat::Rgba);
    }

    #[test]
    fn new_validates_buffer_size() {
        assert!(Texture::new(2, 2, 3, vec![0; 12]).is_ok());
        assert!(Texture::new(2, 2, 4, vec![0; 12]).is_err());
        assert!(Texture::new(2, 2, 1, vec![0; 4]).is_err());
        assert!(Texture::new(0, 2, 3, Vec::new()).is_err());
    }

    #[test]
    fn missing_file_is_an_image_error() {
        assert!(matches!(
            Texture::from_file("no/such/texture.png"),
            Err(LoadError::Image { .. })
        ));
    }
}
