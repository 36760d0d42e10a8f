use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageBuffer, Pixel};
use thiserror::Error;

/// Errors produced while decoding a texture image.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("texture failed to load at path {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported texture component count: {0}")]
    UnsupportedChannels(u8),
    #[error("texture has zero area")]
    Empty,
}

/// Pixel layout of the source image, inferred from its component count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Red,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn from_channel_count(count: u8) -> Result<Self, TextureError> {
        match count {
            1 => Ok(Self::Red),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            other => Err(TextureError::UnsupportedChannels(other)),
        }
    }

    /// Bytes per texel of the uploaded data. RGB sources are expanded to RGBA
    /// because the GPU has no three-component 8-bit format.
    pub fn bytes_per_texel(self) -> u32 {
        match self {
            Self::Red => 1,
            Self::Rgb | Self::Rgba => 4,
        }
    }
}

/// Decoded texture with its full mip chain, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Level 0 first, each following level half the size down to 1x1.
    pub levels: Vec<Vec<u8>>,
}

impl TextureData {
    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let image = image::open(path).map_err(|source| TextureError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_image(image)
    }

    /// Flips the image vertically so row zero is the bottom of the picture,
    /// matching OBJ texture coordinates.
    pub fn from_image(image: DynamicImage) -> Result<Self, TextureError> {
        let format = PixelFormat::from_channel_count(image.color().channel_count())?;
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty);
        }
        let image = image.flipv();
        let levels = match format {
            PixelFormat::Red => mip_chain(image.to_luma8()),
            PixelFormat::Rgb | PixelFormat::Rgba => mip_chain(image.to_rgba8()),
        };
        Ok(Self {
            width,
            height,
            format,
            levels,
        })
    }

    /// A single RGBA texel, used in place of missing or broken maps.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            format: PixelFormat::Rgba,
            levels: vec![rgba.to_vec()],
        }
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn level_size(&self, level: u32) -> (u32, u32) {
        ((self.width >> level).max(1), (self.height >> level).max(1))
    }
}

/// Number of levels in a full mip chain for the given base size.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

fn mip_chain<P>(base: ImageBuffer<P, Vec<u8>>) -> Vec<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let mut levels = Vec::with_capacity(mip_level_count(base.width(), base.height()) as usize);
    let mut current = base;
    loop {
        let (width, height) = current.dimensions();
        let next = (width > 1 || height > 1).then(|| {
            imageops::resize(
                &current,
                (width / 2).max(1),
                (height / 2).max(1),
                FilterType::Triangle,
            )
        });
        levels.push(current.into_raw());
        match next {
            Some(next) => current = next,
            None => break,
        }
    }
    levels
}

#[cfg(test)]
mod tests {
    use image::{GrayAlphaImage, Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;

    #[test]
    fn rgb_image_is_uploaded_as_rgb_with_alpha_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        RgbImage::from_pixel(4, 2, Rgb([10, 20, 30])).save(&path).unwrap();

        let texture = TextureData::load(&path).unwrap();
        assert_eq!(texture.format, PixelFormat::Rgb);
        assert_eq!((texture.width, texture.height), (4, 2));
        assert_eq!(texture.levels[0].len(), 4 * 2 * 4);
        assert_eq!(&texture.levels[0][..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn mip_chain_halves_down_to_one_texel() {
        let texture =
            TextureData::from_image(DynamicImage::ImageRgba8(RgbaImage::new(8, 2))).unwrap();
        assert_eq!(texture.mip_level_count(), 4);
        assert_eq!(texture.level_size(1), (4, 1));
        assert_eq!(texture.level_size(3), (1, 1));
        for (level, data) in texture.levels.iter().enumerate() {
            let (w, h) = texture.level_size(level as u32);
            assert_eq!(data.len() as u32, w * h * 4);
        }
    }

    #[test]
    fn rows_are_flipped_so_origin_is_bottom_left() {
        let mut image = RgbaImage::new(1, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        let texture = TextureData::from_image(DynamicImage::ImageRgba8(image)).unwrap();
        assert_eq!(&texture.levels[0][..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn single_channel_images_stay_single_channel() {
        let image = DynamicImage::ImageLuma8(image::GrayImage::new(2, 2));
        let texture = TextureData::from_image(image).unwrap();
        assert_eq!(texture.format, PixelFormat::Red);
        assert_eq!(texture.levels[0].len(), 4);
    }

    #[test]
    fn two_channel_images_are_rejected() {
        let image = DynamicImage::ImageLumaA8(GrayAlphaImage::new(2, 2));
        assert!(matches!(
            TextureData::from_image(image),
            Err(TextureError::UnsupportedChannels(2))
        ));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = TextureData::load(Path::new("does/not/exist.png")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.png"));
    }
}
