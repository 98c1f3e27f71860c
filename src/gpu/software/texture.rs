//! Texture objects of the software device.

use crate::gpu::device::{PixelFormat, SamplerParams, TextureFilter, TextureWrap};
use crate::math::Vec3;
use crate::render::TextureSampler;

/// One mip level, stored as RGBA8 rows, first uploaded row first.
#[derive(Clone, Debug, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<[u8; 4]>,
}

impl MipLevel {
    #[inline]
    fn texel(&self, x: u32, y: u32) -> Vec3 {
        let [r, g, b, _] = self.texels[(y * self.width + x) as usize];
        Vec3::new(r as f32, g as f32, b as f32) / 255.0
    }

    /// Half-size level averaging 2x2 blocks; odd edges reuse the last texel.
    fn downsample(&self) -> MipLevel {
        let width = (self.width / 2).max(1);
        let height = (self.height / 2).max(1);
        let mut texels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let mut sum = [0u32; 4];
                for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    let sx = (x * 2 + dx).min(self.width - 1);
                    let sy = (y * 2 + dy).min(self.height - 1);
                    let texel = self.texels[(sy * self.width + sx) as usize];
                    for (acc, channel) in sum.iter_mut().zip(texel) {
                        *acc += channel as u32;
                    }
                }
                texels.push(sum.map(|c| ((c + 2) / 4) as u8));
            }
        }
        MipLevel {
            width,
            height,
            texels,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TextureObject {
    pub params: SamplerParams,
    pub levels: Vec<MipLevel>,
}

impl TextureObject {
    /// Replaces the whole mip chain with a new base level. Returns false if
    /// `pixels` is too short for the given size and format.
    pub fn set_image(&mut self, width: u32, height: u32, format: PixelFormat, pixels: &[u8]) -> bool {
        let channels = format.channels();
        let count = width as usize * height as usize;
        if width == 0 || height == 0 || pixels.len() < count * channels {
            return false;
        }
        let texels = pixels
            .chunks_exact(channels)
            .take(count)
            .map(|p| match format {
                PixelFormat::Rgb => [p[0], p[1], p[2], 255],
                PixelFormat::Rgba => [p[0], p[1], p[2], p[3]],
            })
            .collect();
        self.levels = vec![MipLevel {
            width,
            height,
            texels,
        }];
        true
    }

    /// Rebuilds levels 1.. from level 0 down to 1x1.
    pub fn generate_mipmaps(&mut self) {
        self.levels.truncate(1);
        while let Some(last) = self.levels.last() {
            if last.width == 1 && last.height == 1 {
                break;
            }
            let next = last.downsample();
            self.levels.push(next);
        }
    }

    pub fn base(&self) -> Option<&MipLevel> {
        self.levels.first()
    }
}

#[inline]
fn wrap(coord: i64, size: u32, mode: TextureWrap) -> u32 {
    match mode {
        TextureWrap::Repeat => coord.rem_euclid(size as i64) as u32,
        TextureWrap::ClampToEdge => coord.clamp(0, size as i64 - 1) as u32,
    }
}

impl TextureSampler for TextureObject {
    /// Samples the base level with the magnification filter. A texture with
    /// no image samples black.
    fn sample(&self, u: f32, v: f32) -> Vec3 {
        let Some(level) = self.base() else {
            return Vec3::ZERO;
        };
        let p = &self.params;
        let x = u * level.width as f32;
        let y = v * level.height as f32;

        match p.mag_filter {
            TextureFilter::Nearest => level.texel(
                wrap(x.floor() as i64, level.width, p.wrap_s),
                wrap(y.floor() as i64, level.height, p.wrap_t),
            ),
            TextureFilter::Linear => {
                let x = x - 0.5;
                let y = y - 0.5;
                let (x0, y0) = (x.floor(), y.floor());
                let (fx, fy) = (x - x0, y - y0);
                let (x0, y0) = (x0 as i64, y0 as i64);
                let xs = [wrap(x0, level.width, p.wrap_s), wrap(x0 + 1, level.width, p.wrap_s)];
                let ys = [wrap(y0, level.height, p.wrap_t), wrap(y0 + 1, level.height, p.wrap_t)];

                let top = level.texel(xs[0], ys[0]) * (1.0 - fx) + level.texel(xs[1], ys[0]) * fx;
                let bottom = level.texel(xs[0], ys[1]) * (1.0 - fx) + level.texel(xs[1], ys[1]) * fx;
                top * (1.0 - fy) + bottom * fy
            }
        }
    }
}
