//! Packed ARGB8888 colour helpers.

use crate::math::Vec3;

pub const BLACK: u32 = 0xFF00_0000;

/// Packs a linear [0, 1] RGB colour into opaque ARGB8888.
#[inline]
pub fn pack_rgb(color: Vec3) -> u32 {
    let c = color.clamp(0.0, 1.0);
    let to_byte = |v: f32| (v * 255.0 + 0.5) as u32;
    0xFF00_0000 | (to_byte(c.x) << 16) | (to_byte(c.y) << 8) | to_byte(c.z)
}

/// Unpacks the RGB channels of an ARGB8888 colour into [0, 1].
#[inline]
pub fn unpack_rgb(color: u32) -> Vec3 {
    let channel = |shift: u32| ((color >> shift) & 0xFF) as f32 / 255.0;
    Vec3::new(channel(16), channel(8), channel(0))
}
