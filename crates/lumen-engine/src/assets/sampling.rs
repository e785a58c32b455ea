use glam::{Mat3, Vec2, Vec3};

/// Texture coordinate wrapping outside `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Interpretation of the stored texel values.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Color textures authored in sRGB; decoded to linear on sampling.
    #[default]
    Srgb,
    /// Data textures (normals, roughness, masks).
    Linear,
}

/// Sampler and UV-placement parameters of a texture.
///
/// Can be edited while the texture is still pending; the values are applied
/// on the first upload.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureSampling {
    pub repeat: Vec2,
    pub offset: Vec2,
    /// Radians, counter-clockwise around `center`.
    pub rotation: f32,
    pub center: Vec2,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    /// Stored for hosts that build mip chains; the bundled GPU surface samples
    /// level 0 only.
    pub generate_mipmaps: bool,
    pub color_space: ColorSpace,
}

impl Default for TextureSampling {
    fn default() -> Self {
        Self {
            repeat: Vec2::ONE,
            offset: Vec2::ZERO,
            rotation: 0.0,
            center: Vec2::ZERO,
            wrap_s: WrapMode::ClampToEdge,
            wrap_t: WrapMode::ClampToEdge,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            generate_mipmaps: true,
            color_space: ColorSpace::Srgb,
        }
    }
}

impl TextureSampling {
    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap_s = wrap;
        self.wrap_t = wrap;
        self
    }

    pub fn with_filters(mut self, min: FilterMode, mag: FilterMode) -> Self {
        self.min_filter = min;
        self.mag_filter = mag;
        self
    }

    /// Sampler-relevant subset; UV placement changes do not need a new sampler.
    pub fn sampler_key(&self) -> (WrapMode, WrapMode, FilterMode, FilterMode) {
        (self.wrap_s, self.wrap_t, self.min_filter, self.mag_filter)
    }

    /// 3x3 matrix applied to mesh UVs: scale by `repeat`, rotate around
    /// `center`, then shift by `offset`.
    pub fn uv_transform(&self) -> Mat3 {
        let (s, c) = self.rotation.sin_cos();
        let Vec2 { x: sx, y: sy } = self.repeat;
        let Vec2 { x: cx, y: cy } = self.center;
        let Vec2 { x: tx, y: ty } = self.offset;

        Mat3::from_cols(
            Vec3::new(sx * c, -sy * s, 0.0),
            Vec3::new(sx * s, sy * c, 0.0),
            Vec3::new(
                -sx * (c * cx + s * cy) + cx + tx,
                -sy * (-s * cx + c * cy) + cy + ty,
                1.0,
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn apply(m: Mat3, uv: Vec2) -> Vec2 {
        let v = m * uv.extend(1.0);
        Vec2::new(v.x, v.y)
    }

    #[test]
    fn default_is_identity() {
        let m = TextureSampling::default().uv_transform();
        assert!(m.abs_diff_eq(Mat3::IDENTITY, 1e-6));
    }

    #[test]
    fn repeat_then_offset() {
        let s = TextureSampling {
            repeat: Vec2::new(2.0, 3.0),
            offset: Vec2::new(0.5, 0.5),
            ..Default::default()
        };
        let uv = apply(s.uv_transform(), Vec2::new(1.0, 1.0));
        assert!(uv.abs_diff_eq(Vec2::new(2.5, 3.5), 1e-6), "{uv:?}");
    }

    #[test]
    fn rotation_pivots_on_center() {
        let s = TextureSampling {
            rotation: PI,
            center: Vec2::splat(0.5),
            ..Default::default()
        };
        let m = s.uv_transform();
        assert!(apply(m, Vec2::splat(0.5)).abs_diff_eq(Vec2::splat(0.5), 1e-6));
        assert!(apply(m, Vec2::ZERO).abs_diff_eq(Vec2::ONE, 1e-5));
    }

    #[test]
    fn sampler_key_ignores_uv_placement() {
        let a = TextureSampling::default();
        let b = TextureSampling { offset: Vec2::splat(0.3), ..a };
        assert_eq!(a.sampler_key(), b.sampler_key());

        let c = a.with_wrap(WrapMode::Repeat);
        assert_ne!(a.sampler_key(), c.sampler_key());
    }
}
